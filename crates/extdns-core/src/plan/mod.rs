//! Reconciliation planner
//!
//! The planner diffs a desired endpoint list against the current one and
//! produces the [`Changes`] needed to move current towards desired. The
//! result is then folded through the configured [`Policy`] list.
//!
//! ## Matching
//!
//! Desired and current endpoints are matched on `dns_name` only. Two
//! records with the same name but different types are treated as one
//! slot and produce an update, not a create/delete pair.
//!
//! ## Merge
//!
//! When a matched record changed, the update entry is a copy of the
//! desired endpoint that:
//! - inherits labels from the current record (owner id included),
//! - keeps the current record type if the target changed,
//! - keeps the current TTL unless the desired side configured a
//!   different one.
//!
//! The caller's desired endpoints are never modified.

pub mod policy;

pub use policy::{Policy, PolicyKind, SyncPolicy, UpsertOnlyPolicy};

use crate::endpoint::Endpoint;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Actions a provider has to execute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Records that need to be created
    pub create: Vec<Endpoint>,
    /// Records that need to be updated (current data)
    pub update_old: Vec<Endpoint>,
    /// Records that need to be updated (desired data)
    pub update_new: Vec<Endpoint>,
    /// Records that need to be deleted
    pub delete: Vec<Endpoint>,
}

impl Changes {
    /// Whether there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty()
    }

    /// Number of paired updates
    pub fn update_count(&self) -> usize {
        self.update_new.len()
    }
}

/// Inputs of one planning round
pub struct Plan {
    current: Vec<Endpoint>,
    desired: Vec<Endpoint>,
    policies: Vec<Box<dyn Policy>>,
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policies: Vec<&str> = self.policies.iter().map(|p| p.name()).collect();
        f.debug_struct("Plan")
            .field("current", &self.current.len())
            .field("desired", &self.desired.len())
            .field("policies", &policies)
            .finish()
    }
}

/// Output of [`Plan::calculate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanResult {
    /// Desired endpoints, as passed in
    pub desired: Vec<Endpoint>,
    /// Current endpoints, as passed in
    pub current: Vec<Endpoint>,
    /// Changes after all policies were applied
    pub changes: Changes,
}

impl Plan {
    /// Create a plan with no policies
    pub fn new(current: Vec<Endpoint>, desired: Vec<Endpoint>) -> Self {
        Self {
            current,
            desired,
            policies: Vec::new(),
        }
    }

    /// Append a policy; policies run in the order they were added
    pub fn with_policy(mut self, policy: Box<dyn Policy>) -> Self {
        self.policies.push(policy);
        self
    }

    /// Replace the policy list
    pub fn with_policies(mut self, policies: Vec<Box<dyn Policy>>) -> Self {
        self.policies = policies;
        self
    }

    /// Compute the changes needed to move current towards desired
    ///
    /// This never fails.
    pub fn calculate(self) -> PlanResult {
        let mut changes = Changes::default();

        // First occurrence wins when a name appears more than once.
        let mut current_by_name: HashMap<&str, &Endpoint> = HashMap::new();
        for record in &self.current {
            current_by_name
                .entry(record.dns_name.as_str())
                .or_insert(record);
        }

        for desired in &self.desired {
            let Some(current) = current_by_name.get(desired.dns_name.as_str()) else {
                debug!("Planning creation {}", desired);
                changes.create.push(desired.clone());
                continue;
            };

            let target_changed = target_changed(desired, current);
            let update_ttl = should_update_ttl(desired, current);

            if !target_changed && !update_ttl {
                debug!("Skipping endpoint {} because nothing has changed", desired);
                continue;
            }

            debug!("Updating old {}", current);
            changes.update_old.push((*current).clone());

            let merged = merge(desired, current, target_changed, update_ttl);
            debug!("Updating new {}", merged);
            changes.update_new.push(merged);
        }

        let desired_names: HashSet<&str> =
            self.desired.iter().map(|d| d.dns_name.as_str()).collect();
        for current in &self.current {
            if !desired_names.contains(current.dns_name.as_str()) {
                debug!("Planning deletion {}", current);
                changes.delete.push(current.clone());
            }
        }

        for policy in &self.policies {
            debug!("Applying policy {}", policy.name());
            changes = policy.apply(changes);
        }

        PlanResult {
            desired: self.desired,
            current: self.current,
            changes,
        }
    }
}

fn target_changed(desired: &Endpoint, current: &Endpoint) -> bool {
    desired.target != current.target
}

fn should_update_ttl(desired: &Endpoint, current: &Endpoint) -> bool {
    desired.ttl.is_configured() && desired.ttl != current.ttl
}

fn merge(desired: &Endpoint, current: &Endpoint, target_changed: bool, update_ttl: bool) -> Endpoint {
    let mut merged = desired.clone();
    merged.merge_labels(&current.labels);

    if target_changed {
        merged.record_type = current.record_type.clone();
    }

    if !update_ttl {
        merged.ttl = current.ttl;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{OWNER_LABEL_KEY, RecordType, Ttl};

    fn a(name: &str, target: &str) -> Endpoint {
        Endpoint::new(name, RecordType::A, target)
    }

    fn names(endpoints: &[Endpoint]) -> Vec<&str> {
        endpoints.iter().map(|e| e.dns_name.as_str()).collect()
    }

    #[test]
    fn identical_lists_produce_no_changes() {
        let records = vec![
            a("foo.example.org", "1.2.3.4").with_ttl(300),
            a("bar.example.org", "5.6.7.8"),
        ];

        let result = Plan::new(records.clone(), records).calculate();

        assert!(result.changes.is_empty());
    }

    #[test]
    fn unmatched_names_are_created_and_deleted() {
        let current = vec![a("old.example.org", "1.1.1.1"), a("keep.example.org", "2.2.2.2")];
        let desired = vec![a("keep.example.org", "2.2.2.2"), a("new.example.org", "3.3.3.3")];

        let changes = Plan::new(current, desired).calculate().changes;

        assert_eq!(names(&changes.create), vec!["new.example.org"]);
        assert_eq!(names(&changes.delete), vec!["old.example.org"]);
        assert!(changes.update_old.is_empty());
        assert!(changes.update_new.is_empty());
    }

    #[test]
    fn target_change_produces_paired_update() {
        let current = vec![a("foo.example.org", "1.1.1.1")];
        let desired = vec![a("foo.example.org", "2.2.2.2")];

        let changes = Plan::new(current, desired).calculate().changes;

        assert_eq!(changes.update_old, vec![a("foo.example.org", "1.1.1.1")]);
        assert_eq!(changes.update_new, vec![a("foo.example.org", "2.2.2.2")]);
        assert!(changes.create.is_empty());
        assert!(changes.delete.is_empty());
    }

    #[test]
    fn configured_ttl_change_produces_update() {
        let current = vec![a("foo.example.org", "1.1.1.1").with_ttl(300)];
        let desired = vec![a("foo.example.org", "1.1.1.1").with_ttl(60)];

        let changes = Plan::new(current, desired).calculate().changes;

        assert_eq!(changes.update_new.len(), 1);
        assert_eq!(changes.update_new[0].ttl, Ttl::new(60));
    }

    #[test]
    fn unconfigured_ttl_with_same_target_is_a_noop() {
        let current = vec![a("foo.example.org", "1.1.1.1").with_ttl(300)];
        let desired = vec![a("foo.example.org", "1.1.1.1")];

        let changes = Plan::new(current, desired).calculate().changes;

        assert!(changes.is_empty());
    }

    #[test]
    fn update_keeps_current_ttl_when_unconfigured() {
        let current = vec![a("foo.example.org", "1.1.1.1").with_ttl(300)];
        let desired = vec![a("foo.example.org", "2.2.2.2")];

        let changes = Plan::new(current, desired).calculate().changes;

        assert_eq!(changes.update_new[0].ttl, Ttl::new(300));
        assert_eq!(changes.update_new[0].target, "2.2.2.2");
    }

    #[test]
    fn update_inherits_current_record_type_on_target_change() {
        let current = vec![Endpoint::new("foo.example.org", RecordType::Cname, "lb.example.org")];
        let desired = vec![a("foo.example.org", "1.2.3.4")];

        let changes = Plan::new(current, desired).calculate().changes;

        assert_eq!(changes.update_new[0].record_type, RecordType::Cname);
        assert_eq!(changes.update_new[0].target, "1.2.3.4");
    }

    #[test]
    fn ttl_only_update_keeps_desired_record_type() {
        let current = vec![Endpoint::new("foo.example.org", RecordType::Cname, "1.2.3.4")];
        let desired = vec![a("foo.example.org", "1.2.3.4").with_ttl(60)];

        let changes = Plan::new(current, desired).calculate().changes;

        assert_eq!(changes.update_new[0].record_type, RecordType::A);
    }

    #[test]
    fn update_inherits_owner_label() {
        let current = vec![a("foo.example.org", "1.1.1.1").with_label(OWNER_LABEL_KEY, "default")];
        let desired = vec![a("foo.example.org", "2.2.2.2")];

        let changes = Plan::new(current, desired).calculate().changes;

        assert_eq!(changes.update_new[0].owner(), Some("default"));
    }

    #[test]
    fn caller_desired_records_are_not_mutated() {
        let current = vec![
            Endpoint::new("foo.example.org", RecordType::Cname, "lb.example.org")
                .with_ttl(300)
                .with_label(OWNER_LABEL_KEY, "default"),
        ];
        let desired = vec![a("foo.example.org", "1.2.3.4")];
        let desired_before = desired.clone();

        let result = Plan::new(current, desired).calculate();

        assert_eq!(result.desired, desired_before);
        assert_ne!(result.changes.update_new[0], desired_before[0]);
    }

    #[test]
    fn same_name_different_type_is_one_slot() {
        let current = vec![Endpoint::new("foo.example.org", RecordType::Txt, "\"hello\"")];
        let desired = vec![a("foo.example.org", "1.2.3.4")];

        let changes = Plan::new(current, desired).calculate().changes;

        assert!(changes.create.is_empty());
        assert!(changes.delete.is_empty());
        assert_eq!(changes.update_old.len(), 1);
    }

    #[test]
    fn first_current_match_wins() {
        let current = vec![a("foo.example.org", "1.1.1.1"), a("foo.example.org", "2.2.2.2")];
        let desired = vec![a("foo.example.org", "1.1.1.1")];

        let changes = Plan::new(current, desired).calculate().changes;

        assert!(changes.is_empty());
    }

    /// Turns every delete into a create
    struct RecreatePolicy;

    impl Policy for RecreatePolicy {
        fn apply(&self, mut changes: Changes) -> Changes {
            changes.create.append(&mut changes.delete);
            changes
        }

        fn name(&self) -> &'static str {
            "recreate"
        }
    }

    #[test]
    fn policy_order_changes_the_result() {
        let current = vec![a("old.example.org", "1.1.1.1")];
        let desired = vec![a("new.example.org", "2.2.2.2")];

        let recreate_first = Plan::new(current.clone(), desired.clone())
            .with_policy(Box::new(RecreatePolicy))
            .with_policy(Box::new(UpsertOnlyPolicy))
            .calculate()
            .changes;
        let upsert_first = Plan::new(current, desired)
            .with_policy(Box::new(UpsertOnlyPolicy))
            .with_policy(Box::new(RecreatePolicy))
            .calculate()
            .changes;

        assert_eq!(
            names(&recreate_first.create),
            vec!["new.example.org", "old.example.org"]
        );
        assert_eq!(names(&upsert_first.create), vec!["new.example.org"]);
        assert!(recreate_first.delete.is_empty());
        assert!(upsert_first.delete.is_empty());
    }

    #[test]
    fn policies_run_in_order() {
        let current = vec![a("old.example.org", "1.1.1.1")];
        let desired = vec![a("new.example.org", "2.2.2.2")];

        let changes = Plan::new(current, desired)
            .with_policy(Box::new(SyncPolicy))
            .with_policy(Box::new(UpsertOnlyPolicy))
            .calculate()
            .changes;

        assert_eq!(names(&changes.create), vec!["new.example.org"]);
        assert!(changes.delete.is_empty());
    }

    #[test]
    fn result_keeps_inputs() {
        let current = vec![a("old.example.org", "1.1.1.1")];
        let desired = vec![a("new.example.org", "2.2.2.2")];

        let result = Plan::new(current.clone(), desired.clone()).calculate();

        assert_eq!(result.current, current);
        assert_eq!(result.desired, desired);
    }
}
