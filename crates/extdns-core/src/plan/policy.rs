//! Synchronization policies
//!
//! A policy is a pure transform over a computed [`Changes`] set. Policies
//! run after diffing, in the order they were configured, each consuming
//! the previous one's output.

use super::Changes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A transform applied to a change-set
pub trait Policy: Send + Sync {
    /// Transform the change-set
    fn apply(&self, changes: Changes) -> Changes;

    /// Configuration name of the policy (for logging)
    fn name(&self) -> &'static str;
}

/// Allows every create, update and delete
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncPolicy;

impl Policy for SyncPolicy {
    fn apply(&self, changes: Changes) -> Changes {
        changes
    }

    fn name(&self) -> &'static str {
        "sync"
    }
}

/// Allows creates and updates; existing records are never removed
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertOnlyPolicy;

impl Policy for UpsertOnlyPolicy {
    fn apply(&self, changes: Changes) -> Changes {
        Changes {
            delete: Vec::new(),
            ..changes
        }
    }

    fn name(&self) -> &'static str {
        "upsert-only"
    }
}

/// Configured policy name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Full synchronization
    #[default]
    Sync,
    /// Never delete
    UpsertOnly,
}

impl PolicyKind {
    /// All accepted configuration names
    pub const NAMES: &'static [&'static str] = &["sync", "upsert-only"];

    /// Instantiate the policy
    pub fn build(self) -> Box<dyn Policy> {
        match self {
            PolicyKind::Sync => Box::new(SyncPolicy),
            PolicyKind::UpsertOnly => Box::new(UpsertOnlyPolicy),
        }
    }

    /// Configuration name
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Sync => "sync",
            PolicyKind::UpsertOnly => "upsert-only",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(PolicyKind::Sync),
            "upsert-only" => Ok(PolicyKind::UpsertOnly),
            other => Err(crate::Error::config(format!(
                "Unknown policy '{}'. Supported policies: {}",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}
