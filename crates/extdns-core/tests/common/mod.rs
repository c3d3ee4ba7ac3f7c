//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record how the core
//! calls its collaborators.

#![allow(dead_code)]

use extdns_core::error::{Error, Result};
use extdns_core::traits::{DnsProvider, Registry, Source};
use extdns_core::{Changes, Endpoint, ExtDnsConfig, PolicyKind, RecordType, RunMode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shorthand for an A record
pub fn a(name: &str, target: &str) -> Endpoint {
    Endpoint::new(name, RecordType::A, target)
}

/// Shorthand for a CNAME record
pub fn cname(name: &str, target: &str) -> Endpoint {
    Endpoint::new(name, RecordType::Cname, target)
}

/// Names of a list of endpoints, in order
pub fn names(endpoints: &[Endpoint]) -> Vec<&str> {
    endpoints.iter().map(|e| e.dns_name.as_str()).collect()
}

/// A Source returning a fixed list and counting calls
pub struct MockSource {
    endpoints: Vec<Endpoint>,
    call_count: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times endpoints() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new MockSource that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            endpoints: other.endpoints.clone(),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl Source for MockSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.endpoints.clone())
    }
}

/// A Source that always fails
pub struct FailingSource {
    pub message: &'static str,
}

#[async_trait::async_trait]
impl Source for FailingSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>> {
        Err(Error::source_error(self.message))
    }
}

/// A Registry holding records in memory and recording applied change-sets
#[derive(Clone, Default)]
pub struct MockRegistry {
    records: Arc<Mutex<Vec<Endpoint>>>,
    applied: Arc<Mutex<Vec<Changes>>>,
    fail_apply: bool,
}

impl MockRegistry {
    pub fn new(records: Vec<Endpoint>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    /// A registry whose apply_changes() always fails
    pub fn failing(records: Vec<Endpoint>) -> Self {
        Self {
            fail_apply: true,
            ..Self::new(records)
        }
    }

    /// Change-sets passed to apply_changes(), in order
    pub fn applied(&self) -> Vec<Changes> {
        self.applied.lock().unwrap().clone()
    }

    /// Records currently held
    pub fn current(&self) -> Vec<Endpoint> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Registry for MockRegistry {
    async fn records(&self) -> Result<Vec<Endpoint>> {
        Ok(self.current())
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        if self.fail_apply {
            return Err(Error::provider("mock", "backend unavailable"));
        }

        self.applied.lock().unwrap().push(changes.clone());

        let mut records = self.records.lock().unwrap();
        let removed: Vec<&str> = changes
            .update_old
            .iter()
            .chain(&changes.delete)
            .map(|e| e.dns_name.as_str())
            .collect();
        records.retain(|r| !removed.contains(&r.dns_name.as_str()));
        records.extend(changes.create.iter().cloned());
        records.extend(changes.update_new.iter().cloned());
        Ok(())
    }

    fn registry_name(&self) -> &'static str {
        "mock"
    }
}

/// A DnsProvider holding records in memory
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    inner: MockRegistry,
}

impl MockDnsProvider {
    pub fn new(records: Vec<Endpoint>) -> Self {
        Self {
            inner: MockRegistry::new(records),
        }
    }

    pub fn applied(&self) -> Vec<Changes> {
        self.inner.applied()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn records(&self) -> Result<Vec<Endpoint>> {
        self.inner.records().await
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        self.inner.apply_changes(changes).await
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Drain every event currently queued on a receiver
pub fn drain<T>(rx: &mut tokio::sync::mpsc::Receiver<T>) -> Vec<T> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Minimal valid configuration for controller tests
pub fn controller_config(mode: RunMode, policy: PolicyKind, dry_run: bool) -> ExtDnsConfig {
    let mut config = ExtDnsConfig::new();
    config.policy = policy;
    config.controller.mode = mode;
    config.controller.dry_run = dry_run;
    config.controller.interval_secs = 1;
    config
}
