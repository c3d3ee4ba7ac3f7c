// # extdns-core
//
// Core library for synchronizing DNS records with a DNS backend.
//
// ## Architecture Overview
//
// - **Endpoint**: The DNS record unit (name, type, target, TTL, labels)
// - **Source**: Trait for producing desired endpoints
// - **FilterSource**: Narrows a source by CIDR, DNS name and base domain
// - **Plan**: Diffs desired against current and applies policies
// - **Policy**: Pure transform over a change-set (sync, upsert-only)
// - **Registry**: Trait for ownership bookkeeping in front of a provider
// - **DnsProvider**: Trait for reading and writing backend records
// - **Controller**: Drives source → plan → registry once or on an interval
// - **ComponentRegistry**: Plugin-based registry for providers and registries
//
// ## Design Principles
//
// 1. **Pure planning**: `Plan::calculate` does no I/O and never fails
// 2. **No hidden retries**: Failures surface to the controller loop
// 3. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod ownership;
pub mod plan;
pub mod registry;
pub mod source;
pub mod traits;

/// Version of this build
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export core types for convenience
pub use config::{ControllerConfig, ExtDnsConfig, FilterConfig, ProviderConfig, RegistryConfig, RunMode};
pub use controller::{Controller, ControllerEvent};
pub use endpoint::{Endpoint, Labels, OWNER_LABEL_KEY, RecordType, Ttl};
pub use error::{Error, Result};
pub use ownership::NoopRegistry;
pub use plan::{Changes, Plan, PlanResult, Policy, PolicyKind, SyncPolicy, UpsertOnlyPolicy};
pub use registry::ComponentRegistry;
pub use source::{DomainFilter, FilterSource, MultiSource, StaticSource};
pub use traits::{DnsProvider, Registry, Source};
