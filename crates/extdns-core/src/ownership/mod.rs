//! Ownership registry implementations
//!
//! - [`NoopRegistry`]: forwards to the provider without ownership tracking

pub mod noop;

pub use noop::{NoopRegistry, NoopRegistryFactory};
