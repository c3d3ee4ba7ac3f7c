//! Core traits for the extdns system
//!
//! This module defines the abstract interfaces that collaborators must follow.
//!
//! - [`Source`]: Produce the desired endpoints
//! - [`Registry`]: Report current endpoints with ownership labels and apply changes
//! - [`DnsProvider`]: Read and write records on a DNS backend

pub mod dns_provider;
pub mod registry;
pub mod source;

pub use dns_provider::{DnsProvider, DnsProviderFactory};
pub use registry::{Registry, RegistryFactory};
pub use source::Source;
