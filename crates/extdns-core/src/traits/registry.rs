// # Registry Trait
//
// Defines the interface for ownership bookkeeping between the planner
// and the DNS provider.
//
// A registry reports the records currently published, decorated with
// ownership labels, and translates a change-set back into provider calls
// plus whatever bookkeeping it needs (e.g. TXT records per owned name).
//
// ## Implementations
//
// - `NoopRegistry`: no ownership tracking, forwards to the provider
// - A TXT-based registry lives outside this crate

use crate::endpoint::Endpoint;
use crate::plan::Changes;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for ownership registry implementations
///
/// # Responsibilities
///
/// - Return current records with ownership labels filled in
/// - Apply a change-set to the underlying provider
///
/// A registry does not retry failed provider calls. Errors are returned
/// to the controller, which logs them and moves on to the next tick.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Current records, with ownership labels
    async fn records(&self) -> Result<Vec<Endpoint>, crate::Error>;

    /// Apply the change-set through the provider
    async fn apply_changes(&self, changes: &Changes) -> Result<(), crate::Error>;

    /// Registry name (for logging)
    fn registry_name(&self) -> &'static str;
}

/// Helper trait for constructing registries from configuration
pub trait RegistryFactory: Send + Sync {
    /// Create a Registry on top of `provider`
    ///
    /// # Parameters
    ///
    /// - `config`: Registry configuration
    /// - `provider`: Provider the registry reads from and writes to
    /// - `owner_id`: Identity of this controller instance
    fn create(
        &self,
        config: &crate::config::RegistryConfig,
        provider: Arc<dyn crate::traits::DnsProvider>,
        owner_id: &str,
    ) -> Result<Box<dyn Registry>, crate::Error>;
}
