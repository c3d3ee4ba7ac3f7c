// # DNS Provider Trait
//
// Defines the interface for reading and writing records on a DNS backend.
//
// ## Implementations
//
// - In-memory: `extdns-provider-inmemory` crate
// - Future: Route53, Cloudflare, Google Cloud DNS, etc.
//
// ## Usage
//
// ```rust,ignore
// use extdns_core::{Changes, DnsProvider};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let records = provider.records().await?;
//     provider.apply_changes(&Changes::default()).await?;
//
//     Ok(())
// }
// ```

use crate::endpoint::Endpoint;
use crate::plan::Changes;
use crate::source::DomainFilter;
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// ## Allowed Capabilities
/// - Perform API calls to their backend
/// - Return success or failure
///
/// ## Forbidden Capabilities
/// - Retry or back off (the controller owns scheduling)
/// - Decide which changes are needed (the planner owns that)
/// - Spawn background tasks
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List all records the provider currently publishes
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Endpoint>)`: The published records
    /// - `Err(Error)`: If the backend could not be queried
    async fn records(&self) -> Result<Vec<Endpoint>, crate::Error>;

    /// Apply a change-set
    ///
    /// # Parameters
    ///
    /// - `changes`: Creates, paired updates and deletes to execute
    ///
    /// # Returns
    ///
    /// - `Ok(())`: All changes were applied
    /// - `Err(Error)`: If the backend rejected the changes
    async fn apply_changes(&self, changes: &Changes) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the provider (e.g., "inmemory", "route53")
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    /// - `domain_filter`: Zones the provider is allowed to manage
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
        domain_filter: DomainFilter,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
