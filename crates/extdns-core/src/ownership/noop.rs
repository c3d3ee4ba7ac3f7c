// # Noop Registry
//
// Registry without ownership bookkeeping.
//
// Current records come straight from the provider, without owner labels,
// and change-sets are forwarded unchanged. Every record the provider
// reports is therefore treated as managed by this instance.

use crate::config::RegistryConfig;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::plan::Changes;
use crate::traits::{DnsProvider, Registry, RegistryFactory};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Registry forwarding directly to a provider
#[derive(Clone)]
pub struct NoopRegistry {
    provider: Arc<dyn DnsProvider>,
}

impl NoopRegistry {
    /// Create a registry on top of `provider`
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Registry for NoopRegistry {
    async fn records(&self) -> Result<Vec<Endpoint>> {
        self.provider.records().await
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        debug!(
            "Forwarding changes to provider {}",
            self.provider.provider_name()
        );
        self.provider.apply_changes(changes).await
    }

    fn registry_name(&self) -> &'static str {
        "noop"
    }
}

/// Factory for [`NoopRegistry`]
pub struct NoopRegistryFactory;

impl RegistryFactory for NoopRegistryFactory {
    fn create(
        &self,
        config: &RegistryConfig,
        provider: Arc<dyn DnsProvider>,
        _owner_id: &str,
    ) -> Result<Box<dyn Registry>> {
        match config {
            RegistryConfig::Noop => Ok(Box::new(NoopRegistry::new(provider))),
            other => Err(Error::config(format!(
                "Noop registry factory cannot build '{}'",
                other.type_name()
            ))),
        }
    }
}
