//! Plugin-based component registry
//!
//! The registry allows DNS providers and ownership registries to be
//! registered dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use extdns_core::registry::ComponentRegistry;
//! use extdns_core::config::ProviderConfig;
//!
//! let registry = ComponentRegistry::with_builtins();
//! registry.register_provider("inmemory", Box::new(InMemoryProviderFactory));
//!
//! let config = ProviderConfig::InMemory { zones: vec!["example.org".into()] };
//! let provider = registry.create_provider(&config, DomainFilter::all())?;
//! ```
//!
//! ## Registration
//!
//! Provider crates expose a `register()` function:
//!
//! ```rust,ignore
//! pub fn register(registry: &ComponentRegistry) {
//!     registry.register_provider("inmemory", Box::new(InMemoryProviderFactory));
//! }
//! ```

use crate::config::{ProviderConfig, RegistryConfig};
use crate::error::{Error, Result};
use crate::ownership::NoopRegistryFactory;
use crate::source::DomainFilter;
use crate::traits::{DnsProvider, DnsProviderFactory, Registry, RegistryFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Component registry for plugin-based collaborator creation
///
/// The registry maintains maps of type names to factory objects,
/// allowing dynamic instantiation based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ComponentRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,

    /// Registered ownership registry factories
    registries: RwLock<HashMap<String, Box<dyn RegistryFactory>>>,
}

impl ComponentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the components shipped in this crate
    ///
    /// Currently registers the `noop` ownership registry.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_registry("noop", Box::new(NoopRegistryFactory));
        registry
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "inmemory", "route53")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers.insert(name.into(), factory);
    }

    /// Register an ownership registry factory
    ///
    /// # Parameters
    ///
    /// - `name`: Registry type name (e.g., "noop", "txt")
    /// - `factory`: Factory object for creating registry instances
    pub fn register_registry(&self, name: impl Into<String>, factory: Box<dyn RegistryFactory>) {
        let mut registries = self.registries.write().unwrap_or_else(PoisonError::into_inner);
        registries.insert(name.into(), factory);
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub fn create_provider(
        &self,
        config: &ProviderConfig,
        domain_filter: DomainFilter,
    ) -> Result<Box<dyn DnsProvider>> {
        let provider_type = config.type_name();
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config, domain_filter)
    }

    /// Create an ownership registry from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Registry>)`: Created registry instance
    /// - `Err(Error)`: If registry type is not registered or creation fails
    pub fn create_registry(
        &self,
        config: &RegistryConfig,
        provider: Arc<dyn DnsProvider>,
        owner_id: &str,
    ) -> Result<Box<dyn Registry>> {
        let registry_type = config.type_name();
        let registries = self.registries.read().unwrap_or_else(PoisonError::into_inner);

        let factory = registries
            .get(registry_type)
            .ok_or_else(|| Error::config(format!("Unknown registry type: {}", registry_type)))?;

        factory.create(config, provider, owner_id)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.keys().cloned().collect()
    }

    /// List all registered registry types
    pub fn list_registries(&self) -> Vec<String> {
        let registries = self.registries.read().unwrap_or_else(PoisonError::into_inner);
        registries.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.contains_key(name)
    }

    /// Check if a registry type is registered
    pub fn has_registry(&self, name: &str) -> bool {
        let registries = self.registries.read().unwrap_or_else(PoisonError::into_inner);
        registries.contains_key(name)
    }
}
