// # In-Memory DNS Provider
//
// This crate provides an in-memory DNS provider for the extdns system.
//
// ## Purpose
//
// Keeps zones and records in a map guarded by a RwLock. Nothing is
// persisted. Useful for testing, demos and dry runs of a configuration
// before pointing it at a real backend.
//
// ## Behavior
//
// - Records belong to the zone with the longest matching suffix
// - Records outside every zone are skipped with a warning
// - Creating an existing record fails with `RecordAlreadyExists`
// - Updating or deleting a missing record fails with `RecordNotFound`
// - A change-set is validated in full before anything is written, so a
//   failed batch leaves the zones untouched
//
// ## Constraints
//
// Like every provider, this one does not retry, does not decide which
// changes are needed, and does not spawn tasks.

use async_trait::async_trait;
use extdns_core::config::ProviderConfig;
use extdns_core::registry::ComponentRegistry;
use extdns_core::traits::{DnsProvider, DnsProviderFactory};
use extdns_core::{Changes, DomainFilter, Endpoint, Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Provider type name used in configuration and the component registry
pub const PROVIDER_NAME: &str = "inmemory";

/// Records of one zone, keyed by (name, type)
type Zone = BTreeMap<(String, String), Endpoint>;

/// In-memory DNS provider
///
/// Cloning shares the underlying zones.
///
/// # Example
///
/// ```rust
/// use extdns_core::{Changes, DnsProvider, DomainFilter, Endpoint, RecordType};
/// use extdns_provider_inmemory::InMemoryProvider;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = InMemoryProvider::new(DomainFilter::all());
///     provider.create_zone("example.org").await?;
///
///     let changes = Changes {
///         create: vec![Endpoint::new("foo.example.org", RecordType::A, "1.2.3.4")],
///         ..Changes::default()
///     };
///     provider.apply_changes(&changes).await?;
///
///     assert_eq!(provider.records().await?.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    zones: Arc<RwLock<BTreeMap<String, Zone>>>,
    domain_filter: DomainFilter,
}

impl InMemoryProvider {
    /// Create a provider with no zones
    pub fn new(domain_filter: DomainFilter) -> Self {
        Self {
            zones: Arc::new(RwLock::new(BTreeMap::new())),
            domain_filter,
        }
    }

    /// Create an empty zone
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the zone is excluded by the domain filter
    /// - [`Error::RecordAlreadyExists`] if the zone already exists
    pub async fn create_zone(&self, zone: &str) -> Result<()> {
        let zone = normalize(zone);
        if zone.is_empty() {
            return Err(Error::config("Zone name cannot be empty"));
        }
        if !self.domain_filter.matches(&zone) {
            return Err(Error::config(format!(
                "Zone {} is excluded by the domain filter",
                zone
            )));
        }

        let mut zones = self.zones.write().await;
        if zones.contains_key(&zone) {
            return Err(Error::already_exists(format!("zone {}", zone)));
        }
        debug!("Creating zone {}", zone);
        zones.insert(zone, Zone::new());
        Ok(())
    }

    /// Names of all zones
    pub async fn zones(&self) -> Vec<String> {
        self.zones.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl DnsProvider for InMemoryProvider {
    async fn records(&self) -> Result<Vec<Endpoint>> {
        let zones = self.zones.read().await;
        Ok(zones
            .values()
            .flat_map(|zone| zone.values().cloned())
            .collect())
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        let mut zones = self.zones.write().await;

        // Work on a copy so a rejected batch leaves the zones untouched.
        let mut staged = zones.clone();

        for endpoint in &changes.create {
            let Some(zone) = zone_for(&mut staged, &endpoint.dns_name) else {
                continue;
            };
            let key = key_of(endpoint);
            if zone.contains_key(&key) {
                return Err(Error::already_exists(endpoint.to_string()));
            }
            zone.insert(key, endpoint.clone());
        }

        for (old, new) in changes.update_old.iter().zip(&changes.update_new) {
            let Some(zone) = zone_for(&mut staged, &old.dns_name) else {
                continue;
            };
            if zone.remove(&key_of(old)).is_none() {
                return Err(Error::not_found(old.to_string()));
            }
            zone.insert(key_of(new), new.clone());
        }

        for endpoint in &changes.delete {
            let Some(zone) = zone_for(&mut staged, &endpoint.dns_name) else {
                continue;
            };
            if zone.remove(&key_of(endpoint)).is_none() {
                return Err(Error::not_found(endpoint.to_string()));
            }
        }

        *zones = staged;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Zone with the longest suffix matching `name`
fn zone_for<'a>(zones: &'a mut BTreeMap<String, Zone>, name: &str) -> Option<&'a mut Zone> {
    let name = normalize(name);
    let zone_name = zones
        .keys()
        .filter(|zone| {
            name == **zone
                || name
                    .strip_suffix(zone.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
        .max_by_key(|zone| zone.len())
        .cloned();

    match zone_name {
        Some(zone_name) => zones.get_mut(&zone_name),
        None => {
            warn!("No zone found for {}, skipping", name);
            None
        }
    }
}

fn key_of(endpoint: &Endpoint) -> (String, String) {
    (endpoint.dns_name.clone(), endpoint.record_type.to_string())
}

fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Factory for creating in-memory providers from configuration
pub struct InMemoryProviderFactory;

impl DnsProviderFactory for InMemoryProviderFactory {
    fn create(
        &self,
        config: &ProviderConfig,
        domain_filter: DomainFilter,
    ) -> Result<Box<dyn DnsProvider>> {
        let ProviderConfig::InMemory { zones } = config else {
            return Err(Error::config(format!(
                "In-memory factory cannot build provider '{}'",
                config.type_name()
            )));
        };

        let mut map = BTreeMap::new();
        for zone in zones {
            let zone = normalize(zone);
            if !domain_filter.matches(&zone) {
                warn!("Zone {} is excluded by the domain filter, skipping", zone);
                continue;
            }
            map.entry(zone).or_insert_with(Zone::new);
        }

        let provider = InMemoryProvider {
            zones: Arc::new(RwLock::new(map)),
            domain_filter,
        };

        Ok(Box::new(provider))
    }
}

/// Register the in-memory provider with a component registry
pub fn register(registry: &ComponentRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(InMemoryProviderFactory));
}
