//! Configuration types for the extdns system
//!
//! This module defines all configuration structures used throughout the crate.

use crate::plan::PolicyKind;
use crate::source::{DomainFilter, parse_cidrs};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main extdns configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtDnsConfig {
    /// Synchronization policy
    #[serde(default)]
    pub policy: PolicyKind,

    /// Ownership registry configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// DNS provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Endpoint filters
    #[serde(default)]
    pub filters: FilterConfig,

    /// Control loop settings
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Identity of this instance, recorded as the owner of created records
    #[serde(default = "default_owner_id")]
    pub txt_owner_id: String,
}

impl ExtDnsConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            policy: PolicyKind::default(),
            registry: RegistryConfig::default(),
            provider: ProviderConfig::default(),
            filters: FilterConfig::default(),
            controller: ControllerConfig::default(),
            txt_owner_id: default_owner_id(),
        }
    }

    /// Parse a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.txt_owner_id.trim().is_empty() {
            return Err(crate::Error::config("Owner id cannot be empty"));
        }

        self.provider.validate()?;
        self.registry.validate()?;
        self.filters.validate()?;
        self.controller.validate()?;

        Ok(())
    }
}

impl Default for ExtDnsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Ownership registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryConfig {
    /// No ownership tracking
    #[default]
    Noop,

    /// Custom registry
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl RegistryConfig {
    /// Validate the registry configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RegistryConfig::Noop => Ok(()),
            RegistryConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom registry factory cannot be empty",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the registry type name
    pub fn type_name(&self) -> &str {
        match self {
            RegistryConfig::Noop => "noop",
            RegistryConfig::Custom { factory, .. } => factory,
        }
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// In-memory provider
    InMemory {
        /// Pre-created zones
        #[serde(default)]
        zones: Vec<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::InMemory { zones } => {
                if zones.iter().any(|z| z.trim().is_empty()) {
                    return Err(crate::Error::config("In-memory zone names cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::InMemory { .. } => "inmemory",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::InMemory { zones: Vec::new() }
    }
}

/// Endpoint filter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Zones the provider may manage
    #[serde(default)]
    pub domain_filter: DomainFilter,

    /// Parent domains desired endpoints must fall under
    #[serde(default)]
    pub base_domain_filter: DomainFilter,

    /// Networks whose addresses are never published as A records
    #[serde(default)]
    pub cidr_ignore: Vec<String>,

    /// Names (or `*.suffix` wildcards) that are never published
    #[serde(default)]
    pub dns_ignore: Vec<String>,
}

impl FilterConfig {
    /// Validate the filter configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        parse_cidrs(&self.cidr_ignore)?;

        for pattern in &self.dns_ignore {
            validate_dns_pattern(pattern)?;
        }

        Ok(())
    }
}

fn validate_dns_pattern(pattern: &str) -> Result<(), crate::Error> {
    if pattern.trim().is_empty() {
        return Err(crate::Error::config("DNS ignore pattern cannot be empty"));
    }

    let body = pattern.strip_prefix("*.").unwrap_or(pattern);
    if body.is_empty() {
        return Err(crate::Error::config(format!(
            "DNS ignore pattern '{}' has no suffix",
            pattern
        )));
    }
    if body.contains('*') {
        return Err(crate::Error::config(format!(
            "DNS ignore pattern '{}': '*' is only allowed as the leftmost label",
            pattern
        )));
    }

    Ok(())
}

/// How the control loop runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Reconcile every `interval_secs` until shutdown
    #[default]
    Interval,
    /// Reconcile once and exit
    Once,
    /// Delete every record the registry reports, then exit
    Cleanup,
}

/// Control loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Seconds between two reconciliations
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Run mode
    #[serde(default)]
    pub mode: RunMode,

    /// Log changes instead of applying them
    #[serde(default)]
    pub dry_run: bool,

    /// Capacity of the controller event channel
    ///
    /// When full, new events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ControllerConfig {
    /// Validate the controller configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }

    /// Interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            mode: RunMode::default(),
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_owner_id() -> String {
    "default".to_string()
}

fn default_interval_secs() -> u64 {
    60
}

fn default_event_channel_capacity() -> usize {
    100
}
