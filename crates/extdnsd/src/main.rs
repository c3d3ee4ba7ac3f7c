// # extdnsd - DNS Record Synchronizer Daemon
//
// This is a thin integration layer. Planning, filtering and the control
// loop live in extdns-core; providers live in their own crates.
//
// The extdnsd daemon is responsible for:
// 1. Reading configuration from a JSON file and environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers and ownership registries
// 4. Starting the controller
//
// ## Configuration
//
// `EXTDNS_CONFIG` names an optional JSON file with the full configuration.
// The variables below override individual fields of it (or of the
// defaults when no file is given).
//
// ### Source
// - `EXTDNS_ENDPOINTS`: Comma-separated `name:TYPE:target[:ttl]` entries.
//   Several groups may be given separated by `;`; each group becomes its
//   own source and the daemon reads them all in order.
//
// ### Filters
// - `EXTDNS_DOMAIN_FILTER`: Zones the provider may manage
// - `EXTDNS_BASE_DOMAIN_FILTER`: Suffixes endpoint names must fall under
// - `EXTDNS_EXCLUDE_CIDRS`: CIDR ranges whose A records are dropped
// - `EXTDNS_EXCLUDE_DNS`: Names to drop (`*.example.org` matches one label)
//
// ### Provider and registry
// - `EXTDNS_ZONES`: Zones of the in-memory provider
// - `EXTDNS_TXT_OWNER_ID`: Owner id handed to the registry
//
// ### Controller
// - `EXTDNS_POLICY`: `sync` or `upsert-only`
// - `EXTDNS_MODE`: `interval`, `once` or `cleanup`
// - `EXTDNS_INTERVAL_SECS`: Seconds between two reconciliations
// - `EXTDNS_DRY_RUN`: Log changes instead of applying them
//
// ### Logging
// - `EXTDNS_LOG_LEVEL`: trace, debug, info, warn, error
// - `EXTDNS_LOG_FORMAT`: text or json
//
// ## Example
//
// ```bash
// export EXTDNS_ZONES=example.org
// export EXTDNS_ENDPOINTS=www.example.org:A:192.0.2.10:300,api.example.org:CNAME:www.example.org
// export EXTDNS_EXCLUDE_CIDRS=10.0.0.0/8
// export EXTDNS_MODE=once
//
// extdnsd
// ```

use anyhow::{Context, Result};
use extdns_core::{
    ComponentRegistry, Controller, ControllerEvent, ExtDnsConfig, FilterSource, MultiSource,
    PolicyKind, ProviderConfig, RunMode, Source, StaticSource,
};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, debug, error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum ExtDnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<ExtDnsExitCode> for ExitCode {
    fn from(code: ExtDnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

/// Daemon configuration
struct Config {
    core: ExtDnsConfig,
    endpoints: String,
    log_level: Level,
    log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut core = match var("EXTDNS_CONFIG") {
            Some(path) => ExtDnsConfig::from_file(&path)
                .with_context(|| format!("Failed to load EXTDNS_CONFIG file {}", path))?,
            None => ExtDnsConfig::new(),
        };

        if let Some(policy) = var("EXTDNS_POLICY") {
            core.policy = policy.parse::<PolicyKind>()?;
        }
        if let Some(mode) = var("EXTDNS_MODE") {
            core.controller.mode = parse_mode(&mode)?;
        }
        if let Some(secs) = var("EXTDNS_INTERVAL_SECS") {
            core.controller.interval_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("EXTDNS_INTERVAL_SECS '{}' is not a number", secs))?;
        }
        if let Some(dry_run) = var("EXTDNS_DRY_RUN") {
            core.controller.dry_run = parse_bool("EXTDNS_DRY_RUN", &dry_run)?;
        }
        if let Some(owner) = var("EXTDNS_TXT_OWNER_ID") {
            core.txt_owner_id = owner;
        }

        if let Some(filters) = var("EXTDNS_DOMAIN_FILTER") {
            core.filters.domain_filter = split_list(&filters).into();
        }
        if let Some(filters) = var("EXTDNS_BASE_DOMAIN_FILTER") {
            core.filters.base_domain_filter = split_list(&filters).into();
        }
        if let Some(cidrs) = var("EXTDNS_EXCLUDE_CIDRS") {
            core.filters.cidr_ignore = split_list(&cidrs);
        }
        if let Some(names) = var("EXTDNS_EXCLUDE_DNS") {
            core.filters.dns_ignore = split_list(&names);
        }
        if let Some(zones) = var("EXTDNS_ZONES") {
            core.provider = ProviderConfig::InMemory {
                zones: split_list(&zones),
            };
        }

        let log_level = match var("EXTDNS_LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "EXTDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        let log_format = match var("EXTDNS_LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!(
                "EXTDNS_LOG_FORMAT '{}' is not valid. Valid formats: text, json",
                other
            ),
        };

        Ok(Self {
            core,
            endpoints: var("EXTDNS_ENDPOINTS").unwrap_or_default(),
            log_level,
            log_format,
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.core.validate()?;

        if self.endpoints.trim().is_empty() && self.core.controller.mode != RunMode::Cleanup {
            warn!("EXTDNS_ENDPOINTS is empty; every managed record will be planned for deletion");
        }

        Ok(())
    }
}

fn parse_mode(value: &str) -> Result<RunMode> {
    match value.trim().to_lowercase().as_str() {
        "interval" => Ok(RunMode::Interval),
        "once" => Ok(RunMode::Once),
        "cleanup" => Ok(RunMode::Cleanup),
        other => anyhow::bail!(
            "EXTDNS_MODE '{}' is not valid. Valid modes: interval, once, cleanup",
            other
        ),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{} '{}' is not a boolean", name, other),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn init_tracing(level: Level, format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(level);
    let result = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    result.context("Failed to set tracing subscriber")
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ExtDnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = init_tracing(config.log_level, config.log_format) {
        eprintln!("{:#}", e);
        return ExtDnsExitCode::ConfigError.into();
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation error: {:#}", e);
        return ExtDnsExitCode::ConfigError.into();
    }

    info!("Starting extdnsd {}", extdns_core::VERSION);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ExtDnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Build the components and run the controller
async fn run_daemon(config: Config) -> ExtDnsExitCode {
    let (controller, events) = match build_controller(&config) {
        Ok(built) => built,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return ExtDnsExitCode::ConfigError;
        }
    };

    tokio::spawn(log_events(events));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Shutdown listener error: {:#}", e),
        }
        let _ = shutdown_tx.send(());
    });

    match controller.run_with_shutdown(Some(shutdown_rx)).await {
        Ok(()) => {
            info!("Shutting down daemon");
            ExtDnsExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Daemon error: {}", e);
            ExtDnsExitCode::RuntimeError
        }
    }
}

fn build_controller(config: &Config) -> Result<(Controller, mpsc::Receiver<ControllerEvent>)> {
    let components = ComponentRegistry::with_builtins();

    #[cfg(feature = "inmemory")]
    {
        debug!("Registering in-memory provider");
        extdns_provider_inmemory::register(&components);
    }

    let core = &config.core;
    info!(
        "Provider: {}, registry: {}, policy: {}, mode: {:?}",
        core.provider.type_name(),
        core.registry.type_name(),
        core.policy,
        core.controller.mode
    );

    let provider = components
        .create_provider(&core.provider, core.filters.domain_filter.clone())
        .context("Failed to create DNS provider")?;
    let registry = components
        .create_registry(&core.registry, Arc::from(provider), &core.txt_owner_id)
        .context("Failed to create ownership registry")?;

    let groups = endpoint_groups(&config.endpoints)?;
    let source = FilterSource::from_config(Box::new(groups), &core.filters)?;

    Ok(Controller::new(Box::new(source), registry, core)?)
}

/// One static source per `;`-separated group of `EXTDNS_ENDPOINTS`
fn endpoint_groups(endpoints: &str) -> Result<MultiSource> {
    let mut sources = MultiSource::default();
    let mut total = 0;

    for (index, group) in endpoints.split(';').enumerate() {
        let group = StaticSource::parse(group)
            .with_context(|| format!("Invalid EXTDNS_ENDPOINTS group {}", index + 1))?;
        if group.is_empty() {
            continue;
        }
        total += group.len();
        sources.push(Box::new(group) as Box<dyn Source>);
    }

    info!("Managing {} endpoint(s)", total);
    Ok(sources)
}

async fn log_events(mut events: mpsc::Receiver<ControllerEvent>) {
    while let Some(event) = events.recv().await {
        debug!("Controller event: {:?}", event);
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}
