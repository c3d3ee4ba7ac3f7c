//! Reconciliation controller
//!
//! The Controller is responsible for:
//! - Fetching desired endpoints from the Source
//! - Fetching current records from the Registry
//! - Planning the changes and applying policies
//! - Handing the changes back to the Registry (or only logging them)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐          ┌──────────────┐
//! │   Source    │─desired─▶│              │
//! └─────────────┘          │     Plan     │──changes──┐
//! ┌─────────────┐          │  + policies  │           │
//! │  Registry   │─current─▶│              │           │
//! └─────────────┘          └──────────────┘           │
//!        ▲                                            │
//!        └───────────── apply_changes ◀───────────────┘
//! ```
//!
//! ## Run Modes
//!
//! - `Interval`: reconcile on every tick until shutdown
//! - `Once`: reconcile once and return
//! - `Cleanup`: plan against an empty desired list with the sync policy,
//!   deleting every record the registry reports, and return
//!
//! A failed tick is logged and reported as an event. The next tick starts
//! from scratch; nothing is retried.

use crate::config::{ExtDnsConfig, RunMode};
use crate::error::Result;
use crate::plan::{Changes, Plan, PlanResult, Policy, PolicyKind, SyncPolicy};
use crate::traits::{Registry, Source};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

/// Events emitted by the Controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Controller started
    Started {
        mode: RunMode,
    },

    /// Changes were calculated
    PlanCalculated {
        create: usize,
        update: usize,
        delete: usize,
    },

    /// Nothing to do this tick
    UpToDate,

    /// Changes were applied through the registry
    ChangesApplied {
        create: usize,
        update: usize,
        delete: usize,
        at: DateTime<Utc>,
    },

    /// Changes were only logged (dry-run)
    DryRunSkipped {
        create: usize,
        update: usize,
        delete: usize,
    },

    /// A tick failed
    SyncFailed {
        error: String,
    },

    /// Controller stopped
    Stopped {
        reason: String,
    },
}

/// Reconciliation controller
///
/// ## Lifecycle
///
/// 1. Create with [`Controller::new()`]
/// 2. Run with [`Controller::run()`], or call [`Controller::run_once()`]
///    from an external scheduler
/// 3. Drop to cleanup
pub struct Controller {
    /// Producer of desired endpoints
    source: Box<dyn Source>,

    /// Ownership registry in front of the provider
    registry: Box<dyn Registry>,

    /// Configured policy
    policy: PolicyKind,

    /// Run mode
    mode: RunMode,

    /// Log instead of apply
    dry_run: bool,

    /// Time between two ticks in interval mode
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ControllerEvent>,
}

impl Controller {
    /// Create a new controller
    ///
    /// # Returns
    ///
    /// A tuple of (controller, event_receiver) where event_receiver yields controller events
    pub fn new(
        source: Box<dyn Source>,
        registry: Box<dyn Registry>,
        config: &ExtDnsConfig,
    ) -> Result<(Self, mpsc::Receiver<ControllerEvent>)> {
        config.controller.validate()?;

        let (tx, rx) = mpsc::channel(config.controller.event_channel_capacity);

        let controller = Self {
            source,
            registry,
            policy: config.policy,
            mode: config.controller.mode,
            dry_run: config.controller.dry_run,
            interval: config.controller.interval(),
            event_tx: tx,
        };

        Ok((controller, rx))
    }

    /// Run mode this controller was configured with
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Run the controller until shutdown (SIGINT) or, in `Once` and
    /// `Cleanup` modes, until the single tick completes
    pub async fn run(&self) -> Result<()> {
        self.run_with_shutdown(None).await
    }

    /// Run the controller with an explicit shutdown signal
    ///
    /// With `None`, interval mode stops on Ctrl-C. A dropped sender counts
    /// as a shutdown request.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.emit_event(ControllerEvent::Started { mode: self.mode });

        if self.mode != RunMode::Interval {
            let result = self.tick().await.map(|_| ());
            self.emit_event(ControllerEvent::Stopped {
                reason: "Single run completed".to_string(),
            });
            return result;
        }

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for shutdown signal: {}", e);
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);

        loop {
            tokio::select! {
                Some(_) = ticks.next() => {
                    // Errors were already logged and reported; keep running.
                    let _ = self.tick().await;
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(ControllerEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }
            }
        }

        Ok(())
    }

    /// Perform one reconciliation
    ///
    /// # Returns
    ///
    /// - `Ok(PlanResult)`: The plan that was applied (or logged in dry-run)
    /// - `Err(Error)`: If the source, the registry or the provider failed
    pub async fn run_once(&self) -> Result<PlanResult> {
        let current = self.registry.records().await?;

        let desired = match self.mode {
            RunMode::Cleanup => Vec::new(),
            RunMode::Interval | RunMode::Once => self.source.endpoints().await?,
        };
        let policy: Box<dyn Policy> = match self.mode {
            RunMode::Cleanup => Box::new(SyncPolicy),
            RunMode::Interval | RunMode::Once => self.policy.build(),
        };

        debug!(
            "Planning {} desired against {} current records",
            desired.len(),
            current.len()
        );

        let result = Plan::new(current, desired).with_policy(policy).calculate();
        let (create, update, delete) = counts(&result.changes);

        self.emit_event(ControllerEvent::PlanCalculated {
            create,
            update,
            delete,
        });

        if result.changes.is_empty() {
            info!("All records are already up to date");
            self.emit_event(ControllerEvent::UpToDate);
            return Ok(result);
        }

        if self.dry_run {
            log_changes(&result.changes);
            info!(
                "Dry run: skipping {} create(s), {} update(s), {} delete(s)",
                create, update, delete
            );
            self.emit_event(ControllerEvent::DryRunSkipped {
                create,
                update,
                delete,
            });
            return Ok(result);
        }

        self.registry.apply_changes(&result.changes).await?;

        info!(
            "Applied {} create(s), {} update(s), {} delete(s) via {} registry",
            create,
            update,
            delete,
            self.registry.registry_name()
        );
        self.emit_event(ControllerEvent::ChangesApplied {
            create,
            update,
            delete,
            at: Utc::now(),
        });

        Ok(result)
    }

    async fn tick(&self) -> Result<PlanResult> {
        self.run_once().await.inspect_err(|e| {
            error!("Failed to synchronize records: {}", e);
            self.emit_event(ControllerEvent::SyncFailed {
                error: e.to_string(),
            });
        })
    }

    /// Emit a controller event
    fn emit_event(&self, event: ControllerEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

fn counts(changes: &Changes) -> (usize, usize, usize) {
    (
        changes.create.len(),
        changes.update_count(),
        changes.delete.len(),
    )
}

fn log_changes(changes: &Changes) {
    for endpoint in &changes.create {
        info!("CREATE {}", endpoint);
    }
    for (old, new) in changes.update_old.iter().zip(&changes.update_new) {
        info!("UPDATE {} -> {}", old, new);
    }
    for endpoint in &changes.delete {
        info!("DELETE {}", endpoint);
    }
}
