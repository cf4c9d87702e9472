//! Session supervisor
//!
//! Reconciles declared encoder configuration against the session registry,
//! starts at most one stopped session per scheduler tick, and owns one
//! watcher task per running encoder.
//!
//! All registry mutations go through [`SharedRegistry`]'s lock; session
//! add/remove and watcher bookkeeping only happen from the task that owns
//! the [`Supervisor`].

mod reconcile;
mod scheduler;
mod watcher;

pub use reconcile::ReconcileReport;

use crate::config::{Config, ConfigSource};
use crate::encoder::{EncoderConfig, ProcessLauncher};
use crate::error::SupervisorError;
use crate::session::SharedRegistry;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};
use watcher::WatcherHandle;

/// Cool-downs and termination timing applied by every watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Exit code treated as a deliberate shutdown
    pub clean_exit_code: i32,
    /// Delay before restart after a clean exit
    pub clean_cooldown: Duration,
    /// Delay before restart after any other exit or a failed launch
    pub error_cooldown: Duration,
    /// How long a terminated encoder gets to exit
    pub termination_timeout: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            clean_exit_code: 0,
            clean_cooldown: Duration::from_secs(5),
            error_cooldown: Duration::from_secs(20),
            termination_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub binary_path: PathBuf,
    pub policy: RestartPolicy,
    pub tick_interval: Duration,
    pub reload_interval: Duration,
}

impl SupervisorSettings {
    pub fn from_config(cfg: &Config) -> Result<Self, SupervisorError> {
        let sup = &cfg.supervisor;
        Ok(Self {
            binary_path: cfg.binary_path()?,
            policy: RestartPolicy {
                clean_exit_code: sup.clean_exit_code,
                clean_cooldown: sup.clean_cooldown,
                error_cooldown: sup.error_cooldown,
                termination_timeout: sup.termination_timeout,
            },
            tick_interval: sup.tick_interval,
            reload_interval: sup.reload_interval,
        })
    }
}

pub struct Supervisor {
    registry: SharedRegistry,
    launcher: Arc<dyn ProcessLauncher>,
    settings: SupervisorSettings,
    /// Latest declared config per id, applied on the session's next start
    declared: HashMap<String, EncoderConfig>,
    /// One entry per session whose watcher task may still be running
    watchers: HashMap<String, WatcherHandle>,
}

impl Supervisor {
    pub fn new(
        registry: SharedRegistry,
        launcher: Arc<dyn ProcessLauncher>,
        settings: SupervisorSettings,
    ) -> Self {
        info!(
            "Supervisor using {} launcher ({})",
            launcher.name(),
            settings.binary_path.display()
        );

        Self {
            registry,
            launcher,
            settings,
            declared: HashMap::new(),
            watchers: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    /// True if a watcher task for `id` has not finished yet
    pub fn is_watching(&self, id: &str) -> bool {
        self.watchers.get(id).is_some_and(|w| !w.is_finished())
    }

    /// Number of watcher tasks that have not finished yet
    pub fn active_watchers(&self) -> usize {
        self.watchers.values().filter(|w| !w.is_finished()).count()
    }

    /// How long a watcher may take to wind down before it is aborted
    fn stop_timeout(&self) -> Duration {
        self.settings.policy.termination_timeout + Duration::from_secs(1)
    }

    /// Drive the scheduler and config reloads until `shutdown` resolves,
    /// then stop every session.
    pub async fn run<S, F>(mut self, source: S, shutdown: F)
    where
        S: ConfigSource,
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.settings.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let reload_every = self.settings.reload_interval;
        let mut reloader = interval_at(Instant::now() + reload_every, reload_every);
        reloader.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = reloader.tick() => {
                    self.reload(&source).await;
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        self.shutdown().await;
    }

    /// Re-read configuration and reconcile; failures keep the previous config
    pub async fn reload<S: ConfigSource + ?Sized>(&mut self, source: &S) {
        let cfg = match source.load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Config reload failed, keeping previous configuration: {}", e);
                return;
            }
        };

        match cfg.binary_path() {
            Ok(path) if path != self.settings.binary_path => {
                warn!(
                    "encoder.binary_path changed to {}; restart the supervisor to apply it",
                    path.display()
                );
            }
            _ => {}
        }

        if let Err(e) = self.reconcile(&cfg.encoders).await {
            error!("Reconcile after reload failed, keeping previous configuration: {}", e);
        }
    }

    /// Stop every watcher, terminating its encoder, then return
    ///
    /// Watchers stop concurrently; each gets the termination timeout plus one
    /// second before it is aborted.
    pub async fn shutdown(&mut self) {
        let watchers: Vec<_> = self.watchers.drain().collect();
        if watchers.is_empty() {
            info!("Supervisor stopped (no running sessions)");
            return;
        }

        info!("Stopping {} session(s)", watchers.len());

        let timeout = self.stop_timeout();
        futures::future::join_all(
            watchers
                .into_iter()
                .map(|(id, watcher)| async move { watcher.stop(&id, timeout).await }),
        )
        .await;

        info!("Supervisor stopped");
    }
}
