use super::RestartPolicy;
use crate::encoder::{EncoderConfig, EncoderProcess, ProcessLauncher};
use crate::error::SupervisorError;
use crate::session::{SessionStatus, SharedRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Everything one watcher needs, moved into its task
pub(crate) struct Watch {
    pub id: String,
    pub config: EncoderConfig,
    pub registry: SharedRegistry,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub binary_path: PathBuf,
    pub policy: RestartPolicy,
}

/// Supervisor-side handle to a running watcher task
pub(crate) struct WatcherHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Start watching a session that the scheduler just moved to `connecting`
    pub fn spawn(watch: Watch) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(watch.run(cancel.clone()));
        Self { cancel, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the watcher and wait up to `timeout` for it to wind down
    ///
    /// Cancelling terminates the subprocess if one is running, marking the
    /// session `stopped`, and drops any pending cool-down. A watcher
    /// that overruns is aborted; its process goes down with the dropped
    /// handle.
    pub async fn stop(self, id: &str, timeout: Duration) {
        self.cancel.cancel();

        let mut task = self.task;
        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Watcher for session {} panicked: {}", id, e),
            Err(_) => {
                warn!("Watcher for session {} did not stop within {:?}, aborting", id, timeout);
                task.abort();
            }
        }
    }
}

/// How a session's run ended, decides the cool-down
enum Outcome {
    Clean,
    Failed(SupervisorError),
}

impl Watch {
    async fn run(self, cancel: CancellationToken) {
        let outcome = match self.launch().await {
            Ok(mut process) => {
                self.set_status(SessionStatus::Live).await;
                info!("Session {} is live (pid {:?})", self.id, process.pid());

                tokio::select! {
                    exit = process.wait() => {
                        self.set_status(SessionStatus::Error).await;
                        match exit {
                            Ok(exit) if exit.is_clean(self.policy.clean_exit_code) => Outcome::Clean,
                            Ok(exit) => Outcome::Failed(SupervisorError::ProcessRuntime {
                                id: self.id.clone(),
                                code: exit.code,
                                stderr: exit.stderr.trim().to_string(),
                            }),
                            Err(source) => Outcome::Failed(SupervisorError::ProcessWait {
                                id: self.id.clone(),
                                source,
                            }),
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("Terminating encoder for session {}", self.id);
                        match process.terminate(self.policy.termination_timeout).await {
                            Ok(()) => self.set_status(SessionStatus::Stopped).await,
                            Err(e) => warn!(
                                "Encoder for session {} did not terminate cleanly: {}",
                                self.id, e
                            ),
                        }
                        return;
                    }
                }
            }
            Err(err) => {
                self.set_status(SessionStatus::Error).await;
                Outcome::Failed(err)
            }
        };

        let cooldown = match &outcome {
            Outcome::Clean => {
                info!(
                    "Encoder for session {} exited cleanly, restarting in {:?}",
                    self.id, self.policy.clean_cooldown
                );
                self.policy.clean_cooldown
            }
            Outcome::Failed(err) => {
                error!("{}", err);
                warn!(
                    "Session {} will restart in {:?}",
                    self.id, self.policy.error_cooldown
                );
                self.policy.error_cooldown
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(cooldown) => {
                self.set_status(SessionStatus::Stopped).await;
            }
            _ = cancel.cancelled() => {}
        }
    }

    async fn launch(&self) -> Result<Box<dyn EncoderProcess>, SupervisorError> {
        let args = self.launcher.build_arguments(&self.config)?;

        self.launcher
            .spawn(&self.binary_path, &args)
            .await
            .map_err(|source| SupervisorError::ProcessLaunch {
                id: self.id.clone(),
                source,
            })
    }

    async fn set_status(&self, status: SessionStatus) {
        let mut registry = self.registry.write().await;
        if !registry.set_status(&self.id, status) {
            warn!("Session {} vanished before it could become {}", self.id, status);
        }
    }
}
