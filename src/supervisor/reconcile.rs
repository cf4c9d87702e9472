use super::Supervisor;
use crate::encoder::EncoderConfig;
use crate::error::SupervisorError;
use crate::session::Session;
use std::collections::HashSet;
use tracing::{info, warn};

/// What a reconcile pass changed in the registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Ids that got a new `stopped` session
    pub added: Vec<String>,
    /// Ids whose session (and encoder, if any) was removed
    pub removed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl Supervisor {
    /// Make the registry match `declared`
    ///
    /// New ids get a `stopped` session. Ids no longer declared have their
    /// encoder terminated and any pending cool-down cancelled before the
    /// session is removed. Sessions present on both sides keep their state;
    /// a changed config is applied when the session next starts.
    pub async fn reconcile(
        &mut self,
        declared: &[EncoderConfig],
    ) -> Result<ReconcileReport, SupervisorError> {
        if declared.is_empty() {
            return Err(SupervisorError::configuration(
                "there are no encoders in the config",
            ));
        }

        let mut report = ReconcileReport::default();
        let mut declared_ids = HashSet::new();

        let to_remove: Vec<String> = {
            let mut registry = self.registry.write().await;

            for config in declared {
                if !declared_ids.insert(config.id.clone()) {
                    warn!("Ignoring duplicate encoder id '{}'", config.id);
                    continue;
                }

                if !registry.contains(&config.id) {
                    registry.upsert(Session::new(config.clone()));
                    report.added.push(config.id.clone());
                }
                self.declared.insert(config.id.clone(), config.clone());
            }

            registry
                .list()
                .iter()
                .filter(|s| !declared_ids.contains(&s.id))
                .map(|s| s.id.clone())
                .collect()
        };

        self.declared.retain(|id, _| declared_ids.contains(id));

        for id in to_remove {
            if let Some(watcher) = self.watchers.remove(&id) {
                watcher.stop(&id, self.stop_timeout()).await;
            }

            self.registry.write().await.remove(&id);
            report.removed.push(id);
        }

        if !report.is_empty() {
            info!(
                "Reconciled configuration: added {:?}, removed {:?}",
                report.added, report.removed
            );
        }

        Ok(report)
    }
}
