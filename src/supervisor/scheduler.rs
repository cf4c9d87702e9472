use super::watcher::{Watch, WatcherHandle};
use super::Supervisor;
use crate::session::SessionStatus;
use std::sync::Arc;
use tracing::info;

impl Supervisor {
    /// Start the first `stopped` session in registry order, if any
    ///
    /// Never starts more than one session per call, so a burst of new or
    /// failed sessions comes back up one tick at a time. Returns the id of
    /// the session moved to `connecting`.
    pub async fn tick(&mut self) -> Option<String> {
        self.watchers.retain(|_, watcher| !watcher.is_finished());

        let (id, config) = {
            let mut registry = self.registry.write().await;
            let next_id = registry
                .list()
                .iter()
                .find(|s| s.status == SessionStatus::Stopped)?
                .id
                .clone();
            let session = registry.find_mut(&next_id)?;

            if let Some(latest) = self.declared.get(&session.id) {
                if *latest != session.config {
                    info!("Applying updated configuration to session {}", session.id);
                    session.config = latest.clone();
                }
            }

            session.status = SessionStatus::Connecting;
            (session.id.clone(), session.config.clone())
        };

        info!("Starting session {}", id);

        let watch = Watch {
            id: id.clone(),
            config,
            registry: Arc::clone(&self.registry),
            launcher: Arc::clone(&self.launcher),
            binary_path: self.settings.binary_path.clone(),
            policy: self.settings.policy,
        };

        // A finished watcher for the same id may still be winding down after
        // its final `stopped` write; it holds no process by then.
        self.watchers.insert(id.clone(), WatcherHandle::spawn(watch));

        Some(id)
    }
}
