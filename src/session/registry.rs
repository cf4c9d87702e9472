use super::session::{Session, SessionStatus};
use super::summary::StatusSummary;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registry handle shared between the supervisor, its watchers and the
/// status surfaces. Every read and write goes through the one lock.
pub type SharedRegistry = Arc<RwLock<SessionRegistry>>;

/// Authoritative list of sessions, in insertion order
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// All sessions in insertion order
    pub fn list(&self) -> &[Session] {
        &self.sessions
    }

    pub fn find(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Replace the session with the same id in place, or append it
    pub fn upsert(&mut self, session: Session) {
        match self.find_mut(&session.id) {
            Some(existing) => *existing = session,
            None => self.sessions.push(session),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Session> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        Some(self.sessions.remove(index))
    }

    /// Set the status of `id`; returns false if the session is gone
    pub fn set_status(&mut self, id: &str, status: SessionStatus) -> bool {
        match self.find_mut(id) {
            Some(session) => {
                session.status = status;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn summary(&self) -> StatusSummary {
        StatusSummary::from_sessions(&self.sessions)
    }
}
