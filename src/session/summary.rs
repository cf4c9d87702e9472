use super::session::{Session, SessionStatus, SessionView};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-status counts over the registry
///
/// Every status surface (console, HTML, JSON) renders this same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub connecting: usize,
    pub live: usize,
    pub error: usize,
    pub stopped: usize,
    /// Ids currently in `error`, in registry order
    pub error_ids: Vec<String>,
}

impl StatusSummary {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let mut summary = Self {
            total: sessions.len(),
            ..Self::default()
        };

        for session in sessions {
            match session.status {
                SessionStatus::Connecting => summary.connecting += 1,
                SessionStatus::Live => summary.live += 1,
                SessionStatus::Error => {
                    summary.error += 1;
                    summary.error_ids.push(session.id.clone());
                }
                SessionStatus::Stopped => summary.stopped += 1,
            }
        }

        summary
    }

    pub fn count(&self, status: SessionStatus) -> usize {
        match status {
            SessionStatus::Connecting => self.connecting,
            SessionStatus::Live => self.live,
            SessionStatus::Error => self.error,
            SessionStatus::Stopped => self.stopped,
        }
    }

    /// One-line form used by the console and the log
    pub fn line(&self) -> String {
        format!(
            "Active: {} | Connecting: {} | Error: {} | Stopped: {} | Total: {}",
            self.live, self.connecting, self.error, self.stopped, self.total
        )
    }
}

/// Point-in-time snapshot served by `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub service: String,
    pub timestamp: DateTime<Utc>,
    pub summary: StatusSummary,
    pub sessions: Vec<SessionView>,
}

impl StatusSnapshot {
    pub fn capture(service: impl Into<String>, sessions: &[Session]) -> Self {
        Self {
            service: service.into(),
            timestamp: Utc::now(),
            summary: StatusSummary::from_sessions(sessions),
            sessions: sessions.iter().map(Session::view).collect(),
        }
    }
}
