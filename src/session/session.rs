use crate::encoder::{EncoderConfig, EncoderSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an encoder session
///
/// The cycle is `stopped → connecting → live → error → stopped`. `error` is
/// transient: it is always followed by a scheduled move back to `stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Connecting,
    Live,
    Error,
    Stopped,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Live => "live",
            Self::Error => "error",
            Self::Stopped => "stopped",
        }
    }

    /// Human label ("Live", "Error", ...)
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Live => "Live",
            Self::Error => "Error",
            Self::Stopped => "Stopped",
        }
    }

    /// True while a subprocess may be attached to the session
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Live)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One supervised encoder, keyed by its config id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub status: SessionStatus,
    pub config: EncoderConfig,
}

impl Session {
    /// Freshly declared sessions start `stopped` so the scheduler picks them up
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            id: config.id.clone(),
            status: SessionStatus::Stopped,
            config,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            status: self.status,
            encoder: self.config.summary(),
        }
    }
}

/// Serializable, credential-free view of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: String,
    pub status: SessionStatus,
    pub encoder: EncoderSummary,
}
