use thiserror::Error;

/// Errors raised by the supervisor and its collaborators.
///
/// Every variant except `Configuration` is scoped to a single session and
/// never leaves that session's watcher task.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// Declared configuration is empty, unreadable or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Encoder settings cannot be turned into an argument vector.
    #[error("invalid encoder format for session '{id}': {reason}")]
    InvalidFormat { id: String, reason: String },

    /// The encoder binary could not be spawned.
    #[error("failed to launch encoder for session '{id}': {source}")]
    ProcessLaunch {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on a running encoder failed, so its exit status is unknown.
    #[error("lost track of encoder for session '{id}': {source}")]
    ProcessWait {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// The encoder exited with something other than the clean-exit code.
    #[error("encoder for session '{id}' exited with {}: {stderr}", describe_code(.code))]
    ProcessRuntime {
        id: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl SupervisorError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_format(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

impl From<config::ConfigError> for SupervisorError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
