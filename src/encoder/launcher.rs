use super::config::EncoderConfig;
use crate::error::SupervisorError;
use std::io;
use std::path::Path;
use std::time::Duration;

/// How an encoder process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    /// Everything the process wrote to stderr
    pub stderr: String,
}

impl ProcessExit {
    /// True when the process exited with the designated clean-exit code
    pub fn is_clean(&self, clean_exit_code: i32) -> bool {
        self.code == Some(clean_exit_code)
    }
}

/// A running encoder subprocess
///
/// Owned exclusively by one process watcher for its whole lifetime.
#[async_trait::async_trait]
pub trait EncoderProcess: Send {
    /// OS process id, if still known
    fn pid(&self) -> Option<u32>;

    /// Wait for the process to exit and collect its stderr
    async fn wait(&mut self) -> io::Result<ProcessExit>;

    /// Ask the process to terminate and wait up to `grace` for it to exit
    async fn terminate(&mut self, grace: Duration) -> io::Result<()>;
}

/// Boundary to the external encoder binary
///
/// Production: [`FfmpegLauncher`](super::FfmpegLauncher).
/// Tests substitute a scripted launcher.
#[async_trait::async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Build the argument vector for one session
    ///
    /// Fails with `InvalidFormat` for unsupported formats or missing fields.
    fn build_arguments(&self, config: &EncoderConfig) -> Result<Vec<String>, SupervisorError>;

    /// Start the encoder binary with the given arguments
    async fn spawn(&self, binary: &Path, args: &[String]) -> io::Result<Box<dyn EncoderProcess>>;

    /// Launcher name for logging
    fn name(&self) -> &str;
}
