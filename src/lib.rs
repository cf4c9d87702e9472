pub mod config;
pub mod console;
pub mod encoder;
pub mod error;
pub mod http;
pub mod session;
pub mod supervisor;

pub use config::{Config, ConfigSource, FileConfigSource};
pub use encoder::{
    EncoderConfig, EncoderProcess, EncoderSummary, FfmpegLauncher, ProcessExit, ProcessLauncher,
    RelayConfig,
};
pub use error::SupervisorError;
pub use http::{create_router, AppState};
pub use session::{
    Session, SessionRegistry, SessionStatus, SessionView, SharedRegistry, StatusSnapshot,
    StatusSummary,
};
pub use supervisor::{ReconcileReport, RestartPolicy, Supervisor, SupervisorSettings};
