//! Encoder configuration and the process-launcher boundary
//!
//! The supervisor never builds command lines or touches `tokio::process`
//! itself; it goes through [`ProcessLauncher`]:
//! - `build_arguments` turns an [`EncoderConfig`] into an argument vector
//! - `spawn` starts the binary and hands back an [`EncoderProcess`]
//! - [`EncoderProcess`] waits for exit (collecting stderr) or terminates

pub mod config;
pub mod ffmpeg;
pub mod launcher;

pub use config::{EncoderConfig, EncoderSummary, RelayConfig};
pub use ffmpeg::{AudioFormat, FfmpegLauncher, FfmpegProcess, STDERR_TAIL_BYTES};
pub use launcher::{EncoderProcess, ProcessExit, ProcessLauncher};
