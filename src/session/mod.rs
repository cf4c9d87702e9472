//! Session registry and status projection
//!
//! This module provides the data model the supervisor reconciles against:
//! - `Session` / `SessionStatus`: one tracked encoder and its lifecycle state
//! - `SessionRegistry`: ordered, id-keyed list of sessions
//! - `StatusSummary` / `StatusSnapshot`: read-only projections for display

mod registry;
mod session;
mod summary;

pub use registry::{SessionRegistry, SharedRegistry};
pub use session::{Session, SessionStatus, SessionView};
pub use summary::{StatusSnapshot, StatusSummary};
