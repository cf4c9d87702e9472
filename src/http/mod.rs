//! HTTP status surface
//!
//! Read-only views over the session registry:
//! - GET / and GET /status - HTML status page
//! - GET /api/status - JSON snapshot (sessions, summary, timestamp)
//! - GET /health - Health check
//!
//! Every response is marked uncacheable.

mod handlers;
pub mod page;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
