use crate::session::{SessionRegistry, SharedRegistry};

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Session registry (read-only from the HTTP side)
    pub registry: SharedRegistry,

    /// Service name shown on the status page and in the API snapshot
    pub service_name: String,
}

impl AppState {
    pub fn new(registry: SharedRegistry, service_name: impl Into<String>) -> Self {
        Self {
            registry,
            service_name: service_name.into(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SessionRegistry::shared(), "stream-encoder")
    }
}
