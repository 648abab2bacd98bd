use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::AiGateway;
use crate::persistence::device::DeviceStore;
use crate::workspace::sessions::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Per-user workspaces and the debounced profile writer.
    pub sessions: SessionRegistry,
    /// Device-local key/value data: wallet, caches, preferences.
    pub device: Arc<dyn DeviceStore>,
    pub ai: AiGateway,
    pub config: Config,
}
