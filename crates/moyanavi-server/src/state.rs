use std::sync::Arc;

use moyanavi::agent::AgentRuntime;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<dyn AgentRuntime>,
}

impl AppState {
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self { runtime }
    }
}
