//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store shared by every request
    pub repository: Arc<dyn FullRepository>,
    /// Windows and limits handed to the engine on each call
    pub config: Arc<SchedulerConfig>,
}

impl AppState {
    /// Create a new application state with default configuration.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_config(repository, SchedulerConfig::default())
    }

    pub fn with_config(repository: Arc<dyn FullRepository>, config: SchedulerConfig) -> Self {
        Self {
            repository,
            config: Arc::new(config),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.engine.max_commit_attempts
    }
}
