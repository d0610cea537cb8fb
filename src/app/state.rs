//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::session::{RoomSettings, SessionManager};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // One session manager for the lifetime of the process
        let sessions = Arc::new(SessionManager::new(RoomSettings::from_config(&config)));

        Self { config, sessions }
    }
}
