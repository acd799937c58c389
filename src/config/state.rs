// Application state module
// Read-only state shared by every connection of one server

use std::sync::Arc;

use super::types::Config;
use crate::logger::ServerEvents;

/// Application state
///
/// Nothing here is mutated after start-up; requests share no mutable state.
pub struct AppState {
    pub config: Config,
    pub events: Arc<dyn ServerEvents>,
}

impl AppState {
    pub fn new(config: Config, events: Arc<dyn ServerEvents>) -> Self {
        Self { config, events }
    }
}
