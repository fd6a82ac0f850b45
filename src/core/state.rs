// Application state (AppState)

use crate::core::config::Config;
use crate::core::startup::bootstrap_admin;
use crate::stores::user_directory::UserDirectory;
use chrono::Utc;
use std::sync::Arc;

/// Shared application state
///
/// Constructed once at startup and handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// The user registry
    pub directory: Arc<UserDirectory>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the state with the directory seeded by the bootstrap administrator
    pub fn new(config: Config) -> Self {
        let directory = UserDirectory::new();
        directory.insert(bootstrap_admin(&config.bootstrap, Utc::now()));

        Self {
            directory: Arc::new(directory),
            config: Arc::new(config),
        }
    }
}
