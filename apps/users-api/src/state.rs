//! Application state shared with the readiness handler.

use database::mongodb::Client;

/// Shared application state.
///
/// Cloning is cheap: the MongoDB client is a handle to a shared pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client
    pub mongo: Client,
}
