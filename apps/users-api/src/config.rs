use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use std::path::Path;

// Import database configs from the database library
use database::mongodb::MongoConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    /// Reads `.env` from the working directory, then the environment.
    pub fn load() -> eyre::Result<Self> {
        Self::load_from(".env")
    }

    /// Reads the dotenv file at `path` when it exists, then the environment.
    /// Variables already set in the process win over the file.
    pub fn load_from(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        match dotenvy::from_path(path) {
            Ok(()) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(eyre::eyre!("Failed to load {}: {}", path.display(), e)),
        }
        Self::from_env()
    }

    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?; // MONGO_URI, defaults to localhost
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=5000

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
        })
    }
}
