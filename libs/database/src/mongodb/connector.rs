use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use std::time::Duration;
use tracing::debug;

use super::MongoConfig;

/// Database used when neither the config nor the connection string names one.
pub const DEFAULT_DATABASE: &str = "users";

/// Error type for MongoDB operations
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Build a client from a MongoConfig without contacting the server.
///
/// The driver connects lazily, so this only fails when the connection string
/// cannot be parsed (or, for `mongodb+srv://`, resolved).
///
/// # Example
/// ```ignore
/// use database::mongodb::{MongoConfig, create_client, ping};
///
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "users");
/// let client = create_client(&config).await?;
/// ping(&client).await?;
/// ```
pub async fn create_client(config: &MongoConfig) -> Result<Client, MongoError> {
    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    Ok(Client::with_options(options)?)
}

/// Round-trip a `ping` command to verify the server is reachable.
pub async fn ping(client: &Client) -> Result<(), MongoError> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    debug!("MongoDB ping succeeded");
    Ok(())
}

/// Resolve the database handle the application works against.
///
/// Precedence: explicit `config.database`, then the database named in the
/// connection string, then [`DEFAULT_DATABASE`].
pub fn database(client: &Client, config: &MongoConfig) -> Database {
    match config.database.as_deref() {
        Some(name) => client.database(name),
        None => client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
    }
}
