use axum_helpers::server::{create_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb;
use domain_users::MongoUserRepository;
use tracing::{error, info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from .env (if present) and environment variables
    let config = Config::load()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    // The driver connects lazily, so only a malformed connection string fails here
    let client = mongodb::create_client(&config.mongodb)
        .await
        .map_err(|e| eyre::eyre!("Invalid MongoDB configuration: {}", e))?;
    let db = mongodb::database(&client, &config.mongodb);
    let users = MongoUserRepository::new(&db);

    // An unreachable database is logged, not fatal; requests fail with 500 until it is back
    match mongodb::ping(&client).await {
        Ok(()) => {
            info!(database = db.name(), "MongoDB connected");
            if let Err(e) = users.ensure_indexes().await {
                warn!("Failed to ensure user indexes, retrying on first write: {}", e);
            }
        }
        Err(e) => error!("MongoDB connection failed: {}", e),
    }

    let state = AppState {
        config,
        mongo: client,
    };

    let api_routes = api::routes(users);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // - /health: liveness check with app name/version
    // - /ready: readiness check with a MongoDB ping
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    create_app(app, &state.config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
