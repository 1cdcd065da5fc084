//! Database library providing the MongoDB connector used by the API services
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client construction, database resolution and ping
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Examples
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "users");
//! let client = mongodb::create_client(&config).await?;
//! mongodb::ping(&client).await?;
//! let db = mongodb::database(&client, &config);
//! ```

#[cfg(feature = "mongodb")]
pub mod mongodb;
