//! MongoDB database connector and utilities
//!
//! Client construction, database resolution and connectivity checks.

mod config;
mod connector;

pub use config::{DEFAULT_URL, MongoConfig};
pub use connector::{DEFAULT_DATABASE, MongoError, create_client, database, ping};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
