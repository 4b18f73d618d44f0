//! Configuration module.
//!
//! Loads configuration from environment variables.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// Collection holding `{user_id, role}` rows.
    pub roles_collection: String,

    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `.env` is loaded by `main` before this runs.
    ///
    /// # Errors
    /// Returns error if `MONGODB_URI` is missing or `BIND_ADDR` is not a socket address.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mongodb_uri = non_empty("MONGODB_URI").context("MONGODB_URI must be set")?;

        let bind_addr = non_empty("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR is not a socket address: {}", bind_addr))?;

        Ok(Self {
            mongodb_uri,
            mongodb_database: non_empty("MONGODB_DATABASE")
                .unwrap_or_else(|| "rolecache".to_string()),
            roles_collection: non_empty("ROLES_COLLECTION")
                .unwrap_or_else(|| "user_roles".to_string()),
            bind_addr,
        })
    }
}
