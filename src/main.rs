//! Rolecache service entry point.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use rolecache::cache::CacheRegistry;
use rolecache::config::Config;
use rolecache::database::{Database, MongoRoleAuthority};
use rolecache::permissions::RoleCache;
use rolecache::server::{self, AppState};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rolecache=info,mongodb=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting rolecache...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    info!("Database connected");

    let cache = CacheRegistry::new();
    let authority = Arc::new(MongoRoleAuthority::new(&db, &config.roles_collection));
    let roles = RoleCache::new(authority, &cache)?;
    info!(
        "Role cache ready (authority collection: {})",
        config.roles_collection
    );

    server::serve(config.bind_addr, AppState { roles }).await
}
