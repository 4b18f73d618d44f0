//! Rolecache - cached admin-role lookups for a community news front-end.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `cache` - Named, typed caches with Moka
//! - `permissions` - Admin role cache, role authority seam, watch adapters
//! - `database` - MongoDB role authority
//! - `server` - HTTP adapter (axum)

pub mod cache;
pub mod config;
pub mod database;
pub mod permissions;
pub mod server;
