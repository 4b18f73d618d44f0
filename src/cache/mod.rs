//! Cache module - Named, typed caches backed by Moka.
//!
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Cheap-to-clone typed handle over a Moka cache
//!
//! Caches never expire or evict on their own; entries go away only through
//! `invalidate_all`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let roles: TypedCache<String, bool> = registry.get_or_create("admin_roles")?;
//!
//! roles.insert(user_id.clone(), true);
//! let is_admin = roles.get(&user_id);
//! ```

mod registry;
mod typed;

pub use registry::{CacheError, CacheRegistry};
pub use typed::TypedCache;
