//! Permission system for checking user roles.
//!
//! Answers "is this user an admin?" with as few round-trips to the role
//! authority as possible.
//!
//! ## Features
//!
//! - Read-through admin cache, cleared only explicitly
//! - Batched lookups (one authority query for every uncached user)
//! - Fail-closed: a failed query means "not an admin"
//! - Watch adapters for views that render while a lookup is in flight
//!
//! ## Usage
//!
//! ```rust,ignore
//! let roles = RoleCache::new(authority, &registry)?;
//!
//! if roles.is_admin(Some(&user_id)).await {
//!     // ...
//! }
//!
//! let admins = roles.is_admin_batch(&author_ids).await;
//! ```

mod authority;
mod checker;
#[cfg(test)]
pub(crate) mod testing;
mod watch;

pub use authority::{AuthorityError, Role, RoleAuthority};
pub use checker::RoleCache;
pub use watch::{BatchStatus, RoleStatus, watch_admin, watch_admins};
