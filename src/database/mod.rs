//! Database module exports.

mod models;
mod mongo;
mod roles;

pub use models::UserRole;
pub use mongo::Database;
pub use roles::MongoRoleAuthority;
