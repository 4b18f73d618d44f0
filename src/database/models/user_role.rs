//! Role assignment rows.

use serde::{Deserialize, Serialize};

use crate::permissions::Role;

/// One role held by one user. A user holding several roles has several rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    /// Opaque user identifier issued by the auth backend.
    pub user_id: String,
    pub role: Role,
}
