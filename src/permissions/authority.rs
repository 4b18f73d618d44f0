//! Role authority - the source of truth the role cache reads through to.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application roles stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed authoritative query.
///
/// Every variant is the same condition from the cache's point of view:
/// the authority could not prove the role, so the caller is denied.
#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("role authority request failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("malformed role response: {0}")]
    Malformed(String),
}

impl AuthorityError {
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// Remote authority answering role membership questions.
///
/// Timeouts and cancellation belong to the implementation's transport.
#[async_trait]
pub trait RoleAuthority: Send + Sync {
    /// Does `user_id` currently hold `role`?
    async fn has_role(&self, user_id: &str, role: Role) -> Result<bool, AuthorityError>;

    /// Which of `user_ids` currently hold `role`?
    ///
    /// The answer is a positive list: ids missing from it do not hold the role.
    async fn users_with_role(
        &self,
        user_ids: &[String],
        role: Role,
    ) -> Result<HashSet<String>, AuthorityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(role, Role::Moderator);
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_backend_error_keeps_source() {
        let err = AuthorityError::backend("connection reset");
        assert_eq!(err.to_string(), "role authority request failed: connection reset");
        assert!(std::error::Error::source(&err).is_some());
    }
}
