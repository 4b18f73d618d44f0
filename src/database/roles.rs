//! MongoDB-backed role authority.
//!
//! Reads role rows straight from the database on every call; caching is
//! the job of `RoleCache`.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Document, doc};
use mongodb::error::ErrorKind;
use tracing::debug;

use super::Database;
use super::models::UserRole;
use crate::permissions::{AuthorityError, Role, RoleAuthority};

/// Role authority over a collection of `{user_id, role}` rows.
#[derive(Clone)]
pub struct MongoRoleAuthority {
    collection: Collection<UserRole>,
}

impl MongoRoleAuthority {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }
}

#[async_trait]
impl RoleAuthority for MongoRoleAuthority {
    async fn has_role(&self, user_id: &str, role: Role) -> Result<bool, AuthorityError> {
        let row = self
            .collection
            .find_one(role_filter(user_id, role))
            .await
            .map_err(classify)?;

        debug!("DB role check {} for {}: {}", role, user_id, row.is_some());
        Ok(row.is_some())
    }

    async fn users_with_role(
        &self,
        user_ids: &[String],
        role: Role,
    ) -> Result<HashSet<String>, AuthorityError> {
        let rows: Vec<UserRole> = self
            .collection
            .find(role_members_filter(user_ids, role))
            .await
            .map_err(classify)?
            .try_collect()
            .await
            .map_err(classify)?;

        let holders = requested_holders(user_ids, rows);

        debug!(
            "DB role listing {} for {} users: {} holders",
            role,
            user_ids.len(),
            holders.len()
        );
        Ok(holders)
    }
}

/// Filter matching the row that grants `role` to `user_id`.
fn role_filter(user_id: &str, role: Role) -> Document {
    doc! { "user_id": user_id, "role": role.as_str() }
}

/// Filter matching every row that grants `role` to one of `user_ids`.
fn role_members_filter(user_ids: &[String], role: Role) -> Document {
    doc! {
        "user_id": { "$in": user_ids.to_vec() },
        "role": role.as_str(),
    }
}

/// Ids of `rows` that were asked about; rows for other users are dropped.
fn requested_holders(
    user_ids: &[String],
    rows: impl IntoIterator<Item = UserRole>,
) -> HashSet<String> {
    let requested: HashSet<&str> = user_ids.iter().map(String::as_str).collect();
    rows.into_iter()
        .filter(|row| requested.contains(row.user_id.as_str()))
        .map(|row| row.user_id)
        .collect()
}

/// Rows that cannot be decoded are malformed responses; everything else
/// is a backend failure.
fn classify(err: mongodb::error::Error) -> AuthorityError {
    if matches!(*err.kind, ErrorKind::BsonDeserialization(_)) {
        AuthorityError::Malformed(err.to_string())
    } else {
        AuthorityError::backend(err)
    }
}
