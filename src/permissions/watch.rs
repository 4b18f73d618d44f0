//! Watch adapters that publish role lookups to a view.
//!
//! A view holds the returned `watch::Receiver`, renders the current value
//! and re-renders on `changed()`. Lookups run on a spawned task so the
//! caller never waits on the authority.

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::debug;

use super::RoleCache;

/// Admin status of one user as seen by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleStatus {
    Loading,
    Resolved(bool),
}

impl RoleStatus {
    /// `true` only once the lookup finished with an admin answer.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Resolved(true))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Admin status of a set of users as seen by a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Loading,
    Resolved(HashMap<String, bool>),
}

impl BatchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Admin flag for one user; `false` while loading or when unknown.
    pub fn is_admin(&self, user_id: &str) -> bool {
        match self {
            Self::Loading => false,
            Self::Resolved(roles) => roles.get(user_id).copied().unwrap_or(false),
        }
    }
}

/// Watch the admin status of one user.
///
/// Absent ids and cached decisions resolve immediately without spawning.
/// Must be called from within a Tokio runtime.
pub fn watch_admin(cache: &RoleCache, user_id: Option<String>) -> watch::Receiver<RoleStatus> {
    let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
        return watch::channel(RoleStatus::Resolved(false)).1;
    };

    if let Some(is_admin) = cache.cached(&user_id) {
        return watch::channel(RoleStatus::Resolved(is_admin)).1;
    }

    let (tx, rx) = watch::channel(RoleStatus::Loading);
    let cache = cache.clone();

    tokio::spawn(async move {
        let is_admin = cache.is_admin(Some(&user_id)).await;
        if tx.send(RoleStatus::Resolved(is_admin)).is_err() {
            debug!("Admin status for user {} resolved after view went away", user_id);
        }
    });

    rx
}

/// Watch the admin status of many users with a single batched lookup.
///
/// If every id is empty or already cached the status resolves immediately
/// without spawning. Must be called from within a Tokio runtime.
pub fn watch_admins(cache: &RoleCache, user_ids: Vec<String>) -> watch::Receiver<BatchStatus> {
    if let Some(roles) = cached_batch(cache, &user_ids) {
        return watch::channel(BatchStatus::Resolved(roles)).1;
    }

    let (tx, rx) = watch::channel(BatchStatus::Loading);
    let cache = cache.clone();

    tokio::spawn(async move {
        let roles = cache.is_admin_batch(&user_ids).await;
        if tx.send(BatchStatus::Resolved(roles)).is_err() {
            debug!(
                "Admin status for {} users resolved after view went away",
                user_ids.len()
            );
        }
    });

    rx
}

/// Decisions for every id, or `None` if any non-empty id is uncached.
fn cached_batch(cache: &RoleCache, user_ids: &[String]) -> Option<HashMap<String, bool>> {
    user_ids
        .iter()
        .map(|user_id| {
            if user_id.is_empty() {
                Some((String::new(), false))
            } else {
                cache.cached(user_id).map(|is_admin| (user_id.clone(), is_admin))
            }
        })
        .collect()
}
