//! In-memory role authority for tests.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{AuthorityError, Role, RoleAuthority};

/// Answers from a fixed admin set and records every query it receives.
#[derive(Debug, Default)]
pub(crate) struct StaticAuthority {
    admins: Mutex<HashSet<String>>,
    failing: AtomicBool,
    single_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    batch_queries: Mutex<Vec<Vec<String>>>,
}

impl StaticAuthority {
    pub fn with_admins(admins: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            admins: Mutex::new(admins.iter().map(|id| id.to_string()).collect()),
            ..Default::default()
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn grant(&self, user_id: &str) {
        self.admins.lock().insert(user_id.to_string());
    }

    pub fn revoke(&self, user_id: &str) {
        self.admins.lock().remove(user_id);
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.single_calls() + self.batch_calls()
    }

    /// Ids sent with the most recent batch query, sorted.
    pub fn last_batch(&self) -> Option<Vec<String>> {
        self.batch_queries.lock().last().map(|ids| {
            let mut ids = ids.clone();
            ids.sort();
            ids
        })
    }

    fn check_available(&self) -> Result<(), AuthorityError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthorityError::backend("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleAuthority for StaticAuthority {
    async fn has_role(&self, user_id: &str, role: Role) -> Result<bool, AuthorityError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(role == Role::Admin && self.admins.lock().contains(user_id))
    }

    async fn users_with_role(
        &self,
        user_ids: &[String],
        role: Role,
    ) -> Result<HashSet<String>, AuthorityError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.batch_queries.lock().push(user_ids.to_vec());
        self.check_available()?;

        if role != Role::Admin {
            return Ok(HashSet::new());
        }
        let admins = self.admins.lock();
        Ok(user_ids
            .iter()
            .filter(|id| admins.contains(id.as_str()))
            .cloned()
            .collect())
    }
}
