//! Admin role checker with read-through caching.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{Role, RoleAuthority};
use crate::cache::{CacheError, CacheRegistry, TypedCache};

/// Registry name of the admin decision cache.
const ADMIN_ROLES_CACHE: &str = "admin_roles";

/// Read-through cache of "is this user an admin?" decisions.
///
/// Decisions live until [`RoleCache::invalidate_all`]; there is no TTL and
/// no per-user eviction. Any failure to reach the authority is answered
/// with `false`.
///
/// Lookups take no lock around the authority call, so two concurrent misses
/// for the same user may both query it. Both write the same answer.
#[derive(Clone)]
pub struct RoleCache {
    authority: Arc<dyn RoleAuthority>,
    entries: TypedCache<String, bool>,
}

impl RoleCache {
    /// Create a role cache backed by `authority`.
    ///
    /// Instances built from the same registry share their decisions.
    pub fn new(
        authority: Arc<dyn RoleAuthority>,
        registry: &CacheRegistry,
    ) -> Result<Self, CacheError> {
        let entries = registry.get_or_create(ADMIN_ROLES_CACHE)?;
        Ok(Self { authority, entries })
    }

    /// Check if a user is an admin.
    ///
    /// An absent or empty id is never an admin and never reaches the cache.
    /// A failed query is not cached, so the next call asks again.
    pub async fn is_admin(&self, user_id: Option<&str>) -> bool {
        let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
            return false;
        };

        let key = user_id.to_string();
        if let Some(cached) = self.entries.get(&key) {
            debug!("Admin cache hit for user {}", user_id);
            return cached;
        }

        debug!("Admin cache miss for user {}", user_id);

        match self.authority.has_role(user_id, Role::Admin).await {
            Ok(is_admin) => {
                self.entries.insert(key, is_admin);
                is_admin
            }
            Err(e) => {
                warn!("Admin role check failed for user {}, denying: {}", user_id, e);
                false
            }
        }
    }

    /// Check admin status for many users with at most one authority query.
    ///
    /// Duplicate ids collapse. Only ids without a cached decision are sent
    /// to the authority, and every one of them is cached on success,
    /// including the ones that came back as non-admins. If the query fails
    /// those ids map to `false` and stay uncached.
    pub async fn is_admin_batch<I, S>(&self, user_ids: I) -> HashMap<String, bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles = HashMap::new();
        let mut seen = HashSet::new();
        let mut uncached = Vec::new();

        for user_id in user_ids {
            let user_id = user_id.as_ref();
            if !seen.insert(user_id.to_string()) {
                continue;
            }

            if user_id.is_empty() {
                roles.insert(String::new(), false);
                continue;
            }

            match self.entries.get(&user_id.to_string()) {
                Some(cached) => {
                    roles.insert(user_id.to_string(), cached);
                }
                None => uncached.push(user_id.to_string()),
            }
        }

        if uncached.is_empty() {
            debug!("Admin cache hit for all {} users", roles.len());
            return roles;
        }

        debug!(
            "Admin cache miss for {} of {} users",
            uncached.len(),
            seen.len()
        );

        match self.authority.users_with_role(&uncached, Role::Admin).await {
            Ok(admins) => {
                for user_id in uncached {
                    let is_admin = admins.contains(&user_id);
                    self.entries.insert(user_id.clone(), is_admin);
                    roles.insert(user_id, is_admin);
                }
            }
            Err(e) => {
                warn!(
                    "Batch admin role check failed for {} users, denying: {}",
                    uncached.len(),
                    e
                );
                for user_id in uncached {
                    roles.insert(user_id, false);
                }
            }
        }

        roles
    }

    /// Drop every cached decision.
    ///
    /// Call this when roles might have changed; the next lookup for any
    /// user goes back to the authority.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
        debug!("Invalidated all admin role entries");
    }

    /// Cached decision for a user, without querying the authority.
    pub fn cached(&self, user_id: &str) -> Option<bool> {
        self.entries.get(&user_id.to_string())
    }

    /// Number of cached decisions, for diagnostics.
    ///
    /// Approximate right after [`RoleCache::invalidate_all`]: cleared
    /// decisions may still be counted until the cache reclaims them, though
    /// [`RoleCache::cached`] and lookups no longer see them.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

impl std::fmt::Debug for RoleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleCache")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::testing::StaticAuthority;

    fn role_cache(authority: &Arc<StaticAuthority>) -> RoleCache {
        RoleCache::new(authority.clone(), &CacheRegistry::new()).unwrap()
    }

    fn expected(pairs: &[(&str, bool)]) -> HashMap<String, bool> {
        pairs.iter().map(|(id, v)| (id.to_string(), *v)).collect()
    }

    #[tokio::test]
    async fn test_single_lookup_queries_once() {
        let authority = StaticAuthority::with_admins(&["alice"]);
        let cache = role_cache(&authority);

        assert!(cache.is_admin(Some("alice")).await);
        assert!(cache.is_admin(Some("alice")).await);

        assert_eq!(authority.single_calls(), 1);
        assert_eq!(cache.cached("alice"), Some(true));
    }

    #[tokio::test]
    async fn test_single_lookup_caches_non_admin() {
        let authority = StaticAuthority::with_admins(&[]);
        let cache = role_cache(&authority);

        assert!(!cache.is_admin(Some("bob")).await);
        assert!(!cache.is_admin(Some("bob")).await);

        assert_eq!(authority.single_calls(), 1);
        assert_eq!(cache.cached("bob"), Some(false));
    }

    #[tokio::test]
    async fn test_absent_user_is_never_admin() {
        let authority = StaticAuthority::with_admins(&[""]);
        let cache = role_cache(&authority);

        assert!(!cache.is_admin(None).await);
        assert!(!cache.is_admin(Some("")).await);

        assert_eq!(authority.total_calls(), 0);
        assert_eq!(cache.cached(""), None);
    }

    #[tokio::test]
    async fn test_single_failure_denies_and_skips_cache() {
        let authority = StaticAuthority::with_admins(&["alice"]);
        authority.set_failing(true);
        let cache = role_cache(&authority);

        assert!(!cache.is_admin(Some("alice")).await);
        assert_eq!(cache.cached("alice"), None);

        // Not cached, so the next call asks again.
        authority.set_failing(false);
        assert!(cache.is_admin(Some("alice")).await);
        assert_eq!(authority.single_calls(), 2);
    }

    #[tokio::test]
    async fn test_batch_resolves_positive_list() {
        let authority = StaticAuthority::with_admins(&["A", "C"]);
        let cache = role_cache(&authority);

        let roles = cache.is_admin_batch(["A", "B", "C", "D"]).await;

        assert_eq!(
            roles,
            expected(&[("A", true), ("B", false), ("C", true), ("D", false)])
        );
        assert_eq!(authority.batch_calls(), 1);
        for (id, is_admin) in [("A", true), ("B", false), ("C", true), ("D", false)] {
            assert_eq!(cache.cached(id), Some(is_admin));
        }
        assert_eq!(cache.entry_count(), 4);
    }

    #[tokio::test]
    async fn test_batch_fully_cached_skips_authority() {
        let authority = StaticAuthority::with_admins(&["A"]);
        let cache = role_cache(&authority);
        cache.is_admin_batch(["A", "B"]).await;

        let roles = cache.is_admin_batch(vec!["B".to_string(), "A".to_string()]).await;

        assert_eq!(roles, expected(&[("A", true), ("B", false)]));
        assert_eq!(authority.batch_calls(), 1);
    }

    #[tokio::test]
    async fn test_batch_queries_only_uncached_ids() {
        let authority = StaticAuthority::with_admins(&["A", "C"]);
        let cache = role_cache(&authority);
        assert!(cache.is_admin(Some("A")).await);

        let roles = cache.is_admin_batch(["A", "B", "C", "B", "C"]).await;

        assert_eq!(roles, expected(&[("A", true), ("B", false), ("C", true)]));
        assert_eq!(
            authority.last_batch(),
            Some(vec!["B".to_string(), "C".to_string()])
        );
        assert_eq!(authority.batch_calls(), 1);
    }

    #[tokio::test]
    async fn test_batch_failure_denies_uncached_only() {
        let authority = StaticAuthority::with_admins(&["A", "C"]);
        let cache = role_cache(&authority);
        assert!(cache.is_admin(Some("A")).await);

        authority.set_failing(true);
        let roles = cache.is_admin_batch(["A", "B", "C"]).await;

        assert_eq!(roles, expected(&[("A", true), ("B", false), ("C", false)]));
        assert_eq!(cache.cached("A"), Some(true));
        assert_eq!(cache.cached("B"), None);
        assert_eq!(cache.cached("C"), None);
    }

    #[tokio::test]
    async fn test_batch_empty_input_and_empty_ids() {
        let authority = StaticAuthority::with_admins(&["A"]);
        let cache = role_cache(&authority);

        assert!(cache.is_admin_batch(Vec::<String>::new()).await.is_empty());

        let roles = cache.is_admin_batch(["", "A"]).await;
        assert_eq!(roles, expected(&[("", false), ("A", true)]));
        assert_eq!(authority.last_batch(), Some(vec!["A".to_string()]));
        assert_eq!(cache.cached(""), None);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_fresh_query() {
        let authority = StaticAuthority::with_admins(&["alice"]);
        let cache = role_cache(&authority);
        assert!(cache.is_admin(Some("alice")).await);

        authority.revoke("alice");
        assert!(cache.is_admin(Some("alice")).await, "stale until invalidated");

        cache.invalidate_all();
        assert_eq!(cache.cached("alice"), None);
        assert!(!cache.is_admin(Some("alice")).await);
        assert_eq!(authority.single_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_is_idempotent() {
        let authority = StaticAuthority::with_admins(&["A"]);
        let cache = role_cache(&authority);
        cache.is_admin_batch(["A", "B"]).await;

        cache.invalidate_all();
        cache.invalidate_all();

        assert_eq!(cache.cached("A"), None);
        assert_eq!(cache.cached("B"), None);

        authority.grant("B");
        let roles = cache.is_admin_batch(["A", "B"]).await;
        assert_eq!(roles, expected(&[("A", true), ("B", true)]));
        assert_eq!(authority.batch_calls(), 2);
    }

    #[tokio::test]
    async fn test_caches_from_same_registry_share_decisions() {
        let authority = StaticAuthority::with_admins(&["alice"]);
        let registry = CacheRegistry::new();
        let first = RoleCache::new(authority.clone(), &registry).unwrap();
        let second = RoleCache::new(authority.clone(), &registry).unwrap();

        assert!(first.is_admin(Some("alice")).await);
        assert!(second.is_admin(Some("alice")).await);
        assert_eq!(authority.single_calls(), 1);
        assert_eq!(second.entry_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lookups_agree() {
        let authority = StaticAuthority::with_admins(&["alice"]);
        let cache = role_cache(&authority);

        let lookups = (0..16).map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.is_admin(Some("alice")).await })
        });
        let results = futures::future::join_all(lookups).await;

        assert!(results.into_iter().all(|r| r.unwrap()));
        assert!(authority.single_calls() >= 1);
        assert!(authority.single_calls() <= 16);
        assert_eq!(cache.cached("alice"), Some(true));
    }
}
