//! Cache registry - Central management for all caches.

use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info};

use super::TypedCache;

/// Errors raised when resolving a named cache.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache '{name}' already exists as {existing}, requested {requested}")]
    TypeMismatch {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },
}

/// Central registry for named, typed caches.
///
/// The registry is constructed once at startup and injected into every
/// component that owns a cache, so the same name always resolves to the
/// same storage for the lifetime of the process.
///
/// ## Example
///
/// ```rust,ignore
/// let registry = CacheRegistry::new();
/// let roles: TypedCache<String, bool> = registry.get_or_create("admin_roles")?;
/// ```
#[derive(Clone)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

/// Internal cache entry storing type-erased cache.
struct CacheEntry {
    cache: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl CacheEntry {
    fn downcast<K, V>(&self, name: &str) -> Result<TypedCache<K, V>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.cache
            .downcast_ref::<TypedCache<K, V>>()
            .cloned()
            .ok_or_else(|| CacheError::TypeMismatch {
                name: name.to_string(),
                existing: self.type_name,
                requested: std::any::type_name::<TypedCache<K, V>>(),
            })
    }
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new() -> Self {
        info!("Cache registry initialized");
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get an existing cache by name.
    ///
    /// Returns `Ok(None)` if no cache is registered under `name`.
    pub fn get<K, V>(&self, name: &str) -> Result<Option<TypedCache<K, V>>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let caches = self.caches.read();
        caches
            .get(name)
            .map(|entry| entry.downcast::<K, V>(name))
            .transpose()
    }

    /// Get an existing cache or create a new one if it doesn't exist.
    pub fn get_or_create<K, V>(&self, name: &str) -> Result<TypedCache<K, V>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if let Some(cache) = self.get(name)? {
            return Ok(cache);
        }

        let mut caches = self.caches.write();

        // Another caller may have registered it between the two locks.
        if let Some(existing) = caches.get(name) {
            return existing.downcast(name);
        }

        debug!("Creating cache: {}", name);
        let cache = TypedCache::<K, V>::new(name);

        caches.insert(
            name.to_string(),
            CacheEntry {
                cache: Box::new(cache.clone()),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
            },
        );

        Ok(cache)
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}
