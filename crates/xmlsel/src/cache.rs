//! Compiled selector caching.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::{debug, trace};
use xmlsel_core::logging::targets;

use crate::error::{Error, Result};
use crate::parser;
use crate::selector::SelectorGroup;

/// The process-wide cache used by string-taking query methods.
static GLOBAL_CACHE: OnceLock<SelectorCache> = OnceLock::new();

/// Get the process-wide selector cache.
pub fn global_cache() -> &'static SelectorCache {
    GLOBAL_CACHE.get_or_init(SelectorCache::new)
}

/// Bounded map from selector text to its parsed form.
///
/// Safe to share between threads. Parse failures are not cached.
pub struct SelectorCache {
    /// Parsed selectors by source text.
    cache: RwLock<HashMap<String, Arc<SelectorGroup>>>,
    /// Maximum cache entries.
    max_size: usize,
}

impl SelectorCache {
    /// Create a new selector cache.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a cache with specific capacity.
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::with_capacity(max_size)),
            max_size: max_size.max(1),
        }
    }

    /// Get the parsed form of `selector`, parsing it on first use.
    pub fn get_or_parse(&self, selector: &str) -> Result<Arc<SelectorGroup>> {
        if let Some(group) = self.cache.read().get(selector) {
            trace!(target: targets::CACHE, selector, "selector cache hit");
            return Ok(Arc::clone(group));
        }

        let group = Arc::new(
            parser::parse(selector).map_err(|e| Error::invalid_selector(selector, e))?,
        );
        debug!(target: targets::CACHE, selector, chains = group.chains.len(), "compiled selector");

        let mut cache = self.cache.write();
        // Simple eviction: clear half when full
        if cache.len() >= self.max_size {
            Self::evict_half(&mut cache);
        }
        let group = cache
            .entry(selector.to_owned())
            .or_insert(group);
        Ok(Arc::clone(group))
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Drop all cached selectors.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Evict half the entries.
    fn evict_half(cache: &mut HashMap<String, Arc<SelectorGroup>>) {
        let target = cache.len() / 2;
        let keys: Vec<_> = cache.keys().take(target).cloned().collect();
        for key in keys {
            cache.remove(&key);
        }
        debug!(target: targets::CACHE, evicted = target, remaining = cache.len(), "selector cache evicted");
    }
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SelectorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorCache")
            .field("len", &self.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_basic_operations() {
        let cache = SelectorCache::new();
        assert!(cache.is_empty());

        let first = cache.get_or_parse("Q > R").unwrap();
        let second = cache.get_or_parse("Q > R").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.get_or_parse("S").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_skips_failures() {
        let cache = SelectorCache::new();
        let err = cache.get_or_parse("Q[").unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { ref selector, .. } if selector == "Q["));
        assert!(err.parse_error().is_some());
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_evicts_when_full() {
        let cache = SelectorCache::with_capacity(4);
        for name in ["a", "b", "c", "d"] {
            cache.get_or_parse(name).unwrap();
        }
        assert_eq!(cache.len(), 4);

        cache.get_or_parse("e").unwrap();
        assert_eq!(cache.len(), 3);
        assert!(cache.get_or_parse("e").is_ok());
    }

    #[test]
    fn cache_clear() {
        let cache = SelectorCache::default();
        cache.get_or_parse("a, b").unwrap();
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn global_cache_is_shared() {
        let group = global_cache().get_or_parse("global-cache-test").unwrap();
        let again = global_cache().get_or_parse("global-cache-test").unwrap();
        assert!(Arc::ptr_eq(&group, &again));
    }
}
