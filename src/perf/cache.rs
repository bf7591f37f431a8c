//! Bounded result cache with insertion-order eviction
//!
//! Keeps repeated pan/zoom requests from recomputing LTTB while capping memory.
//! Eviction is FIFO: re-reading an old entry does not protect it.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::constants::cache::DEFAULT_MAX_ENTRIES;

/// FIFO-bounded key/value store
pub struct ResultCache<K, V> {
    entries: HashMap<K, V>,
    /// Keys in insertion order, oldest at the front
    order: VecDeque<K>,
    max_entries: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up a cached value, counting the hit or miss
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.entries.get(key) {
            Some(v) => {
                self.hits += 1;
                Some(v)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check for a key without touching hit/miss counters
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value, evicting the oldest insertion first when full.
    ///
    /// Replacing an existing key keeps its original insertion position.
    pub fn set(&mut self, key: K, value: V) {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return;
        }

        if self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            self.entries.remove(&oldest);
            self.evictions += 1;
            log::trace!("result cache full ({}), evicted oldest entry", self.max_entries);
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Get cache statistics; `total_points` is left for callers that know the value type
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            max_entries: self.max_entries,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            total_points: 0,
        }
    }
}

impl<K, V> Default for ResultCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of cache entries
    pub entries: usize,
    /// Entry bound
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Total number of cached points across all entries
    pub total_points: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_eviction() {
        let max = 5;
        let mut cache = ResultCache::new(max);

        for i in 0..=max {
            cache.set(i, i * 10);
        }

        assert_eq!(cache.len(), max);
        assert!(!cache.contains(&0), "first insertion should be evicted");
        for i in 1..=max {
            assert!(cache.contains(&i));
        }
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_access_does_not_protect_old_entry() {
        let mut cache = ResultCache::new(2);
        cache.set("a", 1);
        cache.set("b", 2);

        // Not LRU: reading "a" leaves it first in line
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.set("c", 3);

        assert!(!cache.contains(&"a"));
        assert!(cache.contains(&"b"));
        assert!(cache.contains(&"c"));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut cache = ResultCache::new(2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(&10));

        cache.set("c", 3);
        assert!(!cache.contains(&"a"));
    }

    #[test]
    fn test_clear() {
        let mut cache = ResultCache::new(10);
        cache.set(1, "x");
        cache.set(2, "y");

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);

        // Order queue is reset too, so refilling never evicts stale keys
        for i in 0..10 {
            cache.set(i, "z");
        }
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_hit_miss_counters() {
        let mut cache = ResultCache::new(4);
        assert_eq!(cache.get(&1), None);
        cache.set(1, ());
        assert!(cache.get(&1).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.max_entries, 4);
    }

    #[test]
    fn test_zero_bound_is_clamped() {
        let mut cache = ResultCache::new(0);
        cache.set(1, ());
        cache.set(2, ());
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&2));
    }
}
