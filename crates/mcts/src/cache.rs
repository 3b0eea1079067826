//! Position-keyed cache for evaluator calls.
//!
//! Keys are `Game::fingerprint` strings, so transpositions reached through
//! different move orders share one evaluation. Each engine owns its cache;
//! entries survive across searches until `clear` or eviction.

use crate::evaluator::Evaluation;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Snapshot of cache counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,

    /// Lookups that found nothing.
    pub misses: u64,

    /// Entries currently stored.
    pub len: usize,

    /// hits / (hits + misses), 0.0 before any lookup.
    pub hit_rate: f64,
}

/// Bounded cache of evaluations keyed by position fingerprint.
///
/// Entries carry a logical timestamp refreshed on every hit. When an insert
/// would exceed capacity the least-recently-used half is dropped in one
/// batch, which keeps eviction off the per-lookup path.
#[derive(Debug)]
pub struct InferenceCache {
    entries: HashMap<String, (u64, Arc<Evaluation>)>,
    capacity: usize,
    tick: u64,
    hits: u64,
    misses: u64,
}

impl InferenceCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            tick: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up an evaluation, counting a hit or miss and refreshing recency.
    pub fn lookup(&mut self, key: &str) -> Option<Arc<Evaluation>> {
        let tick = self.next_tick();
        match self.entries.get_mut(key) {
            Some((stamp, eval)) => {
                *stamp = tick;
                self.hits += 1;
                Some(Arc::clone(eval))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store an evaluation. Counters are unchanged; misses were already
    /// recorded by the failed lookup.
    pub fn insert(&mut self, key: String, eval: Arc<Evaluation>) {
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest_half();
        }
        let tick = self.next_tick();
        self.entries.insert(key, (tick, eval));
    }

    /// Drop all entries and reset the hit/miss counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current counters and fill level.
    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        };
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
            hit_rate,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_oldest_half(&mut self) {
        let mut stamps: Vec<u64> = self.entries.values().map(|(stamp, _)| *stamp).collect();
        stamps.sort_unstable();
        let cutoff = stamps[stamps.len() / 2];
        let before = self.entries.len();
        self.entries.retain(|_, (stamp, _)| *stamp >= cutoff);
        debug!(
            evicted = before - self.entries.len(),
            remaining = self.entries.len(),
            "inference cache eviction"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(value: f32) -> Arc<Evaluation> {
        Arc::new(Evaluation {
            policy: vec![1.0],
            value,
        })
    }

    #[test]
    fn test_hit_and_miss_counting() {
        let mut cache = InferenceCache::new(8);

        assert!(cache.lookup("a").is_none());
        cache.insert("a".to_string(), eval(0.5));
        let hit = cache.lookup("a").unwrap();
        assert!((hit.value - 0.5).abs() < 1e-6);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.len, 1);
        assert!((stats.hit_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut cache = InferenceCache::new(8);
        cache.insert("a".to_string(), eval(0.1));
        cache.lookup("a");
        cache.lookup("b");

        cache.clear();
        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.len, 0);
        assert_eq!(stats.hit_rate, 0.0);
    }

    #[test]
    fn test_eviction_keeps_recently_used() {
        let mut cache = InferenceCache::new(4);
        for key in ["a", "b", "c", "d"] {
            cache.insert(key.to_string(), eval(0.0));
        }
        // Freshen "a" so it outranks b and c.
        assert!(cache.lookup("a").is_some());

        cache.insert("e".to_string(), eval(0.0));

        assert!(cache.len() <= 4);
        assert!(cache.lookup("a").is_some());
        assert!(cache.lookup("e").is_some());
        assert!(cache.lookup("b").is_none());
        assert!(cache.lookup("c").is_none());
    }

    #[test]
    fn test_reinsert_existing_key_does_not_evict() {
        let mut cache = InferenceCache::new(2);
        cache.insert("a".to_string(), eval(0.1));
        cache.insert("b".to_string(), eval(0.2));

        // Overwriting a resident key must not trigger eviction.
        cache.insert("a".to_string(), eval(0.9));
        assert_eq!(cache.len(), 2);
        assert!((cache.lookup("a").unwrap().value - 0.9).abs() < 1e-6);
        assert!(cache.lookup("b").is_some());
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let mut cache = InferenceCache::new(0);
        cache.insert("a".to_string(), eval(0.5));
        assert!(cache.lookup("a").is_none());
        assert_eq!(cache.len(), 0);
    }
}
