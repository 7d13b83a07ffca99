//! Render cache
//!
//! A bounded LRU cache of rendered charts, keyed by the hash of the source
//! text and the requested canvas size. The cache is owned by the caller;
//! the engine itself keeps nothing between renders.

use crate::config::EngineConfig;
use crate::primitives::RenderedChart;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Cache key: source hash plus canvas size in hundredths of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub source_hash: u64,
    width_fixed: u32,
    height_fixed: u32,
}

impl RenderKey {
    pub fn new(source_hash: u64, width: f64, height: f64) -> Self {
        Self {
            source_hash,
            width_fixed: (width * 100.0) as u32,
            height_fixed: (height * 100.0) as u32,
        }
    }

    /// Key for a source text rendered at the given size
    pub fn for_source(source: &str, width: f64, height: f64) -> Self {
        Self::new(hash_source(source), width, height)
    }

    pub fn width(&self) -> f64 {
        self.width_fixed as f64 / 100.0
    }

    pub fn height(&self) -> f64 {
        self.height_fixed as f64 / 100.0
    }
}

/// Hash of a chart description
pub fn hash_source(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded LRU cache of rendered charts
#[derive(Debug)]
pub struct RenderCache {
    capacity: usize,
    entries: HashMap<RenderKey, Arc<RenderedChart>>,
    /// Most recently used at the front
    lru: VecDeque<RenderKey>,
    stats: CacheStats,
}

impl RenderCache {
    /// A capacity of zero disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            lru: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    /// Cache sized by `cache_capacity`
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cache_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn contains(&self, key: &RenderKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up a chart, marking it most recently used
    pub fn get(&mut self, key: &RenderKey) -> Option<Arc<RenderedChart>> {
        match self.entries.get(key).cloned() {
            Some(chart) => {
                self.stats.hits += 1;
                self.touch(*key);
                Some(chart)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Store a chart, evicting the least recently used entries over capacity
    pub fn insert(&mut self, key: RenderKey, chart: Arc<RenderedChart>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key, chart).is_some() {
            self.touch(key);
        } else {
            self.lru.push_front(key);
        }
        self.enforce_limit();
    }

    /// Return the cached chart, or render, store and return a new one.
    ///
    /// `None` from `render` is passed through and nothing is stored.
    pub fn get_or_render<F>(&mut self, key: RenderKey, render: F) -> Option<Arc<RenderedChart>>
    where
        F: FnOnce() -> Option<RenderedChart>,
    {
        if let Some(chart) = self.get(&key) {
            return Some(chart);
        }
        let chart = Arc::new(render()?);
        self.insert(key, Arc::clone(&chart));
        Some(chart)
    }

    /// Drop every entry rendered from the given source
    pub fn invalidate_source(&mut self, source_hash: u64) {
        self.entries.retain(|key, _| key.source_hash != source_hash);
        self.lru.retain(|key| key.source_hash != source_hash);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    fn touch(&mut self, key: RenderKey) {
        self.lru.retain(|k| *k != key);
        self.lru.push_front(key);
    }

    fn enforce_limit(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(key) = self.lru.pop_back() else {
                break;
            };
            if self.entries.remove(&key).is_some() {
                self.stats.evictions += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Group;

    fn chart(width: f64) -> RenderedChart {
        RenderedChart {
            width,
            height: 100.0,
            root: Group::new("chart"),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = RenderCache::new(4);
        let key = RenderKey::for_source("begin-axis end-axis", 200.0, 100.0);
        assert!(cache.get(&key).is_none());
        cache.insert(key, Arc::new(chart(200.0)));
        assert_eq!(cache.get(&key).map(|c| c.width), Some(200.0));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hit_ratio(), 0.5);
    }

    #[test]
    fn test_capacity_from_config() {
        let mut config = EngineConfig::default();
        config.cache_capacity = 3;
        assert_eq!(RenderCache::from_config(&config).capacity(), 3);
    }

    #[test]
    fn test_size_is_part_of_key() {
        let a = RenderKey::for_source("x", 200.0, 100.0);
        let b = RenderKey::for_source("x", 201.0, 100.0);
        assert_ne!(a, b);
        assert_eq!(b.width(), 201.0);
        assert_eq!(b.height(), 100.0);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = RenderCache::new(2);
        let keys: Vec<RenderKey> = (0..3)
            .map(|i| RenderKey::for_source(&format!("chart {}", i), 100.0, 100.0))
            .collect();
        cache.insert(keys[0], Arc::new(chart(1.0)));
        cache.insert(keys[1], Arc::new(chart(2.0)));
        // Touch the oldest so the second becomes least recently used
        assert!(cache.get(&keys[0]).is_some());
        cache.insert(keys[2], Arc::new(chart(3.0)));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&keys[0]));
        assert!(!cache.contains(&keys[1]));
        assert!(cache.contains(&keys[2]));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_get_or_render_renders_once() {
        let mut cache = RenderCache::new(2);
        let key = RenderKey::for_source("x", 10.0, 10.0);
        let mut calls = 0;
        for _ in 0..3 {
            let result = cache.get_or_render(key, || {
                calls += 1;
                Some(chart(10.0))
            });
            assert!(result.is_some());
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_get_or_render_none_is_not_stored() {
        let mut cache = RenderCache::new(2);
        let key = RenderKey::for_source("x", 10.0, 10.0);
        assert!(cache.get_or_render(key, || None).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut cache = RenderCache::new(0);
        let key = RenderKey::for_source("x", 10.0, 10.0);
        cache.insert(key, Arc::new(chart(10.0)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_source() {
        let mut cache = RenderCache::new(4);
        let a = RenderKey::for_source("a", 10.0, 10.0);
        let a_large = RenderKey::for_source("a", 20.0, 20.0);
        let b = RenderKey::for_source("b", 10.0, 10.0);
        for key in [a, a_large, b] {
            cache.insert(key, Arc::new(chart(10.0)));
        }
        cache.invalidate_source(hash_source("a"));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&b));
    }
}
