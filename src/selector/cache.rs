//! Compiled Selector Cache
//!
//! Bounded LRU map from selector text to compiled `Selector`, shared by
//! every Selection that resolves selector text. Compilation runs outside
//! the lock; concurrent misses on the same text may compile twice, and the
//! later insert is discarded in favour of the entry already present.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use lru::LruCache;
use tracing::{debug, trace};

use super::compiler::Selector;
use crate::error::Result;

/// Capacity of a cache created without an explicit limit
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Thread-safe LRU cache of compiled selectors
pub struct PredicateCache {
    state: Mutex<CacheState>,
}

struct CacheState {
    // Unbounded so a capacity of zero is representable; the limit is
    // enforced by `evict`.
    entries: LruCache<String, Arc<Selector>>,
    capacity: usize,
}

impl CacheState {
    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            match self.entries.pop_lru() {
                Some((text, _)) => trace!(selector = %text, "evicted compiled selector"),
                None => break,
            }
        }
    }
}

impl PredicateCache {
    /// Create a cache holding at most `DEFAULT_CACHE_CAPACITY` selectors
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PredicateCache {
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                capacity,
            }),
        }
    }

    /// Process-wide cache used by `Selection::new` and `Selection::from_document`
    pub fn global() -> &'static Arc<PredicateCache> {
        static GLOBAL: OnceLock<Arc<PredicateCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(PredicateCache::new()))
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the compiled selector for `text`, compiling it on a miss.
    ///
    /// Hits and inserts both mark the entry most recently used. Compile
    /// errors are returned and never cached.
    pub fn get(&self, text: &str) -> Result<Arc<Selector>> {
        if let Some(selector) = self.lock().entries.get(text) {
            return Ok(Arc::clone(selector));
        }

        debug!(selector = text, "compiling selector");
        let compiled = Arc::new(Selector::compile(text)?);
        Ok(self.insert_or_existing(text, compiled))
    }

    /// Second locked step of `get`: keep an entry another caller inserted
    /// while `compiled` was being built, otherwise insert `compiled`
    fn insert_or_existing(&self, text: &str, compiled: Arc<Selector>) -> Arc<Selector> {
        let mut state = self.lock();
        if let Some(existing) = state.entries.get(text) {
            debug!(selector = text, "discarding redundant compile");
            return Arc::clone(existing);
        }

        state.entries.put(text.to_string(), Arc::clone(&compiled));
        state.evict();
        compiled
    }

    /// Change the capacity and evict down to it. Negative values are ignored.
    pub fn set_capacity(&self, capacity: isize) {
        let Ok(capacity) = usize::try_from(capacity) else {
            return;
        };

        let mut state = self.lock();
        debug!(from = state.capacity, to = capacity, "selector cache capacity changed");
        state.capacity = capacity;
        state.evict();
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `text` is cached; does not affect recency
    pub fn contains(&self, text: &str) -> bool {
        self.lock().entries.contains(text)
    }

    /// Drop every entry, keeping the capacity
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Cached selector texts from least to most recently used
    pub fn recency(&self) -> Vec<String> {
        let state = self.lock();
        let mut texts: Vec<String> = state.entries.iter().map(|(k, _)| k.clone()).collect();
        texts.reverse();
        texts
    }
}

impl Default for PredicateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PredicateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("PredicateCache")
            .field("len", &state.entries.len())
            .field("capacity", &state.capacity)
            .finish()
    }
}
