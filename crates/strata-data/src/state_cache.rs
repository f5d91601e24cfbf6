// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A permanent map from structural keys to objects built from them.

use ahash::AHashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

/// Hit and miss counters of a [`StateCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the constructor.
    pub misses: u64,
    /// Entries currently cached.
    pub entries: usize,
}

/// Maps immutable keys to the objects built from them, for the lifetime of
/// the owner.
///
/// Hits take a shared read lock only. Misses are resolved one at a time under
/// a separate lock and re-check the map first, so the constructor runs exactly
/// once per key even if several threads miss on it together. Entries are never
/// evicted; [`invalidate`](Self::invalidate) clears the whole cache.
///
/// A constructor must not look up the cache it is constructing for.
pub struct StateCache<K, V> {
    name: &'static str,
    map: RwLock<AHashMap<K, V>>,
    miss_lock: Mutex<()>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> fmt::Debug for StateCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCache")
            .field("name", &self.name)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<K, V> StateCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache. `name` only appears in logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            map: RwLock::new(AHashMap::new()),
            miss_lock: Mutex::new(()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached value for `key` without constructing anything.
    pub fn get(&self, key: &K) -> Option<V> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).cloned()
    }

    /// Returns the cached value for `key`, constructing it on a miss.
    pub fn get_or_create(&self, key: &K, constructor: impl FnOnce(&K) -> V) -> V {
        match self.get_or_try_create::<std::convert::Infallible>(key, |key| Ok(constructor(key))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_create`](Self::get_or_create), for fallible constructors.
    ///
    /// A failed construction caches nothing; the next lookup tries again.
    pub fn get_or_try_create<E>(
        &self,
        key: &K,
        constructor: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("{} cache hit", self.name);
            return Ok(value);
        }

        let _miss = self.miss_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have resolved the same miss while we waited.
        if let Some(value) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        let value = constructor(key)?;
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), value.clone());
        Ok(value)
    }

    /// Removes every entry and returns them, so the caller can release them.
    ///
    /// Only for device reset or loss, never during steady-state rendering.
    pub fn invalidate(&self) -> Vec<(K, V)> {
        let _miss = self.miss_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        let entries: Vec<_> = map.drain().collect();
        if !entries.is_empty() {
            log::debug!("Invalidated {} {} cache entries", entries.len(), self.name);
        }
        entries
    }

    /// The number of cached entries.
    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit and miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn constructor_runs_once_per_key() {
        // --- ARRANGE ---
        let cache: StateCache<u32, String> = StateCache::new("test");
        let calls = AtomicUsize::new(0);

        // --- ACT ---
        for i in 0..10_000u32 {
            let key = i % 100;
            let value = cache.get_or_create(&key, |key| {
                calls.fetch_add(1, Ordering::SeqCst);
                format!("state-{key}")
            });
            assert_eq!(value, format!("state-{key}"));
        }

        // --- ASSERT ---
        assert_eq!(calls.load(Ordering::SeqCst), 100);
        let stats = cache.stats();
        assert_eq!(stats.misses, 100);
        assert_eq!(stats.hits, 9_900);
        assert_eq!(stats.entries, 100);
    }

    #[test]
    fn failed_construction_is_not_cached() {
        let cache: StateCache<&str, u64> = StateCache::new("test");

        let first: Result<u64, &str> = cache.get_or_try_create(&"blend", |_| Err("out of memory"));
        let second: Result<u64, &str> = cache.get_or_try_create(&"blend", |_| Ok(7));

        assert!(first.is_err());
        assert_eq!(second, Ok(7));
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn invalidate_returns_every_entry() {
        let cache: StateCache<u8, u8> = StateCache::new("test");
        for key in 0..5 {
            cache.get_or_create(&key, |k| k * 2);
        }

        let mut drained = cache.invalidate();
        drained.sort();

        assert_eq!(drained, vec![(0, 0), (1, 2), (2, 4), (3, 6), (4, 8)]);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn concurrent_misses_construct_once() {
        // --- ARRANGE ---
        let cache: StateCache<u32, u32> = StateCache::new("test");
        let calls = AtomicUsize::new(0);

        // --- ACT ---
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for key in 0..50 {
                        let value = cache.get_or_create(&key, |key| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            key + 1000
                        });
                        assert_eq!(value, key + 1000);
                    }
                });
            }
        });

        // --- ASSERT ---
        assert_eq!(calls.load(Ordering::SeqCst), 50);
        assert_eq!(cache.len(), 50);
    }
}
