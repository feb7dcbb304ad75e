//! Caller-owned TTL cache
//!
//! Entries expire `ttl` after insertion. Expired entries are purged on read of
//! their key, and `insert` sweeps the whole map at most once per `ttl`, so keys
//! that are never read again do not accumulate. Invalidation is explicit.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

struct Entries<K, V> {
    map: HashMap<K, CacheEntry<V>>,
    last_sweep: Instant,
}

impl<K, V> Entries<K, V>
where
    K: Eq + Hash,
{
    fn purge_expired(&mut self, ttl: Duration) {
        self.map.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        self.last_sweep = Instant::now();
    }
}

/// Key → value cache with a fixed time-to-live
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<Entries<K, V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;

        match entries.map.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.map.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace, restarting the TTL
    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock().await;
        if entries.last_sweep.elapsed() >= self.ttl {
            entries.purge_expired(self.ttl);
        }
        entries.map.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop one entry; returns true if it was present
    pub async fn invalidate(&self, key: &K) -> bool {
        self.entries.lock().await.map.remove(key).is_some()
    }

    /// Drop every entry whose key matches `predicate`; returns how many were removed
    pub async fn invalidate_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut entries = self.entries.lock().await;
        let before = entries.map.len();
        entries.map.retain(|key, _| !predicate(key));
        before - entries.map.len()
    }

    pub async fn invalidate_all(&self) {
        self.entries.lock().await.map.clear();
    }

    /// Number of fresh entries (purges expired ones)
    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        entries.purge_expired(self.ttl);
        entries.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Apply `f` to every fresh value in place without restarting TTLs
    pub async fn update_all<F>(&self, mut f: F)
    where
        F: FnMut(&mut V),
    {
        let mut entries = self.entries.lock().await;
        entries.purge_expired(self.ttl);
        for entry in entries.map.values_mut() {
            f(&mut entry.value);
        }
    }
}
