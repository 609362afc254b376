use crate::deduplication::SharedFetch;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Configuration for the query cache
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// How long a finished entry stays fresh; `None` keeps it for the session
    pub ttl: Option<Duration>,
    /// Maximum number of entries; `None` means unbounded
    pub max_entries: Option<usize>,
    /// Whether results are retained at all
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: None,
            max_entries: None,
            enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl: Some(ttl),
            max_entries: Some(max_entries),
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Where a key is in its `pending -> success | error` lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Success,
    Error,
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub status: EntryStatus,
    pub value: Option<V>,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) enum Slot<V> {
    Pending(SharedFetch<V>),
    Success(V),
    Error(String),
}

pub(crate) struct StoredEntry<V> {
    pub(crate) slot: Slot<V>,
    pub(crate) updated_at: DateTime<Utc>,
    /// Identifies the request that produced this entry.
    pub(crate) generation: u64,
}

impl<V: Clone> StoredEntry<V> {
    pub(crate) fn pending(fetch: SharedFetch<V>, generation: u64) -> Self {
        Self {
            slot: Slot::Pending(fetch),
            updated_at: Utc::now(),
            generation,
        }
    }

    pub(crate) fn completed(result: Result<V, String>, generation: u64) -> Self {
        let slot = match result {
            Ok(value) => Slot::Success(value),
            Err(message) => Slot::Error(message),
        };
        Self {
            slot,
            updated_at: Utc::now(),
            generation,
        }
    }

    pub(crate) fn status(&self) -> EntryStatus {
        match self.slot {
            Slot::Pending(_) => EntryStatus::Pending,
            Slot::Success(_) => EntryStatus::Success,
            Slot::Error(_) => EntryStatus::Error,
        }
    }

    /// Pending entries never expire.
    pub(crate) fn is_expired(&self, ttl: Option<Duration>) -> bool {
        match (&self.slot, ttl) {
            (Slot::Pending(_), _) | (_, None) => false,
            (_, Some(ttl)) => Utc::now() >= self.updated_at + ttl,
        }
    }

    fn snapshot(&self) -> CacheEntry<V> {
        let (value, error_message) = match &self.slot {
            Slot::Pending(_) => (None, None),
            Slot::Success(value) => (Some(value.clone()), None),
            Slot::Error(message) => (None, Some(message.clone())),
        };
        CacheEntry {
            status: self.status(),
            value,
            error_message,
            updated_at: self.updated_at,
        }
    }
}

/// Keyed request cache with at most one in-flight request per key.
///
/// Cloning is cheap and every clone shares the same entries, so one cache can
/// be owned by a session and handed to whatever needs it.
pub struct QueryCache<K, V> {
    pub(crate) entries: Arc<DashMap<K, StoredEntry<V>>>,
    /// Source of request generations, shared by all clones.
    generations: Arc<AtomicU64>,
    pub(crate) config: CacheConfig,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            generations: Arc::clone(&self.generations),
            config: self.config.clone(),
        }
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            generations: Arc::new(AtomicU64::new(1)),
            config,
        }
    }

    pub(crate) fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current state of `key`, or `None` when absent or expired.
    pub fn status(&self, key: &K) -> Option<CacheEntry<V>> {
        let stored = self.entries.get(key)?;
        if stored.is_expired(self.config.ttl) {
            return None;
        }
        Some(stored.snapshot())
    }

    /// The fresh success value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        self.status(key).and_then(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores the outcome of request `generation`, unless the entry was
    /// replaced or removed in the meantime.
    pub(crate) fn complete(&self, key: &K, generation: u64, result: Result<V, String>) {
        match self.entries.get_mut(key) {
            Some(mut stored) if stored.generation == generation => {
                *stored = StoredEntry::completed(result, generation);
                log::debug!("Stored {} for key: {:?}", stored.status(), key);
            }
            _ => log::debug!("Dropping stale result for key: {:?}", key),
        }
    }

    /// Remove expired entries from cache
    pub fn evict_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.config.ttl;
        self.entries.retain(|_, stored| !stored.is_expired(ttl));
        let evicted = before.saturating_sub(self.entries.len());
        log::debug!("Evicted {} expired cache entries", evicted);
        evicted
    }

    /// Makes space for one more entry when a capacity is configured.
    ///
    /// Must not be called while holding a reference into `entries`.
    pub(crate) fn make_room(&self) {
        let Some(max_entries) = self.config.max_entries else {
            return;
        };
        if self.entries.len() < max_entries {
            return;
        }

        self.evict_expired();
        if self.entries.len() >= max_entries {
            self.evict_oldest(max_entries);
        }
    }

    /// Removes the oldest quarter of finished entries.
    fn evict_oldest(&self, max_entries: usize) {
        let mut finished: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| entry.value().status() != EntryStatus::Pending)
            .map(|entry| (entry.key().clone(), entry.value().updated_at))
            .collect();

        finished.sort_by_key(|(_, updated_at)| *updated_at);

        let to_remove = (max_entries / 4).max(1);
        for (key, _) in finished.into_iter().take(to_remove) {
            self.entries.remove(&key);
        }

        log::debug!("Evicted up to {} oldest cache entries", to_remove);
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        self.entries.clear();
        log::info!("Cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let ttl = self.config.ttl;
        let mut stats = CacheStats {
            max_entries: self.config.max_entries,
            ..CacheStats::default()
        };

        for entry in self.entries.iter() {
            stats.total_entries += 1;
            if entry.value().is_expired(ttl) {
                stats.expired_entries += 1;
                continue;
            }
            match entry.value().status() {
                EntryStatus::Pending => stats.pending_entries += 1,
                EntryStatus::Success => stats.success_entries += 1,
                EntryStatus::Error => stats.error_entries += 1,
            }
        }

        stats
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub pending_entries: usize,
    pub success_entries: usize,
    pub error_entries: usize,
    pub expired_entries: usize,
    pub max_entries: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn insert(cache: &QueryCache<String, u32>, key: &str, result: Result<u32, String>) {
        cache
            .entries
            .insert(key.to_string(), StoredEntry::completed(result, 0));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(EntryStatus::Pending.to_string(), "pending");
        assert_eq!(EntryStatus::from_str("error").unwrap(), EntryStatus::Error);
    }

    #[test]
    fn test_snapshot_of_finished_entries() {
        let cache = QueryCache::<String, u32>::default();
        insert(&cache, "ok", Ok(7));
        insert(&cache, "bad", Err("Movie not found!".to_string()));

        let ok = cache.status(&"ok".to_string()).unwrap();
        assert_eq!(ok.status, EntryStatus::Success);
        assert_eq!(ok.value, Some(7));

        let bad = cache.status(&"bad".to_string()).unwrap();
        assert_eq!(bad.status, EntryStatus::Error);
        assert_eq!(bad.error_message.as_deref(), Some("Movie not found!"));
        assert_eq!(cache.get(&"bad".to_string()), None);
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let expired = StoredEntry {
            slot: Slot::Success(1u32),
            updated_at: Utc::now() - Duration::days(365),
            generation: 0,
        };
        assert!(!expired.is_expired(None));
        assert!(expired.is_expired(Some(Duration::hours(1))));
    }

    #[test]
    fn test_expired_entries_are_absent_and_evictable() {
        let cache = QueryCache::<String, u32>::new(CacheConfig {
            ttl: Some(Duration::minutes(5)),
            ..CacheConfig::default()
        });
        cache.entries.insert(
            "old".to_string(),
            StoredEntry {
                slot: Slot::Success(1),
                updated_at: Utc::now() - Duration::minutes(10),
                generation: 0,
            },
        );
        insert(&cache, "new", Ok(2));

        assert!(cache.status(&"old".to_string()).is_none());
        assert_eq!(cache.stats().expired_entries, 1);
        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"new".to_string()), Some(2));
    }

    #[test]
    fn test_make_room_drops_oldest() {
        let cache = QueryCache::<String, u32>::new(CacheConfig {
            max_entries: Some(4),
            ..CacheConfig::default()
        });
        for (age, key) in [(40, "a"), (30, "b"), (20, "c"), (10, "d")] {
            cache.entries.insert(
                key.to_string(),
                StoredEntry {
                    slot: Slot::Success(age),
                    updated_at: Utc::now() - Duration::seconds(age as i64),
                    generation: 0,
                },
            );
        }

        cache.make_room();

        assert_eq!(cache.len(), 3);
        assert!(cache.status(&"a".to_string()).is_none());
        assert!(cache.status(&"d".to_string()).is_some());
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let cache = QueryCache::<String, u32>::default();
        insert(&cache, "k", Ok(1));
        cache.complete(&"k".to_string(), 99, Ok(2));
        assert_eq!(cache.get(&"k".to_string()), Some(1));

        cache.complete(&"missing".to_string(), 0, Ok(3));
        assert_eq!(cache.len(), 1);
        assert!(cache.status(&"missing".to_string()).is_none());
    }

    #[test]
    fn test_generations_are_per_cache() {
        let first = QueryCache::<String, u32>::default();
        let second = QueryCache::<String, u32>::default();
        let shared = first.clone();

        assert_eq!(first.next_generation(), 1);
        assert_eq!(shared.next_generation(), 2);
        assert_eq!(second.next_generation(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::<String, u32>::default();
        insert(&cache, "k", Ok(1));
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
