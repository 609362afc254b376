//! Request coalescing on top of [`QueryCache`].
//!
//! The first request for a key inserts a pending entry and spawns the fetch;
//! any request for the same key arriving before it completes joins that
//! fetch instead of starting another one. The spawned task writes the result
//! back into the cache itself, so a caller that stops waiting does not cancel
//! the fetch.

use crate::cache::{QueryCache, Slot, StoredEntry};
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, Shared};
use futures::{Future, FutureExt};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::oneshot;

/// Outcome of a cached request; errors are kept as their display message.
pub type FetchResult<V> = Result<V, String>;

/// In-flight fetch that any number of callers can await.
pub type SharedFetch<V> = Shared<BoxFuture<'static, FetchResult<V>>>;

const ABANDONED: &str = "Request was abandoned before completing";

/// What a request returned: a cached outcome, or the in-flight fetch.
pub enum Lookup<V> {
    Ready(FetchResult<V>),
    Pending(SharedFetch<V>),
}

impl<V: Clone> Lookup<V> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Lookup::Pending(_))
    }

    /// Waits for the outcome.
    pub async fn resolve(self) -> FetchResult<V> {
        match self {
            Lookup::Ready(result) => result,
            Lookup::Pending(fetch) => fetch.await,
        }
    }
}

impl<V> Debug for Lookup<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::Ready(Ok(_)) => f.write_str("Lookup::Ready(Ok(..))"),
            Lookup::Ready(Err(message)) => write!(f, "Lookup::Ready(Err({:?}))", message),
            Lookup::Pending(_) => f.write_str("Lookup::Pending"),
        }
    }
}

fn channel<V: Clone + Send + Sync + 'static>() -> (oneshot::Sender<FetchResult<V>>, SharedFetch<V>) {
    let (sender, receiver) = oneshot::channel();
    let fetch = receiver
        .map(|received| received.unwrap_or_else(|_| Err(ABANDONED.to_string())))
        .boxed()
        .shared();
    (sender, fetch)
}

/// The answer an existing entry gives without a new fetch, if any.
fn existing<K: Debug, V: Clone>(stored: &StoredEntry<V>, key: &K, fresh: bool) -> Option<Lookup<V>> {
    match &stored.slot {
        Slot::Pending(in_flight) => {
            log::debug!("Request already pending for key: {:?}", key);
            Some(Lookup::Pending(in_flight.clone()))
        }
        Slot::Success(value) if fresh => {
            log::debug!("Cache hit for key: {:?}", key);
            Some(Lookup::Ready(Ok(value.clone())))
        }
        Slot::Error(message) if fresh => {
            log::debug!("Cached error for key: {:?}", key);
            Some(Lookup::Ready(Err(message.clone())))
        }
        _ => None,
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Returns the cached outcome for `key`, joins its in-flight fetch, or
    /// starts `fetch` when the key is absent or expired.
    ///
    /// `fetch` is only invoked when a new upstream call is actually needed.
    /// Must be called from within a Tokio runtime.
    pub fn request<F, Fut, E>(&self, key: K, fetch: F) -> Lookup<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display,
    {
        self.lookup_or_start(key, fetch, false)
    }

    /// Like [`request`](Self::request) but re-fetches a finished entry.
    /// A pending entry is joined, never duplicated.
    pub fn refresh<F, Fut, E>(&self, key: K, fetch: F) -> Lookup<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display,
    {
        self.lookup_or_start(key, fetch, true)
    }

    /// Shorthand for `request(key, fetch).resolve().await`.
    pub async fn fetch<F, Fut, E>(&self, key: K, fetch: F) -> FetchResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display,
    {
        self.request(key, fetch).resolve().await
    }

    fn lookup_or_start<F, Fut, E>(&self, key: K, fetch: F, force: bool) -> Lookup<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display,
    {
        if !self.config.enabled {
            let (sender, shared) = channel();
            let future = fetch();
            tokio::spawn(async move {
                let _ = sender.send(future.await.map_err(|e| e.to_string()));
            });
            return Lookup::Pending(shared);
        }

        let ttl = self.config.ttl;
        let answered = |stored: &StoredEntry<V>| {
            let fresh = !force && !stored.is_expired(ttl);
            existing(stored, &key, fresh)
        };

        if let Some(lookup) = self.entries.get(&key).and_then(|stored| answered(stored.value())) {
            return lookup;
        }

        // Only a key that adds an entry may push others out.
        if !self.entries.contains_key(&key) {
            self.make_room();
        }

        let (sender, shared) = channel();
        let generation = self.next_generation();
        let pending = StoredEntry::pending(shared.clone(), generation);

        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if let Some(lookup) = answered(occupied.get()) {
                    return lookup;
                }
                occupied.insert(pending);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(pending);
            }
        }

        log::debug!("Executing new request for key: {:?}", key);
        let cache = self.clone();
        let future = fetch();
        tokio::spawn(async move {
            let result = future.await.map_err(|e| e.to_string());
            cache.complete(&key, generation, result.clone());
            let _ = sender.send(result);
        });

        Lookup::Pending(shared)
    }
}
