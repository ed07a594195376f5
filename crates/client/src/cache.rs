//! Tagged query cache.
//!
//! Cached entries carry invalidation labels ([`Tag`]): every list read shares
//! [`Tag::List`], single-customer reads carry a per-id [`Tag::Customer`].
//! A mutation names the tags it invalidates; matching entries are marked
//! stale rather than dropped, so screens holding them keep rendering the
//! (already patched) data while a refresh runs.
//!
//! Entry life cycle: absent, then `Fresh` after a successful read. A
//! mutation moves matching entries to `Stale`; the next read serves the
//! stale value, moves the entry to `Refreshing`, and kicks a background
//! refetch which reinserts it `Fresh`. Failed reads cache nothing.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::future::Cache;

use punchcard_core::{Customer, CustomerId};

/// Entries the cache holds at most. The working set is tiny (one list entry
/// plus one entry per viewed customer); the bound is a backstop.
const MAX_ENTRIES: u64 = 1_000;

/// Key identifying a cached query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The full customer list.
    List,
    /// A single customer record.
    Customer(CustomerId),
}

/// Invalidation label attached to cached entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Shared by every list read; mutations touch it because the list view
    /// embeds per-customer point and visit fields.
    List,
    /// Carried by reads of one customer's record.
    Customer(CustomerId),
}

/// Cached value variants.
#[derive(Debug, Clone)]
pub enum CacheValue {
    List(Vec<Customer>),
    Customer(Box<Customer>),
}

/// Freshness of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// In sync with the store as of the last read or refresh.
    Fresh,
    /// Invalidated by a mutation; serve it (it has been patched) but
    /// refetch on the next read.
    Stale,
    /// Stale, with a background refetch already in flight.
    Refreshing,
}

/// A cached query result with its freshness.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub value: CacheValue,
    pub freshness: Freshness,
}

/// The tagged query cache.
///
/// Entries have no expiry; they live until a mutation invalidates them
/// (capacity-bounded only).
pub struct QueryCache {
    entries: Cache<CacheKey, CachedEntry>,
    tags: Mutex<HashMap<Tag, HashSet<CacheKey>>>,
    /// Bumped on every invalidation. A background refetch captures it when
    /// it starts and must not land its snapshot `Fresh` if it has moved
    /// since: the snapshot predates a mutation.
    generation: AtomicU64,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().max_capacity(MAX_ENTRIES).build(),
            tags: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Current invalidation generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Look up the entry for `key`, whatever its freshness.
    pub async fn entry(&self, key: &CacheKey) -> Option<CachedEntry> {
        self.entries.get(key).await
    }

    /// Insert a freshly fetched value, registering the tags it carries.
    pub async fn insert(&self, key: CacheKey, value: CacheValue, provides: &[Tag]) {
        {
            let mut tags = self.tags.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            for tag in provides {
                tags.entry(*tag).or_default().insert(key);
            }
        }
        self.entries
            .insert(
                key,
                CachedEntry {
                    value,
                    freshness: Freshness::Fresh,
                },
            )
            .await;
    }

    /// Mark every entry carrying one of `invalidates` as stale.
    ///
    /// Entries are not dropped: their (patched) data keeps serving until a
    /// read triggers the refetch.
    pub async fn invalidate(&self, invalidates: &[Tag]) {
        self.generation.fetch_add(1, Ordering::AcqRel);

        let keys: Vec<CacheKey> = {
            let tags = self.tags.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            invalidates
                .iter()
                .filter_map(|tag| tags.get(tag))
                .flatten()
                .copied()
                .collect()
        };

        for key in keys {
            if let Some(mut entry) = self.entries.get(&key).await {
                entry.freshness = Freshness::Stale;
                self.entries.insert(key, entry).await;
            }
        }
    }

    /// Set the freshness of an existing entry.
    ///
    /// Used to mark a background refetch in flight (`Refreshing`, so stale
    /// reads do not pile up duplicate refreshes) and to requeue an entry as
    /// `Stale` when that refetch fails. No-op for absent keys.
    pub async fn set_freshness(&self, key: CacheKey, freshness: Freshness) {
        if let Some(mut entry) = self.entries.get(&key).await {
            entry.freshness = freshness;
            self.entries.insert(key, entry).await;
        }
    }

    /// Optimistically patch cached entries with the result of a points
    /// mutation: overwrite `points` and `total_visits` on the matching
    /// record inside the cached list and the cached single-customer entry.
    ///
    /// An entry that does not hold the record (list not yet cached, record
    /// filtered out) is left alone; this is a no-op, not an error.
    pub async fn patch_customer(&self, updated: &Customer) {
        if let Some(mut entry) = self.entries.get(&CacheKey::List).await
            && let CacheValue::List(ref mut customers) = entry.value
            && let Some(cached) = customers.iter_mut().find(|c| c.id == updated.id)
        {
            cached.points = updated.points;
            cached.total_visits = updated.total_visits;
            self.entries.insert(CacheKey::List, entry).await;
        }

        let key = CacheKey::Customer(updated.id);
        if let Some(mut entry) = self.entries.get(&key).await
            && let CacheValue::Customer(ref mut cached) = entry.value
        {
            cached.points = updated.points;
            cached.total_visits = updated.total_visits;
            self.entries.insert(key, entry).await;
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
