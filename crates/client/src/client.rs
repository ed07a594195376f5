//! The loyalty client facade.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use punchcard_core::{Customer, CustomerId, CustomerStore, PointsAward};

use crate::cache::{CacheKey, CacheValue, Freshness, QueryCache, Tag};
use crate::error::ClientError;

/// Cache-coherent client over a [`CustomerStore`].
///
/// Cheaply cloneable; clones share the cache and the store.
pub struct LoyaltyClient<S> {
    inner: Arc<ClientInner<S>>,
}

impl<S> Clone for LoyaltyClient<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ClientInner<S> {
    store: S,
    cache: QueryCache,
}

impl<S> LoyaltyClient<S>
where
    S: CustomerStore + 'static,
{
    /// Create a client over the given store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                store,
                cache: QueryCache::new(),
            }),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// List all customers.
    ///
    /// Served from cache when possible; a stale entry is served as-is (it
    /// has been patched by any intervening mutation) while a background
    /// refresh re-syncs it with the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails. Prior cached state is left
    /// untouched.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, ClientError> {
        if let Some(entry) = self.inner.cache.entry(&CacheKey::List).await
            && let CacheValue::List(customers) = entry.value
        {
            debug!(freshness = ?entry.freshness, "Cache hit for customer list");
            if entry.freshness == Freshness::Stale {
                self.spawn_refresh(CacheKey::List).await;
            }
            return Ok(customers);
        }

        let customers = self.inner.store.get_all().await?;
        self.inner
            .cache
            .insert(
                CacheKey::List,
                CacheValue::List(customers.clone()),
                &[Tag::List],
            )
            .await;
        Ok(customers)
    }

    /// List customers matching a search query (name, phone, or email,
    /// case-insensitive). Pure filter over the cached list; no extra round
    /// trip beyond what [`Self::list_customers`] needs.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying list read fails.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_customers(&self, query: &str) -> Result<Vec<Customer>, ClientError> {
        let customers = self.list_customers().await?;
        Ok(customers.into_iter().filter(|c| c.matches(query)).collect())
    }

    /// Get a single customer by id.
    ///
    /// # Errors
    ///
    /// Returns [`punchcard_core::StoreError::NotFound`] (wrapped) for an
    /// unknown id. Errors are never cached.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, ClientError> {
        let key = CacheKey::Customer(id);
        if let Some(entry) = self.inner.cache.entry(&key).await
            && let CacheValue::Customer(customer) = entry.value
        {
            debug!(freshness = ?entry.freshness, "Cache hit for customer");
            if entry.freshness == Freshness::Stale {
                self.spawn_refresh(key).await;
            }
            return Ok(*customer);
        }

        let customer = self.inner.store.get_by_id(id).await?;
        self.inner
            .cache
            .insert(
                key,
                CacheValue::Customer(Box::new(customer.clone())),
                &[Tag::Customer(id)],
            )
            .await;
        Ok(customer)
    }

    /// Get a single customer, abandoning the read if `cancel` fires first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] on cancellation; no cache
    /// mutation is applied in that case.
    pub async fn get_customer_with_cancel(
        &self,
        id: CustomerId,
        cancel: &CancellationToken,
    ) -> Result<Customer, ClientError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.get_customer(id) => result,
        }
    }

    // =========================================================================
    // Scan (simulated NFC/QR) - not cached, every scan is a fresh draw
    // =========================================================================

    /// Scan a customer: one record chosen uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns [`punchcard_core::StoreError::EmptyCollection`] (wrapped) if
    /// the store holds no customers.
    #[instrument(skip(self))]
    pub async fn scan_customer(&self) -> Result<Customer, ClientError> {
        Ok(self.inner.store.scan_random().await?)
    }

    /// Scan a customer, abandoning the draw if `cancel` fires first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] on cancellation.
    pub async fn scan_customer_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Customer, ClientError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.scan_customer() => result,
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Award points to a customer.
    ///
    /// On success the cached list and single-customer entries are patched
    /// with the new `points`/`total_visits` and marked stale, so already
    /// rendered views show the award immediately and the next read re-syncs
    /// with the store. On failure the cache is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`punchcard_core::StoreError::InvalidAmount`] for a zero or
    /// balance-overflowing amount and [`punchcard_core::StoreError::NotFound`]
    /// for an unknown id (both wrapped).
    #[instrument(skip(self), fields(id = %id, amount))]
    pub async fn add_points(
        &self,
        id: CustomerId,
        amount: u32,
    ) -> Result<PointsAward, ClientError> {
        let award = self.inner.store.add_points(id, amount).await?;
        self.apply_award(&award).await;
        Ok(award)
    }

    /// Award points, abandoning the request if `cancel` fires before the
    /// store commits.
    ///
    /// Once the store has committed, the cache patch always runs: a token
    /// firing between commit and patch must not leave cached views behind
    /// the store.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] if cancelled before the commit;
    /// otherwise as [`Self::add_points`].
    pub async fn add_points_with_cancel(
        &self,
        id: CustomerId,
        amount: u32,
        cancel: &CancellationToken,
    ) -> Result<PointsAward, ClientError> {
        let award = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ClientError::Cancelled),
            result = self.inner.store.add_points(id, amount) => result?,
        };
        self.apply_award(&award).await;
        Ok(award)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn apply_award(&self, award: &PointsAward) {
        let id = award.customer.id;
        // Patch first, then invalidate: the entries end up both patched and
        // flagged for refetch on the next read.
        self.inner.cache.patch_customer(&award.customer).await;
        self.inner
            .cache
            .invalidate(&[Tag::Customer(id), Tag::List])
            .await;
    }

    /// Kick a background refetch for a stale entry. The stale data keeps
    /// serving until the refetch lands; a failed refetch requeues the entry
    /// as stale so a later read retries.
    ///
    /// The entry is marked `Refreshing` before the task is spawned, so a
    /// second stale read arriving right behind the first finds the flag
    /// already set and does not start a duplicate refetch.
    async fn spawn_refresh(&self, key: CacheKey) {
        self.inner
            .cache
            .set_freshness(key, Freshness::Refreshing)
            .await;
        let started_at = self.inner.cache.generation();
        let client = self.clone();
        tokio::spawn(async move {
            let result = match key {
                CacheKey::List => client
                    .inner
                    .store
                    .get_all()
                    .await
                    .map(CacheValue::List)
                    .map(|value| (value, vec![Tag::List])),
                CacheKey::Customer(id) => client
                    .inner
                    .store
                    .get_by_id(id)
                    .await
                    .map(|c| CacheValue::Customer(Box::new(c)))
                    .map(|value| (value, vec![Tag::Customer(id)])),
            };
            match result {
                Ok((value, tags)) => {
                    // A mutation that invalidated while the fetch was in
                    // flight has already patched the entry; this snapshot
                    // predates it and must not land as fresh over the
                    // patched data. Requeue stale and let the next read
                    // refetch instead.
                    if client.inner.cache.generation() != started_at {
                        client.inner.cache.set_freshness(key, Freshness::Stale).await;
                        return;
                    }
                    client.inner.cache.insert(key, value, &tags).await;
                    if client.inner.cache.generation() != started_at {
                        client.inner.cache.set_freshness(key, Freshness::Stale).await;
                    }
                }
                Err(err) => {
                    warn!(error = %err, ?key, "Background cache refresh failed");
                    client.inner.cache.set_freshness(key, Freshness::Stale).await;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use punchcard_core::{MemoryStore, StoreError};

    /// Store wrapper that counts round trips, to observe cache behavior.
    struct CountingStore {
        inner: MemoryStore,
        get_all_calls: AtomicUsize,
        get_by_id_calls: AtomicUsize,
        add_points_calls: AtomicUsize,
    }

    impl CountingStore {
        fn sample() -> Self {
            Self {
                inner: MemoryStore::with_sample_data(),
                get_all_calls: AtomicUsize::new(0),
                get_by_id_calls: AtomicUsize::new(0),
                add_points_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CustomerStore for CountingStore {
        async fn get_all(&self) -> Result<Vec<Customer>, StoreError> {
            self.get_all_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_all().await
        }

        async fn get_by_id(&self, id: CustomerId) -> Result<Customer, StoreError> {
            self.get_by_id_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_by_id(id).await
        }

        async fn scan_random(&self) -> Result<Customer, StoreError> {
            self.inner.scan_random().await
        }

        async fn add_points(
            &self,
            id: CustomerId,
            amount: u32,
        ) -> Result<PointsAward, StoreError> {
            self.add_points_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.add_points(id, amount).await
        }
    }

    fn client() -> LoyaltyClient<CountingStore> {
        LoyaltyClient::new(CountingStore::sample())
    }

    /// Store wrapper whose `get_all` takes its snapshot and then parks on a
    /// semaphore until the test releases it, to interleave a slow refetch
    /// with mutations.
    struct GatedStore {
        inner: Arc<MemoryStore>,
        gated: Arc<AtomicBool>,
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl CustomerStore for GatedStore {
        async fn get_all(&self) -> Result<Vec<Customer>, StoreError> {
            let snapshot = self.inner.get_all().await;
            if self.gated.load(Ordering::SeqCst) {
                // Forget the permit so every gated read needs its own
                // release.
                self.gate.acquire().await.expect("gate open").forget();
            }
            snapshot
        }

        async fn get_by_id(&self, id: CustomerId) -> Result<Customer, StoreError> {
            self.inner.get_by_id(id).await
        }

        async fn scan_random(&self) -> Result<Customer, StoreError> {
            self.inner.scan_random().await
        }

        async fn add_points(
            &self,
            id: CustomerId,
            amount: u32,
        ) -> Result<PointsAward, StoreError> {
            self.inner.add_points(id, amount).await
        }
    }

    #[tokio::test]
    async fn test_repeated_list_reads_hit_cache() {
        let client = client();

        let first = client.list_customers().await.unwrap();
        let second = client.list_customers().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.inner.store.get_all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_single_reads_hit_cache() {
        let client = client();

        let first = client.get_customer(CustomerId::new(2)).await.unwrap();
        let second = client.get_customer(CustomerId::new(2)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.inner.store.get_by_id_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_add_points_keeps_cached_views_coherent_without_refetch() {
        let client = client();

        // Prime both views.
        client.list_customers().await.unwrap();
        client.get_customer(CustomerId::new(1)).await.unwrap();

        let award = client.add_points(CustomerId::new(1), 20).await.unwrap();
        assert_eq!(award.previous_points, 250);
        assert_eq!(award.points_added, 20);
        assert_eq!(award.customer.points, 270);
        assert_eq!(award.customer.total_visits, 13);

        // Both views reflect the award from the patched cache; no inline
        // round trip happened for either read.
        let listed = client.list_customers().await.unwrap();
        let in_list = listed
            .iter()
            .find(|c| c.id == CustomerId::new(1))
            .unwrap();
        assert_eq!(in_list.points, 270);
        assert_eq!(in_list.total_visits, 13);

        let single = client.get_customer(CustomerId::new(1)).await.unwrap();
        assert_eq!(single.points, 270);
        assert_eq!(single.total_visits, 13);
    }

    #[tokio::test]
    async fn test_slow_refresh_does_not_clobber_a_later_award() {
        let store = Arc::new(MemoryStore::with_sample_data());
        let gated = Arc::new(AtomicBool::new(false));
        let gate = Arc::new(Semaphore::new(0));
        let client = LoyaltyClient::new(GatedStore {
            inner: Arc::clone(&store),
            gated: Arc::clone(&gated),
            gate: Arc::clone(&gate),
        });

        // Prime the list, then gate every later refetch.
        client.list_customers().await.unwrap();
        gated.store(true, Ordering::SeqCst);

        // First award marks the list stale; the next read serves the
        // patched value and kicks a refresh, whose snapshot (points=260)
        // is now parked on the gate.
        client.add_points(CustomerId::new(1), 10).await.unwrap();
        client.list_customers().await.unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // Second award commits while that snapshot is in flight.
        client.add_points(CustomerId::new(1), 10).await.unwrap();
        gate.add_permits(1);
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }

        // The pre-award snapshot was dropped: the cached list still holds
        // both awards and stays flagged for refetch.
        let entry = client.inner.cache.entry(&CacheKey::List).await.unwrap();
        let CacheValue::List(customers) = entry.value else {
            panic!("expected list value");
        };
        let cached = customers
            .iter()
            .find(|c| c.id == CustomerId::new(1))
            .unwrap();
        let in_store = store.get_by_id(CustomerId::new(1)).await.unwrap();
        assert_eq!(cached.points, 270);
        assert_eq!(cached.points, in_store.points);
        assert_eq!(entry.freshness, Freshness::Stale);
    }

    #[tokio::test]
    async fn test_consecutive_stale_reads_share_one_refresh() {
        let client = client();
        client.list_customers().await.unwrap();
        client.add_points(CustomerId::new(1), 5).await.unwrap();

        // Both reads arrive while the entry is stale or already
        // refreshing; only one refetch may result.
        client.list_customers().await.unwrap();
        client.list_customers().await.unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // One priming fetch plus one refresh.
        assert_eq!(client.inner.store.get_all_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unrelated_cached_records_survive_a_mutation() {
        let client = client();
        client.get_customer(CustomerId::new(2)).await.unwrap();

        client.add_points(CustomerId::new(1), 5).await.unwrap();

        // Customer 2's cached entry was not tagged by the mutation.
        let other = client.get_customer(CustomerId::new(2)).await.unwrap();
        assert_eq!(other.points, 180);
        assert_eq!(client.inner.store.get_by_id_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_untouched() {
        let client = client();
        client.list_customers().await.unwrap();

        let err = client.add_points(CustomerId::new(1), 0).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Store(StoreError::InvalidAmount(0))
        ));

        // Still a fresh cache hit with the original balance.
        let listed = client.list_customers().await.unwrap();
        let unchanged = listed
            .iter()
            .find(|c| c.id == CustomerId::new(1))
            .unwrap();
        assert_eq!(unchanged.points, 250);
        assert_eq!(client.inner.store.get_all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_forwarded_and_never_cached() {
        let client = client();

        for _ in 0..2 {
            let err = client.get_customer(CustomerId::new(999)).await.unwrap_err();
            assert!(matches!(err, ClientError::Store(StoreError::NotFound(_))));
        }
        // Both misses went to the store.
        assert_eq!(client.inner.store.get_by_id_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_scan_on_empty_store_fails_cleanly() {
        let client = LoyaltyClient::new(MemoryStore::empty());
        let err = client.scan_customer().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Store(StoreError::EmptyCollection)
        ));
    }

    #[tokio::test]
    async fn test_scan_is_never_cached() {
        let client = client();
        let listed = client.list_customers().await.unwrap();
        for _ in 0..5 {
            let scanned = client.scan_customer().await.unwrap();
            assert!(listed.contains(&scanned));
        }
    }

    #[tokio::test]
    async fn test_search_filters_cached_list() {
        let client = client();

        let by_name = client.search_customers("fatima").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, CustomerId::new(2));

        let by_phone = client.search_customers("634567").await.unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].name, "Omar Bouzid");

        let all = client.search_customers("").await.unwrap();
        assert_eq!(all.len(), 3);

        // One round trip fed every search.
        assert_eq!(client.inner.store.get_all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_read_applies_no_cache_mutation() {
        let client = client();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .get_customer_with_cancel(CustomerId::new(1), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));

        // Nothing was fetched or cached.
        assert_eq!(client.inner.store.get_by_id_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_mutation_never_reaches_the_store() {
        let client = client();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .add_points_with_cancel(CustomerId::new(1), 10, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(client.inner.store.add_points_calls.load(Ordering::SeqCst), 0);

        // The record is untouched.
        let customer = client.get_customer(CustomerId::new(1)).await.unwrap();
        assert_eq!(customer.points, 250);
    }

    #[tokio::test]
    async fn test_uncancelled_token_does_not_interfere() {
        let client = client();
        let cancel = CancellationToken::new();

        let award = client
            .add_points_with_cancel(CustomerId::new(1), 15, &cancel)
            .await
            .unwrap();
        assert_eq!(award.customer.points, 265);

        let scanned = client.scan_customer_with_cancel(&cancel).await.unwrap();
        assert!(scanned.points > 0);
    }
}
