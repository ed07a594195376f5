//! Seeded in-memory customer store.

use rand::seq::IndexedRandom;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use async_trait::async_trait;

use super::{CustomerStore, StoreError, seed};
use crate::types::{Customer, CustomerId, PointsAward};

/// In-memory implementation of [`CustomerStore`].
///
/// The collection lives behind a single `RwLock`; `add_points` takes the
/// write guard for its whole read-modify-write, which keeps the additive
/// points invariant even with concurrent callers.
///
/// Process-local only: contents reset on restart.
#[derive(Debug)]
pub struct MemoryStore {
    customers: RwLock<Vec<Customer>>,
}

impl MemoryStore {
    /// Create a store holding the given records.
    #[must_use]
    pub fn new(customers: Vec<Customer>) -> Self {
        Self {
            customers: RwLock::new(customers),
        }
    }

    /// Create an empty store.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Create a store seeded with the built-in sample customers.
    #[must_use]
    pub fn with_sample_data() -> Self {
        Self::new(seed::sample_customers())
    }

    /// Create a store seeded from a JSON seed file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Seed`] if the file cannot be read, parsed, or
    /// contains duplicate ids.
    pub fn from_seed_file(path: &std::path::Path) -> Result<Self, StoreError> {
        let customers = seed::load_file(path)?;
        debug!(count = customers.len(), path = %path.display(), "Seed file loaded");
        Ok(Self::new(customers))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_sample_data()
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    #[instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.customers.read().await.clone())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: CustomerId) -> Result<Customer, StoreError> {
        self.customers
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn scan_random(&self) -> Result<Customer, StoreError> {
        let customers = self.customers.read().await;
        customers
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(StoreError::EmptyCollection)
    }

    #[instrument(skip(self), fields(id = %id, amount))]
    async fn add_points(
        &self,
        id: CustomerId,
        amount: u32,
    ) -> Result<PointsAward, StoreError> {
        if amount == 0 {
            return Err(StoreError::InvalidAmount(0));
        }

        // Write guard held across the whole read-modify-write.
        let mut customers = self.customers.write().await;
        let customer = customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let previous_points = customer.points;
        // Reject rather than wrap: a wrapped balance would go backwards.
        let new_points = previous_points
            .checked_add(amount)
            .ok_or(StoreError::InvalidAmount(i64::from(amount)))?;
        customer.points = new_points;
        customer.total_visits = customer.total_visits.saturating_add(1);

        debug!(
            previous_points,
            new_points = customer.points,
            "Points awarded"
        );

        Ok(PointsAward {
            customer: customer.clone(),
            points_added: amount,
            previous_points,
        })
    }
}
