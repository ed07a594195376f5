//! The authoritative customer store.
//!
//! # Architecture
//!
//! The store is the single source of truth for customer records. Everything
//! else (the query/cache layer, the HTTP API) holds derived copies that must
//! eventually reflect it after a successful mutation.
//!
//! The [`CustomerStore`] trait keeps the store injectable: the cache layer
//! and route handlers never touch a shared global, and tests can substitute
//! a fake implementation.
//!
//! # Operations
//!
//! - `get_all` - snapshot of the full collection
//! - `get_by_id` - single record lookup
//! - `scan_random` - uniformly random record (simulated NFC/QR scan)
//! - `add_points` - the only mutation; bumps `points` and `total_visits`

mod memory;
pub mod seed;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Customer, CustomerId, PointsAward};

/// Errors produced by store operations.
///
/// All variants are recoverable at the caller: the UI presents a retry
/// affordance rather than treating any of these as fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the given id.
    #[error("customer not found: {0}")]
    NotFound(CustomerId),

    /// The points amount was zero, negative, or would overflow the balance.
    #[error("invalid points amount: {0}")]
    InvalidAmount(i64),

    /// A scan was attempted against an empty store.
    #[error("no customers to scan")]
    EmptyCollection,

    /// Seed data could not be loaded.
    #[error("seed error: {0}")]
    Seed(#[from] seed::SeedError),
}

/// Asynchronous access to the customer collection.
///
/// Implementations must make `add_points` atomic with respect to concurrent
/// callers: the read-modify-write of `points` and `total_visits` may not
/// interleave with another write to the same record.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Return a snapshot of the full collection.
    async fn get_all(&self) -> Result<Vec<Customer>, StoreError>;

    /// Return the record matching `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has that id.
    async fn get_by_id(&self, id: CustomerId) -> Result<Customer, StoreError>;

    /// Return one record chosen uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyCollection`] if the store holds no records.
    async fn scan_random(&self) -> Result<Customer, StoreError>;

    /// Add `amount` points to the record matching `id`, bumping
    /// `total_visits` by one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidAmount`] if `amount` is zero or would
    /// overflow the balance, and [`StoreError::NotFound`] if no record has
    /// that id. On error the record is left unchanged.
    async fn add_points(
        &self,
        id: CustomerId,
        amount: u32,
    ) -> Result<PointsAward, StoreError>;
}
