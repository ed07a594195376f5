//! Punchcard query/cache layer.
//!
//! # Architecture
//!
//! [`LoyaltyClient`] fronts a [`punchcard_core::CustomerStore`] and keeps the
//! views the mobile shell renders (the customer list and single-customer
//! cards) coherent without manual refetching:
//!
//! - Reads are cached in `moka` and tagged with invalidation labels
//!   (the shared list label plus a per-customer label).
//! - The points mutation invalidates the matching labels and optimistically
//!   patches any cached list or single-customer entry in place, so screens
//!   that already hold data show the new balance immediately.
//! - A stale entry is served as-is while a background refresh brings it back
//!   in sync with the store; it is never silently discarded.
//!
//! Store errors pass through unchanged and leave prior cached state
//! untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! use punchcard_client::LoyaltyClient;
//! use punchcard_core::{CustomerId, MemoryStore};
//!
//! let client = LoyaltyClient::new(MemoryStore::with_sample_data());
//!
//! let customers = client.list_customers().await?;
//! let award = client.add_points(CustomerId::new(1), 20).await?;
//!
//! // Both cached views already reflect the award.
//! let refreshed = client.get_customer(CustomerId::new(1)).await?;
//! assert_eq!(refreshed.points, award.customer.points);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
mod client;
mod error;

pub use client::LoyaltyClient;
pub use error::ClientError;
