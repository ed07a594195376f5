//! Punchcard Core - Shared types and the customer store.
//!
//! This crate provides the domain types and the authoritative customer
//! store used across all Punchcard components:
//! - `client` - Query/cache layer consumed by the mobile client shell
//! - `server` - HTTP API exposing the store to devices
//! - `cli` - Command-line tools for seed-file management
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and the customer record
//! - [`store`] - The `CustomerStore` trait and the seeded in-memory store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod store;
pub mod types;

pub use store::{CustomerStore, MemoryStore, StoreError};
pub use types::*;
