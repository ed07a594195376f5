//! Core types for Punchcard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod customer;
pub mod id;

pub use customer::{Customer, PointsAward};
pub use id::*;
