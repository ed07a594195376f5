//! Punchcard server library.
//!
//! This crate provides the HTTP API as a library, allowing it to be tested
//! in-process and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
