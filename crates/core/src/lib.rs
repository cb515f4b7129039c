//! MediStore Core - Shared domain types.
//!
//! This crate provides the types shared by the storefront and its tests:
//! typed ids, user roles, order statuses, prices, and the JSON shapes the
//! MediStore API returns for users, cart items, and orders.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! handling. The API owns these records; the storefront only caches and
//! displays them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
