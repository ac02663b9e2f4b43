//! Mavi Core - Shared types library.
//!
//! This crate provides common types used across all Mavi components:
//! - `storefront` - Cart ledger, catalog, checkout and the JSON API
//! - `cli` - Command-line access to the persisted cart and catalog
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product records, prices, identifiers, categories and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
