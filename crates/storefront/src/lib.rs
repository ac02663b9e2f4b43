//! Mavi Gadget storefront library.
//!
//! A demo shop backend: a catalog, one cart and favorites list per browser
//! session, all written through to durable storage slots after every change,
//! a display-only checkout and a demo admin panel for editing the catalog.
//! The HTTP API is built by [`routes::app`]; the `mavi` CLI drives the same
//! slots directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod favorites;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;
