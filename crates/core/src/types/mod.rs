//! Core types for Mavi.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use category::Category;
pub use email::{Email, EmailError};
pub use id::{IdError, ProductId};
pub use price::{CurrencyCode, Price};
pub use product::{MAX_PRICE, Product, ProductDraft, ProductError, ProductPatch};
