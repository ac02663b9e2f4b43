//! Shopping cart ledger.
//!
//! The [`CartLedger`] holds the shopper's line items and the four derived
//! totals (subtotal, shipping, discount, total). Totals are recomputed by
//! every mutator and can never be set directly.
//!
//! Durable persistence is layered on top by [`PersistentCart`], which writes
//! a snapshot through a [`SlotStorage`](crate::storage::SlotStorage) handle
//! after each mutation.

mod ledger;
mod persist;
mod shipping;

pub use ledger::{CartError, CartLedger, CartTotals, LineItem, ProductSnapshot};
pub use persist::{CartSnapshot, CartState, PersistentCart};
pub use shipping::ShippingPolicy;

/// Default storage slot for the cart snapshot.
pub const DEFAULT_CART_SLOT: &str = "mavigadget-cart";
