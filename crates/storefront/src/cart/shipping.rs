//! Flat-rate shipping with a free-shipping threshold.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shipping rule applied to a cart subtotal.
///
/// Shipping is free only when the subtotal is strictly greater than the
/// threshold; a subtotal exactly at the threshold still pays the flat fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// Subtotal that must be exceeded for free shipping.
    pub free_shipping_threshold: Decimal,
    /// Fee charged otherwise.
    pub flat_fee: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::new(5000, 2),
            flat_fee: Decimal::new(999, 2),
        }
    }
}

impl ShippingPolicy {
    /// Shipping charged for `subtotal`.
    ///
    /// An empty cart has a zero subtotal and therefore pays the flat fee;
    /// callers that want zero shipping for an empty cart go through
    /// [`CartLedger`](super::CartLedger), which resets all totals when empty.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }

    /// How much more the shopper must spend to unlock free shipping.
    ///
    /// Zero once the subtotal is above the threshold. At exactly the
    /// threshold this reports one cent, since shipping is still charged.
    #[must_use]
    pub fn remaining_for_free_shipping(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.free_shipping_threshold
                .saturating_sub(subtotal)
                .saturating_add(Decimal::new(1, 2))
                .max(Decimal::ZERO)
        }
    }
}
