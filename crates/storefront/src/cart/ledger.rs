//! Line items and derived totals.

use mavi_core::{Price, Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ShippingPolicy;

/// Errors raised when a cart change cannot be priced.
///
/// A failed change leaves the cart exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart total would exceed the largest supported amount")]
    TotalOverflow,

    #[error("product {0} has a non-positive unit price")]
    InvalidPrice(ProductId),
}

/// Product data copied into a line item when it is added.
///
/// Later catalog edits do not change a snapshot already in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    /// Unit price charged for this line.
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    pub in_stock: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            original_price: product.original_price,
            in_stock: product.in_stock,
            images: product.images.clone(),
        }
    }
}

/// One product and its quantity. `quantity` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Same as the product id; a cart has at most one line per product.
    pub id: ProductId,
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl LineItem {
    /// Unit price times quantity, `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.product.price.checked_times(self.quantity)
    }
}

/// The four derived monetary fields of a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Price `items` under `policy`. An empty list is all zeros.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::TotalOverflow`] if any sum leaves the range of
    /// [`Decimal`].
    pub fn of(items: &[LineItem], policy: &ShippingPolicy) -> Result<Self, CartError> {
        if items.is_empty() {
            return Ok(Self::default());
        }

        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| {
                item.line_total().and_then(|line| sum.checked_add(line))
            })
            .ok_or(CartError::TotalOverflow)?;
        let shipping = policy.shipping_for(subtotal);
        // No promotion mechanism exists yet.
        let discount = Decimal::ZERO;
        let total = subtotal
            .checked_add(shipping)
            .and_then(|total| total.checked_sub(discount))
            .ok_or(CartError::TotalOverflow)?;

        Ok(Self {
            subtotal,
            shipping,
            discount,
            total,
        })
    }
}

/// The shopper's cart.
///
/// Items keep insertion order. Every mutator prices the new item list first
/// and only then replaces the old one, so [`CartTotals`] always match the
/// items and there is no way to set a total directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartLedger {
    items: Vec<LineItem>,
    totals: CartTotals,
    policy: ShippingPolicy,
}

impl CartLedger {
    /// Create an empty cart priced with `policy`.
    #[must_use]
    pub fn new(policy: ShippingPolicy) -> Self {
        Self {
            items: Vec::new(),
            totals: CartTotals::default(),
            policy,
        }
    }

    /// Rebuild a cart from previously stored line items.
    ///
    /// Lines with a zero quantity are dropped and duplicate ids are merged,
    /// so a hand-edited snapshot cannot break the one-line-per-product rule.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line has a non-positive price or the
    /// lines cannot be priced.
    pub fn from_items(
        items: impl IntoIterator<Item = LineItem>,
        policy: ShippingPolicy,
    ) -> Result<Self, CartError> {
        let mut merged: Vec<LineItem> = Vec::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            ensure_positive_price(&item.id, &item.product.price)?;
            match merged.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => merged.push(item),
            }
        }

        let mut ledger = Self::new(policy);
        ledger.commit(merged)?;
        Ok(ledger)
    }

    /// Add `quantity` of `product`.
    ///
    /// An existing line for the same product has its quantity increased;
    /// otherwise a new line is appended with a snapshot of the product.
    /// A quantity of zero or less removes the product's line instead.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the product has a non-positive price or
    /// the new totals overflow. The cart is unchanged in that case.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> Result<(), CartError> {
        let Some(quantity) = positive_quantity(quantity) else {
            return self.remove_item(&product.id);
        };
        ensure_positive_price(&product.id, &product.price)?;

        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => items.push(LineItem {
                id: product.id.clone(),
                product: ProductSnapshot::from(product),
                quantity,
            }),
        }
        self.commit(items)
    }

    /// Remove the line for `product_id`. Absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the remaining lines cannot be priced.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        let items = self
            .items
            .iter()
            .filter(|item| &item.id != product_id)
            .cloned()
            .collect();
        self.commit(items)
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line. Ids not in the cart are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the new totals overflow. The cart is
    /// unchanged in that case.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        let Some(quantity) = positive_quantity(quantity) else {
            return self.remove_item(product_id);
        };

        let mut items = self.items.clone();
        if let Some(item) = items.iter_mut().find(|item| &item.id == product_id) {
            item.quantity = quantity;
        }
        self.commit(items)
    }

    /// Empty the cart and zero every total.
    pub fn clear(&mut self) {
        self.items.clear();
        self.totals = CartTotals::default();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Current derived totals.
    #[must_use]
    pub const fn totals(&self) -> CartTotals {
        self.totals
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Amount still needed for free shipping; zero for an empty cart.
    #[must_use]
    pub fn free_shipping_remaining(&self) -> Decimal {
        if self.is_empty() {
            return Decimal::ZERO;
        }
        self.policy.remaining_for_free_shipping(self.totals.subtotal)
    }

    /// Recompute totals for `items` and install both, or change nothing.
    fn commit(&mut self, items: Vec<LineItem>) -> Result<(), CartError> {
        let totals = CartTotals::of(&items, &self.policy)?;
        self.items = items;
        self.totals = totals;
        Ok(())
    }
}

fn ensure_positive_price(id: &ProductId, price: &Price) -> Result<(), CartError> {
    if price.is_positive() {
        Ok(())
    } else {
        Err(CartError::InvalidPrice(id.clone()))
    }
}

fn positive_quantity(quantity: i64) -> Option<u32> {
    if quantity <= 0 {
        return None;
    }
    Some(u32::try_from(quantity).unwrap_or(u32::MAX))
}
