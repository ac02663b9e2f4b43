//! Checkout: validate the shopper's details and turn the cart into an order
//! confirmation.
//!
//! There is no payment processing and no order history; placing an order
//! produces a display-only confirmation and empties the cart.

use chrono::{DateTime, Duration, Utc};
use mavi_core::{Email, EmailError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::cart::{CartTotals, LineItem, PersistentCart};
use crate::storage::SlotStorage;

/// Days between placing an order and its estimated delivery.
const DELIVERY_DAYS: i64 = 7;

/// Errors that reject a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// How the shopper intends to pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Paypal,
    ApplePay,
}

/// Shipping and contact details submitted at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutInfo {
    /// Check that every field is filled in and the email is well formed.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checking fields in form order.
    pub fn validate(&self) -> Result<Email, CheckoutError> {
        let required = [
            ("email", &self.email),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address", &self.address),
            ("city", &self.city),
            ("country", &self.country),
            ("postal_code", &self.postal_code),
            ("phone", &self.phone),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(CheckoutError::MissingField(*field));
        }
        Ok(Email::parse(&self.email)?)
    }
}

/// Order status shown on the confirmation page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
}

/// What the shopper sees after placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_number: String,
    pub email: Email,
    pub payment_method: PaymentMethod,
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
    pub placed_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    pub status: OrderStatus,
}

/// `MG` followed by the last six digits of the millisecond timestamp.
#[must_use]
pub fn order_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(1_000_000);
    format!("MG{millis:06}")
}

/// Place an order for everything in `cart`.
///
/// On success the cart's items and totals are copied into the confirmation
/// and the cart is cleared (which writes through to storage like any other
/// mutation). A rejected checkout leaves the cart untouched.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] for an empty cart, or a validation
/// error for incomplete details.
pub async fn place_order<S: SlotStorage + Clone + 'static>(
    cart: &mut PersistentCart<S>,
    info: CheckoutInfo,
    now: DateTime<Utc>,
) -> Result<OrderConfirmation, CheckoutError> {
    if cart.ledger().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let email = info.validate()?;

    let confirmation = OrderConfirmation {
        order_number: order_number(now),
        email,
        payment_method: info.payment_method,
        items: cart.ledger().items().to_vec(),
        totals: cart.ledger().totals(),
        placed_at: now,
        estimated_delivery: now + Duration::days(DELIVERY_DAYS),
        status: OrderStatus::Processing,
    };
    cart.clear().await;

    info!(
        order_number = %confirmation.order_number,
        items = confirmation.items.len(),
        total = %confirmation.totals.total,
        "Order placed"
    );
    Ok(confirmation)
}
