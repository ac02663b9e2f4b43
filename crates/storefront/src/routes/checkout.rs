//! Checkout route handler.

use axum::{Json, http::StatusCode};
use chrono::Utc;
use tracing::instrument;

use crate::checkout::{CheckoutInfo, OrderConfirmation, place_order};
use crate::error::{AppJson, Result};
use crate::middleware::CurrentShopper;

/// Place an order for the session's cart.
#[instrument(
    skip(shopper, info),
    fields(shopper = %shopper.id, payment_method = ?info.payment_method)
)]
pub async fn place(
    shopper: CurrentShopper,
    AppJson(info): AppJson<CheckoutInfo>,
) -> Result<(StatusCode, Json<OrderConfirmation>)> {
    let mut guard = shopper.handle.lock().await;
    let confirmation = place_order(&mut guard.cart, info, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}
