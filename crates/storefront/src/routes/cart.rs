//! Cart route handlers.
//!
//! Each session has its own cart. Every mutation writes through to the
//! session's cart slot; a failed write shows up as `"degraded": true` in the
//! response, never as an error status.

use axum::{
    Json,
    extract::{Path, State},
};
use mavi_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::{CartTotals, LineItem};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::CurrentShopper;
use crate::state::{AppState, SharedCart};

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartView {
    /// Shopper id whose slot holds this cart.
    pub shopper: String,
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
    pub item_count: u64,
    /// How much more to spend for free shipping; zero once it applies.
    pub free_shipping_remaining: Decimal,
    /// Whether the last write to storage failed.
    pub degraded: bool,
}

impl CartView {
    #[must_use]
    pub fn new(shopper: &str, cart: &SharedCart) -> Self {
        let ledger = cart.ledger();
        Self {
            shopper: shopper.to_owned(),
            items: ledger.items().to_vec(),
            totals: ledger.totals(),
            item_count: ledger.item_count(),
            free_shipping_remaining: ledger.free_shipping_remaining(),
            degraded: cart.is_degraded(),
        }
    }
}

const fn default_quantity() -> i64 {
    1
}

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// Update-quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityForm {
    pub quantity: i64,
}

/// Item count response.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

pub async fn show(shopper: CurrentShopper) -> Json<CartView> {
    let guard = shopper.handle.lock().await;
    Json(CartView::new(&shopper.id, &guard.cart))
}

/// Add a catalog product to the cart.
///
/// Unknown products are `404`; out-of-stock products and additions whose
/// total cannot be represented are rejected with `400`.
#[instrument(
    skip(state, shopper),
    fields(shopper = %shopper.id, product_id = %form.product_id, quantity = form.quantity)
)]
pub async fn add(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    AppJson(form): AppJson<AddToCartForm>,
) -> Result<Json<CartView>> {
    let product = state
        .catalog()
        .await
        .get(&form.product_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    if !product.in_stock {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            product.name
        )));
    }

    let mut guard = shopper.handle.lock().await;
    guard.cart.add_item(&product, form.quantity).await?;
    tracing::info!(item_count = guard.cart.item_count(), "Added to cart");
    Ok(Json(CartView::new(&shopper.id, &guard.cart)))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(
    skip(shopper),
    fields(shopper = %shopper.id, product_id = %id, quantity = form.quantity)
)]
pub async fn update(
    shopper: CurrentShopper,
    Path(id): Path<ProductId>,
    AppJson(form): AppJson<UpdateQuantityForm>,
) -> Result<Json<CartView>> {
    let mut guard = shopper.handle.lock().await;
    guard.cart.update_quantity(&id, form.quantity).await?;
    Ok(Json(CartView::new(&shopper.id, &guard.cart)))
}

#[instrument(skip(shopper), fields(shopper = %shopper.id, product_id = %id))]
pub async fn remove(shopper: CurrentShopper, Path(id): Path<ProductId>) -> Result<Json<CartView>> {
    let mut guard = shopper.handle.lock().await;
    guard.cart.remove_item(&id).await?;
    Ok(Json(CartView::new(&shopper.id, &guard.cart)))
}

#[instrument(skip(shopper), fields(shopper = %shopper.id))]
pub async fn clear(shopper: CurrentShopper) -> Json<CartView> {
    let mut guard = shopper.handle.lock().await;
    guard.cart.clear().await;
    Json(CartView::new(&shopper.id, &guard.cart))
}

pub async fn count(shopper: CurrentShopper) -> Json<CartCount> {
    Json(CartCount {
        count: shopper.handle.lock().await.cart.item_count(),
    })
}
