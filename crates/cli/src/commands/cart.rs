//! Cart commands.
//!
//! These operate on the same storage slots as the storefront server.
//! Products are looked up in the saved catalog.

use std::fmt::Write;

use mavi_core::{IdError, ProductId};
use mavi_storefront::cart::{CartError, PersistentCart};
use mavi_storefront::catalog::Catalog;
use mavi_storefront::config::StorefrontConfig;
use mavi_storefront::storage::FileStorage;
use thiserror::Error;

use super::{money, slot, storage};

/// Errors from cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    #[error("invalid product id: {0}")]
    InvalidId(#[from] IdError),

    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Open the file-backed cart described by `config`, or one shopper's cart.
pub async fn open(
    config: &StorefrontConfig,
    shopper: Option<&str>,
) -> PersistentCart<FileStorage> {
    PersistentCart::open(
        storage(config),
        slot(&config.cart_slot, shopper),
        config.shipping,
    )
    .await
}

/// Render line items and totals.
pub fn show(cart: &PersistentCart<FileStorage>) -> String {
    let ledger = cart.ledger();
    if ledger.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = String::new();
    for item in ledger.items() {
        let line_total = item
            .line_total()
            .map_or_else(|| "overflow".to_string(), money);
        let _ = writeln!(
            out,
            "{:>4}  {:<50} {:>3} x {:>9} = {:>10}",
            item.id,
            item.product.name,
            item.quantity,
            money(item.product.price.amount),
            line_total,
        );
    }

    let totals = ledger.totals();
    let _ = writeln!(out);
    let _ = writeln!(out, "Items:    {}", ledger.item_count());
    let _ = writeln!(out, "Subtotal: {}", money(totals.subtotal));
    if totals.shipping.is_zero() {
        let _ = writeln!(out, "Shipping: FREE");
    } else {
        let _ = writeln!(out, "Shipping: {}", money(totals.shipping));
        let _ = writeln!(
            out,
            "          add {} more for free shipping",
            money(ledger.free_shipping_remaining())
        );
    }
    if !totals.discount.is_zero() {
        let _ = writeln!(out, "Discount: -{}", money(totals.discount));
    }
    let _ = write!(out, "Total:    {}", money(totals.total));

    if let Some(err) = cart.last_persist_error() {
        let _ = write!(out, "\nwarning: cart could not be saved ({err})");
    }
    out
}

/// Add a catalog product.
///
/// # Errors
///
/// Fails for a malformed or unknown id, an out-of-stock product, or an
/// addition the cart refuses.
pub async fn add(
    cart: &mut PersistentCart<FileStorage>,
    catalog: &Catalog,
    id: &str,
    quantity: i64,
) -> Result<String, CartCommandError> {
    let id = ProductId::parse(id)?;
    let product = catalog
        .get(&id)
        .ok_or_else(|| CartCommandError::UnknownProduct(id.clone()))?;
    if !product.in_stock {
        return Err(CartCommandError::OutOfStock(product.name.clone()));
    }

    cart.add_item(product, quantity).await?;
    tracing::info!(product_id = %id, quantity, "Added to cart");
    Ok(show(cart))
}

/// Set the quantity of a line already in the cart.
///
/// # Errors
///
/// Fails for a malformed id or a quantity the cart refuses.
pub async fn set(
    cart: &mut PersistentCart<FileStorage>,
    id: &str,
    quantity: i64,
) -> Result<String, CartCommandError> {
    let id = ProductId::parse(id)?;
    cart.update_quantity(&id, quantity).await?;
    Ok(show(cart))
}

/// Remove a line.
///
/// # Errors
///
/// Fails for a malformed id.
pub async fn remove(
    cart: &mut PersistentCart<FileStorage>,
    id: &str,
) -> Result<String, CartCommandError> {
    let id = ProductId::parse(id)?;
    cart.remove_item(&id).await?;
    Ok(show(cart))
}

pub async fn clear(cart: &mut PersistentCart<FileStorage>) -> String {
    cart.clear().await;
    show(cart)
}
