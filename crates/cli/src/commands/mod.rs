//! Subcommand implementations. Each returns the text to print.

pub mod cart;
pub mod catalog;
pub mod favorites;

use mavi_core::Price;
use mavi_storefront::catalog::Catalog;
use mavi_storefront::config::StorefrontConfig;
use mavi_storefront::storage::{FileStorage, scoped_slot};
use rust_decimal::Decimal;

/// Format an amount as dollars with two decimals.
pub fn money(amount: Decimal) -> String {
    Price::usd(amount).to_string()
}

/// File storage under `config.data_dir`, shared with the server.
pub fn storage(config: &StorefrontConfig) -> FileStorage {
    FileStorage::new(config.data_dir.clone())
}

/// The slot for `base`: the shopper's copy when `shopper` is given,
/// otherwise `base` itself.
pub fn slot(base: &str, shopper: Option<&str>) -> String {
    shopper.map_or_else(|| base.to_owned(), |id| scoped_slot(base, id))
}

/// The catalog as last saved by the admin panel, or the seed.
pub async fn load_catalog(config: &StorefrontConfig) -> Catalog {
    Catalog::open(&storage(config), &config.catalog_slot).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formats_as_usd() {
        assert_eq!(money(Decimal::new(2190, 2)), "$21.90");
        assert_eq!(money(Decimal::from(5)), "$5.00");
        assert_eq!(money(Decimal::new(28_107, 3)), "$28.11");
    }

    #[test]
    fn test_slot_scoping() {
        assert_eq!(slot("mavigadget-cart", None), "mavigadget-cart");
        assert_eq!(slot("mavigadget-cart", Some("abc")), "mavigadget-cart-abc");
    }
}
