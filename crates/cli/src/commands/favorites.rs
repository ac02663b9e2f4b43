//! Favorites commands.

use std::fmt::Write;

use mavi_core::{IdError, ProductId};
use mavi_storefront::catalog::Catalog;
use mavi_storefront::config::StorefrontConfig;
use mavi_storefront::favorites::PersistentFavorites;
use mavi_storefront::storage::FileStorage;
use thiserror::Error;

use super::{money, slot, storage};

/// Errors from favorites commands.
#[derive(Debug, Error)]
pub enum FavoritesCommandError {
    #[error("invalid product id: {0}")]
    InvalidId(#[from] IdError),

    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
}

/// Open the file-backed favorites described by `config`.
pub async fn open(
    config: &StorefrontConfig,
    shopper: Option<&str>,
) -> PersistentFavorites<FileStorage> {
    PersistentFavorites::open(storage(config), slot(&config.favorites_slot, shopper)).await
}

/// Render favorites that are still in the catalog.
pub fn show(favorites: &PersistentFavorites<FileStorage>, catalog: &Catalog) -> String {
    let ids = favorites.favorites().ids();
    if ids.is_empty() {
        return "No favorites".to_string();
    }

    let mut out = String::new();
    for id in ids {
        match catalog.get(id) {
            Some(p) => {
                let _ = writeln!(out, "{:>4}  {:<55} {:>10}", p.id, p.name, money(p.price.amount));
            }
            None => {
                let _ = writeln!(out, "{id:>4}  (no longer in the catalog)");
            }
        }
    }
    let _ = write!(out, "{} favorite(s)", ids.len());
    out
}

/// Favorite a catalog product.
///
/// # Errors
///
/// Fails for a malformed or unknown id.
pub async fn add(
    favorites: &mut PersistentFavorites<FileStorage>,
    catalog: &Catalog,
    id: &str,
) -> Result<String, FavoritesCommandError> {
    let id = ProductId::parse(id)?;
    if catalog.get(&id).is_none() {
        return Err(FavoritesCommandError::UnknownProduct(id));
    }
    favorites.add(id).await;
    Ok(show(favorites, catalog))
}

/// Unfavorite a product.
///
/// # Errors
///
/// Fails for a malformed id.
pub async fn remove(
    favorites: &mut PersistentFavorites<FileStorage>,
    catalog: &Catalog,
    id: &str,
) -> Result<String, FavoritesCommandError> {
    let id = ProductId::parse(id)?;
    favorites.remove(&id).await;
    Ok(show(favorites, catalog))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_favorites_persist_between_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorefrontConfig::default()
        };
        let catalog = Catalog::seeded();

        add(&mut open(&config, None).await, &catalog, "1")
            .await
            .unwrap();
        add(&mut open(&config, None).await, &catalog, "1")
            .await
            .unwrap();
        let output = show(&open(&config, None).await, &catalog);
        assert!(output.ends_with("1 favorite(s)"));
        assert!(dir.path().join("mavigadget-user.json").exists());

        remove(&mut open(&config, None).await, &catalog, "1")
            .await
            .unwrap();
        assert_eq!(show(&open(&config, None).await, &catalog), "No favorites");
    }

    #[tokio::test]
    async fn test_unknown_product_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorefrontConfig::default()
        };
        let mut favorites = open(&config, None).await;

        assert!(matches!(
            add(&mut favorites, &Catalog::seeded(), "999").await,
            Err(FavoritesCommandError::UnknownProduct(_))
        ));
    }
}
