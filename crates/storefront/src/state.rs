//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::warn;

use crate::cart::PersistentCart;
use crate::catalog::{Catalog, CatalogError};
use crate::config::StorefrontConfig;
use crate::favorites::PersistentFavorites;
use crate::middleware::session::SESSION_EXPIRY_SECONDS;
use crate::storage::{FileStorage, SlotStorage, scoped_slot};

/// Storage handle shared by the catalog and every shopper.
pub type SharedStorage = Arc<dyn SlotStorage>;

/// The cart type held by the server: write-through to the shared storage.
pub type SharedCart = PersistentCart<SharedStorage>;

/// Favorites held by the server.
pub type SharedFavorites = PersistentFavorites<SharedStorage>;

/// Handle to one shopper's state. Locking it serializes that shopper's
/// mutations so each one produces exactly one write in order.
pub type ShopperHandle = Arc<Mutex<Shopper>>;

/// Most shoppers kept open at once; evicted shoppers are reopened from
/// storage on their next request.
const MAX_OPEN_SHOPPERS: u64 = 10_000;

/// Everything the server keeps for one browser session.
pub struct Shopper {
    pub cart: SharedCart,
    pub favorites: SharedFavorites,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// per-session shoppers, the catalog and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: SharedStorage,
    shoppers: Cache<String, ShopperHandle>,
    catalog: RwLock<Catalog>,
}

impl AppState {
    /// Create state backed by files under `config.data_dir`.
    pub async fn new(config: StorefrontConfig) -> Self {
        let storage: SharedStorage = Arc::new(FileStorage::new(config.data_dir.clone()));
        Self::with_storage(config, storage).await
    }

    /// Create state with an explicit storage backend. The catalog is loaded
    /// from `config.catalog_slot`, falling back to the seed.
    pub async fn with_storage(config: StorefrontConfig, storage: SharedStorage) -> Self {
        let catalog = Catalog::open(&storage, &config.catalog_slot).await;
        Self::with_catalog(config, storage, catalog)
    }

    /// Create state with an explicit storage backend and catalog.
    #[must_use]
    pub fn with_catalog(
        config: StorefrontConfig,
        storage: SharedStorage,
        catalog: Catalog,
    ) -> Self {
        let shoppers = Cache::builder()
            .max_capacity(MAX_OPEN_SHOPPERS)
            .time_to_idle(Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs()))
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                shoppers,
                catalog: RwLock::new(catalog),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The shopper for session `id`, rehydrated from its slots on first use.
    pub async fn shopper(&self, id: &str) -> ShopperHandle {
        self.inner
            .shoppers
            .get_with(id.to_owned(), async {
                let config = &self.inner.config;
                let storage = &self.inner.storage;
                let cart = PersistentCart::open(
                    Arc::clone(storage),
                    scoped_slot(&config.cart_slot, id),
                    config.shipping,
                )
                .await;
                let favorites = PersistentFavorites::open(
                    Arc::clone(storage),
                    scoped_slot(&config.favorites_slot, id),
                )
                .await;
                Arc::new(Mutex::new(Shopper { cart, favorites }))
            })
            .await
    }

    pub async fn catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        self.inner.catalog.read().await
    }

    /// Apply `edit` to the catalog and save the result to
    /// `config.catalog_slot`.
    ///
    /// A failed save is logged; the edit stays in effect.
    ///
    /// # Errors
    ///
    /// Returns the edit's [`CatalogError`]; nothing is saved in that case.
    pub async fn edit_catalog<T>(
        &self,
        edit: impl FnOnce(&mut Catalog) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut catalog = self.inner.catalog.write().await;
        let value = edit(&mut catalog)?;

        let slot = &self.inner.config.catalog_slot;
        if let Err(e) = catalog.save(&self.inner.storage, slot).await {
            warn!(slot = %slot, error = %e, "Failed to persist catalog, keeping in-memory edit");
        }
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mavi_core::{ProductDraft, ProductId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    fn test_state(storage: &Arc<MemoryStorage>) -> AppState {
        AppState::with_catalog(
            StorefrontConfig::default(),
            Arc::clone(storage) as SharedStorage,
            Catalog::seeded(),
        )
    }

    #[tokio::test]
    async fn test_shoppers_have_separate_carts() {
        let storage = Arc::new(MemoryStorage::new());
        let state = test_state(&storage);
        let product = state
            .catalog()
            .await
            .get(&ProductId::parse("1").unwrap())
            .cloned()
            .unwrap();

        let alice = state.shopper("alice").await;
        alice.lock().await.cart.add_item(&product, 2).await.unwrap();

        let bob = state.shopper("bob").await;
        assert_eq!(bob.lock().await.cart.item_count(), 0);
        assert_eq!(state.shopper("alice").await.lock().await.cart.item_count(), 2);

        let slot = scoped_slot(&state.config().cart_slot, "alice");
        assert!(storage.load(&slot).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_edit_catalog_is_saved() {
        let storage = Arc::new(MemoryStorage::new());
        let state = test_state(&storage);

        let added = state
            .edit_catalog(|catalog| {
                catalog.add(ProductDraft {
                    name: "Desk Fan".to_string(),
                    price: Decimal::new(1999, 2),
                    images: vec!["/static/products/fan.jpeg".to_string()],
                    category: "kitchen-gadgets".to_string(),
                    ..ProductDraft::default()
                })
            })
            .await
            .unwrap();

        let reloaded = AppState::with_storage(
            StorefrontConfig::default(),
            Arc::clone(&storage) as SharedStorage,
        )
        .await;
        assert_eq!(reloaded.catalog().await.get(&added.id), Some(&added));
    }

    #[tokio::test]
    async fn test_failed_edit_is_not_saved() {
        let storage = Arc::new(MemoryStorage::new());
        let state = test_state(&storage);

        let missing = ProductId::parse("nope").unwrap();
        assert!(state.edit_catalog(|c| c.delete(&missing)).await.is_err());
        assert!(
            storage
                .load(&state.config().catalog_slot)
                .unwrap()
                .is_none()
        );
    }
}
