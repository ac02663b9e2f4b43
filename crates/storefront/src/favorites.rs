//! Shopper favorites.
//!
//! A favorites list is an ordered set of product ids. Like the cart it is
//! written through to a storage slot after every change; a failed write is
//! logged and remembered, never returned as an error.

use mavi_core::ProductId;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::storage::{self, SlotStorage, StorageError};

/// Default storage slot for favorites.
pub const DEFAULT_FAVORITES_SLOT: &str = "mavigadget-user";

/// Favorited product ids, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorites {
    favorite_products: Vec<ProductId>,
}

impl Favorites {
    /// Add `id`. Returns `false` if it was already a favorite.
    pub fn add(&mut self, id: ProductId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.favorite_products.push(id);
        true
    }

    /// Remove `id`. Returns `false` if it was not a favorite.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.favorite_products.len();
        self.favorite_products.retain(|fav| fav != id);
        self.favorite_products.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.favorite_products.contains(id)
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.favorite_products
    }
}

/// Favorites that save themselves after every change.
#[derive(Debug)]
pub struct PersistentFavorites<S> {
    favorites: Favorites,
    storage: S,
    slot: String,
    last_error: Option<String>,
}

impl<S: SlotStorage + Clone + 'static> PersistentFavorites<S> {
    /// Open the favorites stored in `slot`, or start empty.
    pub async fn open(storage: S, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let mut last_error = None;

        let favorites = match storage::restore::<_, Favorites>(&storage, &slot).await {
            Ok(Some(favorites)) => favorites,
            Ok(None) => Favorites::default(),
            Err(e) => {
                warn!(slot = %slot, error = %e, "Favorites storage unavailable, starting empty");
                last_error = Some(e.to_string());
                Favorites::default()
            }
        };

        Self {
            favorites,
            storage,
            slot,
            last_error,
        }
    }

    #[must_use]
    pub const fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    /// Add `id`; unchanged lists are not written.
    pub async fn add(&mut self, id: ProductId) -> bool {
        let added = self.favorites.add(id);
        if added {
            self.write_through().await;
        }
        added
    }

    /// Remove `id`; unchanged lists are not written.
    pub async fn remove(&mut self, id: &ProductId) -> bool {
        let removed = self.favorites.remove(id);
        if removed {
            self.write_through().await;
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.favorites.contains(id)
    }

    /// Whether the last storage operation failed.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.last_error.is_some()
    }

    /// Write the list to its slot.
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] from encoding or from the backend.
    pub async fn persist(&self) -> Result<(), StorageError> {
        storage::store(&self.storage, &self.slot, &self.favorites).await
    }

    async fn write_through(&mut self) {
        match self.persist().await {
            Ok(()) => {
                if self.last_error.take().is_some() {
                    info!(slot = %self.slot, "Favorites storage recovered");
                }
            }
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to persist favorites");
                self.last_error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;

    fn id(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    async fn open(storage: &Arc<MemoryStorage>) -> PersistentFavorites<Arc<MemoryStorage>> {
        PersistentFavorites::open(Arc::clone(storage), DEFAULT_FAVORITES_SLOT).await
    }

    #[test]
    fn test_add_ignores_duplicates() {
        let mut favorites = Favorites::default();
        assert!(favorites.add(id("1")));
        assert!(favorites.add(id("2")));
        assert!(!favorites.add(id("1")));

        assert_eq!(favorites.ids(), &[id("1"), id("2")]);
    }

    #[test]
    fn test_remove() {
        let mut favorites = Favorites::default();
        favorites.add(id("1"));

        assert!(favorites.remove(&id("1")));
        assert!(!favorites.remove(&id("1")));
        assert!(!favorites.contains(&id("1")));
    }

    #[test]
    fn test_serialized_field_name() {
        let mut favorites = Favorites::default();
        favorites.add(id("7"));

        let value = serde_json::to_value(&favorites).unwrap();
        assert_eq!(value, serde_json::json!({"favoriteProducts": ["7"]}));
    }

    #[tokio::test]
    async fn test_changes_survive_reopen() {
        let storage = Arc::new(MemoryStorage::new());
        let mut favorites = open(&storage).await;
        favorites.add(id("1")).await;
        favorites.add(id("2")).await;
        favorites.remove(&id("1")).await;

        let reopened = open(&storage).await;
        assert!(reopened.contains(&id("2")));
        assert!(!reopened.contains(&id("1")));

        let stored: serde_json::Value =
            serde_json::from_str(&storage.load(DEFAULT_FAVORITES_SLOT).unwrap().unwrap())
                .unwrap();
        assert_eq!(stored["version"], 0);
        assert_eq!(stored["state"]["favoriteProducts"][0], "2");
    }

    #[tokio::test]
    async fn test_write_failure_is_non_fatal() {
        let storage = Arc::new(MemoryStorage::new());
        let mut favorites = open(&storage).await;
        storage.set_unavailable(true);

        assert!(favorites.add(id("1")).await);
        assert!(favorites.contains(&id("1")));
        assert!(favorites.is_degraded());

        storage.set_unavailable(false);
        favorites.add(id("2")).await;
        assert!(!favorites.is_degraded());
        assert_eq!(open(&storage).await.favorites().ids().len(), 2);
    }
}
