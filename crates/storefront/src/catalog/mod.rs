//! Product catalog.
//!
//! Seeded from [`seed`] on first start. Admin edits are saved to the
//! catalog slot, so they survive restarts and the CLI sees them too; they
//! never reach line items already copied into a cart.

pub mod search;
pub mod seed;

use mavi_core::{Category, Product, ProductDraft, ProductError, ProductId, ProductPatch};
use thiserror::Error;
use tracing::{info, warn};

pub use search::{PriceRange, SearchQuery, SortBy};

use crate::storage::{self, SlotStorage, StorageError};

/// Default storage slot for the edited product list.
pub const DEFAULT_CATALOG_SLOT: &str = "mavigadget-products";

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    #[error("invalid product: {0}")]
    Invalid(#[from] ProductError),
}

/// The product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Catalog {
    /// Catalog with the built-in demo products and categories.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(seed::products(), seed::categories())
    }

    #[must_use]
    pub const fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            products,
            categories,
        }
    }

    /// All products in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Products whose category slug is `slug`.
    pub fn by_category<'a>(&'a self, slug: &'a str) -> impl Iterator<Item = &'a Product> + 'a {
        self.products.iter().filter(move |p| p.category == slug)
    }

    pub fn featured(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_featured)
    }

    pub fn new_arrivals(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_new)
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Load the product list saved in `slot`, or the seeded catalog if the
    /// slot is empty, unreadable or unavailable.
    ///
    /// Stored products are validated again; invalid ones are dropped.
    /// Categories always come from the seed.
    pub async fn open<S: SlotStorage + Clone + 'static>(storage: &S, slot: &str) -> Self {
        let products = match storage::restore::<_, Vec<Product>>(storage, slot).await {
            Ok(Some(products)) => products,
            Ok(None) => return Self::seeded(),
            Err(e) => {
                warn!(slot = %slot, error = %e, "Catalog storage unavailable, using seed");
                return Self::seeded();
            }
        };

        let stored = products.len();
        let products: Vec<Product> = products
            .into_iter()
            .filter_map(|product| {
                let id = product.id.clone();
                product
                    .to_draft()
                    .validate(id.clone())
                    .inspect_err(|e| {
                        warn!(product_id = %id, error = %e, "Dropping invalid stored product");
                    })
                    .ok()
            })
            .collect();
        info!(slot = %slot, products = products.len(), stored, "Catalog loaded from storage");

        Self::new(products, seed::categories())
    }

    /// Save the product list to `slot`.
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] from encoding or from the backend.
    pub async fn save<S: SlotStorage + Clone + 'static>(
        &self,
        storage: &S,
        slot: &str,
    ) -> Result<(), StorageError> {
        storage::store(storage, slot, &self.products).await
    }

    /// Run a search query; see [`SearchQuery`].
    #[must_use]
    pub fn search(&self, query: &SearchQuery) -> Vec<&Product> {
        query.run(&self.products)
    }

    /// Validate `draft` and append it with a generated `product_<uuid>` id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] if the draft fails validation.
    pub fn add(&mut self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let product = draft.validate(ProductId::generate())?;
        info!(product_id = %product.id, name = %product.name, "Product added");
        self.products.push(product.clone());
        Ok(product)
    }

    /// Apply `patch` to the product with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown ids and
    /// [`CatalogError::Invalid`] if the patched product fails validation.
    pub fn update(&mut self, id: &ProductId, patch: ProductPatch) -> Result<Product, CatalogError> {
        let slot = self
            .products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        let updated = patch.apply(slot)?;
        *slot = updated.clone();
        info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    /// Remove the product with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown ids.
    pub fn delete(&mut self, id: &ProductId) -> Result<Product, CatalogError> {
        let index = self
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        let removed = self.products.remove(index);
        info!(product_id = %id, "Product deleted");
        Ok(removed)
    }
}
