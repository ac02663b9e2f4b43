//! Catalog product records.
//!
//! A [`Product`] is always valid: the only way to build one from untrusted
//! input is [`ProductDraft::validate`], and edits go through
//! [`ProductPatch::apply`], which re-runs the same checks.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Description used when a draft leaves it blank.
pub const DEFAULT_DESCRIPTION: &str = "No description yet";

/// Highest allowed product rating.
const MAX_RATING: u8 = 5;

/// Highest accepted unit price, in dollars. Keeps cart arithmetic far from
/// the limits of [`Decimal`].
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Errors produced while validating product input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("price must be greater than zero (got {0})")]
    NonPositivePrice(Decimal),
    #[error("price {0} exceeds the maximum of {max}", max = MAX_PRICE)]
    PriceTooHigh(Decimal),
    #[error("original price {original} must be greater than the price {price}")]
    OriginalPriceNotAbovePrice { original: Decimal, price: Decimal },
    #[error("at least one product image is required")]
    MissingImage,
    #[error("category cannot be empty")]
    EmptyCategory,
    #[error("rating must be between 0 and 5 (got {0})")]
    InvalidRating(Decimal),
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Selling price; this is what a cart charges.
    pub price: Price,
    /// List price shown struck through, when the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    /// Percentage off the original price, derived at validation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,
    pub images: Vec<String>,
    /// Category slug.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl Product {
    /// Case-insensitive match against name, description, tags and category.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
            || self.category.to_lowercase().contains(needle)
    }

    /// Convert back into an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.amount,
            original_price: self.original_price.map(|p| p.amount),
            images: self.images.clone(),
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            tags: self.tags.clone(),
            in_stock: self.in_stock,
            rating: self.rating,
            reviews: self.reviews,
            is_new: self.is_new,
            is_featured: self.is_featured,
        }
    }
}

/// Unvalidated product input, as submitted by the admin product form.
///
/// New products default to in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub images: Vec<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    pub in_stock: bool,
    pub rating: Option<Decimal>,
    pub reviews: Option<u32>,
    pub is_new: bool,
    pub is_featured: bool,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: Decimal::ZERO,
            original_price: None,
            images: Vec::new(),
            category: String::new(),
            subcategory: None,
            tags: Vec::new(),
            in_stock: true,
            rating: None,
            reviews: None,
            is_new: false,
            is_featured: false,
        }
    }
}

impl ProductDraft {
    /// Validate the draft and turn it into a [`Product`] with the given id.
    ///
    /// Blank tags and image URLs are dropped, text fields are trimmed, and a
    /// blank description becomes [`DEFAULT_DESCRIPTION`].
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] describing the first invalid field.
    pub fn validate(self, id: ProductId) -> Result<Product, ProductError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ProductError::EmptyName);
        }

        if self.price <= Decimal::ZERO {
            return Err(ProductError::NonPositivePrice(self.price));
        }
        if let Some(too_high) = [Some(self.price), self.original_price]
            .into_iter()
            .flatten()
            .find(|amount| *amount > MAX_PRICE)
        {
            return Err(ProductError::PriceTooHigh(too_high));
        }

        let discount_percent = match self.original_price {
            Some(original) if original <= self.price => {
                return Err(ProductError::OriginalPriceNotAbovePrice {
                    original,
                    price: self.price,
                });
            }
            Some(original) => discount_percent(original, self.price),
            None => None,
        };

        let images = non_blank(self.images);
        if images.is_empty() {
            return Err(ProductError::MissingImage);
        }

        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(ProductError::EmptyCategory);
        }

        if let Some(rating) = self.rating {
            if rating < Decimal::ZERO || rating > Decimal::from(MAX_RATING) {
                return Err(ProductError::InvalidRating(rating));
            }
        }

        let description = match self.description.trim() {
            "" => DEFAULT_DESCRIPTION.to_owned(),
            text => text.to_owned(),
        };

        Ok(Product {
            id,
            name,
            description,
            price: Price::usd(self.price),
            original_price: self.original_price.map(Price::usd),
            discount_percent,
            images,
            category,
            subcategory: self
                .subcategory
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            tags: non_blank(self.tags),
            in_stock: self.in_stock,
            rating: self.rating,
            reviews: self.reviews,
            is_new: self.is_new,
            is_featured: self.is_featured,
        })
    }
}

/// Partial product update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    /// Remove the original price (ends a sale).
    pub clear_original_price: bool,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tags: Option<Vec<String>>,
    pub in_stock: Option<bool>,
    pub rating: Option<Decimal>,
    pub reviews: Option<u32>,
    pub is_new: Option<bool>,
    pub is_featured: Option<bool>,
}

impl ProductPatch {
    /// Apply the patch to `product`, returning the re-validated result.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] if the patched record is invalid; the
    /// original product is untouched in that case.
    pub fn apply(self, product: &Product) -> Result<Product, ProductError> {
        let mut draft = product.to_draft();

        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if self.clear_original_price {
            draft.original_price = None;
        } else if let Some(original) = self.original_price {
            draft.original_price = Some(original);
        }
        if let Some(images) = self.images {
            draft.images = images;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(subcategory) = self.subcategory {
            draft.subcategory = Some(subcategory);
        }
        if let Some(tags) = self.tags {
            draft.tags = tags;
        }
        if let Some(in_stock) = self.in_stock {
            draft.in_stock = in_stock;
        }
        if let Some(rating) = self.rating {
            draft.rating = Some(rating);
        }
        if let Some(reviews) = self.reviews {
            draft.reviews = Some(reviews);
        }
        if let Some(is_new) = self.is_new {
            draft.is_new = is_new;
        }
        if let Some(is_featured) = self.is_featured {
            draft.is_featured = is_featured;
        }

        draft.validate(product.id.clone())
    }
}

/// `round((original - price) / original * 100)`, half away from zero.
fn discount_percent(original: Decimal, price: Decimal) -> Option<u8> {
    ((original - price) / original * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u8()
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "  Astronaut On The Moon Wall Light ".to_string(),
            price: Decimal::new(9095, 2),
            images: vec!["https://img/1.jpeg".to_string(), "  ".to_string()],
            category: "home-gadgets".to_string(),
            tags: vec!["space".to_string(), String::new()],
            in_stock: true,
            ..ProductDraft::default()
        }
    }

    fn id() -> ProductId {
        ProductId::parse("2").unwrap()
    }

    #[test]
    fn test_validate_normalizes_fields() {
        let product = draft().validate(id()).unwrap();
        assert_eq!(product.name, "Astronaut On The Moon Wall Light");
        assert_eq!(product.description, DEFAULT_DESCRIPTION);
        assert_eq!(product.images, vec!["https://img/1.jpeg"]);
        assert_eq!(product.tags, vec!["space"]);
        assert_eq!(product.price, Price::from_cents(9095));
        assert_eq!(product.discount_percent, None);
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let d = ProductDraft {
            name: "   ".to_string(),
            ..draft()
        };
        assert_eq!(d.validate(id()), Err(ProductError::EmptyName));
    }

    #[test]
    fn test_validate_rejects_non_positive_price() {
        let d = ProductDraft {
            price: Decimal::ZERO,
            ..draft()
        };
        assert!(matches!(
            d.validate(id()),
            Err(ProductError::NonPositivePrice(_))
        ));
    }

    #[test]
    fn test_validate_rejects_price_above_maximum() {
        let d = ProductDraft {
            price: Decimal::MAX,
            ..draft()
        };
        assert_eq!(d.validate(id()), Err(ProductError::PriceTooHigh(Decimal::MAX)));

        let d = ProductDraft {
            original_price: Some(MAX_PRICE + Decimal::ONE),
            ..draft()
        };
        assert!(matches!(d.validate(id()), Err(ProductError::PriceTooHigh(_))));

        let d = ProductDraft {
            price: MAX_PRICE,
            ..draft()
        };
        assert!(d.validate(id()).is_ok());
    }

    #[test]
    fn test_validate_requires_image() {
        let d = ProductDraft {
            images: vec![" ".to_string()],
            ..draft()
        };
        assert_eq!(d.validate(id()), Err(ProductError::MissingImage));
    }

    #[test]
    fn test_validate_rating_range() {
        let d = ProductDraft {
            rating: Some(Decimal::new(51, 1)),
            ..draft()
        };
        assert!(matches!(
            d.validate(id()),
            Err(ProductError::InvalidRating(_))
        ));

        let d = ProductDraft {
            rating: Some(Decimal::from(5)),
            ..draft()
        };
        assert!(d.validate(id()).is_ok());
    }

    #[test]
    fn test_discount_is_derived_from_original_price() {
        let d = ProductDraft {
            price: Decimal::from(60),
            original_price: Some(Decimal::from(80)),
            ..draft()
        };
        let product = d.validate(id()).unwrap();
        assert_eq!(product.discount_percent, Some(25));

        // 1/3 off rounds to 33, 2.5 rounds away from zero
        assert_eq!(
            discount_percent(Decimal::from(30), Decimal::from(20)),
            Some(33)
        );
        assert_eq!(
            discount_percent(Decimal::from(200), Decimal::from(195)),
            Some(3)
        );
    }

    #[test]
    fn test_original_price_must_exceed_price() {
        let d = ProductDraft {
            price: Decimal::from(60),
            original_price: Some(Decimal::from(60)),
            ..draft()
        };
        assert!(matches!(
            d.validate(id()),
            Err(ProductError::OriginalPriceNotAbovePrice { .. })
        ));
    }

    #[test]
    fn test_patch_updates_and_revalidates() {
        let product = draft().validate(id()).unwrap();

        let patched = ProductPatch {
            price: Some(Decimal::from(45)),
            in_stock: Some(false),
            ..ProductPatch::default()
        }
        .apply(&product)
        .unwrap();
        assert_eq!(patched.id, product.id);
        assert_eq!(patched.price, Price::usd(Decimal::from(45)));
        assert!(!patched.in_stock);
        assert_eq!(patched.name, product.name);

        let err = ProductPatch {
            name: Some(String::new()),
            ..ProductPatch::default()
        }
        .apply(&product);
        assert_eq!(err, Err(ProductError::EmptyName));
    }

    #[test]
    fn test_patch_can_clear_original_price() {
        let product = ProductDraft {
            original_price: Some(Decimal::from(100)),
            ..draft()
        }
        .validate(id())
        .unwrap();
        assert!(product.discount_percent.is_some());

        let patched = ProductPatch {
            clear_original_price: true,
            ..ProductPatch::default()
        }
        .apply(&product)
        .unwrap();
        assert_eq!(patched.original_price, None);
        assert_eq!(patched.discount_percent, None);
    }

    #[test]
    fn test_matches_text() {
        let product = draft().validate(id()).unwrap();
        assert!(product.matches_text("astronaut"));
        assert!(product.matches_text("space"));
        assert!(product.matches_text("gadgets"));
        assert!(!product.matches_text("kitchen"));
    }
}
