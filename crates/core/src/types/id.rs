//! Product identifiers.
//!
//! Catalog ids are opaque strings: the seeded catalog uses small numbers
//! (`"1"`, `"2"`, ...) while products created through the admin panel get a
//! generated `product_<uuid>` id. A cart holds at most one line item per id.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when an identifier is blank.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("identifier cannot be empty")]
pub struct IdError;

/// Type-safe product identifier.
///
/// ```
/// use mavi_core::ProductId;
///
/// let id = ProductId::parse("42").unwrap();
/// assert_eq!(id.as_str(), "42");
/// assert!(ProductId::parse("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Parse a product id, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] if the trimmed input is empty.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError);
        }
        Ok(Self(s.to_owned()))
    }

    /// Generate a fresh `product_<uuid>` id for a newly created product.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("product_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}
