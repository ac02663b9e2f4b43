//! Catalog categories.

use serde::{Deserialize, Serialize};

/// A browsable product category.
///
/// Products reference their category by [`Category::slug`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub image: String,
    pub description: String,
    pub slug: String,
}
