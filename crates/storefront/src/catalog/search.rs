//! Catalog search: text match, filters and sorting.

use std::str::FromStr;

use mavi_core::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price bucket filter. Bucket edges overlap at 50 the way the storefront
/// filter panel labels them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceRange {
    /// Below 25.
    Under25,
    /// 25 to 50 inclusive.
    From25To50,
    /// 50 to 100 inclusive.
    From50To100,
    /// Above 100.
    Over100,
}

impl PriceRange {
    /// Wire name, as used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Under25 => "under25",
            Self::From25To50 => "from25-to50",
            Self::From50To100 => "from50-to100",
            Self::Over100 => "over100",
        }
    }

    #[must_use]
    pub fn contains(self, price: Decimal) -> bool {
        let (p25, p50, p100) = (Decimal::from(25), Decimal::from(50), Decimal::from(100));
        match self {
            Self::Under25 => price < p25,
            Self::From25To50 => price >= p25 && price <= p50,
            Self::From50To100 => price >= p50 && price <= p100,
            Self::Over100 => price > p100,
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Catalog order.
    #[default]
    Relevance,
    PriceLow,
    PriceHigh,
    /// Highest rating first; unrated products count as zero.
    Rating,
    /// New arrivals first, otherwise catalog order.
    Newest,
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Under25, Self::From25To50, Self::From50To100, Self::Over100]
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown price range {s:?}"))
    }
}

impl SortBy {
    /// Wire name, as used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Newest => "newest",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Relevance,
            Self::PriceLow,
            Self::PriceHigh,
            Self::Rating,
            Self::Newest,
        ]
        .into_iter()
        .find(|sort| sort.as_str() == s)
        .ok_or_else(|| format!("unknown sort order {s:?}"))
    }
}

/// A catalog search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Free text, matched case-insensitively against name, description,
    /// tags and category. Blank matches everything.
    pub text: String,
    /// Category slugs; empty means any category.
    pub categories: Vec<String>,
    pub price_range: Option<PriceRange>,
    pub in_stock_only: bool,
    pub min_rating: Option<Decimal>,
    pub sort: SortBy,
}

impl SearchQuery {
    /// Plain text search with no filters.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn matches(&self, product: &Product, needle: &str) -> bool {
        if !needle.is_empty() && !product.matches_text(needle) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }
        if let Some(range) = self.price_range {
            if !range.contains(product.price.amount) {
                return false;
            }
        }
        if self.in_stock_only && !product.in_stock {
            return false;
        }
        if let Some(min) = self.min_rating {
            // Unrated products never pass a rating filter.
            if product.rating.is_none_or(|r| r < min) {
                return false;
            }
        }
        true
    }

    pub(super) fn run<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let needle = self.text.trim().to_lowercase();
        let mut results: Vec<&Product> = products
            .iter()
            .filter(|p| self.matches(p, &needle))
            .collect();

        // sort_by is stable, so ties keep catalog order.
        match self.sort {
            SortBy::Relevance => {}
            SortBy::PriceLow => results.sort_by(|a, b| a.price.amount.cmp(&b.price.amount)),
            SortBy::PriceHigh => results.sort_by(|a, b| b.price.amount.cmp(&a.price.amount)),
            SortBy::Rating => results.sort_by(|a, b| {
                b.rating
                    .unwrap_or_default()
                    .cmp(&a.rating.unwrap_or_default())
            }),
            SortBy::Newest => results.sort_by_key(|p| !p.is_new),
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn ids(results: &[&Product]) -> Vec<String> {
        results.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_text_matches_name_tags_and_category() {
        let catalog = Catalog::seeded();

        let by_name = catalog.search(&SearchQuery::text("ASTRONAUT"));
        assert_eq!(ids(&by_name), vec!["2"]);

        let by_tag = catalog.search(&SearchQuery::text("whiskey"));
        assert_eq!(ids(&by_tag), vec!["12"]);

        let by_category = catalog.search(&SearchQuery::text("bed-bath"));
        assert_eq!(ids(&by_category), vec!["5"]);
    }

    #[test]
    fn test_blank_text_matches_everything() {
        let catalog = Catalog::seeded();
        assert_eq!(
            catalog.search(&SearchQuery::text("   ")).len(),
            catalog.all().len()
        );
    }

    #[test]
    fn test_price_range_buckets() {
        assert!(PriceRange::Under25.contains(Decimal::new(2499, 2)));
        assert!(!PriceRange::Under25.contains(Decimal::from(25)));
        assert!(PriceRange::From25To50.contains(Decimal::from(50)));
        assert!(PriceRange::From50To100.contains(Decimal::from(50)));
        assert!(!PriceRange::Over100.contains(Decimal::from(100)));

        let catalog = Catalog::seeded();
        let query = SearchQuery {
            price_range: Some(PriceRange::Over100),
            ..SearchQuery::default()
        };
        assert_eq!(ids(&catalog.search(&query)), vec!["5", "10"]);
    }

    #[test]
    fn test_category_and_rating_filters() {
        let catalog = Catalog::seeded();
        let query = SearchQuery {
            categories: vec!["home-gadgets".to_string()],
            min_rating: Some(Decimal::new(48, 1)),
            ..SearchQuery::default()
        };
        assert_eq!(ids(&catalog.search(&query)), vec!["1", "2"]);
    }

    #[test]
    fn test_sorting() {
        let catalog = Catalog::seeded();

        let cheapest = catalog.search(&SearchQuery {
            sort: SortBy::PriceLow,
            ..SearchQuery::default()
        });
        assert_eq!(cheapest.first().map(|p| p.id.as_str()), Some("11"));

        let priciest = catalog.search(&SearchQuery {
            sort: SortBy::PriceHigh,
            ..SearchQuery::default()
        });
        assert_eq!(priciest.first().map(|p| p.id.as_str()), Some("5"));

        let newest = catalog.search(&SearchQuery {
            sort: SortBy::Newest,
            ..SearchQuery::default()
        });
        assert_eq!(newest.first().map(|p| p.id.as_str()), Some("11"));
        assert_eq!(newest.get(1).map(|p| p.id.as_str()), Some("1"));

        let best = catalog.search(&SearchQuery {
            sort: SortBy::Rating,
            ..SearchQuery::default()
        });
        assert_eq!(best.first().map(|p| p.id.as_str()), Some("2"));
    }

    #[test]
    fn test_from_str_matches_serde_names() {
        for sort in [
            SortBy::Relevance,
            SortBy::PriceLow,
            SortBy::PriceHigh,
            SortBy::Rating,
            SortBy::Newest,
        ] {
            let json = serde_json::to_string(&sort).unwrap_or_default();
            assert_eq!(json.trim_matches('"'), sort.as_str());
            assert_eq!(sort.as_str().parse::<SortBy>(), Ok(sort));
        }
        for range in [
            PriceRange::Under25,
            PriceRange::From25To50,
            PriceRange::From50To100,
            PriceRange::Over100,
        ] {
            let json = serde_json::to_string(&range).unwrap_or_default();
            assert_eq!(json.trim_matches('"'), range.as_str());
            assert_eq!(range.as_str().parse::<PriceRange>(), Ok(range));
        }
        assert!("cheapest".parse::<SortBy>().is_err());
    }

    #[test]
    fn test_sort_by_deserializes_kebab_case() {
        let sort: SortBy = serde_json::from_str("\"price-low\"").unwrap_or_default();
        assert_eq!(sort, SortBy::PriceLow);
        let range: Option<PriceRange> = serde_json::from_str("\"from25-to50\"").ok();
        assert_eq!(range, Some(PriceRange::From25To50));
    }
}
