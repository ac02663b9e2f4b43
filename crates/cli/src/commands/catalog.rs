//! Catalog commands.

use std::fmt::Write;

use mavi_core::Product;
use mavi_storefront::catalog::{Catalog, PriceRange, SearchQuery, SortBy};

use super::money;

fn render(products: &[&Product]) -> String {
    if products.is_empty() {
        return "No products found".to_string();
    }
    let mut out = String::new();
    for p in products {
        let flags = match (p.in_stock, p.is_new) {
            (false, _) => " [out of stock]",
            (true, true) => " [new]",
            (true, false) => "",
        };
        let _ = writeln!(
            out,
            "{:>4}  {:<55} {:>10}  {}{}",
            p.id,
            p.name,
            money(p.price.amount),
            p.category,
            flags
        );
    }
    let _ = write!(out, "{} product(s)", products.len());
    out
}

/// List the catalog, optionally one category.
pub fn list(catalog: &Catalog, category: Option<&str>) -> String {
    let products: Vec<&Product> = match category {
        Some(slug) => catalog.by_category(slug).collect(),
        None => catalog.all().iter().collect(),
    };
    render(&products)
}

/// Run a text search.
pub fn search(
    catalog: &Catalog,
    text: String,
    sort: SortBy,
    price: Option<PriceRange>,
    in_stock: bool,
) -> String {
    let query = SearchQuery {
        text,
        price_range: price,
        in_stock_only: in_stock,
        sort,
        ..SearchQuery::default()
    };
    render(&catalog.search(&query))
}
