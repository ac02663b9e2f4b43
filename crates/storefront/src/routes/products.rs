//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use mavi_core::{Category, Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::{PriceRange, SearchQuery, SortBy};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub featured: Option<bool>,
    #[serde(rename = "new")]
    pub is_new: Option<bool>,
}

/// Product listing, optionally narrowed by category and flags.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Product>> {
    let catalog = state.catalog().await;
    let products = catalog
        .all()
        .iter()
        .filter(|p| params.category.as_ref().is_none_or(|c| &p.category == c))
        .filter(|p| params.featured.is_none_or(|f| p.is_featured == f))
        .filter(|p| params.is_new.is_none_or(|n| p.is_new == n))
        .cloned()
        .collect();
    Json(products)
}

/// Product detail.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn show(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<Product>> {
    let catalog = state.catalog().await;
    catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Query parameters for search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub price: Option<PriceRange>,
    pub in_stock: Option<bool>,
    pub min_rating: Option<Decimal>,
    pub sort: Option<SortBy>,
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        Self {
            text: params.q.unwrap_or_default(),
            categories: params.category.into_iter().collect(),
            price_range: params.price,
            in_stock_only: params.in_stock.unwrap_or(false),
            min_rating: params.min_rating,
            sort: params.sort.unwrap_or_default(),
        }
    }
}

/// Search results.
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub total: usize,
    pub products: Vec<Product>,
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResults> {
    let query = SearchQuery::from(params);
    let catalog = state.catalog().await;
    let products: Vec<Product> = catalog.search(&query).into_iter().cloned().collect();

    tracing::debug!(query = %query.text, results = products.len(), "Search");
    Json(SearchResults {
        query: query.text,
        total: products.len(),
        products,
    })
}

pub async fn categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog().await.categories().to_vec())
}

/// A category with its products.
#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub products: Vec<Product>,
}

#[instrument(skip(state))]
pub async fn category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryPage>> {
    let catalog = state.catalog().await;
    let category = catalog
        .category(&slug)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;
    let products = catalog.by_category(&slug).cloned().collect();
    Ok(Json(CategoryPage { category, products }))
}
