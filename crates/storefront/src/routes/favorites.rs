//! Favorites route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use mavi_core::{Product, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentShopper;
use crate::state::{AppState, SharedFavorites};

/// Favorites display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesView {
    pub ids: Vec<ProductId>,
    /// Favorited products still in the catalog, in favorite order.
    pub products: Vec<Product>,
    /// Whether the last write to storage failed.
    pub degraded: bool,
}

/// Whether one product is a favorite.
#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteStatus {
    pub favorite: bool,
}

async fn view(state: &AppState, favorites: &SharedFavorites) -> FavoritesView {
    let catalog = state.catalog().await;
    let ids = favorites.favorites().ids().to_vec();
    let products = ids.iter().filter_map(|id| catalog.get(id).cloned()).collect();
    FavoritesView {
        ids,
        products,
        degraded: favorites.is_degraded(),
    }
}

pub async fn index(State(state): State<AppState>, shopper: CurrentShopper) -> Json<FavoritesView> {
    let guard = shopper.handle.lock().await;
    Json(view(&state, &guard.favorites).await)
}

pub async fn status(shopper: CurrentShopper, Path(id): Path<ProductId>) -> Json<FavoriteStatus> {
    let favorite = shopper.handle.lock().await.favorites.contains(&id);
    Json(FavoriteStatus { favorite })
}

/// Favorite a catalog product. Unknown products are `404`.
#[instrument(skip(state, shopper), fields(shopper = %shopper.id, product_id = %id))]
pub async fn add(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Path(id): Path<ProductId>,
) -> Result<Json<FavoritesView>> {
    if state.catalog().await.get(&id).is_none() {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    let mut guard = shopper.handle.lock().await;
    guard.favorites.add(id).await;
    Ok(Json(view(&state, &guard.favorites).await))
}

#[instrument(skip(state, shopper), fields(shopper = %shopper.id, product_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Path(id): Path<ProductId>,
) -> Json<FavoritesView> {
    let mut guard = shopper.handle.lock().await;
    guard.favorites.remove(&id).await;
    Json(view(&state, &guard.favorites).await)
}
