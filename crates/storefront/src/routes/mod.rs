//! HTTP route handlers for storefront.
//!
//! Every route speaks JSON, including errors (`{"error": ...}`). Money is
//! rendered as decimal strings. Cart and favorites routes act on the shopper
//! of the current session.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Health check
//!
//! # Catalog
//! GET    /api/products             - Product listing (?category=&featured=&new=)
//! GET    /api/products/{id}        - Product detail
//! GET    /api/search               - Search (?q=&category=&price=&in_stock=&min_rating=&sort=)
//! GET    /api/categories           - Category listing
//! GET    /api/categories/{slug}    - Category with its products
//!
//! # Cart
//! GET    /api/cart                 - Cart view with totals
//! POST   /api/cart/items           - Add a product
//! PATCH  /api/cart/items/{id}      - Set a line quantity
//! DELETE /api/cart/items/{id}      - Remove a line
//! DELETE /api/cart                 - Empty the cart
//! GET    /api/cart/count           - Total item count
//!
//! # Favorites
//! GET    /api/favorites            - Favorite ids and products
//! GET    /api/favorites/{id}       - Whether a product is a favorite
//! PUT    /api/favorites/{id}       - Favorite a product
//! DELETE /api/favorites/{id}       - Unfavorite a product
//!
//! # Checkout
//! POST   /api/checkout             - Place an order
//!
//! # Admin (requires admin session)
//! POST   /admin/login              - Sign in
//! POST   /admin/logout             - Sign out
//! GET    /admin/me                 - Current admin
//! GET    /admin/dashboard          - Catalog figures
//! POST   /admin/products           - Create product
//! PATCH  /admin/products/{id}      - Update product
//! DELETE /admin/products/{id}      - Delete product
//! ```

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/search", get(products::search))
        .route("/categories", get(products::categories))
        .route("/categories/{slug}", get(products::category))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{id}",
            axum::routing::patch(cart::update).delete(cart::remove),
        )
        .route("/count", get(cart::count))
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new().route("/", get(favorites::index)).route(
        "/{id}",
        get(favorites::status)
            .put(favorites::add)
            .delete(favorites::remove),
    )
}

/// Create the `/api` router: catalog, cart, favorites and checkout.
pub fn api_routes() -> Router<AppState> {
    catalog_routes()
        .nest("/cart", cart_routes())
        .nest("/favorites", favorites_routes())
        .route("/checkout", post(checkout::place))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(admin::login))
        .route("/logout", post(admin::logout))
        .route("/me", get(admin::me))
        .route("/dashboard", get(admin::dashboard))
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            axum::routing::patch(admin::update_product).delete(admin::delete_product),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .nest("/admin", admin_routes())
}

/// Build the complete application with its middleware stack.
///
/// Sentry layers are added by the binary, since they need an initialized
/// client.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config().secure_cookies);

    routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::catalog::Catalog;
    use crate::config::StorefrontConfig;
    use crate::storage::MemoryStorage;

    fn test_app() -> Router {
        let state = AppState::with_catalog(
            StorefrontConfig::default(),
            Arc::new(MemoryStorage::new()),
            Catalog::seeded(),
        );
        app(state)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = test_app()
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_cart_view() {
        let response = test_app()
            .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));

        let view: cart::CartView = serde_json::from_value(json_body(response).await).unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.item_count, 0);
        assert!(!view.shopper.is_empty());
        assert!(!view.degraded);
    }

    #[tokio::test]
    async fn test_malformed_cart_body_is_json_bad_request() {
        let response = test_app()
            .oneshot(
                Request::post("/api/cart/items")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"product_id":"1","quantity":"two"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_favorite_unknown_product_is_not_found() {
        let response = test_app()
            .oneshot(
                Request::put("/api/favorites/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
