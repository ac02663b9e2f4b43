//! Integration tests for the Mavi Gadget storefront.
//!
//! Requests are driven through the full router in-process with
//! `tower::ServiceExt::oneshot`, so no server or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mavi-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart API, totals, shipping threshold and sessions
//! - `storefront_admin` - Admin session and catalog editing
//! - `storefront_catalog` - Listing, search and favorites
//! - `cart_persistence` - Write-through to disk and rehydration

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use mavi_core::{Product, ProductDraft, ProductId};
use mavi_storefront::catalog::Catalog;
use mavi_storefront::config::StorefrontConfig;
use mavi_storefront::routes;
use mavi_storefront::state::{AppState, SharedStorage};
use mavi_storefront::storage::MemoryStorage;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

/// A storefront app wired to test storage.
///
/// [`get`](Self::get), [`post`](Self::post), [`patch`](Self::patch) and
/// [`delete`](Self::delete) behave like one browser: they send the session
/// cookie from the last response that set one. [`send`](Self::send) leaves
/// that cookie alone.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    jar: Mutex<Option<String>>,
}

/// A response with its body decoded.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// JSON body, a JSON string for plain-text bodies, or `Null` when empty.
    pub body: Value,
    /// `name=value` of the session cookie, if one was set.
    pub cookie: Option<String>,
}

impl TestApp {
    /// App with the seeded catalog and in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_memory(Arc::new(MemoryStorage::new()), Catalog::seeded())
    }

    /// App with the given in-memory storage and catalog.
    #[must_use]
    pub fn with_memory(storage: Arc<MemoryStorage>, catalog: Catalog) -> Self {
        Self::with_storage(storage, catalog)
    }

    /// App with any storage backend and catalog, using default configuration.
    #[must_use]
    pub fn with_storage(storage: SharedStorage, catalog: Catalog) -> Self {
        Self::from_state(AppState::with_catalog(
            StorefrontConfig::default(),
            storage,
            catalog,
        ))
    }

    /// App that loads its catalog from `storage`, as the server does on start.
    pub async fn open(storage: SharedStorage) -> Self {
        Self::from_state(AppState::with_storage(StorefrontConfig::default(), storage).await)
    }

    fn from_state(state: AppState) -> Self {
        let router = routes::app(state.clone());
        Self {
            router,
            state,
            jar: Mutex::new(None),
        }
    }

    /// The session cookie the browser-like helpers currently send.
    ///
    /// # Panics
    ///
    /// Panics if the cookie jar lock is poisoned.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn session_cookie(&self) -> Option<String> {
        self.jar.lock().expect("cookie jar").clone()
    }

    #[allow(clippy::expect_used)]
    async fn browse(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let cookie = self.session_cookie();
        let resp = self.send(method, path, body, cookie.as_deref()).await;
        if let Some(cookie) = &resp.cookie {
            *self.jar.lock().expect("cookie jar") = Some(cookie.clone());
        }
        resp
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails, which is a
    /// test failure.
    #[allow(clippy::missing_panics_doc, clippy::expect_used)]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.dispatch(request).await
    }

    /// POST a raw body with the given content type, as the current browser.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    #[allow(clippy::expect_used)]
    pub async fn post_raw(&self, path: &str, content_type: &str, body: &str) -> TestResponse {
        let mut builder = Request::post(path).header(header::CONTENT_TYPE, content_type);
        if let Some(cookie) = self.session_cookie() {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(Body::from(body.to_owned()))
            .expect("request");
        self.dispatch(request).await
    }

    #[allow(clippy::expect_used)]
    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            body,
            cookie,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.browse(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.browse(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str) -> TestResponse {
        self.browse(Method::PUT, path, None).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.browse(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.browse(Method::DELETE, path, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A valid in-stock product priced at `cents`.
///
/// # Panics
///
/// Panics if `id` is blank or `cents` is not positive.
#[must_use]
#[allow(clippy::expect_used)]
pub fn product(id: &str, cents: i64) -> Product {
    ProductDraft {
        name: format!("Test Product {id}"),
        price: Decimal::new(cents, 2),
        images: vec![format!("/static/products/{id}.jpeg")],
        category: "daily-discovery".to_string(),
        ..ProductDraft::default()
    }
    .validate(ProductId::parse(id).expect("id"))
    .expect("valid product")
}

/// A catalog holding exactly `products` and the seeded categories.
#[must_use]
pub fn catalog_of(products: Vec<Product>) -> Catalog {
    Catalog::new(products, mavi_storefront::catalog::seed::categories())
}

/// Parse a decimal string field from a JSON body.
///
/// # Panics
///
/// Panics if the value is not a decimal string.
#[must_use]
#[allow(clippy::expect_used)]
pub fn dec(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal string")
        .parse()
        .expect("decimal")
}
