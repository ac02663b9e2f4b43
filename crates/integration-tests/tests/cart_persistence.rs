//! Write-through persistence to disk and rehydration on restart.
//!
//! Sessions live in memory, so a restarted server hands every client a new
//! shopper. The old shopper's cart stays in its slot and is checked here by
//! opening that slot directly, the way the CLI's `--shopper` does.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::StatusCode;
use mavi_integration_tests::{TestApp, catalog_of, dec, product};
use mavi_storefront::cart::{CartSnapshot, DEFAULT_CART_SLOT, PersistentCart, ShippingPolicy};
use mavi_storefront::storage::{FileStorage, scoped_slot};
use rust_decimal::Decimal;
use serde_json::json;

fn file_app(dir: &std::path::Path) -> TestApp {
    TestApp::with_storage(
        Arc::new(FileStorage::new(dir)),
        catalog_of(vec![product("a", 2000), product("b", 1500)]),
    )
}

async fn stored_cart(dir: &std::path::Path, shopper: &str) -> PersistentCart<FileStorage> {
    PersistentCart::open(
        FileStorage::new(dir),
        scoped_slot(DEFAULT_CART_SLOT, shopper),
        ShippingPolicy::default(),
    )
    .await
}

fn shopper_of(body: &serde_json::Value) -> String {
    body["shopper"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let shopper = {
        let app = file_app(dir.path());
        app.post("/api/cart/items", json!({"product_id": "a", "quantity": 2}))
            .await;
        app.post("/api/cart/items", json!({"product_id": "b"})).await;
        let resp = app.patch("/api/cart/items/b", json!({"quantity": 3})).await;
        shopper_of(&resp.body)
    };

    let cart = stored_cart(dir.path(), &shopper).await;
    assert_eq!(cart.item_count(), 5);
    assert_eq!(cart.ledger().totals().subtotal, Decimal::from(85));
    assert_eq!(cart.ledger().totals().shipping, Decimal::ZERO);

    // A restarted server starts a fresh session with an empty cart.
    let app = file_app(dir.path());
    let resp = app.get("/api/cart").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["item_count"], 0);
    assert_ne!(shopper_of(&resp.body), shopper);
}

#[tokio::test]
async fn test_same_session_rehydrates_after_eviction() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(dir.path());
    let resp = app
        .post("/api/cart/items", json!({"product_id": "a", "quantity": 4}))
        .await;
    let shopper = shopper_of(&resp.body);

    // A second server over the same directory sees the same slot.
    let other = file_app(dir.path());
    let handle = other.state.shopper(&shopper).await;
    let guard = handle.lock().await;
    assert_eq!(guard.cart.item_count(), 4);
    assert_eq!(guard.cart.ledger().totals().subtotal, Decimal::from(80));
}

#[tokio::test]
async fn test_snapshot_on_disk_matches_cart() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(dir.path());
    let resp = app.post("/api/cart/items", json!({"product_id": "a"})).await;
    let slot = scoped_slot(DEFAULT_CART_SLOT, &shopper_of(&resp.body));

    let raw = std::fs::read_to_string(dir.path().join(format!("{slot}.json"))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], 0);
    assert_eq!(value["state"]["items"][0]["id"], "a");
    assert_eq!(value["state"]["items"][0]["quantity"], 1);
    assert_eq!(value["state"]["total"], "29.99");

    let snapshot = CartSnapshot::from_json(&raw).unwrap();
    assert_eq!(snapshot.state.items.len(), 1);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| !name.to_string_lossy().ends_with(".json"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[tokio::test]
async fn test_clear_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let shopper = {
        let app = file_app(dir.path());
        app.post("/api/cart/items", json!({"product_id": "a"})).await;
        let resp = app.delete("/api/cart").await;
        assert_eq!(dec(&resp.body["totals"]["total"]), Decimal::ZERO);
        shopper_of(&resp.body)
    };

    let cart = stored_cart(dir.path(), &shopper).await;
    assert!(cart.ledger().is_empty());
    assert_eq!(cart.ledger().totals().total, Decimal::ZERO);
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(dir.path());
    let shopper = shopper_of(&app.get("/api/cart").await.body);
    let slot = scoped_slot(DEFAULT_CART_SLOT, &shopper);
    std::fs::write(
        dir.path().join(format!("{slot}.json")),
        "{\"state\": [truncated",
    )
    .unwrap();

    let handle = file_app(dir.path()).state.shopper(&shopper).await;
    let mut guard = handle.lock().await;
    assert_eq!(guard.cart.item_count(), 0);
    assert!(!guard.cart.is_degraded());

    // The next mutation overwrites the bad snapshot.
    guard.cart.add_item(&product("b", 1500), 1).await.unwrap();
    drop(guard);
    assert_eq!(stored_cart(dir.path(), &shopper).await.item_count(), 1);
}
