//! Per-session shopper extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::session_keys;
use crate::state::{AppState, ShopperHandle};

/// The shopper behind the current session.
///
/// The first request of a session gets a fresh random shopper id, stored in
/// the session; the cart and favorites are opened from slots scoped to it.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(shopper: CurrentShopper) -> String {
///     shopper.handle.lock().await.cart.item_count().to_string()
/// }
/// ```
pub struct CurrentShopper {
    pub id: String,
    pub handle: ShopperHandle,
}

impl FromRequestParts<AppState> for CurrentShopper {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let id = match session.get::<String>(session_keys::SHOPPER_ID).await? {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().simple().to_string();
                session.insert(session_keys::SHOPPER_ID, &id).await?;
                tracing::debug!(shopper = %id, "New shopper session");
                id
            }
        };

        let handle = state.shopper(&id).await;
        Ok(Self { id, handle })
    }
}
