//! Admin route handlers.
//!
//! Login stores the [`AdminUser`] in the session; every other admin route
//! requires it through [`RequireAdmin`]. Catalog edits are saved to the
//! catalog slot as they happen.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mavi_core::{Product, ProductDraft, ProductId, ProductPatch};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::admin::{AdminUser, DashboardStats};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::{RequireAdmin, clear_admin_user, set_admin_user};
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    AppJson(form): AppJson<LoginForm>,
) -> Result<Json<AdminUser>> {
    let Some(admin) = state.config().admin.verify(&form.username, &form.password) else {
        tracing::warn!("Admin login failed");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    // Prevent session fixation
    session.cycle_id().await?;
    set_admin_user(&session, &admin).await?;
    tracing::info!("Admin logged in");
    Ok(Json(admin))
}

#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_admin_user(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(RequireAdmin(admin): RequireAdmin) -> Json<AdminUser> {
    Json(admin)
}

pub async fn dashboard(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<DashboardStats> {
    Json(DashboardStats::of(&*state.catalog().await))
}

#[instrument(skip(state, admin, draft), fields(admin = %admin.username))]
pub async fn create_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(draft): AppJson<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.edit_catalog(|catalog| catalog.add(draft)).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, admin, patch), fields(admin = %admin.username, product_id = %id))]
pub async fn update_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    AppJson(patch): AppJson<ProductPatch>,
) -> Result<Json<Product>> {
    let product = state
        .edit_catalog(|catalog| catalog.update(&id, patch))
        .await?;
    Ok(Json(product))
}

#[instrument(skip(state, admin), fields(admin = %admin.username, product_id = %id))]
pub async fn delete_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state.edit_catalog(|catalog| catalog.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
