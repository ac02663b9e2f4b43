//! Admin authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::admin::AdminUser;
use crate::models::session_keys;

/// Extractor that requires a signed-in admin.
///
/// Rejects with `401 Unauthorized` when the session has no admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdmin(pub AdminUser);

/// Rejection for [`RequireAdmin`].
#[derive(Debug)]
pub struct AdminRejection;

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, "Admin login required").into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminRejection)?;

        let admin: AdminUser = session
            .get(session_keys::ADMIN_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AdminRejection)?;

        Ok(Self(admin))
    }
}

/// Store the signed-in admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_admin_user(
    session: &Session,
    admin: &AdminUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::ADMIN_USER, admin).await
}

/// Remove the admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_admin_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<AdminUser>(session_keys::ADMIN_USER)
        .await?;
    Ok(())
}
