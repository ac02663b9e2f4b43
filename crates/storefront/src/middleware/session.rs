//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. A session carries the
//! shopper id that keys the cart and favorites slots, plus the admin login.
//! Losing sessions on restart starts a fresh shopper; the old slots stay on
//! disk.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mavi_session";

/// Session expiry time in seconds (1 day).
pub const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with an in-memory store.
///
/// `secure` marks the cookie HTTPS-only; leave it off for plain-HTTP local
/// development.
#[must_use]
pub fn create_session_layer(secure: bool) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
