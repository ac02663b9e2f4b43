//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, error capture)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)

pub mod auth;
pub mod session;
pub mod shopper;

pub use auth::{RequireAdmin, clear_admin_user, set_admin_user};
pub use session::create_session_layer;
pub use shopper::CurrentShopper;
