//! Session-related types.
//!
//! The server-side session holds identities only; the shopper's cart and
//! favorites live in storage slots named after the shopper id.

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the signed-in [`AdminUser`](crate::admin::AdminUser).
    pub const ADMIN_USER: &str = "admin_user";

    /// Key for the shopper id that scopes the cart and favorites slots.
    pub const SHOPPER_ID: &str = "shopper_id";
}
