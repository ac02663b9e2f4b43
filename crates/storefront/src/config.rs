//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `MAVI_HOST` - Bind address (default: 127.0.0.1)
//! - `MAVI_PORT` - Listen port (default: 3000)
//! - `MAVI_DATA_DIR` - Directory holding the slot files (default: ./data)
//! - `MAVI_CART_SLOT` - Base slot name for shopper carts (default: mavigadget-cart)
//! - `MAVI_CATALOG_SLOT` - Slot holding admin catalog edits (default: mavigadget-products)
//! - `MAVI_FAVORITES_SLOT` - Base slot name for shopper favorites (default: mavigadget-user)
//! - `MAVI_FREE_SHIPPING_THRESHOLD` - Subtotal that must be exceeded for free shipping (default: 50.00)
//! - `MAVI_FLAT_SHIPPING_FEE` - Shipping fee below the threshold (default: 9.99)
//! - `MAVI_ADMIN_USERNAME` - Admin login name (default: admin)
//! - `MAVI_ADMIN_PASSWORD` - Admin password (default: the demo password)
//! - `MAVI_ADMIN_EMAIL` - Admin email shown after login
//! - `MAVI_SECURE_COOKIES` - Mark the session cookie HTTPS-only (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use mavi_core::MAX_PRICE;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::admin::{
    AdminCredentials, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
};
use crate::cart::{DEFAULT_CART_SLOT, ShippingPolicy};
use crate::catalog::DEFAULT_CATALOG_SLOT;
use crate::favorites::DEFAULT_FAVORITES_SLOT;
use crate::storage::validate_slot;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory for file-backed slot storage
    pub data_dir: PathBuf,
    /// Base slot name for cart snapshots; each shopper gets `<slot>-<id>`
    pub cart_slot: String,
    /// Slot holding the edited product list
    pub catalog_slot: String,
    /// Base slot name for favorites lists
    pub favorites_slot: String,
    /// Shipping rule applied to cart totals
    pub shipping: ShippingPolicy,
    /// Demo admin account
    pub admin: AdminCredentials,
    /// Whether the session cookie requires HTTPS
    pub secure_cookies: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("cart_slot", &self.cart_slot)
            .field("catalog_slot", &self.catalog_slot)
            .field("favorites_slot", &self.favorites_slot)
            .field("shipping", &self.shipping)
            .field("admin_username", &self.admin.username)
            .field("admin_password", &"[REDACTED]")
            .field("secure_cookies", &self.secure_cookies)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            data_dir: PathBuf::from("./data"),
            cart_slot: DEFAULT_CART_SLOT.to_string(),
            catalog_slot: DEFAULT_CATALOG_SLOT.to_string(),
            favorites_slot: DEFAULT_FAVORITES_SLOT.to_string(),
            shipping: ShippingPolicy::default(),
            admin: AdminCredentials::default(),
            secure_cookies: false,
            sentry_dsn: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("MAVI_HOST", "127.0.0.1")?;
        let port = env.parse_or("MAVI_PORT", "3000")?;
        let data_dir = PathBuf::from(env.get_or("MAVI_DATA_DIR", "./data"));
        let cart_slot = env.slot_or("MAVI_CART_SLOT", DEFAULT_CART_SLOT)?;
        let catalog_slot = env.slot_or("MAVI_CATALOG_SLOT", DEFAULT_CATALOG_SLOT)?;
        let favorites_slot = env.slot_or("MAVI_FAVORITES_SLOT", DEFAULT_FAVORITES_SLOT)?;

        let defaults = ShippingPolicy::default();
        let shipping = ShippingPolicy {
            free_shipping_threshold: env.parse_money(
                "MAVI_FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold,
            )?,
            flat_fee: env.parse_money("MAVI_FLAT_SHIPPING_FEE", defaults.flat_fee)?,
        };

        let admin = AdminCredentials {
            username: env.get_or("MAVI_ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
            password: SecretString::from(env.get_or("MAVI_ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD)),
            email: env.get_or("MAVI_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
        };
        if admin.username.trim().is_empty() {
            return Err(invalid("MAVI_ADMIN_USERNAME", "must not be blank"));
        }
        if admin.password.expose_secret().is_empty() {
            return Err(invalid("MAVI_ADMIN_PASSWORD", "must not be empty"));
        }

        let secure_cookies = env.parse_or("MAVI_SECURE_COOKIES", "false")?;
        let sentry_dsn = env.get("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty());

        Ok(Self {
            host,
            port,
            data_dir,
            cart_slot,
            catalog_slot,
            favorites_slot,
            shipping,
            admin,
            secure_cookies,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable (or its default) with `FromStr`.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(key, e))
    }

    /// Get a storage slot name. Slot names become file names.
    fn slot_or(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        let slot = self.get_or(key, default);
        validate_slot(&slot).map_err(|_| invalid(key, "use only letters, digits, '-' and '_'"))?;
        Ok(slot)
    }

    /// Parse a decimal amount between zero and the maximum product price.
    fn parse_money(&self, key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };
        let amount = raw.trim().parse::<Decimal>().map_err(|e| invalid(key, e))?;
        if amount.is_sign_negative() {
            return Err(invalid(key, "must not be negative"));
        }
        if amount > MAX_PRICE {
            return Err(invalid(key, format!("must not exceed {MAX_PRICE}")));
        }
        Ok(amount)
    }
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.cart_slot, "mavigadget-cart");
        assert_eq!(config.catalog_slot, "mavigadget-products");
        assert_eq!(config.favorites_slot, "mavigadget-user");
        assert_eq!(config.shipping, ShippingPolicy::default());
        assert_eq!(config.admin.username, "admin");
        assert!(!config.secure_cookies);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MAVI_HOST", "0.0.0.0"),
            ("MAVI_PORT", "8080"),
            ("MAVI_DATA_DIR", "/var/lib/mavi"),
            ("MAVI_CART_SLOT", "test_cart"),
            ("MAVI_CATALOG_SLOT", "test_products"),
            ("MAVI_FREE_SHIPPING_THRESHOLD", "75"),
            ("MAVI_FLAT_SHIPPING_FEE", "4.50"),
            ("MAVI_ADMIN_USERNAME", "root"),
            ("MAVI_SECURE_COOKIES", "true"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/mavi"));
        assert_eq!(config.cart_slot, "test_cart");
        assert_eq!(config.catalog_slot, "test_products");
        assert_eq!(config.shipping.free_shipping_threshold, Decimal::from(75));
        assert_eq!(config.shipping.flat_fee, Decimal::new(450, 2));
        assert!(config.admin.verify("root", "mavigadget2025").is_some());
        assert!(config.secure_cookies);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("MAVI_HOST", "not-an-ip"),
            ("MAVI_PORT", "70000"),
            ("MAVI_CART_SLOT", "../cart"),
            ("MAVI_FAVORITES_SLOT", "user favorites"),
            ("MAVI_FREE_SHIPPING_THRESHOLD", "99999999999"),
            ("MAVI_FREE_SHIPPING_THRESHOLD", "fifty"),
            ("MAVI_FLAT_SHIPPING_FEE", "-1"),
            ("MAVI_ADMIN_PASSWORD", ""),
            ("MAVI_SECURE_COOKIES", "maybe"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            let ConfigError::InvalidEnvVar(name, _) = err;
            assert_eq!(name, key);
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[
            ("MAVI_ADMIN_PASSWORD", "hunter2-super-secret"),
            ("SENTRY_DSN", "https://secretkey@sentry.example/1"),
        ])
        .unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("hunter2-super-secret"));
        assert!(!debug.contains("secretkey"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("admin"));
    }
}
