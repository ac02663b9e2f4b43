//! Demo admin account.
//!
//! A single configured username/password pair guards the catalog editing
//! routes. This is a demo gate, not an authentication system: the password
//! is compared as plain text and there are no roles.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "mavigadget2025";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@mavigadget.com";

/// The configured admin account.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
    pub email: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: SecretString::from(DEFAULT_ADMIN_PASSWORD),
            email: DEFAULT_ADMIN_EMAIL.to_string(),
        }
    }
}

impl AdminCredentials {
    /// Return the signed-in admin if both values match exactly.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> Option<AdminUser> {
        (username == self.username && password == self.password.expose_secret()).then(|| {
            AdminUser {
                username: self.username.clone(),
                email: self.email.clone(),
            }
        })
    }
}

/// The admin identity kept in the session after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub username: String,
    pub email: String,
}

/// Catalog figures for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    pub featured: usize,
    pub new_arrivals: usize,
    pub categories: usize,
}

impl DashboardStats {
    #[must_use]
    pub fn of(catalog: &Catalog) -> Self {
        let total_products = catalog.all().len();
        let in_stock = catalog.all().iter().filter(|p| p.in_stock).count();
        Self {
            total_products,
            in_stock,
            out_of_stock: total_products - in_stock,
            featured: catalog.featured().count(),
            new_arrivals: catalog.new_arrivals().count(),
            categories: catalog.categories().len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_exact_match() {
        let creds = AdminCredentials::default();
        let user = creds.verify("admin", "mavigadget2025").unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.email, "admin@mavigadget.com");
    }

    #[test]
    fn test_verify_rejects_mismatch() {
        let creds = AdminCredentials::default();
        assert!(creds.verify("admin", "wrong").is_none());
        assert!(creds.verify("Admin", "mavigadget2025").is_none());
        assert!(creds.verify("admin", " mavigadget2025").is_none());
        assert!(creds.verify("", "").is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", AdminCredentials::default());
        assert!(!debug.contains("mavigadget2025"));
    }

    #[test]
    fn test_dashboard_stats() {
        let stats = DashboardStats::of(&Catalog::seeded());
        assert_eq!(stats.total_products, 12);
        assert_eq!(stats.in_stock, 12);
        assert_eq!(stats.out_of_stock, 0);
        assert_eq!(stats.featured, 5);
        assert_eq!(stats.new_arrivals, 1);
        assert_eq!(stats.categories, 6);
    }
}
