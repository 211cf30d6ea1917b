//! Client configuration.

use std::path::PathBuf;

/// Where the client talks to and where it keeps the cart.
///
/// Reads `STOREFRONT_API_URL` (default `http://localhost:3000`),
/// `STOREFRONT_CART_PATH` (default `cart.json`) and
/// `STOREFRONT_TIMEOUT_SECS` (default `30`).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub cart_path: PathBuf,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            base_url: var("STOREFRONT_API_URL").unwrap_or(defaults.base_url),
            cart_path: var("STOREFRONT_CART_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cart_path),
            timeout_secs: var("STOREFRONT_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn with_cart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cart_path = path.into();
        self
    }

    /// Full URL of an API path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            cart_path: PathBuf::from("cart.json"),
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_cleanly() {
        let config = ClientConfig::new("http://shop.local/");
        assert_eq!(config.url("/api/checkout"), "http://shop.local/api/checkout");
        assert_eq!(config.url("api/orders"), "http://shop.local/api/orders");
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.cart_path, PathBuf::from("cart.json"));
        assert_eq!(config.timeout_secs, 30);
    }
}
