//! Application configuration loaded from environment variables.

use checkout::StockPolicy;

/// Signing secret used when `JWT_SECRET` is not set. Fine for local runs only.
pub const DEV_JWT_SECRET: &str = "caffeine-corner-dev-secret";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` (default `0.0.0.0`) and `PORT` (default `3000`)
/// - `RUST_LOG` tracing filter directive (default `info`)
/// - `DATABASE_URL`; when unset the server runs on the in-memory store
/// - `DATABASE_MAX_CONNECTIONS` (default `10`)
/// - `JWT_SECRET`
/// - `STOCK_POLICY`, `strict` or `best-effort` (default `strict`)
/// - `SEED_CATALOG`, seed demo data into PostgreSQL (default `false`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub stock_policy: StockPolicy,
    pub seed_catalog: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from any key lookup. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: non_empty("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: non_empty("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.database_max_connections),
            jwt_secret: non_empty("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            stock_policy: non_empty("STOCK_POLICY")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.stock_policy),
            seed_catalog: non_empty("SEED_CATALOG")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.seed_catalog),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 10,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            stock_policy: StockPolicy::Strict,
            seed_catalog: false,
        }
    }
}
