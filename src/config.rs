use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Pagination defaults for `GET /api/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Extra attempts for idempotent reads that hit a transient error.
    pub read_retries: u32,
    pub retry_backoff_ms: u64,
}

impl DatabaseConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub listing: ListingConfig,
    pub metrics_prefix: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")?,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            read_retries: env_or("DB_READ_RETRIES", 3),
            retry_backoff_ms: env_or("DB_RETRY_BACKOFF_MS", 50),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "userboard".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "userboard-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
        };
        let listing = ListingConfig {
            default_page_size: env_or("USERS_DEFAULT_PAGE_SIZE", 10).max(1),
            max_page_size: env_or("USERS_MAX_PAGE_SIZE", 100).max(1),
        };
        let metrics_prefix =
            std::env::var("METRICS_PREFIX").unwrap_or_else(|_| "userboard".into());
        Ok(Self {
            database,
            jwt,
            listing,
            metrics_prefix,
        })
    }
}
