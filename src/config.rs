//! Runtime configuration read from the environment (and `.env` via dotenvy).

use chrono::Duration;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use crate::domain::aggregates::checkout::DEFAULT_SHIPPING_COST;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub name: String,
    /// Hex SHA-256 of the admin password. Login is disabled when unset.
    pub password_sha256: Option<String>,
    pub token_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub nats_url: Option<String>,
    pub frontend_url: String,
    pub currency: String,
    pub shipping_cost: u64,
    pub max_body_bytes: usize,
    /// A cart untouched for this long is discarded.
    pub cart_idle_ttl: Duration,
    pub admin: AdminConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: None,
            nats_url: None,
            frontend_url: "http://localhost:5174".to_string(),
            currency: "XOF".to_string(),
            shipping_cost: DEFAULT_SHIPPING_COST,
            max_body_bytes: 10 * 1024 * 1024,
            cart_idle_ttl: Duration::hours(72),
            admin: AdminConfig {
                email: "admin@luxewig.com".to_string(),
                name: "LuxeWig Admin".to_string(),
                password_sha256: None,
                token_ttl: Duration::hours(168),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Builds the config from an explicit variable map. Empty values count as unset.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        let admin = AdminConfig {
            email: get("ADMIN_EMAIL").unwrap_or(defaults.admin.email),
            name: get("ADMIN_NAME").unwrap_or(defaults.admin.name),
            password_sha256: get("ADMIN_PASSWORD_SHA256").map(|h| h.to_ascii_lowercase()),
            token_ttl: parse(&get, "ADMIN_TOKEN_TTL_HOURS")?.map(|h: u32| Duration::hours(i64::from(h))).unwrap_or(defaults.admin.token_ttl),
        };
        if let Some(hash) = &admin.password_sha256 {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::Invalid { key: "ADMIN_PASSWORD_SHA256", value: hash.clone() });
            }
        }
        Ok(Self {
            port: parse(&get, "PORT")?.unwrap_or(defaults.port),
            database_url: get("DATABASE_URL"),
            nats_url: get("NATS_URL"),
            frontend_url: get("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            currency: get("CURRENCY").map(|c| c.to_ascii_uppercase()).unwrap_or(defaults.currency),
            shipping_cost: parse(&get, "SHIPPING_COST")?.unwrap_or(defaults.shipping_cost),
            max_body_bytes: parse(&get, "MAX_BODY_BYTES")?.unwrap_or(defaults.max_body_bytes),
            cart_idle_ttl: parse(&get, "CART_IDLE_TTL_HOURS")?.map(|h: u32| Duration::hours(i64::from(h))).unwrap_or(defaults.cart_idle_ttl),
            admin,
        })
    }
}

fn parse<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError> {
    match get(key) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| ConfigError::Invalid { key, value }),
    }
}
