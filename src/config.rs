use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::leaderboard::{DEFAULT_LIMIT, MAX_LIMIT};

const DATABASE_URL: &str = "DATABASE_URL";
const STORE_TIMEOUT_MS: &str = "STORE_TIMEOUT_MS";
const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
const LEADERBOARD_DEFAULT_LIMIT: &str = "LEADERBOARD_DEFAULT_LIMIT";

const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const SUPPORTED_SCHEMES: [&str; 3] = ["postgres://", "postgresql://", "sqlite:"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub store_timeout: Duration,
    pub max_connections: u32,
    pub default_limit: usize,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL).ok_or(ConfigError::Missing(DATABASE_URL))?;
        if !SUPPORTED_SCHEMES
            .iter()
            .any(|scheme| database_url.starts_with(scheme))
        {
            return Err(ConfigError::Invalid {
                key: DATABASE_URL,
                value: database_url,
                reason: "expected a postgres:// or sqlite: url",
            });
        }

        let timeout_ms = parse_positive(&lookup, STORE_TIMEOUT_MS, DEFAULT_STORE_TIMEOUT_MS)?;
        let max_connections =
            parse_positive(&lookup, DATABASE_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS)?;
        let default_limit = parse_positive(&lookup, LEADERBOARD_DEFAULT_LIMIT, DEFAULT_LIMIT)?;
        if default_limit > MAX_LIMIT {
            return Err(ConfigError::Invalid {
                key: LEADERBOARD_DEFAULT_LIMIT,
                value: default_limit.to_string(),
                reason: "exceeds the maximum leaderboard limit",
            });
        }

        Ok(Self {
            database_url,
            store_timeout: Duration::from_millis(timeout_ms),
            max_connections,
            default_limit,
        })
    }
}

fn parse_positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let value = match lookup(key) {
        None => return Ok(default),
        Some(value) => value,
    };
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        Ok(_) => Err(ConfigError::Invalid {
            key,
            value,
            reason: "must be greater than zero",
        }),
        Err(_) => Err(ConfigError::Invalid {
            key,
            value,
            reason: "not a number",
        }),
    }
}
