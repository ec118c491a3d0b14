use std::env;
use std::ops::RangeInclusive;

use crate::app::steps_config::{DEFAULT_MAX_FUTURE_SKEW_MINUTES, MAX_FUTURE_SKEW_LIMIT_MINUTES};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// How far past server receipt time a sample may end before it is skipped
    pub max_future_skew_minutes: i64,
    /// Header carrying the username verified by the upstream auth gateway
    pub auth_user_header: String,
    /// Sustained upload rate per client IP
    pub upload_rate_per_second: u64,
    /// Upload burst size per client IP
    pub upload_rate_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            port: parse_or("PORT", 8080)?,
            max_future_skew_minutes: parse_within(
                "MAX_FUTURE_SKEW_MINUTES",
                DEFAULT_MAX_FUTURE_SKEW_MINUTES,
                0..=MAX_FUTURE_SKEW_LIMIT_MINUTES,
            )?,
            auth_user_header: env::var("AUTH_USER_HEADER")
                .map(|v| v.trim().to_lowercase())
                .unwrap_or_else(|_| "x-authenticated-user".to_string()),
            upload_rate_per_second: parse_or("UPLOAD_RATE_PER_SECOND", 2)?,
            upload_rate_burst: parse_or("UPLOAD_RATE_BURST", 10)?,
        })
    }
}

/// Read an optional numeric variable, falling back to `default` when unset
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Like [`parse_or`], but the value must also fall inside `bounds`
fn parse_within<T>(
    name: &'static str,
    default: T,
    bounds: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + ToString,
{
    let value = parse_or(name, default)?;
    if bounds.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
