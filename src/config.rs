use std::env;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "recipes.db";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub pool_size: u32,
    pub bind_address: String,
    pub port: u16,
    pub seed_demo_data: bool,
    /// Origins browsers may call the API from. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Reads settings from the process environment. Call after `dotenv`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(size) if size >= 1 => size,
                _ => return Err(invalid("DB_POOL_SIZE", value.clone(), "expected a positive integer")),
            },
            None => DEFAULT_POOL_SIZE,
        };
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| invalid("PORT", value.clone(), "expected a port number"))?,
            None => DEFAULT_PORT,
        };
        let seed_demo_data = match lookup("SEED_DEMO_DATA") {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| invalid("SEED_DEMO_DATA", value.clone(), "expected true or false"))?,
            None => false,
        };
        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(value) => parse_origins(&value)?,
            None => Vec::new(),
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            pool_size,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port,
            seed_demo_data,
            allowed_origins,
        })
    }
}

fn invalid(key: &'static str, value: String, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { key, value, reason }
}

fn parse_origins(value: &str) -> Result<Vec<String>, ConfigError> {
    if value.trim() == "*" {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin.contains("://") {
                Ok(origin.to_string())
            } else {
                Err(invalid(
                    "CORS_ALLOWED_ORIGINS",
                    origin.to_string(),
                    "expected an origin such as https://example.com",
                ))
            }
        })
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
