use std::env;
use std::fmt;

use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_PAGE_LIMIT: i64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub default_page_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::Missing(name))?;
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
            Ok(value)
        };

        Ok(Self {
            jwt_secret: required("JWT_SECRET")?,
            database_url: required("DATABASE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            default_page_limit: parse_or(&lookup, "DEFAULT_PAGE_LIMIT", DEFAULT_PAGE_LIMIT)?,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    /// Config for tests and local tooling that never touches a database.
    pub fn for_secret(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            database_url: String::new(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("database_url", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("default_page_limit", &self.default_page_limit)
            .finish()
    }
}
