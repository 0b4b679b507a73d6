//! Database and pool settings loaded from the environment
//!
//! A single `DATABASE_URL` wins over the component variables
//! (`DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`).

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;

/// Connections kept open while idle.
const DEFAULT_POOL_MIN: u32 = 5;
/// Hard ceiling on concurrent checkouts.
const DEFAULT_POOL_MAX: u32 = 20;
const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 2_000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: set {var}")]
    Missing { var: &'static str },

    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid database url: {0}")]
    Url(#[source] sqlx::Error),
}

/// Where to find PostgreSQL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl DatabaseConfig {
    /// Read from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match non_empty(lookup("DB_PORT")) {
            Some(raw) => Some(raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "DB_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            url: non_empty(lookup("DATABASE_URL")),
            host: non_empty(lookup("DB_HOST")),
            port,
            user: non_empty(lookup("DB_USER")),
            password: non_empty(lookup("DB_PASSWORD")),
            name: non_empty(lookup("DB_NAME")),
        })
    }

    /// Override the connection string (e.g. from a CLI flag).
    pub fn with_url(mut self, url: Option<String>) -> Self {
        if url.is_some() {
            self.url = url;
        }
        self
    }

    /// Build sqlx connect options.
    ///
    /// # Errors
    ///
    /// Fails when neither `DATABASE_URL` nor `DB_NAME` is set, or the URL
    /// does not parse.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(ConfigError::Url);
        }

        let name = self
            .name
            .as_deref()
            .ok_or(ConfigError::Missing { var: "DATABASE_URL or DB_NAME" })?;

        let mut options = PgConnectOptions::new()
            .host(self.host.as_deref().unwrap_or(DEFAULT_DB_HOST))
            .port(self.port.unwrap_or(DEFAULT_DB_PORT))
            .database(name);

        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }

        Ok(options)
    }
}

/// Pool sizing and checkout behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub min_connections: u32,
    pub max_connections: u32,
    /// How long a request waits for a free connection before it is
    /// answered with 503.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_connections: DEFAULT_POOL_MIN,
            max_connections: DEFAULT_POOL_MAX,
            acquire_timeout: Duration::from_millis(DEFAULT_ACQUIRE_TIMEOUT_MS),
        }
    }
}

impl PoolSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let min_connections =
            parse_var(&lookup, "CHRONOSCULPT_POOL_MIN")?.unwrap_or(defaults.min_connections);
        let max_connections =
            parse_var(&lookup, "CHRONOSCULPT_POOL_MAX")?.unwrap_or(defaults.max_connections);
        let acquire_timeout = parse_var::<u64, _>(&lookup, "CHRONOSCULPT_ACQUIRE_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.acquire_timeout);

        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "CHRONOSCULPT_POOL_MAX",
                value: max_connections.to_string(),
                reason: "pool needs at least one connection".to_owned(),
            });
        }
        if min_connections > max_connections {
            return Err(ConfigError::Invalid {
                var: "CHRONOSCULPT_POOL_MIN",
                value: min_connections.to_string(),
                reason: format!("exceeds pool maximum of {}", max_connections),
            });
        }

        Ok(Self {
            min_connections,
            max_connections,
            acquire_timeout,
        })
    }
}

/// Minutes past UTC midnight at which a tracking day begins.
pub fn day_start_offset_from_env() -> Result<i64, ConfigError> {
    day_start_offset_from_lookup(|key| std::env::var(key).ok())
}

pub fn day_start_offset_from_lookup<F>(lookup: F) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = "CHRONOSCULPT_DAY_START_OFFSET_MINUTES";
    let minutes: i64 = parse_var(&lookup, var)?.unwrap_or(0);
    if !(-1439..=1439).contains(&minutes) {
        return Err(ConfigError::Invalid {
            var,
            value: minutes.to_string(),
            reason: "must be within one day (-1439..=1439)".to_owned(),
        });
    }
    Ok(minutes)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup(var)) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| ConfigError::Invalid {
            var,
            value: raw,
            reason: e.to_string(),
        }),
        None => Ok(None),
    }
}
