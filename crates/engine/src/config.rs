//! Server configuration from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `SERVER_HOST` | `0.0.0.0` |
//! | `SERVER_PORT` (or `PORT`) | `8080` |
//! | `INITIAL_TIME_MS` | `300000` |
//! | `CLOCK_TICK_MS` | `100` |

use std::net::SocketAddr;
use std::time::Duration;

use gambit_domain::{TimeControl, DEFAULT_INITIAL_TIME_MS};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CLOCK_TICK_MS: u64 = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("Invalid bind address {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub initial_time_ms: u64,
    pub clock_tick_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            initial_time_ms: DEFAULT_INITIAL_TIME_MS,
            clock_tick_ms: DEFAULT_CLOCK_TICK_MS,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("SERVER_HOST").unwrap_or(defaults.host);
        let port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(value) => parse_number::<u16>("SERVER_PORT", value)?,
            None => defaults.port,
        };
        let initial_time_ms = match lookup("INITIAL_TIME_MS") {
            Some(value) => parse_positive("INITIAL_TIME_MS", value)?,
            None => defaults.initial_time_ms,
        };
        let clock_tick_ms = match lookup("CLOCK_TICK_MS") {
            Some(value) => parse_positive("CLOCK_TICK_MS", value)?,
            None => defaults.clock_tick_ms,
        };

        Ok(Self {
            host,
            port,
            initial_time_ms,
            clock_tick_ms,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    pub fn time_control(&self) -> Result<TimeControl, ConfigError> {
        TimeControl::symmetric(self.initial_time_ms)
            .map_err(|_| ConfigError::Zero("INITIAL_TIME_MS"))
    }

    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        match self.clock_tick_ms {
            0 => Err(ConfigError::Zero("CLOCK_TICK_MS")),
            ms => Ok(Duration::from_millis(ms)),
        }
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}

fn parse_positive(name: &'static str, value: String) -> Result<u64, ConfigError> {
    match parse_number::<u64>(name, value)? {
        0 => Err(ConfigError::Zero(name)),
        n => Ok(n),
    }
}
