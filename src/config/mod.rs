//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Ticks per second for every room
    pub tick_rate: u32,
    /// Board edge length in cells
    pub grid_size: i32,
    /// Length of generated room codes
    pub room_code_length: usize,
    /// Max keydown messages per second per connection
    pub input_rate_limit: u32,

    /// Allowed client origins for CORS, comma-separated or `*`
    pub client_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PORT wins over SERVER_ADDR for hosted deployments
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            tick_rate: parse_in_range(&lookup, "TICK_RATE", 10, 1..=120)?,
            grid_size: parse_in_range(&lookup, "GRID_SIZE", 20, 8..=200)?,
            room_code_length: parse_in_range(&lookup, "ROOM_CODE_LENGTH", 5, 4..=12)?,
            input_rate_limit: parse_in_range(&lookup, "INPUT_RATE_LIMIT", 30, 1..=1000)?,

            client_origin: lookup("CLIENT_ORIGIN").unwrap_or_else(|| "*".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: "info".to_string(),
            tick_rate: 10,
            grid_size: 20,
            room_code_length: 5,
            input_rate_limit: 30,
            client_origin: "*".to_string(),
        }
    }
}

fn parse_in_range<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    let value: T = raw.trim().parse().map_err(|_| ConfigError::Invalid(key))?;
    if !range.contains(&value) {
        return Err(ConfigError::OutOfRange(key));
    }
    Ok(value)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Environment variable out of range: {0}")]
    OutOfRange(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
