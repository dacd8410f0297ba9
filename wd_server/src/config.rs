//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration.

use std::net::SocketAddr;
use std::time::Duration;
use word_duel::{GameRules, RoomConfig};

/// Complete server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address.
    pub bind: SocketAddr,
    /// Configuration applied to every room.
    pub room: RoomConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));

        let rules = GameRules {
            pressure_limit: parse_env_or("PRESSURE_LIMIT", 10),
            hand_size: parse_env_or("HAND_SIZE", 3),
            initial_pressure: parse_env_or("INITIAL_PRESSURE", 1),
            option_count: parse_env_or("OPTION_COUNT", 4),
        };

        let room = RoomConfig {
            rules,
            idle_timeout: Duration::from_secs(parse_env_or("ROOM_IDLE_TIMEOUT_SECS", 600)),
            finished_linger: Duration::from_secs(parse_env_or("ROOM_FINISHED_LINGER_SECS", 30)),
        };

        let config = ServerConfig { bind, room };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.room.validate().map_err(|reason| ConfigError::Invalid {
            var: "room configuration".to_string(),
            reason,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse an environment variable with a default fallback.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
