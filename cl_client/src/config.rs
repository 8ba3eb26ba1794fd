//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use cee_lo::{
    entities::Usd,
    table::{DiceMode, SessionConfig},
};

/// Values given on the command line. Each one wins over its environment
/// variable.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub starting_balance: Option<Usd>,
    pub max_bet: Option<Usd>,
    pub turn_secs: Option<u64>,
    pub dice: Option<DiceMode>,
}

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Session the client hosts for its two players
    pub session: SessionConfig,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable can't be used or the resulting session
    /// configuration is invalid
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = SessionConfig::default();

        let dice = match overrides.dice {
            Some(dice) => dice,
            None => match std::env::var("CEELO_DICE") {
                Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    var: "CEELO_DICE".to_string(),
                    reason: format!("'{value}' is not one of tumble, random"),
                })?,
                Err(_) => defaults.dice,
            },
        };

        let session = SessionConfig {
            starting_balance: overrides.starting_balance.unwrap_or_else(|| {
                parse_env_or("CEELO_STARTING_BALANCE", defaults.starting_balance)
            }),
            max_bet: overrides
                .max_bet
                .unwrap_or_else(|| parse_env_or("CEELO_MAX_BET", defaults.max_bet)),
            turn_time_secs: overrides
                .turn_secs
                .unwrap_or_else(|| parse_env_or("CEELO_TURN_SECS", defaults.turn_time_secs)),
            event_log_capacity: parse_env_or("CEELO_EVENT_LOG", defaults.event_log_capacity),
            dice,
            ..defaults
        };

        session.validate()?;
        Ok(Self { session })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Invalid session configuration: {0}")]
    Session(#[from] cee_lo::table::ConfigError),
}

/// Helper to parse environment variable with default fallback
pub fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
