//! Session configuration models.

use serde::{Deserialize, Serialize};
use std::{str::FromStr, time::Duration};
use thiserror::Error;

use crate::game::{
    GameSettings,
    constants::{EVENT_LOG_CAPACITY, MAX_BET, STARTING_BALANCE, TURN_TIME_LIMIT_SECS},
    entities::Usd,
};

/// How the session throws dice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiceMode {
    /// Simulated tumble, paced in real time
    Tumble,
    /// Uniform faces, resolved immediately
    Random,
}

impl std::fmt::Display for DiceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiceMode::Tumble => write!(f, "tumble"),
            DiceMode::Random => write!(f, "random"),
        }
    }
}

impl FromStr for DiceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tumble" => Ok(DiceMode::Tumble),
            "random" => Ok(DiceMode::Random),
            _ => Err(ConfigError::UnknownDiceMode(s.to_string())),
        }
    }
}

/// Configuration problems caught before a session starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("starting balance must be positive")]
    ZeroBalance,
    #[error("max bet must be positive")]
    ZeroMaxBet,
    #[error("turn time limit must be at least one second")]
    ZeroTurnTime,
    #[error("event log must hold at least one entry")]
    ZeroEventLog,
    #[error("unknown dice mode '{0}' (expected tumble or random)")]
    UnknownDiceMode(String),
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session name, used in logs
    pub name: String,

    /// Balance each player starts with
    pub starting_balance: Usd,

    /// Largest bet the banker may place
    pub max_bet: Usd,

    /// Seconds a player has to act before forfeiting
    pub turn_time_secs: u64,

    /// Narration lines kept in the view
    pub event_log_capacity: usize,

    /// Dice source
    pub dice: DiceMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "After-Hours Cee-Lo".to_string(),
            starting_balance: STARTING_BALANCE,
            max_bet: MAX_BET,
            turn_time_secs: TURN_TIME_LIMIT_SECS,
            event_log_capacity: EVENT_LOG_CAPACITY,
            dice: DiceMode::Tumble,
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_balance == 0 {
            return Err(ConfigError::ZeroBalance);
        }

        if self.max_bet == 0 {
            return Err(ConfigError::ZeroMaxBet);
        }

        if self.turn_time_secs == 0 {
            return Err(ConfigError::ZeroTurnTime);
        }

        if self.event_log_capacity == 0 {
            return Err(ConfigError::ZeroEventLog);
        }

        Ok(())
    }

    pub fn turn_time_limit(&self) -> Duration {
        Duration::from_secs(self.turn_time_secs)
    }

    /// Game rules derived from this configuration
    pub fn settings(&self) -> GameSettings {
        GameSettings::new(
            self.starting_balance,
            self.max_bet,
            self.turn_time_limit(),
            self.event_log_capacity,
        )
    }
}
