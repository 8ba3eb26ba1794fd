use super::entities::Usd;

/// Money each player starts a fresh game with.
pub const STARTING_BALANCE: Usd = 100;

/// Largest bet a banker may set for a round.
pub const MAX_BET: Usd = 40;

/// The bet every round opens with before the banker changes it.
pub const INITIAL_BET: Usd = 1;

/// Seconds a player has to act before they forfeit the game.
pub const TURN_TIME_LIMIT_SECS: u64 = 8;

/// Number of narration lines kept for display.
pub const EVENT_LOG_CAPACITY: usize = 10;

// Sentinels sit outside both the point range (1..=6) and the trips range
// (10, 20, .., 60) so they never compare equal to a real score.
pub const WIN_SENTINEL: i32 = 999;
pub const LOSS_SENTINEL: i32 = -1;
