//! # Cee-Lo
//!
//! A two-player Cee-Lo dice wagering game built on a type-safe finite state
//! machine. The core game is implemented as an FSM using `enum_dispatch`
//! for zero-cost trait dispatch.
//!
//! ## Architecture
//!
//! A session moves through five phases:
//!
//! - **Betting**: The banker picks a bet
//! - **Confirming**: The other player matches it (or can't)
//! - **PreRoll**: The current player gets ready to throw
//! - **Rolling**: Dice are in the air until a settled roll comes back
//! - **GameOver**: Someone was cleaned out, walked away or ran out of time
//!
//! ## Core Modules
//!
//! - [`game`]: Game state machine, entities, scoring and turn timers
//! - [`dice`]: The dice collaborator the game receives rolls from
//! - [`table`]: Async session actor wiring timers and dice to the game
//!
//! ## Example
//!
//! ```
//! use cee_lo::{CeeLoState, GameStateManagement};
//! use cee_lo::entities::{Phase, PlayerId};
//!
//! let mut game = CeeLoState::default();
//! game.submit_bet(PlayerId::One, 10).unwrap();
//! assert_eq!(game.phase(), Phase::Confirming);
//! ```

/// The dice collaborator boundary.
pub mod dice;

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    CeeLoState, GameEvent, GameSettings, GameStateManagement, Session, UserError,
    constants::{self, MAX_BET, STARTING_BALANCE},
    entities::{self, DieFace, PlayerId, Roll, Score},
    functional,
};

/// Async session actor.
pub mod table;
