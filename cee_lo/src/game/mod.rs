//! Cee-Lo game engine - core FSM and game logic.
//!
//! This module provides the foundational game implementation including:
//! - Type-safe finite state machine with one type per phase
//! - Scoring and pot settlement
//! - Turn timers and the schedulers that deliver them
//! - Event narration and views

pub mod constants;
pub mod entities;
pub mod functional;
pub mod session;
pub mod state_machine;
pub mod states;
pub mod timer;

pub use session::Session;
pub use state_machine::{
    CeeLoState, Game, GameData, GameEvent, GameSettings, GameStateManagement, UserError,
};
