//! Session module running one game per async actor.
//!
//! Each session runs in its own Tokio task with an mpsc message inbox. The
//! actor owns the game, schedules its turn timer on tokio, throws the dice
//! when the game is waiting on them, and pushes a fresh view to subscribers
//! after every change.
//!
//! ## Example
//!
//! ```no_run
//! use cee_lo::dice::RandomRoller;
//! use cee_lo::game::entities::{Action, PlayerId};
//! use cee_lo::table::{SessionActor, SessionConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, handle) = SessionActor::new(SessionConfig::default(), Arc::new(RandomRoller));
//!     tokio::spawn(actor.run());
//!
//!     let response = handle.take_action(PlayerId::One, Action::SubmitBet(10)).await;
//!     println!("{response:?}");
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{SessionActor, SessionError, SessionHandle};
pub use config::{ConfigError, DiceMode, SessionConfig};
pub use messages::{SessionMessage, SessionResponse, SessionUpdate, SubscriberId};
