//! Session actor message types.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::game::{
    GameEvent, UserError,
    entities::{Action, GameView, PlayerId},
};

/// Identifier a subscriber picks for itself.
pub type SubscriberId = u64;

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Player action (bet, confirm, roll, walk away)
    TakeAction {
        player: PlayerId,
        action: Action,
        response: oneshot::Sender<SessionResponse>,
    },

    /// Get current game view
    GetView {
        response: oneshot::Sender<GameView>,
    },

    /// Throw the current game away and deal a fresh one
    NewGame {
        response: oneshot::Sender<SessionResponse>,
    },

    /// Subscribe to state change notifications
    Subscribe {
        subscriber_id: SubscriberId,
        sender: mpsc::Sender<SessionUpdate>,
    },

    /// Unsubscribe from state change notifications
    Unsubscribe { subscriber_id: SubscriberId },

    /// Stop the actor
    Close {
        response: oneshot::Sender<SessionResponse>,
    },
}

/// Sent to subscribers after every state change
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub view: GameView,
    /// Events since the previous update, oldest first.
    pub events: Vec<GameEvent>,
}

/// Response from session operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionResponse {
    /// Operation succeeded
    Success,

    /// Someone else is expected to act
    NotYourTurn,

    /// Action doesn't apply to the current phase
    InvalidAction(String),

    /// Action was understood but turned down
    Rejected(String),
}

impl From<Result<(), UserError>> for SessionResponse {
    fn from(value: Result<(), UserError>) -> Self {
        match value {
            Ok(()) => SessionResponse::Success,
            Err(UserError::OutOfTurnAction) => SessionResponse::NotYourTurn,
            Err(
                error @ (UserError::OutOfPhase { .. }
                | UserError::StaleTimeout
                | UserError::NoThrowInFlight { .. }),
            ) => SessionResponse::InvalidAction(error.to_string()),
            Err(error) => SessionResponse::Rejected(error.to_string()),
        }
    }
}
