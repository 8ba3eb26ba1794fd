//! Session actor implementation with async message handling.

use super::{
    config::SessionConfig,
    messages::{SessionMessage, SessionResponse, SessionUpdate, SubscriberId},
};
use crate::{
    dice::DiceRoller,
    game::{
        GameStateManagement, Session,
        entities::{Action, GameView, Phase, PlayerId, Roll},
        timer::{TimeoutToken, TokioScheduler},
    },
};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, interval},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,
}

/// Session actor handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    pub fn new(sender: mpsc::Sender<SessionMessage>) -> Self {
        Self { sender }
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> Result<(), SessionError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::Closed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T, SessionError> {
        let (response, receiver) = oneshot::channel();
        self.send(message(response)).await?;
        receiver.await.map_err(|_| SessionError::Closed)
    }

    pub async fn take_action(
        &self,
        player: PlayerId,
        action: Action,
    ) -> Result<SessionResponse, SessionError> {
        self.request(|response| SessionMessage::TakeAction {
            player,
            action,
            response,
        })
        .await
    }

    pub async fn view(&self) -> Result<GameView, SessionError> {
        self.request(|response| SessionMessage::GetView { response })
            .await
    }

    pub async fn new_game(&self) -> Result<SessionResponse, SessionError> {
        self.request(|response| SessionMessage::NewGame { response })
            .await
    }

    /// Subscribe to state changes. Updates that don't fit in `buffer` are
    /// dropped for this subscriber.
    pub async fn subscribe(
        &self,
        subscriber_id: SubscriberId,
        buffer: usize,
    ) -> Result<mpsc::Receiver<SessionUpdate>, SessionError> {
        let (sender, receiver) = mpsc::channel(buffer);
        self.send(SessionMessage::Subscribe {
            subscriber_id,
            sender,
        })
        .await?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, subscriber_id: SubscriberId) -> Result<(), SessionError> {
        self.send(SessionMessage::Unsubscribe { subscriber_id })
            .await
    }

    pub async fn close(&self) -> Result<SessionResponse, SessionError> {
        self.request(|response| SessionMessage::Close { response })
            .await
    }
}

/// Session actor owning one game, its turn timer and its dice
pub struct SessionActor {
    /// Session configuration
    config: SessionConfig,

    /// Game plus the scheduler firing its turn timer
    session: Session<TokioScheduler>,

    /// Fired turn timers
    timeouts: mpsc::Receiver<TimeoutToken>,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    roller: Arc<dyn DiceRoller>,

    /// Settled throws, tagged with the throw they belong to
    rolls: mpsc::Receiver<(u64, Roll)>,
    roll_sender: mpsc::Sender<(u64, Roll)>,

    /// Throw currently in the air, if any
    throw_in_flight: Option<u64>,
    next_throw: u64,

    /// Subscribers for state change notifications
    subscribers: HashMap<SubscriberId, mpsc::Sender<SessionUpdate>>,

    is_closed: bool,
}

impl SessionActor {
    /// Create a new session actor. Must be called from within a tokio
    /// runtime, since the first turn timer is scheduled immediately.
    pub fn new(config: SessionConfig, roller: Arc<dyn DiceRoller>) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let (scheduler, timeouts) = TokioScheduler::new();
        let (roll_sender, rolls) = mpsc::channel(1);

        let session = Session::new(config.settings(), scheduler);

        let actor = Self {
            config,
            session,
            timeouts,
            inbox,
            roller,
            rolls,
            roll_sender,
            throw_in_flight: None,
            next_throw: 0,
            subscribers: HashMap::new(),
            is_closed: false,
        };

        (actor, SessionHandle::new(sender))
    }

    /// Run the session actor event loop
    pub async fn run(mut self) {
        log::info!("Session '{}' starting", self.config.name);

        let mut tick_interval = interval(Duration::from_secs(1));
        // The first tick completes immediately.
        tick_interval.tick().await;

        loop {
            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => break,
                },

                Some(token) = self.timeouts.recv() => {
                    if self.session.timeout(token).is_ok() {
                        self.publish();
                    }
                }

                Some((throw, roll)) = self.rolls.recv() => {
                    self.handle_roll(throw, roll);
                }

                _ = tick_interval.tick() => {
                    if self.session.state().armed_timer().is_some() {
                        self.session.tick();
                        self.publish();
                    }
                }
            }

            if self.is_closed {
                break;
            }
        }

        log::info!("Session '{}' closed", self.config.name);
    }

    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::TakeAction {
                player,
                action,
                response,
            } => {
                let result = self.session.take_action(player, action);
                let ignored = matches!(&result, Err(error) if error.is_ignored());
                if !ignored {
                    self.after_change();
                }
                let _ = response.send(result.into());
            }

            SessionMessage::GetView { response } => {
                let _ = response.send(self.session.view());
            }

            SessionMessage::NewGame { response } => {
                self.throw_in_flight = None;
                self.session.new_game();
                self.after_change();
                let _ = response.send(SessionResponse::Success);
            }

            SessionMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                self.subscribers.insert(subscriber_id, sender);
                log::debug!(
                    "Subscriber {} joined session '{}'",
                    subscriber_id,
                    self.config.name
                );
            }

            SessionMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!(
                    "Subscriber {} left session '{}'",
                    subscriber_id,
                    self.config.name
                );
            }

            SessionMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(SessionResponse::Success);
            }
        }
    }

    fn handle_roll(&mut self, throw: u64, roll: Roll) {
        if self.throw_in_flight != Some(throw) {
            log::debug!("Dropping roll {roll} from abandoned throw {throw}");
            return;
        }
        self.throw_in_flight = None;
        match self.session.resolve_roll(roll) {
            Ok(score) => log::debug!("Throw {throw} settled on {roll} ({score})"),
            Err(e) => log::warn!("Settled roll {roll} arrived outside rolling: {e}"),
        }
        self.after_change();
    }

    fn after_change(&mut self) {
        self.maybe_throw();
        self.publish();
    }

    /// Put the dice in the air if the game is waiting on them.
    fn maybe_throw(&mut self) {
        if self.session.state().phase() != Phase::Rolling || self.throw_in_flight.is_some() {
            return;
        }

        let throw = self.next_throw;
        self.next_throw += 1;
        self.throw_in_flight = Some(throw);

        let roller = Arc::clone(&self.roller);
        let sender = self.roll_sender.clone();
        tokio::spawn(async move {
            let roll = roller.roll().await;
            if sender.send((throw, roll)).await.is_err() {
                log::debug!("Throw {throw} settled after its session closed");
            }
        });
    }

    /// Broadcast the current view and any new events to all subscribers
    fn publish(&mut self) {
        let update = SessionUpdate {
            view: self.session.view(),
            events: self.session.drain_events().into(),
        };
        self.subscribers.retain(|subscriber_id, sender| {
            match sender.try_send(update.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} channel full, dropping update",
                        subscriber_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                    false
                }
            }
        });
    }
}
