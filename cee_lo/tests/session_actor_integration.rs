//! Integration tests for the session actor.
//!
//! Tests the actor end-to-end with scripted dice: action routing, automatic
//! throws, subscriber updates, tokio-driven timeouts and shutdown.

use async_trait::async_trait;
use cee_lo::{
    dice::DiceRoller,
    entities::{Action, GameView, Phase, PlayerId, Roll},
    table::{SessionActor, SessionConfig, SessionError, SessionHandle, SessionResponse, SessionUpdate},
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::mpsc;

/// Dice that land exactly as scripted.
struct ScriptedRoller {
    rolls: Mutex<VecDeque<Roll>>,
}

impl ScriptedRoller {
    fn new(rolls: &[[u8; 3]]) -> Arc<Self> {
        let rolls = rolls
            .iter()
            .map(|values| Roll::from_values(*values).unwrap())
            .collect();
        Arc::new(Self {
            rolls: Mutex::new(rolls),
        })
    }
}

#[async_trait]
impl DiceRoller for ScriptedRoller {
    async fn roll(&self) -> Roll {
        self.rolls
            .lock()
            .unwrap()
            .pop_front()
            .expect("script ran out of rolls")
    }
}

fn start(rolls: &[[u8; 3]]) -> SessionHandle {
    let (actor, handle) = SessionActor::new(SessionConfig::default(), ScriptedRoller::new(rolls));
    tokio::spawn(actor.run());
    handle
}

/// Wait for the first update whose view satisfies `done`.
async fn wait_for(
    updates: &mut mpsc::Receiver<SessionUpdate>,
    done: impl Fn(&GameView) -> bool,
) -> GameView {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let update = updates.recv().await.expect("session closed");
            if done(&update.view) {
                return update.view;
            }
        }
    })
    .await
    .expect("no matching update")
}

#[tokio::test]
async fn test_full_round_through_actor() {
    let handle = start(&[[3, 3, 4], [4, 5, 6]]);
    let mut updates = handle.subscribe(1, 64).await.unwrap();

    assert_eq!(
        handle
            .take_action(PlayerId::One, Action::SubmitBet(10))
            .await
            .unwrap(),
        SessionResponse::Success
    );
    assert_eq!(
        handle
            .take_action(PlayerId::Two, Action::ConfirmBet)
            .await
            .unwrap(),
        SessionResponse::Success
    );
    handle
        .take_action(PlayerId::Two, Action::ReadyToRoll)
        .await
        .unwrap();

    let view = wait_for(&mut updates, |v| {
        v.phase == Phase::PreRoll && v.current_player == PlayerId::One
    })
    .await;
    assert_eq!(view.rolls[1], Some(Roll::from_values([3, 3, 4]).unwrap()));

    handle
        .take_action(PlayerId::One, Action::ReadyToRoll)
        .await
        .unwrap();
    let view = wait_for(&mut updates, |v| v.phase == Phase::Betting).await;

    assert_eq!(view.balances, [110, 90]);
    assert_eq!(view.banker, PlayerId::Two);
    assert_eq!(view.pot, 0);
}

#[tokio::test]
async fn test_actor_maps_errors_to_responses() {
    let handle = start(&[]);

    assert_eq!(
        handle
            .take_action(PlayerId::Two, Action::SubmitBet(10))
            .await
            .unwrap(),
        SessionResponse::NotYourTurn
    );
    assert!(matches!(
        handle
            .take_action(PlayerId::One, Action::ConfirmBet)
            .await
            .unwrap(),
        SessionResponse::InvalidAction(_)
    ));
    assert!(matches!(
        handle
            .take_action(PlayerId::One, Action::SubmitBet(500))
            .await
            .unwrap(),
        SessionResponse::Rejected(_)
    ));
    assert_eq!(handle.view().await.unwrap().phase, Phase::Betting);
}

#[tokio::test]
async fn test_updates_carry_new_events() {
    let handle = start(&[]);
    let mut updates = handle.subscribe(7, 8).await.unwrap();

    handle
        .take_action(PlayerId::One, Action::SubmitBet(3))
        .await
        .unwrap();
    let update = updates.recv().await.unwrap();

    let narration: Vec<String> = update.events.iter().map(ToString::to_string).collect();
    assert!(narration.contains(&"Player 1 (Banker) places a bet of $3.".to_string()));
    assert_eq!(update.view.phase, Phase::Confirming);
}

#[tokio::test]
async fn test_unsubscribed_receiver_closes() {
    let handle = start(&[]);
    let mut updates = handle.subscribe(3, 8).await.unwrap();

    handle.unsubscribe(3).await.unwrap();
    handle
        .take_action(PlayerId::One, Action::SubmitBet(5))
        .await
        .unwrap();

    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while updates.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "receiver should close once unsubscribed");
}

#[tokio::test]
async fn test_new_game_resets_session() {
    let handle = start(&[]);
    handle
        .take_action(PlayerId::Two, Action::Forfeit)
        .await
        .unwrap();
    assert_eq!(handle.view().await.unwrap().phase, Phase::GameOver);

    assert_eq!(handle.new_game().await.unwrap(), SessionResponse::Success);
    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::Betting);
    assert_eq!(view.balances, [100, 100]);
    assert!(view.winner.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_turn_timer_fires_through_tokio() {
    let handle = start(&[]);
    handle
        .take_action(PlayerId::One, Action::SubmitBet(10))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(9)).await;

    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::GameOver);
    assert_eq!(view.balances, [100, 100]);
    assert_eq!(view.winner.map(|w| w.player), Some(PlayerId::One));
}

#[tokio::test(start_paused = true)]
async fn test_acting_resets_turn_timer() {
    let handle = start(&[]);

    tokio::time::sleep(Duration::from_secs(6)).await;
    handle
        .take_action(PlayerId::One, Action::SubmitBet(10))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(6)).await;

    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::Confirming);
    assert!(view.time_remaining < 8);
}

#[tokio::test]
async fn test_close_stops_actor() {
    let handle = start(&[]);
    assert_eq!(handle.close().await.unwrap(), SessionResponse::Success);

    tokio::task::yield_now().await;
    assert_eq!(handle.view().await, Err(SessionError::Closed));
}
