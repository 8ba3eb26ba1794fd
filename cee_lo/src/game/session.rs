//! A game paired with the scheduler that fires its turn timer.

use log::{debug, info};
use std::collections::VecDeque;

use super::entities::{Action, GameView, PlayerId, Roll, Score};
use super::state_machine::{CeeLoState, GameEvent, GameSettings, GameStateManagement, UserError};
use super::timer::{TimeoutScheduler, TimeoutToken, TimerHandle};

/// Drives a [`CeeLoState`] and keeps exactly the armed turn timer scheduled.
///
/// After every input the session compares the token the game has armed with
/// the one it last scheduled. A changed token cancels the old timeout before
/// scheduling the new one, so at most one timeout is ever pending.
#[derive(Debug)]
pub struct Session<S> {
    state: CeeLoState,
    scheduler: S,
    scheduled: Option<(TimeoutToken, TimerHandle)>,
}

impl<S: TimeoutScheduler> Session<S> {
    pub fn new(settings: GameSettings, scheduler: S) -> Self {
        let mut session = Self {
            state: CeeLoState::new(settings),
            scheduler,
            scheduled: None,
        };
        session.sync_timer();
        session
    }

    pub fn take_action(&mut self, player: PlayerId, action: Action) -> Result<(), UserError> {
        let result = self.state.take_action(player, action);
        if let Err(error) = &result {
            debug!("{player} tried to {action}: {error}");
        }
        self.sync_timer();
        result
    }

    pub fn resolve_roll(&mut self, roll: Roll) -> Result<Score, UserError> {
        let result = self.state.resolve_roll(roll);
        self.sync_timer();
        result
    }

    /// Deliver a fired timeout. Anything but the currently scheduled token
    /// is dropped.
    pub fn timeout(&mut self, token: TimeoutToken) -> Result<(), UserError> {
        let result = self.state.timeout(token);
        match &result {
            Ok(()) => info!("{} ran out of time during {}", token.player, token.phase),
            Err(_) => debug!("Dropping stale timeout {token:?}"),
        }
        self.sync_timer();
        result
    }

    pub fn tick(&mut self) {
        self.state.tick();
    }

    /// Start over. The new game's first turn always gets a full deadline.
    pub fn new_game(&mut self) {
        self.state.new_game();
        if let Some((_, handle)) = self.scheduled.take() {
            self.scheduler.cancel(handle);
        }
        self.sync_timer();
    }

    #[must_use]
    pub fn state(&self) -> &CeeLoState {
        &self.state
    }

    #[must_use]
    pub fn view(&self) -> GameView {
        self.state.get_view()
    }

    pub fn drain_events(&mut self) -> VecDeque<GameEvent> {
        self.state.drain_events()
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Token of the timeout currently scheduled, if any.
    #[must_use]
    pub fn scheduled(&self) -> Option<TimeoutToken> {
        self.scheduled.map(|(token, _)| token)
    }

    fn sync_timer(&mut self) {
        let armed = self.state.armed_timer();
        if self.scheduled() == armed {
            return;
        }
        if let Some((_, handle)) = self.scheduled.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(token) = armed {
            let after = self.state.data().settings().turn_time_limit;
            let handle = self.scheduler.schedule(after, token);
            self.scheduled = Some((token, handle));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::game::{entities::Phase, timer::ManualScheduler};

    const LIMIT: Duration = Duration::from_secs(8);

    fn session() -> Session<ManualScheduler> {
        Session::new(GameSettings::default(), ManualScheduler::new())
    }

    fn fire_due(session: &mut Session<ManualScheduler>, by: Duration) {
        for token in session.scheduler_mut().advance(by) {
            let _ = session.timeout(token);
        }
    }

    #[test]
    fn test_new_session_schedules_betting_timer() {
        let session = session();
        assert_eq!(session.scheduler().active(), 1);
        assert_eq!(session.scheduled(), session.state().armed_timer());
    }

    #[test]
    fn test_at_most_one_timer_pending() {
        let mut session = session();
        session.take_action(PlayerId::One, Action::SubmitBet(0)).ok();
        session.take_action(PlayerId::One, Action::SubmitBet(10)).unwrap();
        assert_eq!(session.scheduler().active(), 1);

        session.take_action(PlayerId::Two, Action::ConfirmBet).unwrap();
        assert_eq!(session.scheduler().active(), 1);

        session.take_action(PlayerId::Two, Action::ReadyToRoll).unwrap();
        assert_eq!(session.scheduler().active(), 0);
        assert!(session.scheduled().is_none());
    }

    #[test]
    fn test_acting_before_deadline_prevents_timeout() {
        let mut session = session();
        fire_due(&mut session, LIMIT - Duration::from_secs(1));
        session.take_action(PlayerId::One, Action::SubmitBet(10)).unwrap();
        fire_due(&mut session, Duration::from_secs(1));

        assert_eq!(session.state().phase(), Phase::Confirming);
    }

    #[test]
    fn test_confirming_timeout_returns_bet_to_banker() {
        let mut session = session();
        session.take_action(PlayerId::One, Action::SubmitBet(10)).unwrap();
        fire_due(&mut session, LIMIT);

        let view = session.view();
        assert_eq!(view.phase, Phase::GameOver);
        assert_eq!(view.balances, [100, 100]);
        assert_eq!(view.pot, 0);
        assert_eq!(view.winner.map(|w| w.player), Some(PlayerId::One));
        assert_eq!(session.scheduler().active(), 0);
    }

    #[test]
    fn test_pre_roll_timeout_refunds_both() {
        let mut session = session();
        session.take_action(PlayerId::One, Action::SubmitBet(10)).unwrap();
        session.take_action(PlayerId::Two, Action::ConfirmBet).unwrap();
        fire_due(&mut session, LIMIT);

        let view = session.view();
        assert_eq!(view.balances, [100, 100]);
        assert_eq!(view.winner.map(|w| w.player), Some(PlayerId::One));
        assert!(view.events.contains(
            &"Player 2 didn't roll in time. Bet amounts returned to both players.".to_string()
        ));
    }

    #[test]
    fn test_stale_token_is_dropped() {
        let mut session = session();
        let stale = session.scheduled().unwrap();
        session.take_action(PlayerId::One, Action::SubmitBet(5)).unwrap();

        assert_eq!(session.timeout(stale), Err(UserError::StaleTimeout));
        assert_eq!(session.state().phase(), Phase::Confirming);
        assert_eq!(session.scheduler().active(), 1);
    }

    #[test]
    fn test_new_game_reschedules() {
        let mut session = session();
        session.take_action(PlayerId::Two, Action::Forfeit).unwrap();
        assert_eq!(session.scheduler().active(), 0);

        session.new_game();
        assert_eq!(session.state().phase(), Phase::Betting);
        assert_eq!(session.scheduler().active(), 1);
    }

    #[test]
    fn test_new_game_gets_a_full_turn() {
        let mut session = session();
        fire_due(&mut session, LIMIT - Duration::from_secs(1));
        session.new_game();
        fire_due(&mut session, Duration::from_secs(1));

        assert_eq!(session.scheduler().now(), LIMIT);
        assert_eq!(session.state().phase(), Phase::Betting);
        assert_eq!(session.scheduler().active(), 1);

        fire_due(&mut session, LIMIT - Duration::from_secs(1));
        assert_eq!(session.state().phase(), Phase::GameOver);
    }

    #[test]
    fn test_old_game_timeout_ignored_after_new_game() {
        let mut session = session();
        session.take_action(PlayerId::One, Action::SubmitBet(10)).unwrap();
        let old = session.scheduled().unwrap();
        session.new_game();

        assert_eq!(session.timeout(old), Err(UserError::StaleTimeout));
        assert_eq!(session.state().phase(), Phase::Betting);
        assert_eq!(session.scheduler().active(), 1);
    }

    #[test]
    fn test_tick_counts_down_view() {
        let mut session = session();
        session.tick();
        session.tick();
        assert_eq!(session.view().time_remaining, 6);
    }
}
