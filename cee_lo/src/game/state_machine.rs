//! Cee-Lo state machine implementation.
//!
//! Each phase is its own `Game<T>` type so a transition can only be written
//! from the phase it belongs to. `CeeLoState` wraps the five phases and is
//! the only thing the outside world holds.

use enum_dispatch::enum_dispatch;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt, time::Duration};
use thiserror::Error;

use super::constants::{
    EVENT_LOG_CAPACITY, INITIAL_BET, MAX_BET, STARTING_BALANCE, TURN_TIME_LIMIT_SECS,
};
use super::entities::{
    Action, EventLog, GameView, GameWinner, Phase, PlayerId, Roll, RoundOutcome, Score, Usd,
};
use super::functional::{decide_round, score_roll, split_pot};
use super::states::{Betting, Confirming, GameOver, PhaseMarker, PreRoll, Rolling};
use super::timer::{TimeoutToken, TurnTimer};

/// Errors that can occur during player actions.
///
/// Out-of-phase and out-of-turn actions leave the game untouched. Bet
/// rejections are narrated and restart the banker's timer.
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum UserError {
    #[error("can't {action} during {phase}")]
    OutOfPhase { action: Action, phase: Phase },
    #[error("not your turn")]
    OutOfTurnAction,
    #[error("bet must be between $1 and ${max_bet}")]
    BetOutOfRange { max_bet: Usd },
    #[error("banker can only cover ${available}")]
    BankerCannotCover { available: Usd },
    #[error("opponent can only cover ${available}")]
    OpponentCannotCover { available: Usd },
    #[error("need ${bet} to match the bet")]
    InsufficientFunds { bet: Usd },
    #[error("timeout is no longer current")]
    StaleTimeout,
    #[error("no dice are in the air during {phase}")]
    NoThrowInFlight { phase: Phase },
}

impl UserError {
    /// Whether the input was dropped without touching the game at all.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(
            self,
            Self::OutOfPhase { .. }
                | Self::OutOfTurnAction
                | Self::StaleTimeout
                | Self::NoThrowInFlight { .. }
        )
    }
}

/// Events that occur during gameplay. Their display form is the narration
/// shown to players.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum GameEvent {
    GameStarted {
        banker: PlayerId,
        initial_bet: Usd,
        max_bet: Usd,
    },
    InvalidBet {
        max_bet: Usd,
    },
    BankerShort {
        available: Usd,
    },
    OpponentShort {
        available: Usd,
    },
    BetPlaced {
        banker: PlayerId,
        amount: Usd,
    },
    BetAccepted {
        player: PlayerId,
        amount: Usd,
        pot: Usd,
    },
    CannotCoverBet(PlayerId),
    ReadyToRoll(PlayerId),
    Rolled {
        player: PlayerId,
        roll: Roll,
        score: Score,
    },
    AutoLoss(PlayerId),
    AutoWin(PlayerId),
    RollAgain(PlayerId),
    BankerToRoll(PlayerId),
    RoundTied {
        pot: Usd,
    },
    RoundWon {
        player: PlayerId,
        pot: Usd,
    },
    FinalRolls {
        rolls: [Option<Roll>; 2],
    },
    NewRound {
        banker: PlayerId,
        initial_bet: Usd,
    },
    TimedOut(PlayerId),
    BankerStalled(PlayerId),
    ConfirmStalled(PlayerId),
    RollStalled(PlayerId),
    WalkedAway(PlayerId),
    Refunded {
        player: PlayerId,
        amount: Usd,
    },
    GameOver {
        winner: PlayerId,
        final_balance: Usd,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::GameStarted {
                banker,
                initial_bet,
                max_bet,
            } => format!(
                "After-Hours Cee-Lo! {banker} is the banker. Initial bet is ${initial_bet}. Max bet is ${max_bet}. Let's roll!"
            ),
            Self::InvalidBet { max_bet } => {
                format!("Invalid bet! Keep it between $1 and ${max_bet}.")
            }
            Self::BankerShort { available } => format!(
                "Banker doesn't have enough money for this bet. Maximum bet: ${available}."
            ),
            Self::OpponentShort { available } => format!(
                "The other player doesn't have enough money to match this bet. Maximum bet: ${available}."
            ),
            Self::BetPlaced { banker, amount } => {
                format!("{banker} (Banker) places a bet of ${amount}.")
            }
            Self::BetAccepted {
                player,
                amount,
                pot,
            } => format!("{player} accepts the ${amount} bet. Total pot: ${pot}"),
            Self::CannotCoverBet(player) => {
                format!("{player} doesn't have enough cash to cover the bet. Game over!")
            }
            Self::ReadyToRoll(player) => format!("{player} is ready to roll."),
            Self::Rolled {
                player,
                roll,
                score,
            } => format!("{player} rolled: {roll} - {score} ({})", score.flavor()),
            Self::AutoLoss(player) => format!("{player} automatically loses this round."),
            Self::AutoWin(player) => format!("{player} automatically wins this round."),
            Self::RollAgain(player) => format!("{player} needs to roll again."),
            Self::BankerToRoll(banker) => format!("Banker ({banker}) now prepares to roll."),
            Self::RoundTied { pot } => format!("It's a tie! The ${pot} pot is split."),
            Self::RoundWon { player, pot } => {
                format!("{player} wins the round and takes the pot: ${pot}!")
            }
            Self::FinalRolls { rolls } => {
                let [one, two] = rolls.map(|roll| match roll {
                    Some(roll) => roll.to_string(),
                    None => "N/A".to_string(),
                });
                format!("Final rolls - Player 1: {one}, Player 2: {two}")
            }
            Self::NewRound {
                banker,
                initial_bet,
            } => format!("New round! {banker} is now the banker. Initial bet is ${initial_bet}."),
            Self::TimedOut(player) => format!("Time's up for {player}! The game ends."),
            Self::BankerStalled(banker) => {
                format!("Banker ({banker}) didn't place a bet in time.")
            }
            Self::ConfirmStalled(player) => format!(
                "{player} didn't confirm the bet in time. Bet returned to banker."
            ),
            Self::RollStalled(player) => format!(
                "{player} didn't roll in time. Bet amounts returned to both players."
            ),
            Self::WalkedAway(player) => format!("{player} walks away. Game Over!"),
            Self::Refunded { player, amount } => format!("Refunding ${amount} to {player}."),
            Self::GameOver {
                winner,
                final_balance,
            } => format!("Game Over! {winner} wins with ${final_balance}!"),
        };
        write!(f, "{repr}")
    }
}

/// Game configuration settings
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSettings {
    pub starting_balance: Usd,
    pub max_bet: Usd,
    pub turn_time_limit: Duration,
    pub event_log_capacity: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new(
            STARTING_BALANCE,
            MAX_BET,
            Duration::from_secs(TURN_TIME_LIMIT_SECS),
            EVENT_LOG_CAPACITY,
        )
    }
}

impl GameSettings {
    #[must_use]
    pub const fn new(
        starting_balance: Usd,
        max_bet: Usd,
        turn_time_limit: Duration,
        event_log_capacity: usize,
    ) -> Self {
        Self {
            starting_balance,
            max_bet,
            turn_time_limit,
            event_log_capacity,
        }
    }
}

/// Mutable game data shared across all states
#[derive(Debug)]
pub struct GameData {
    /// Player 1's balance at index 0, player 2's at index 1.
    pub balances: [Usd; 2],
    pub banker: PlayerId,
    pub current_player: PlayerId,
    pub current_bet: Usd,
    /// Stakes escrowed for the current round.
    pub pot: Usd,
    pub scores: [Option<Score>; 2],
    pub rolls: [Option<Roll>; 2],
    pub winner: Option<GameWinner>,
    pub(super) timer: TurnTimer,
    pub(super) log: EventLog,
    /// Queue of events not yet drained by whoever drives the session.
    pub(super) events: VecDeque<GameEvent>,
    /// Balances plus pot, fixed when the game starts.
    total: Usd,
    pub(super) settings: GameSettings,
}

impl Default for GameData {
    fn default() -> Self {
        GameSettings::default().into()
    }
}

impl From<GameSettings> for GameData {
    fn from(value: GameSettings) -> Self {
        Self {
            balances: [value.starting_balance; 2],
            banker: PlayerId::One,
            current_player: PlayerId::One,
            current_bet: INITIAL_BET,
            pot: 0,
            scores: [None; 2],
            rolls: [None; 2],
            winner: None,
            timer: TurnTimer::new(value.turn_time_limit),
            log: EventLog::new(value.event_log_capacity),
            events: VecDeque::new(),
            total: 2 * value.starting_balance,
            settings: value,
        }
    }
}

impl GameData {
    #[must_use]
    pub fn balance(&self, player: PlayerId) -> Usd {
        self.balances[player.index()]
    }

    /// Everything on the table: both balances plus the pot.
    #[must_use]
    pub fn total(&self) -> Usd {
        self.balances.iter().sum::<Usd>() + self.pot
    }

    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub fn timer(&self) -> &TurnTimer {
        &self.timer
    }

    fn narrate(&mut self, event: GameEvent) {
        debug!("{event}");
        self.log.push(event.to_string());
        self.events.push_back(event);
    }

    /// Move a stake from a balance into the pot. Callers validate the
    /// balance first.
    fn escrow(&mut self, player: PlayerId, amount: Usd) {
        let balance = &mut self.balances[player.index()];
        debug_assert!(*balance >= amount, "{player} can't cover ${amount}");
        *balance -= amount;
        self.pot += amount;
    }

    fn pay_out(&mut self, player: PlayerId, amount: Usd) {
        debug_assert!(self.pot >= amount, "pot can't cover ${amount}");
        self.pot -= amount;
        self.balances[player.index()] += amount;
    }

    /// Return escrowed stakes to whoever put them in during `phase`.
    fn refund_stakes(&mut self, phase: Phase) {
        let refunds = match phase {
            Phase::Confirming => {
                let mut refunds = [0; 2];
                refunds[self.banker.index()] = self.pot;
                refunds
            }
            Phase::PreRoll | Phase::Rolling => split_pot(self.pot, self.banker),
            Phase::Betting | Phase::GameOver => [0; 2],
        };
        for player in PlayerId::ALL {
            let amount = refunds[player.index()];
            if amount > 0 {
                self.pay_out(player, amount);
                self.narrate(GameEvent::Refunded { player, amount });
            }
        }
    }

    fn start_new_round(&mut self) {
        self.banker = self.banker.opponent();
        self.current_player = self.banker;
        self.current_bet = INITIAL_BET;
        self.pot = 0;
        self.scores = [None; 2];
        self.rolls = [None; 2];
        self.narrate(GameEvent::NewRound {
            banker: self.banker,
            initial_bet: INITIAL_BET,
        });
    }

    fn check_conservation(&self) {
        debug_assert_eq!(
            self.total(),
            self.total,
            "money was created or destroyed: balances {:?}, pot {}",
            self.balances,
            self.pot
        );
    }
}

/// Trait for reading and housekeeping a game regardless of phase
#[enum_dispatch]
pub trait GameStateManagement {
    fn drain_events(&mut self) -> VecDeque<GameEvent>;

    /// Snapshot for a presentation layer.
    #[must_use]
    fn get_view(&self) -> GameView;

    fn phase(&self) -> Phase;

    fn data(&self) -> &GameData;

    /// Count the turn timer down by one second.
    fn tick(&mut self);
}

/// A Cee-Lo game with data and logic for running a session end-to-end.
#[derive(Debug)]
pub struct Game<T> {
    pub data: GameData,
    pub state: T,
}

impl<T: PhaseMarker> GameStateManagement for Game<T> {
    fn drain_events(&mut self) -> VecDeque<GameEvent> {
        std::mem::take(&mut self.data.events)
    }

    fn get_view(&self) -> GameView {
        GameView {
            balances: self.data.balances,
            banker: self.data.banker,
            current_player: self.data.current_player,
            current_bet: self.data.current_bet,
            pot: self.data.pot,
            phase: T::PHASE,
            scores: self.data.scores,
            rolls: self.data.rolls,
            time_remaining: self.data.timer.time_remaining(),
            winner: self.data.winner,
            events: self.data.log.iter().cloned().collect(),
        }
    }

    fn phase(&self) -> Phase {
        T::PHASE
    }

    fn data(&self) -> &GameData {
        &self.data
    }

    fn tick(&mut self) {
        self.data.timer.tick();
    }
}

/// Why a game ended before a balance ran out.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Forfeit {
    WalkedAway,
    TimedOut,
}

impl<T: PhaseMarker> Game<T> {
    /// Move into `state`, arming a fresh turn timer for phases that wait on
    /// a player and disarming it for the rest.
    fn enter<U: PhaseMarker>(mut self, state: U) -> Game<U> {
        match U::PHASE {
            Phase::Rolling | Phase::GameOver => self.data.timer.stop(),
            phase => {
                self.data.timer.restart(phase, self.data.current_player);
            }
        }
        self.data.check_conservation();
        Game {
            data: self.data,
            state,
        }
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<(), UserError> {
        if player == self.data.current_player {
            Ok(())
        } else {
            Err(UserError::OutOfTurnAction)
        }
    }

    fn finish(mut self, winner: PlayerId) -> Game<GameOver> {
        let final_balance = self.data.balance(winner);
        self.data.winner = Some(GameWinner {
            player: winner,
            final_balance,
        });
        self.data.narrate(GameEvent::GameOver {
            winner,
            final_balance,
        });
        self.enter(GameOver {})
    }

    /// End the game against `loser`, handing back whatever was escrowed
    /// this round.
    fn forfeit(mut self, loser: PlayerId, reason: Forfeit) -> Game<GameOver> {
        match reason {
            Forfeit::WalkedAway => self.data.narrate(GameEvent::WalkedAway(loser)),
            Forfeit::TimedOut => {
                self.data.narrate(GameEvent::TimedOut(loser));
                let stalled = match T::PHASE {
                    Phase::Betting => GameEvent::BankerStalled(loser),
                    Phase::Confirming => GameEvent::ConfirmStalled(loser),
                    _ => GameEvent::RollStalled(loser),
                };
                self.data.narrate(stalled);
            }
        }
        self.data.refund_stakes(T::PHASE);
        self.finish(loser.opponent())
    }
}

impl Game<Betting> {
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        let timer = TurnTimer::new(settings.turn_time_limit);
        Self::with_timer(settings, timer)
    }

    /// Start a game whose turn timer continues from `timer`.
    fn with_timer(settings: GameSettings, timer: TurnTimer) -> Self {
        let mut data = GameData::from(settings);
        data.timer = timer;
        data.narrate(GameEvent::GameStarted {
            banker: data.banker,
            initial_bet: data.current_bet,
            max_bet: data.settings.max_bet,
        });
        data.timer.restart(Phase::Betting, data.current_player);
        Self {
            data,
            state: Betting {},
        }
    }

    /// Check a bet against the table limit and both balances. A rejected
    /// bet is narrated and gives the banker a fresh timer.
    fn validate_bet(&mut self, player: PlayerId, amount: Usd) -> Result<(), UserError> {
        let banker = self.data.banker;
        if player != banker {
            return Err(UserError::OutOfTurnAction);
        }

        let max_bet = self.data.settings.max_bet;
        let banker_balance = self.data.balance(banker);
        let opponent_balance = self.data.balance(banker.opponent());

        let rejection = if !(1..=max_bet).contains(&amount) {
            Some((
                UserError::BetOutOfRange { max_bet },
                GameEvent::InvalidBet { max_bet },
            ))
        } else if amount > banker_balance {
            Some((
                UserError::BankerCannotCover {
                    available: banker_balance,
                },
                GameEvent::BankerShort {
                    available: banker_balance,
                },
            ))
        } else if amount > opponent_balance {
            Some((
                UserError::OpponentCannotCover {
                    available: opponent_balance,
                },
                GameEvent::OpponentShort {
                    available: opponent_balance,
                },
            ))
        } else {
            None
        };

        match rejection {
            Some((error, event)) => {
                self.data.narrate(event);
                self.data.timer.restart(Phase::Betting, banker);
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn place_bet(mut self, amount: Usd) -> Game<Confirming> {
        let banker = self.data.banker;
        self.data.escrow(banker, amount);
        self.data.current_bet = amount;
        self.data.narrate(GameEvent::BetPlaced { banker, amount });
        self.data.current_player = banker.opponent();
        self.enter(Confirming {})
    }
}

impl Game<Confirming> {
    fn can_cover(&self) -> bool {
        self.data.balance(self.data.current_player) >= self.data.current_bet
    }

    fn confirm_bet(mut self) -> CeeLoState {
        let player = self.data.current_player;
        if !self.can_cover() {
            self.data.narrate(GameEvent::CannotCoverBet(player));
            self.data.refund_stakes(Phase::Confirming);
            let banker = self.data.banker;
            return self.finish(banker).into();
        }

        let amount = self.data.current_bet;
        self.data.escrow(player, amount);
        self.data.narrate(GameEvent::BetAccepted {
            player,
            amount,
            pot: self.data.pot,
        });
        // The non-banker always throws first.
        self.data.current_player = self.data.banker.opponent();
        self.enter(PreRoll {}).into()
    }
}

impl Game<PreRoll> {
    fn ready_to_roll(mut self) -> Game<Rolling> {
        self.data
            .narrate(GameEvent::ReadyToRoll(self.data.current_player));
        self.enter(Rolling {})
    }
}

impl Game<Rolling> {
    fn resolve_roll(mut self, roll: Roll) -> CeeLoState {
        let player = self.data.current_player;
        let score = score_roll(&roll);
        self.data.scores[player.index()] = Some(score);
        self.data.rolls[player.index()] = Some(roll);
        self.data.narrate(GameEvent::Rolled {
            player,
            roll,
            score,
        });

        let banker = self.data.banker;
        match score {
            Score::AutoLoss => {
                self.data.narrate(GameEvent::AutoLoss(player));
                self.end_round(RoundOutcome::Winner(player.opponent()))
            }
            Score::AutoWin => {
                self.data.narrate(GameEvent::AutoWin(player));
                self.end_round(RoundOutcome::Winner(player))
            }
            Score::NoScore => {
                self.data.narrate(GameEvent::RollAgain(player));
                self.enter(PreRoll {}).into()
            }
            Score::Trips(_) | Score::Point(_) if player == banker => {
                let outcome = decide_round(self.data.scores);
                self.end_round(outcome)
            }
            Score::Trips(_) | Score::Point(_) => {
                self.data.current_player = banker;
                self.data.narrate(GameEvent::BankerToRoll(banker));
                self.enter(PreRoll {}).into()
            }
        }
    }

    fn end_round(mut self, outcome: RoundOutcome) -> CeeLoState {
        let pot = self.data.pot;
        match outcome {
            RoundOutcome::Tie => {
                self.data.narrate(GameEvent::RoundTied { pot });
                let shares = split_pot(pot, self.data.banker);
                for player in PlayerId::ALL {
                    self.data.pay_out(player, shares[player.index()]);
                }
            }
            RoundOutcome::Winner(player) => {
                self.data.pay_out(player, pot);
                self.data.narrate(GameEvent::RoundWon { player, pot });
            }
        }
        self.data.narrate(GameEvent::FinalRolls {
            rolls: self.data.rolls,
        });

        let [one, two] = self.data.balances;
        if one == 0 || two == 0 {
            let winner = if one > two {
                PlayerId::One
            } else {
                PlayerId::Two
            };
            self.finish(winner).into()
        } else {
            self.data.start_new_round();
            self.enter(Betting {}).into()
        }
    }
}

/// A Cee-Lo session in whichever phase it currently is.
///
/// Every input is accepted in any phase; inputs that don't belong to the
/// current phase or come from the wrong player return an error and leave
/// the game unchanged.
#[enum_dispatch(GameStateManagement)]
#[derive(Debug)]
pub enum CeeLoState {
    Betting(Game<Betting>),
    Confirming(Game<Confirming>),
    PreRoll(Game<PreRoll>),
    Rolling(Game<Rolling>),
    GameOver(Game<GameOver>),
}

impl Default for CeeLoState {
    fn default() -> Self {
        Self::new(GameSettings::default())
    }
}

impl From<GameSettings> for CeeLoState {
    fn from(value: GameSettings) -> Self {
        Self::new(value)
    }
}

impl CeeLoState {
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        Game::<Betting>::new(settings).into()
    }

    /// Throw away this game and start a fresh one with the same settings.
    pub fn new_game(&mut self) {
        let settings = self.data().settings.clone();
        let timer = self.data().timer.for_next_game();
        *self = Game::<Betting>::with_timer(settings, timer).into();
    }

    /// The player whose input the game is waiting on, if any.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        match self {
            Self::GameOver(_) => None,
            _ => Some(self.data().current_player),
        }
    }

    /// The turn timer that should currently be scheduled, if any.
    #[must_use]
    pub fn armed_timer(&self) -> Option<TimeoutToken> {
        self.data().timer.armed()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        matches!(self, Self::GameOver(_))
    }

    pub fn take_action(&mut self, player: PlayerId, action: Action) -> Result<(), UserError> {
        match action {
            Action::SubmitBet(amount) => self.submit_bet(player, amount),
            Action::ConfirmBet => self.confirm_bet(player),
            Action::ReadyToRoll => self.ready_to_roll(player),
            Action::Forfeit => self.forfeit(player),
        }
    }

    pub fn submit_bet(&mut self, player: PlayerId, amount: Usd) -> Result<(), UserError> {
        match self {
            Self::Betting(game) => game.validate_bet(player, amount)?,
            _ => return Err(self.out_of_phase(Action::SubmitBet(amount))),
        }
        self.advance(|state| match state {
            Self::Betting(game) => game.place_bet(amount).into(),
            other => other,
        });
        Ok(())
    }

    /// Match the banker's bet. If the confirming player can't cover it the
    /// game still moves on (to a banker win) and the shortfall is returned
    /// as an error.
    pub fn confirm_bet(&mut self, player: PlayerId) -> Result<(), UserError> {
        let (covered, bet) = match self {
            Self::Confirming(game) => {
                game.ensure_turn(player)?;
                (game.can_cover(), game.data.current_bet)
            }
            _ => return Err(self.out_of_phase(Action::ConfirmBet)),
        };
        self.advance(|state| match state {
            Self::Confirming(game) => game.confirm_bet(),
            other => other,
        });
        if covered {
            Ok(())
        } else {
            Err(UserError::InsufficientFunds { bet })
        }
    }

    pub fn ready_to_roll(&mut self, player: PlayerId) -> Result<(), UserError> {
        match self {
            Self::PreRoll(game) => game.ensure_turn(player)?,
            _ => return Err(self.out_of_phase(Action::ReadyToRoll)),
        }
        self.advance(|state| match state {
            Self::PreRoll(game) => game.ready_to_roll().into(),
            other => other,
        });
        Ok(())
    }

    /// Walk away from the table. Either player may forfeit while the game
    /// is waiting on a player; dice in the air have to land first.
    pub fn forfeit(&mut self, player: PlayerId) -> Result<(), UserError> {
        if matches!(self, Self::Rolling(_) | Self::GameOver(_)) {
            return Err(self.out_of_phase(Action::Forfeit));
        }
        self.end_by_forfeit(player, Forfeit::WalkedAway);
        Ok(())
    }

    /// Feed the settled dice for the player currently rolling.
    pub fn resolve_roll(&mut self, roll: Roll) -> Result<Score, UserError> {
        let Self::Rolling(_) = self else {
            return Err(UserError::NoThrowInFlight {
                phase: self.phase(),
            });
        };
        let score = score_roll(&roll);
        self.advance(|state| match state {
            Self::Rolling(game) => game.resolve_roll(roll),
            other => other,
        });
        Ok(score)
    }

    /// Apply the timeout policy if `token` is the timer currently armed.
    /// Whoever's turn it is forfeits.
    pub fn timeout(&mut self, token: TimeoutToken) -> Result<(), UserError> {
        let data = self.data();
        if !data.timer.is_current(&token)
            || token.phase != self.phase()
            || token.player != data.current_player
        {
            return Err(UserError::StaleTimeout);
        }
        self.end_by_forfeit(token.player, Forfeit::TimedOut);
        Ok(())
    }

    fn end_by_forfeit(&mut self, loser: PlayerId, reason: Forfeit) {
        self.advance(|state| match state {
            Self::Betting(game) => game.forfeit(loser, reason).into(),
            Self::Confirming(game) => game.forfeit(loser, reason).into(),
            Self::PreRoll(game) => game.forfeit(loser, reason).into(),
            Self::Rolling(game) => game.forfeit(loser, reason).into(),
            Self::GameOver(game) => game.into(),
        });
    }

    fn out_of_phase(&self, action: Action) -> UserError {
        UserError::OutOfPhase {
            action,
            phase: self.phase(),
        }
    }

    fn advance(&mut self, transition: impl FnOnce(Self) -> Self) {
        let state = std::mem::take(self);
        *self = transition(state);
    }
}
