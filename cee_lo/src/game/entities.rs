use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::VecDeque,
    fmt::{self},
};
use thiserror::Error;

use super::constants::{self, LOSS_SENTINEL, WIN_SENTINEL};

/// Type alias for whole dollars. Balances, bets, and the pot are all
/// whole dollars and can never go negative.
pub type Usd = u32;

/// One of the two local players sharing a session.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Position of the player's slot in per-player arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Errors converting raw values coming from a dice collaborator.
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum DiceError {
    #[error("die face {0} is outside 1-6")]
    InvalidFace(u8),
    #[error("expected 3 dice, got {0}")]
    WrongDiceCount(usize),
}

/// The value showing on top of a settled die. Always within 1..=6.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DieFace(u8);

impl DieFace {
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);
    pub const THREE: Self = Self(3);
    pub const FOUR: Self = Self(4);
    pub const FIVE: Self = Self(5);
    pub const SIX: Self = Self(6);

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DieFace {
    type Error = DiceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=6 => Ok(Self(value)),
            _ => Err(DiceError::InvalidFace(value)),
        }
    }
}

impl From<DieFace> for u8 {
    fn from(value: DieFace) -> Self {
        value.0
    }
}

impl fmt::Display for DieFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Three settled dice, in the order the collaborator reported them.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Roll(pub [DieFace; 3]);

impl Roll {
    #[must_use]
    pub const fn new(faces: [DieFace; 3]) -> Self {
        Self(faces)
    }

    pub fn from_values(values: [u8; 3]) -> Result<Self, DiceError> {
        let [a, b, c] = values;
        Ok(Self([a.try_into()?, b.try_into()?, c.try_into()?]))
    }

    #[must_use]
    pub fn values(&self) -> [u8; 3] {
        self.0.map(DieFace::value)
    }

    #[must_use]
    pub fn contains(&self, value: u8) -> bool {
        self.0.iter().any(|face| face.value() == value)
    }

    /// Faces sorted from highest to lowest.
    #[must_use]
    pub fn sorted_desc(&self) -> [u8; 3] {
        let mut values = self.values();
        values.sort_unstable_by(|a, b| b.cmp(a));
        values
    }
}

impl TryFrom<&[u8]> for Roll {
    type Error = DiceError;

    fn try_from(values: &[u8]) -> Result<Self, Self::Error> {
        match values {
            [a, b, c] => Self::from_values([*a, *b, *c]),
            _ => Err(DiceError::WrongDiceCount(values.len())),
        }
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}, {b}, {c}")
    }
}

/// Outcome of scoring a single roll.
///
/// Scores compare by their integer value, so the auto-win sentinel beats
/// everything, trips beat any point, and the auto-loss sentinel loses to
/// everything.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Score {
    /// 4-5-6 in any order.
    AutoWin,
    /// 1-2-3 in any order.
    AutoLoss,
    /// All three dice match.
    Trips(u8),
    /// Two dice match; the point is the odd die out.
    Point(u8),
    /// Three distinct dice that aren't a special run. Roll again.
    NoScore,
}

impl Score {
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::AutoWin => WIN_SENTINEL,
            Self::AutoLoss => LOSS_SENTINEL,
            Self::Trips(face) => face as i32 * 10,
            Self::Point(point) => point as i32,
            Self::NoScore => 0,
        }
    }

    /// Table talk shown next to the label in the narration log.
    #[must_use]
    pub const fn flavor(self) -> &'static str {
        match self {
            Self::AutoWin => "You're golden, automatic win",
            Self::AutoLoss => "Busted, automatic loss",
            Self::Trips(_) => "Trips beat any point",
            Self::Point(_) => "Beat it if you can",
            Self::NoScore => "Roll again",
        }
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoWin => write!(f, "4-5-6"),
            Self::AutoLoss => write!(f, "1-2-3"),
            Self::Trips(face) => write!(f, "Trips-{face}"),
            Self::Point(point) => write!(f, "Point is {point}"),
            Self::NoScore => write!(f, "No score"),
        }
    }
}

/// Phase of a session. Each phase names exactly one expected actor
/// (except `GameOver`, which expects none).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Betting,
    Confirming,
    PreRoll,
    Rolling,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Betting => "betting",
            Self::Confirming => "confirming",
            Self::PreRoll => "pre-roll",
            Self::Rolling => "rolling",
            Self::GameOver => "game over",
        };
        write!(f, "{repr}")
    }
}

/// Inputs a player can make from the action surface.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    SubmitBet(Usd),
    ConfirmBet,
    ReadyToRoll,
    Forfeit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SubmitBet(amount) => write!(f, "bet ${amount}"),
            Self::ConfirmBet => write!(f, "confirm the bet"),
            Self::ReadyToRoll => write!(f, "roll"),
            Self::Forfeit => write!(f, "walk away"),
        }
    }
}

/// How a round ended.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RoundOutcome {
    Winner(PlayerId),
    Tie,
}

/// Payload of the win screen.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameWinner {
    pub player: PlayerId,
    pub final_balance: Usd,
}

/// Human-readable narration, newest first, bounded in size.
#[derive(Clone, Debug)]
pub struct EventLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(constants::EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, entry: String) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Snapshot of a session for a presentation layer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameView {
    pub balances: [Usd; 2],
    pub banker: PlayerId,
    pub current_player: PlayerId,
    pub current_bet: Usd,
    pub pot: Usd,
    pub phase: Phase,
    pub scores: [Option<Score>; 2],
    pub rolls: [Option<Roll>; 2],
    pub time_remaining: u32,
    pub winner: Option<GameWinner>,
    /// Narration, newest first.
    pub events: Vec<String>,
}

impl GameView {
    #[must_use]
    pub fn balance(&self, player: PlayerId) -> Usd {
        self.balances[player.index()]
    }

    #[must_use]
    pub fn score(&self, player: PlayerId) -> Option<Score> {
        self.scores[player.index()]
    }

    #[must_use]
    pub fn roll(&self, player: PlayerId) -> Option<Roll> {
        self.rolls[player.index()]
    }
}
