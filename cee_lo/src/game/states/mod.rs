//! Game state definitions for the Cee-Lo FSM.
//!
//! Each state represents a specific phase of a session. The marker types
//! carry no data; everything mutable lives in `GameData`.

use crate::game::entities::Phase;

/// Ties a marker type to the phase it represents.
pub trait PhaseMarker {
    const PHASE: Phase;
}

/// Banker is choosing the bet for the round
#[derive(Debug, Default)]
pub struct Betting {}

/// Non-banker is deciding whether to match the bet
#[derive(Debug)]
pub struct Confirming {}

/// Current player is about to throw the dice
#[derive(Debug)]
pub struct PreRoll {}

/// Dice are in the air; only a settled roll moves the game on
#[derive(Debug)]
pub struct Rolling {}

/// A player was eliminated or forfeited
#[derive(Debug)]
pub struct GameOver {}

impl PhaseMarker for Betting {
    const PHASE: Phase = Phase::Betting;
}

impl PhaseMarker for Confirming {
    const PHASE: Phase = Phase::Confirming;
}

impl PhaseMarker for PreRoll {
    const PHASE: Phase = Phase::PreRoll;
}

impl PhaseMarker for Rolling {
    const PHASE: Phase = Phase::Rolling;
}

impl PhaseMarker for GameOver {
    const PHASE: Phase = Phase::GameOver;
}
