//! Pure scoring and settlement functions.

use std::cmp::Ordering;

use super::entities::{PlayerId, Roll, RoundOutcome, Score, Usd};

/// Score three dice.
///
/// The special runs are checked before anything else: 4-5-6 wins outright,
/// then 1-2-3 loses outright. Otherwise matching dice decide the score.
#[must_use]
pub fn score_roll(roll: &Roll) -> Score {
    if roll.contains(4) && roll.contains(5) && roll.contains(6) {
        return Score::AutoWin;
    }
    if roll.contains(1) && roll.contains(2) && roll.contains(3) {
        return Score::AutoLoss;
    }

    let [high, mid, low] = roll.sorted_desc();
    if high == mid && mid == low {
        Score::Trips(high)
    } else if high == mid {
        Score::Point(low)
    } else if mid == low {
        Score::Point(high)
    } else {
        Score::NoScore
    }
}

/// Decide a round from both players' latest scores.
///
/// A player without a recorded score is treated as having no score.
#[must_use]
pub fn decide_round(scores: [Option<Score>; 2]) -> RoundOutcome {
    let [one, two] = scores.map(|score| score.unwrap_or(Score::NoScore));
    match one.cmp(&two) {
        Ordering::Greater => RoundOutcome::Winner(PlayerId::One),
        Ordering::Less => RoundOutcome::Winner(PlayerId::Two),
        Ordering::Equal => RoundOutcome::Tie,
    }
}

/// Split a pot evenly between both players. An odd unit goes to the banker.
#[must_use]
pub fn split_pot(pot: Usd, banker: PlayerId) -> [Usd; 2] {
    let half = pot / 2;
    let mut shares = [half, half];
    shares[banker.index()] += pot % 2;
    shares
}
