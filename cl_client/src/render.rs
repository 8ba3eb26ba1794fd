//! Plain-text rendering of a game view for the terminal.

use cee_lo::entities::{GameView, Phase, PlayerId};
use std::fmt::Write;

/// The table as a few lines of text.
pub fn render_view(view: &GameView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "--- {} | bet ${} | pot ${} ---",
        view.phase, view.current_bet, view.pot
    );
    for player in PlayerId::ALL {
        let role = if player == view.banker { " (Banker)" } else { "" };
        let last = match (view.roll(player), view.score(player)) {
            (Some(roll), Some(score)) => format!("  rolled {roll} - {score}"),
            _ => String::new(),
        };
        let _ = writeln!(out, "{player}{role}: ${}{last}", view.balance(player));
    }
    out.push_str(&prompt(view));
    out
}

/// What the game is waiting for, and from whom.
pub fn prompt(view: &GameView) -> String {
    let player = view.current_player;
    let clock = format!("[{}s]", view.time_remaining);
    match view.phase {
        Phase::Betting => format!("{player}, place your bet with 'bet N' {clock}"),
        Phase::Confirming => format!(
            "{player}, 'confirm' to match ${} or 'quit' {clock}",
            view.current_bet
        ),
        Phase::PreRoll => format!("{player}, 'roll' when ready {clock}"),
        Phase::Rolling => format!("{player} is rolling the dice..."),
        Phase::GameOver => match view.winner {
            Some(winner) => format!(
                "{} wins with ${}! Type 'new' to play again.",
                winner.player, winner.final_balance
            ),
            None => "Game over. Type 'new' to play again.".to_string(),
        },
    }
}
