//! Integration tests for complete Cee-Lo sessions.
//!
//! Tests full rounds from bet to payout, banker rotation, elimination,
//! forfeits and the turn timeout policy.

use cee_lo::{
    CeeLoState, GameEvent, GameSettings, GameStateManagement, UserError,
    entities::{Action, GameWinner, Phase, PlayerId, Roll, Score},
};

fn roll(values: [u8; 3]) -> Roll {
    Roll::from_values(values).unwrap()
}

/// Bet and confirm `bet`, then feed `rolls` in order to whoever is up to
/// throw.
fn play_round(game: &mut CeeLoState, bet: u32, rolls: &[[u8; 3]]) {
    let banker = game.data().banker;
    game.take_action(banker, Action::SubmitBet(bet)).unwrap();
    game.take_action(banker.opponent(), Action::ConfirmBet)
        .unwrap();
    for values in rolls {
        let player = game.current_player().unwrap();
        game.take_action(player, Action::ReadyToRoll).unwrap();
        game.resolve_roll(roll(*values)).unwrap();
    }
}

#[test]
fn test_full_round_banker_auto_win() {
    let mut game = CeeLoState::default();

    game.submit_bet(PlayerId::One, 10).unwrap();
    assert_eq!(game.data().balances, [90, 100]);
    assert_eq!(game.data().pot, 10);

    game.confirm_bet(PlayerId::Two).unwrap();
    assert_eq!(game.data().balances, [90, 90]);
    assert_eq!(game.data().pot, 20);
    assert_eq!(game.current_player(), Some(PlayerId::Two));

    game.ready_to_roll(PlayerId::Two).unwrap();
    assert_eq!(game.resolve_roll(roll([3, 3, 4])), Ok(Score::Point(4)));
    assert_eq!(game.current_player(), Some(PlayerId::One));

    game.ready_to_roll(PlayerId::One).unwrap();
    assert_eq!(game.resolve_roll(roll([4, 5, 6])), Ok(Score::AutoWin));

    let view = game.get_view();
    assert_eq!(view.balances, [110, 90]);
    assert_eq!(view.pot, 0);
    assert_eq!(view.phase, Phase::Betting);
    assert_eq!(view.banker, PlayerId::Two);
    assert_eq!(view.current_player, PlayerId::Two);
    assert_eq!(view.current_bet, 1);
}

#[test]
fn test_round_narration() {
    let mut game = CeeLoState::default();
    play_round(&mut game, 10, &[[3, 3, 4], [4, 5, 6]]);

    let events: Vec<String> = game.drain_events().iter().map(ToString::to_string).collect();
    assert_eq!(
        events,
        vec![
            "After-Hours Cee-Lo! Player 1 is the banker. Initial bet is $1. Max bet is $40. Let's roll!",
            "Player 1 (Banker) places a bet of $10.",
            "Player 2 accepts the $10 bet. Total pot: $20",
            "Player 2 is ready to roll.",
            "Player 2 rolled: 3, 3, 4 - Point is 4 (Beat it if you can)",
            "Banker (Player 1) now prepares to roll.",
            "Player 1 is ready to roll.",
            "Player 1 rolled: 4, 5, 6 - 4-5-6 (You're golden, automatic win)",
            "Player 1 automatically wins this round.",
            "Player 1 wins the round and takes the pot: $20!",
            "Final rolls - Player 1: 4, 5, 6, Player 2: 3, 3, 4",
            "New round! Player 2 is now the banker. Initial bet is $1.",
        ]
    );
}

#[test]
fn test_event_log_keeps_ten_newest() {
    let mut game = CeeLoState::default();
    play_round(&mut game, 10, &[[3, 3, 4], [4, 5, 6]]);

    let view = game.get_view();
    assert_eq!(view.events.len(), 10);
    assert_eq!(
        view.events[0],
        "New round! Player 2 is now the banker. Initial bet is $1."
    );
    assert_eq!(view.events[9], "Player 2 accepts the $10 bet. Total pot: $20");
}

#[test]
fn test_invalid_bets_keep_betting() {
    let mut game = CeeLoState::default();

    assert_eq!(
        game.submit_bet(PlayerId::One, 0),
        Err(UserError::BetOutOfRange { max_bet: 40 })
    );
    assert_eq!(
        game.submit_bet(PlayerId::One, 41),
        Err(UserError::BetOutOfRange { max_bet: 40 })
    );

    let view = game.get_view();
    assert_eq!(view.phase, Phase::Betting);
    assert_eq!(view.balances, [100, 100]);
    assert_eq!(view.pot, 0);
    assert_eq!(view.events[0], "Invalid bet! Keep it between $1 and $40.");
}

#[test]
fn test_banker_short_on_cash() {
    let mut game = CeeLoState::new(GameSettings {
        starting_balance: 20,
        max_bet: 20,
        ..GameSettings::default()
    });
    // Player 1 loses 15 in the first round, then banks for player 2.
    play_round(&mut game, 15, &[[6, 6, 5], [1, 1, 2]]);
    assert_eq!(game.data().balances, [5, 35]);

    // Player 2 is the banker now and can't bet more than player 1 holds.
    assert_eq!(
        game.submit_bet(PlayerId::Two, 10),
        Err(UserError::OpponentCannotCover { available: 5 })
    );
    assert_eq!(
        game.get_view().events[0],
        "The other player doesn't have enough money to match this bet. Maximum bet: $5."
    );
}

#[test]
fn test_no_score_rolls_again_until_point() {
    let mut game = CeeLoState::default();
    play_round(&mut game, 5, &[[1, 3, 5], [2, 4, 6], [2, 2, 6]]);

    assert_eq!(game.phase(), Phase::PreRoll);
    assert_eq!(game.current_player(), Some(PlayerId::One));
    assert_eq!(game.data().scores[1], Some(Score::Point(6)));
    assert_eq!(game.data().rolls[1], Some(roll([2, 2, 6])));
}

#[test]
fn test_banker_trips_beat_point() {
    let mut game = CeeLoState::default();
    play_round(&mut game, 20, &[[5, 5, 6], [2, 2, 2]]);
    assert_eq!(game.data().balances, [120, 80]);
}

#[test]
fn test_tie_returns_stakes() {
    let mut game = CeeLoState::default();
    play_round(&mut game, 7, &[[4, 4, 3], [3, 1, 1]]);

    assert_eq!(game.data().balances, [100, 100]);
    assert_eq!(game.data().pot, 0);
    assert_eq!(game.data().banker, PlayerId::Two);
}

#[test]
fn test_non_banker_auto_loss_ends_round_immediately() {
    let mut game = CeeLoState::default();
    play_round(&mut game, 10, &[[2, 1, 3]]);

    assert_eq!(game.data().balances, [110, 90]);
    assert_eq!(game.phase(), Phase::Betting);
}

#[test]
fn test_banker_auto_loss_pays_non_banker() {
    let mut game = CeeLoState::default();
    play_round(&mut game, 10, &[[6, 6, 1], [1, 2, 3]]);
    assert_eq!(game.data().balances, [90, 110]);
}

#[test]
fn test_elimination_ends_game() {
    let mut game = CeeLoState::new(GameSettings {
        starting_balance: 40,
        ..GameSettings::default()
    });
    play_round(&mut game, 40, &[[6, 5, 4]]);

    assert_eq!(game.phase(), Phase::GameOver);
    assert_eq!(game.current_player(), None);
    assert_eq!(
        game.data().winner,
        Some(GameWinner {
            player: PlayerId::Two,
            final_balance: 80
        })
    );
    assert_eq!(
        game.get_view().events[0],
        "Game Over! Player 2 wins with $80!"
    );
}

#[test]
fn test_rounds_alternate_banker() {
    let mut game = CeeLoState::default();
    let mut expected = PlayerId::One;
    for _ in 0..4 {
        assert_eq!(game.data().banker, expected);
        play_round(&mut game, 1, &[[5, 5, 3], [3, 3, 5]]);
        expected = expected.opponent();
    }
    assert_eq!(game.data().balances, [100, 100]);
}

// === Forfeit and Timeout Tests ===

#[test]
fn test_forfeit_during_confirming_returns_bet_to_banker() {
    let mut game = CeeLoState::default();
    game.submit_bet(PlayerId::One, 25).unwrap();
    game.take_action(PlayerId::Two, Action::Forfeit).unwrap();

    let view = game.get_view();
    assert_eq!(view.phase, Phase::GameOver);
    assert_eq!(view.balances, [100, 100]);
    assert_eq!(view.winner.map(|w| w.player), Some(PlayerId::One));
    assert!(view.events.contains(&"Player 2 walks away. Game Over!".to_string()));
}

#[test]
fn test_confirming_timeout_forfeits_non_banker() {
    let mut game = CeeLoState::default();
    game.submit_bet(PlayerId::One, 10).unwrap();
    let token = game.armed_timer().unwrap();
    assert_eq!(token.phase, Phase::Confirming);
    assert_eq!(token.player, PlayerId::Two);

    game.timeout(token).unwrap();

    let events: Vec<GameEvent> = game.drain_events().into();
    assert!(events.contains(&GameEvent::TimedOut(PlayerId::Two)));
    assert!(events.contains(&GameEvent::ConfirmStalled(PlayerId::Two)));
    assert!(events.contains(&GameEvent::Refunded {
        player: PlayerId::One,
        amount: 10
    }));
    assert_eq!(game.data().balances, [100, 100]);
    assert_eq!(game.data().winner.map(|w| w.player), Some(PlayerId::One));
}

#[test]
fn test_banker_pre_roll_timeout_refunds_both() {
    let mut game = CeeLoState::default();
    play_round(&mut game, 10, &[[3, 3, 4]]);
    assert_eq!(game.current_player(), Some(PlayerId::One));

    let token = game.armed_timer().unwrap();
    game.timeout(token).unwrap();

    assert_eq!(game.data().balances, [100, 100]);
    assert_eq!(game.data().winner.map(|w| w.player), Some(PlayerId::Two));
}

#[test]
fn test_timeout_after_acting_is_stale() {
    let mut game = CeeLoState::default();
    play_round(&mut game, 10, &[]);
    let token = game.armed_timer().unwrap();
    game.ready_to_roll(PlayerId::Two).unwrap();

    assert_eq!(game.timeout(token), Err(UserError::StaleTimeout));
    assert_eq!(game.phase(), Phase::Rolling);
    assert_eq!(game.data().pot, 20);
}

#[test]
fn test_out_of_turn_actions_change_nothing() {
    let mut game = CeeLoState::default();
    game.submit_bet(PlayerId::One, 10).unwrap();
    let before = game.get_view();

    assert_eq!(
        game.take_action(PlayerId::One, Action::ConfirmBet),
        Err(UserError::OutOfTurnAction)
    );
    assert!(matches!(
        game.take_action(PlayerId::Two, Action::ReadyToRoll),
        Err(UserError::OutOfPhase { .. })
    ));
    assert_eq!(game.get_view(), before);
}
