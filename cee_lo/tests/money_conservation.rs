//! Money conservation tests for whole sessions.
//!
//! Random streams of player actions, settled rolls and timeouts are thrown
//! at a game. Whatever happens, no dollar may be created or destroyed and
//! the pot has to be empty whenever no round is in progress.

use cee_lo::{
    CeeLoState, GameSettings, GameStateManagement,
    entities::{Action, Phase, PlayerId, Roll},
};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Act(PlayerId, Action),
    Settle(Roll),
    Timeout,
}

fn player_strategy() -> impl Strategy<Value = PlayerId> {
    prop_oneof![Just(PlayerId::One), Just(PlayerId::Two)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (player_strategy(), 0u32..=60).prop_map(|(p, amount)| Op::Act(p, Action::SubmitBet(amount))),
        4 => player_strategy().prop_map(|p| Op::Act(p, Action::ConfirmBet)),
        6 => player_strategy().prop_map(|p| Op::Act(p, Action::ReadyToRoll)),
        8 => [1u8..=6, 1u8..=6, 1u8..=6].prop_map(|values| Op::Settle(Roll::from_values(values).unwrap())),
        1 => player_strategy().prop_map(|p| Op::Act(p, Action::Forfeit)),
        1 => Just(Op::Timeout),
    ]
}

fn apply(game: &mut CeeLoState, op: &Op) {
    match op {
        Op::Act(player, action) => {
            let _ = game.take_action(*player, *action);
        }
        Op::Settle(roll) => {
            let _ = game.resolve_roll(*roll);
        }
        Op::Timeout => {
            if let Some(token) = game.armed_timer() {
                game.timeout(token).unwrap();
            }
        }
    }
}

fn settings(starting_balance: u32, max_bet: u32) -> GameSettings {
    GameSettings {
        starting_balance,
        max_bet,
        ..GameSettings::default()
    }
}

proptest! {
    #[test]
    fn test_total_money_is_constant(ops in prop::collection::vec(op_strategy(), 0..300)) {
        let mut game = CeeLoState::default();
        for op in &ops {
            apply(&mut game, op);
            let data = game.data();
            prop_assert_eq!(data.balances[0] + data.balances[1] + data.pot, 200);
        }
    }

    #[test]
    fn test_pot_matches_phase(ops in prop::collection::vec(op_strategy(), 0..300)) {
        let mut game = CeeLoState::default();
        for op in &ops {
            apply(&mut game, op);
            let data = game.data();
            match game.phase() {
                Phase::Betting | Phase::GameOver => prop_assert_eq!(data.pot, 0),
                Phase::Confirming => prop_assert_eq!(data.pot, data.current_bet),
                Phase::PreRoll | Phase::Rolling => prop_assert_eq!(data.pot, 2 * data.current_bet),
            }
        }
    }

    #[test]
    fn test_game_over_always_names_winner(
        balance in 5u32..50,
        ops in prop::collection::vec(op_strategy(), 0..300),
    ) {
        let mut game = CeeLoState::new(settings(balance, balance));
        for op in &ops {
            apply(&mut game, op);
            if game.phase() == Phase::GameOver {
                let winner = game.data().winner;
                prop_assert!(winner.is_some());
                let winner = winner.unwrap();
                prop_assert_eq!(game.data().balance(winner.player), winner.final_balance);
                prop_assert!(game.armed_timer().is_none());
            }
        }
    }

    #[test]
    fn test_one_timer_armed_outside_rolling_and_game_over(
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let mut game = CeeLoState::default();
        for op in &ops {
            apply(&mut game, op);
            let armed = game.armed_timer();
            match game.phase() {
                Phase::Rolling | Phase::GameOver => prop_assert!(armed.is_none()),
                phase => {
                    let token = armed.unwrap();
                    prop_assert_eq!(token.phase, phase);
                    prop_assert_eq!(Some(token.player), game.current_player());
                }
            }
        }
    }
}
