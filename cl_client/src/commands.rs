use cee_lo::entities::{Action, Usd};
use std::fmt;

/// Commands typed at the shared keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Act for whichever player the game is waiting on.
    TakeAction(Action),
    NewGame,
    ShowState { json: bool },
    Help,
    Exit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Bet amount isn't a whole number of dollars.
    InvalidBetAmount(String),
    /// Bet command without an amount.
    MissingBetAmount,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBetAmount(value) => write!(
                f,
                "Invalid bet amount '{}'. Must be a whole number of dollars (e.g., 'bet 10')",
                value
            ),
            Self::MissingBetAmount => write!(f, "Bet requires an amount (e.g., 'bet 10')"),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const COMMANDS: &str = "\
COMMANDS:
  bet N          Banker places a bet of $N
  confirm        Match the banker's bet
  roll           Throw the dice
  quit           Walk away from the table (forfeit)
  new            Start a new game
  state [--json] Show the table
  help           Show this list
  exit           Leave the program
";

/// Parse a command string into a Command.
///
/// # Examples
///
/// ```
/// use cl_client::commands::{Command, parse_command};
/// use cee_lo::entities::Action;
///
/// assert_eq!(parse_command("roll"), Ok(Command::TakeAction(Action::ReadyToRoll)));
/// assert_eq!(parse_command("bet 10"), Ok(Command::TakeAction(Action::SubmitBet(10))));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    match trimmed {
        "confirm" => return Ok(Command::TakeAction(Action::ConfirmBet)),
        "roll" => return Ok(Command::TakeAction(Action::ReadyToRoll)),
        "quit" => return Ok(Command::TakeAction(Action::Forfeit)),
        "new" => return Ok(Command::NewGame),
        "state" => return Ok(Command::ShowState { json: false }),
        "help" => return Ok(Command::Help),
        "exit" => return Ok(Command::Exit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.as_slice() {
        ["bet", amount] => amount
            .parse::<Usd>()
            .map(|amount| Command::TakeAction(Action::SubmitBet(amount)))
            .map_err(|_| ParseError::InvalidBetAmount(amount.to_string())),
        ["bet"] => Err(ParseError::MissingBetAmount),
        ["state", "--json"] => Ok(Command::ShowState { json: true }),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}
