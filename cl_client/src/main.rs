//! A terminal Cee-Lo table for two players sharing one keyboard.
//!
//! The client hosts a session actor in-process, prints its narration as it
//! happens, and forwards each typed command for whichever player the game
//! is waiting on.

use anyhow::{Context, Result};
use cee_lo::{
    dice::{DiceRoller, RandomRoller, TumbleRoller},
    table::{DiceMode, SessionActor, SessionHandle, SessionResponse},
};
use cl_client::{
    commands::{COMMANDS, Command, parse_command},
    config::{ClientConfig, Overrides},
    render::{prompt, render_view},
};
use log::{debug, info};
use pico_args::Arguments;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Play Cee-Lo against a friend at the same terminal

USAGE:
  cl_client [OPTIONS]

OPTIONS:
  --balance DOLLARS     Starting balance per player  [default: 100]
  --max-bet DOLLARS     Table limit for a single bet  [default: 40]
  --turn-secs SECS      Seconds to act before forfeiting  [default: 8]
  --dice MODE           tumble or random  [default: tumble]

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  CEELO_STARTING_BALANCE, CEELO_MAX_BET, CEELO_TURN_SECS, CEELO_EVENT_LOG,
  CEELO_DICE. A .env file in the working directory is read too.
";

const SUBSCRIBER_ID: u64 = 0;
const UPDATE_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        starting_balance: pargs.opt_value_from_str("--balance")?,
        max_bet: pargs.opt_value_from_str("--max-bet")?,
        turn_secs: pargs.opt_value_from_str("--turn-secs")?,
        dice: pargs.opt_value_from_str("--dice")?,
    };

    ctrlc::set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let config = ClientConfig::from_env(overrides).context("invalid configuration")?;
    info!(
        "Opening '{}' (balance ${}, max bet ${}, {}s turns, {} dice)",
        config.session.name,
        config.session.starting_balance,
        config.session.max_bet,
        config.session.turn_time_secs,
        config.session.dice
    );

    let roller: Arc<dyn DiceRoller> = match config.session.dice {
        DiceMode::Tumble => Arc::new(TumbleRoller::real_time()),
        DiceMode::Random => Arc::new(RandomRoller),
    };
    let (actor, handle) = SessionActor::new(config.session, roller);
    tokio::spawn(actor.run());

    let mut updates = handle.subscribe(SUBSCRIBER_ID, UPDATE_BUFFER).await?;
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            if update.events.is_empty() {
                continue;
            }
            for event in &update.events {
                println!("  {event}");
            }
            println!("{}", prompt(&update.view));
        }
    });

    println!("{}", render_view(&handle.view().await?));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::TakeAction(action)) => play(&handle, action).await?,
            Ok(Command::NewGame) => {
                handle.new_game().await?;
            }
            Ok(Command::ShowState { json }) => {
                let view = handle.view().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                } else {
                    println!("{}", render_view(&view));
                }
            }
            Ok(Command::Help) => print!("{COMMANDS}"),
            Ok(Command::Exit) => break,
            Err(error) => println!("{error}"),
        }
    }

    handle.close().await?;
    Ok(())
}

/// Act for the player the table is waiting on.
async fn play(handle: &SessionHandle, action: cee_lo::entities::Action) -> Result<()> {
    let player = handle.view().await?.current_player;
    match handle.take_action(player, action).await? {
        SessionResponse::Success => {}
        SessionResponse::NotYourTurn => println!("It's not {player}'s turn to {action}."),
        SessionResponse::InvalidAction(reason) => println!("{reason}"),
        SessionResponse::Rejected(reason) => debug!("{player} was turned down: {reason}"),
    }
    Ok(())
}
