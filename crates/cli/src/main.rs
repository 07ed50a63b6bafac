mod commands;

use anyhow::{Context, Result};
use commands::{format_hand, help_text, parse_command, Command};
use fivedraw_client::{ClientConfig, FileStore, HttpDeckClient};
use fivedraw_core::{
    Clock, GameController, PersistenceStore, RemoteDeck, SelectionChange, SystemClock, Transition,
};
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("fivedraw error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = ClientConfig::from_env_and_args(&args);
    let state_path = config
        .state_path
        .clone()
        .context("no state file location; pass --state or set HOME")?;
    info!(url = %config.base_url, state = %state_path.display(), "starting");

    let remote = HttpDeckClient::new(&config).context("build deck client")?;
    let store = FileStore::new(state_path);
    let mut controller = GameController::bootstrap(remote, store, SystemClock)
        .with_context(|| format!("could not start a round against {}", config.base_url))?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_repl(&mut controller, stdin.lock(), &mut stdout)
}

fn run_repl<R, S, C>(
    controller: &mut GameController<R, S, C>,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> Result<()>
where
    R: RemoteDeck,
    S: PersistenceStore,
    C: Clock,
{
    writeln!(out, "five-card draw; type help for commands")?;
    print_table(controller, out)?;
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };
        match command {
            Command::Help => writeln!(out, "{}", help_text())?,
            Command::Quit => break,
            Command::Show => print_table(controller, out)?,
            Command::Rank => writeln!(out, "{}", controller.hand_kind())?,
            Command::Toggle(positions) => {
                for position in positions {
                    let note = match controller.toggle_selection(position) {
                        SelectionChange::Added | SelectionChange::Removed => None,
                        SelectionChange::Rejected => Some(format!(
                            "cannot select position {}: a fourth card may only go when the last one kept is an ace",
                            position + 1
                        )),
                        SelectionChange::OutOfRange => {
                            Some(format!("no card at position {}", position + 1))
                        }
                        SelectionChange::Cleared => {
                            Some("already drew this round; restart to play again".to_string())
                        }
                    };
                    if let Some(note) = note {
                        writeln!(out, "{note}")?;
                    }
                }
                print_table(controller, out)?;
            }
            Command::Draw => {
                if !controller.can_draw() {
                    writeln!(out, "already drew this round; restart to play again")?;
                    continue;
                }
                let transition = controller.draw().context("deck service failed during recovery")?;
                report(controller, &transition, out)?;
            }
            Command::Restart => {
                if !controller.can_restart() {
                    writeln!(out, "draw first; restart is available once the round is over")?;
                    continue;
                }
                let transition = controller
                    .restart()
                    .context("deck service failed during recovery")?;
                report(controller, &transition, out)?;
            }
        }
    }
    Ok(())
}

fn report<R, S, C>(
    controller: &GameController<R, S, C>,
    transition: &Transition,
    out: &mut impl Write,
) -> Result<()>
where
    R: RemoteDeck,
    S: PersistenceStore,
    C: Clock,
{
    if let Transition::Recovered(_) = transition {
        writeln!(out, "started a new round on a fresh deck")?;
    }
    print_table(controller, out)
}

fn print_table<R, S, C>(controller: &GameController<R, S, C>, out: &mut impl Write) -> Result<()>
where
    R: RemoteDeck,
    S: PersistenceStore,
    C: Clock,
{
    if let Some(message) = controller.error_message() {
        writeln!(out, "!! {message}")?;
    }
    writeln!(out, "{}", format_hand(controller.hand(), controller.selection()))?;
    let next = if controller.can_draw() {
        "select cards, then draw"
    } else {
        "round over, restart for a new hand"
    };
    writeln!(out, "{} | {next}", controller.hand_kind())?;
    Ok(())
}
