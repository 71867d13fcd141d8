//! Hegemon -- a turn adjudication engine speaking a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Diagnostics go to stderr through `env_logger` (`RUST_LOG=debug` for
//! stage summaries).

use std::io::{self, BufRead};

use log::error;

use hegemon::engine::Engine;
use hegemon::protocol::{parse_command, Command, ProtocolError};

/// Dispatches one command. Returns `false` when the loop should stop.
fn dispatch<W: io::Write>(
    engine: &mut Engine,
    cmd: Command,
    out: &mut W,
) -> Result<bool, ProtocolError> {
    match cmd {
        Command::Hello => engine.handle_hello(out)?,
        Command::IsReady => engine.handle_isready(out)?,
        Command::Config { json } => engine.set_config(&json)?,
        Command::Snapshot { json } => engine.set_snapshot(&json)?,
        Command::Orders { json } => engine.set_orders(&json)?,
        Command::Adjustments { json } => engine.set_adjustments(&json)?,
        Command::Transfers { json } => engine.set_transfers(&json)?,
        Command::Options => engine.handle_options(out)?,
        Command::Resolve => engine.handle_resolve(out)?,
        Command::NextTurn => engine.handle_nextturn(out)?,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() {
    env_logger::init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                error!("{}", e);
                continue;
            }
        };

        match dispatch(&mut engine, cmd, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(ProtocolError::Io(e)) => {
                error!("stdout closed: {}", e);
                break;
            }
            Err(e) => error!("{}", e),
        }
    }
}
