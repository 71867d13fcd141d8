//! Line protocol command parser.
//!
//! Parses incoming protocol commands from raw text into structured
//! `Command` variants that the engine main loop can dispatch on. Commands
//! that carry data take a single JSON document after the keyword; the
//! document is handed to the engine unparsed.

use crate::board::SnapshotError;
use crate::config::ConfigError;

/// Errors raised while parsing or executing protocol commands.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown command: '{0}'")]
    UnknownCommand(String),

    #[error("'{0}' expects a JSON payload")]
    MissingPayload(&'static str),

    #[error("malformed {command} payload: {source}")]
    Payload {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("'{0}' requires a snapshot")]
    NoSnapshot(&'static str),

    #[error("'nextturn' requires a resolved turn")]
    NotResolved,

    #[error("failed to write response: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Protocol handshake; the engine identifies itself.
    Hello,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Replace the game configuration.
    Config { json: String },

    /// Load a turn snapshot. Clears any submitted orders.
    Snapshot { json: String },

    /// Submit unit orders for the loaded turn.
    Orders { json: String },

    /// Submit adjustment orders for the loaded turn.
    Adjustments { json: String },

    /// Submit transfer orders for the loaded turn.
    Transfers { json: String },

    /// Emit the option catalogues for the loaded turn.
    Options,

    /// Resolve the loaded turn.
    Resolve,

    /// Emit the turns that follow the resolved turn.
    NextTurn,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (trimmed, ""),
    };

    let command = match keyword {
        "hegemon" => Command::Hello,
        "isready" => Command::IsReady,
        "options" => Command::Options,
        "resolve" => Command::Resolve,
        "nextturn" => Command::NextTurn,
        "quit" => Command::Quit,

        "config" => Command::Config {
            json: payload("config", rest)?,
        },
        "snapshot" => Command::Snapshot {
            json: payload("snapshot", rest)?,
        },
        "orders" => Command::Orders {
            json: payload("orders", rest)?,
        },
        "adjustments" => Command::Adjustments {
            json: payload("adjustments", rest)?,
        },
        "transfers" => Command::Transfers {
            json: payload("transfers", rest)?,
        },

        other => return Err(ProtocolError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn payload(command: &'static str, rest: &str) -> Result<String, ProtocolError> {
    if rest.is_empty() {
        Err(ProtocolError::MissingPayload(command))
    } else {
        Ok(rest.to_string())
    }
}
