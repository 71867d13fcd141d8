//! Engine state management.
//!
//! Holds the game configuration, the loaded turn and its submitted orders
//! between commands, and writes protocol responses.

use std::io::Write;

use serde::Serialize;

use crate::board::Board;
use crate::config::GameConfig;
use crate::movegen::OptionGenerator;
use crate::protocol::ProtocolError;
use crate::resolve::{next_year, resolve_turn, schedule, NextTurns, TurnOrders, TurnOutcome};

/// The turns that follow, as reported by `nextturn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct NextTurnReport {
    #[serde(flatten)]
    turns: NextTurns,
    year: u32,
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub config: GameConfig,
    pub board: Option<Board>,
    pub orders: TurnOrders,
    pub outcome: Option<TurnOutcome>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with the default configuration and no turn loaded.
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Engine {
            config,
            board: None,
            orders: TurnOrders::default(),
            outcome: None,
        }
    }

    /// Replaces the configuration from a JSON document.
    pub fn set_config(&mut self, json: &str) -> Result<(), ProtocolError> {
        self.config = GameConfig::from_json_str(json)?;
        Ok(())
    }

    /// Loads a turn snapshot, clearing orders and any previous outcome.
    pub fn set_snapshot(&mut self, json: &str) -> Result<(), ProtocolError> {
        let snapshot = serde_json::from_str(json).map_err(|source| ProtocolError::Payload {
            command: "snapshot",
            source,
        })?;
        self.board = Some(Board::new(snapshot)?);
        self.orders = TurnOrders::default();
        self.outcome = None;
        Ok(())
    }

    pub fn set_orders(&mut self, json: &str) -> Result<(), ProtocolError> {
        self.require_board("orders")?;
        self.orders.units = parse_payload("orders", json)?;
        Ok(())
    }

    pub fn set_adjustments(&mut self, json: &str) -> Result<(), ProtocolError> {
        self.require_board("adjustments")?;
        self.orders.adjustments = parse_payload("adjustments", json)?;
        Ok(())
    }

    pub fn set_transfers(&mut self, json: &str) -> Result<(), ProtocolError> {
        self.require_board("transfers")?;
        self.orders.transfers = parse_payload("transfers", json)?;
        Ok(())
    }

    fn require_board(&self, command: &'static str) -> Result<&Board, ProtocolError> {
        self.board.as_ref().ok_or(ProtocolError::NoSnapshot(command))
    }

    /// Handles the handshake: writes id, protocol version and `hegemonok`.
    pub fn handle_hello<W: Write>(&self, out: &mut W) -> Result<(), ProtocolError> {
        writeln!(out, "id name hegemon {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "protocol_version 1")?;
        writeln!(out, "hegemonok")?;
        out.flush()?;
        Ok(())
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> Result<(), ProtocolError> {
        writeln!(out, "readyok")?;
        out.flush()?;
        Ok(())
    }

    /// Writes `options <json>` with every catalogue of the loaded turn.
    pub fn handle_options<W: Write>(&self, out: &mut W) -> Result<(), ProtocolError> {
        let board = self.require_board("options")?;
        let options = OptionGenerator::new(board).generate();
        respond(out, "options", &options)
    }

    /// Resolves the loaded turn and writes `resolution <json>`.
    pub fn handle_resolve<W: Write>(&mut self, out: &mut W) -> Result<(), ProtocolError> {
        let board = self.require_board("resolve")?;
        let outcome = resolve_turn(board, &self.config, &self.orders);
        respond(out, "resolution", &outcome)?;
        self.outcome = Some(outcome);
        Ok(())
    }

    /// Writes `nextturn <json>` for the resolved turn.
    pub fn handle_nextturn<W: Write>(&self, out: &mut W) -> Result<(), ProtocolError> {
        let report = match &self.outcome {
            Some(outcome) => NextTurnReport {
                turns: outcome.next,
                year: outcome.next_year,
            },
            None => {
                let board = self.require_board("nextturn")?;
                let turn = board.turn();
                if turn.phase.has_unit_orders() || turn.phase.is_retreat() {
                    return Err(ProtocolError::NotResolved);
                }
                let turns = schedule(&self.config, turn.phase, turn.year, turn.units_in_retreat);
                NextTurnReport {
                    turns,
                    year: next_year(turn.phase, turns.pending, turn.year),
                }
            }
        };
        respond(out, "nextturn", &report)
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(
    command: &'static str,
    json: &str,
) -> Result<T, ProtocolError> {
    serde_json::from_str(json).map_err(|source| ProtocolError::Payload { command, source })
}

fn respond<W: Write, T: Serialize>(
    out: &mut W,
    keyword: &'static str,
    body: &T,
) -> Result<(), ProtocolError> {
    let json = serde_json::to_string(body).map_err(|source| ProtocolError::Payload {
        command: keyword,
        source,
    })?;
    writeln!(out, "{} {}", keyword, json)?;
    out.flush()?;
    Ok(())
}
