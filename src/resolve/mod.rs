//! Turn resolution.
//!
//! Resolves one turn's submitted orders into outcomes and derives everything
//! storage needs to open the next turn: unit positions, province rows, the
//! country ledger and the next phase. Unit orders go through option
//! classification and the staged [`Adjudicator`]; retreats, adjustments and
//! transfers each have their own resolver.

pub mod adjudicator;
pub mod build;
pub mod classify;
pub mod dependency;
pub mod history;
pub mod phase;
pub mod retreat;
pub mod transfer;

use std::collections::BTreeMap;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::{
    Board, CountryId, CountryLedger, Order, ResolvedOrder, SnapshotError, TurnPhase,
    TurnSnapshot, Unit, UnitStatus,
};
use crate::config::GameConfig;
use crate::movegen::OptionGenerator;

pub use adjudicator::{Adjudication, Adjudicator};
pub use build::{resolve_adjustments, AdjustmentOrder, AdjustmentResolution, AdjustmentResult};
pub use classify::{Classification, OrderBuckets, OrderClassifier};
pub use dependency::{Dependency, DependencyGraph, ForcedFailure};
pub use history::{derive_history, ProvinceHistory};
pub use phase::{next_turns, next_year, nominations_started, schedule, NextTurns};
pub use retreat::{resolve_retreats, RetreatResolution};
pub use transfer::{resolve_transfers, TransferOrder, TransferResult};

/// Everything submitted for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnOrders {
    pub units: Vec<Order>,
    pub adjustments: Vec<AdjustmentOrder>,
    pub transfers: Vec<TransferOrder>,
}

/// A turn snapshot with its orders, as handed over for batch resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInput {
    pub snapshot: TurnSnapshot,
    #[serde(default)]
    pub orders: TurnOrders,
}

/// The complete result of resolving one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub game_id: u32,
    pub phase: TurnPhase,
    pub year: u32,
    pub orders: Vec<ResolvedOrder>,
    pub adjustments: Vec<AdjustmentResult>,
    pub transfers: Vec<TransferResult>,
    /// Every unit after resolution, including newly built ones.
    pub units: Vec<Unit>,
    pub provinces: Vec<ProvinceHistory>,
    pub countries: Vec<CountryLedger>,
    pub units_in_retreat: bool,
    pub next: NextTurns,
    pub next_year: u32,
    pub dependency_cycles: usize,
}

/// Resolves unit orders for an orders turn.
pub fn adjudicate(board: &Board, orders: &[Order]) -> Adjudication {
    let options = OptionGenerator::new(board).generate();
    let classification = OrderClassifier::new(board, &options).classify(orders);
    Adjudicator::new(board, classification).resolve()
}

/// Resolves every part of one turn in phase order.
pub fn resolve_turn(board: &Board, config: &GameConfig, orders: &TurnOrders) -> TurnOutcome {
    let turn = *board.turn();
    let mut ledgers: BTreeMap<CountryId, CountryLedger> = board
        .ledgers()
        .iter()
        .map(|l| (l.country, l.clone()))
        .collect();

    let mut resolved = Vec::new();
    let mut units = board.units().to_vec();
    let mut cycles = 0;

    if turn.phase.has_unit_orders() {
        let adjudication = adjudicate(board, &orders.units);
        cycles = adjudication.dependency_cycles;
        resolved = adjudication.orders;
        units = adjudication.units;
    } else if turn.phase.is_retreat() {
        let options = OptionGenerator::new(board).generate();
        let classification = OrderClassifier::new(board, &options).classify(&orders.units);
        let retreats = resolve_retreats(board, classification);
        resolved = retreats.orders;
        units = retreats.units;
    }

    let provinces = if turn.phase.has_unit_orders() || turn.phase.is_retreat() {
        derive_history(board, &resolved, &units, &mut ledgers)
    } else {
        Vec::new()
    };

    let transfers = if turn.phase.has_transfers() {
        resolve_transfers(&orders.transfers, &mut ledgers, config.default_nuke_range)
    } else {
        Vec::new()
    };

    let mut adjustments = Vec::new();
    if turn.phase.has_adjustments() {
        let outcome = resolve_adjustments(board, &orders.adjustments, &mut ledgers);
        adjustments = outcome.results;
        units = outcome.units;
        units.extend(outcome.built);
    }

    let units_in_retreat = units.iter().any(|u| u.status == UnitStatus::Retreat);
    let next = schedule(config, turn.phase, turn.year, units_in_retreat);
    debug!(
        "game {} {} {}: {} order(s), next {}",
        board.snapshot().game_id,
        turn.phase.display_name(),
        turn.year,
        resolved.len(),
        next.pending.display_name()
    );

    TurnOutcome {
        game_id: board.snapshot().game_id,
        phase: turn.phase,
        year: turn.year,
        orders: resolved,
        adjustments,
        transfers,
        units,
        provinces,
        countries: ledgers.into_values().collect(),
        units_in_retreat,
        next,
        next_year: next_year(turn.phase, next.pending, turn.year),
        dependency_cycles: cycles,
    }
}

/// Resolves independent turns concurrently.
///
/// Results come back in input order. A snapshot that fails validation yields
/// its error without affecting the others.
pub fn resolve_many(
    inputs: &[TurnInput],
    config: &GameConfig,
) -> Vec<Result<TurnOutcome, SnapshotError>> {
    inputs
        .par_iter()
        .map(|input| {
            let board = Board::new(input.snapshot.clone())?;
            Ok(resolve_turn(&board, config, &input.orders))
        })
        .collect()
}
