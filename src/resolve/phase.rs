//! Phase sequencing logic.
//!
//! Determines which turn follows the one just resolved. The cycle is fixed;
//! game configuration only decides whether adjustments and nominations are
//! combined and whether votes ride along with spring orders.

use serde::{Deserialize, Serialize};

use crate::board::TurnPhase;
use crate::config::{GameConfig, NominationTiming};

/// The next turn to open, plus an optional turn that can be prepared early
/// while the pending one (usually retreats) is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTurns {
    pub pending: TurnPhase,
    pub preliminary: Option<TurnPhase>,
}

impl NextTurns {
    fn only(pending: TurnPhase) -> Self {
        NextTurns {
            pending,
            preliminary: None,
        }
    }

    fn with(pending: TurnPhase, preliminary: TurnPhase) -> Self {
        NextTurns {
            pending,
            preliminary: Some(preliminary),
        }
    }
}

/// Computes the turns that follow `phase`.
///
/// Phase flow:
/// - Spring Orders (or Orders and Votes) -> Spring Retreats if dislodged, else Fall Orders
/// - Spring Retreats -> Fall Orders
/// - Fall Orders -> Fall Retreats if dislodged, else Adjustments (combined
///   with Nominations once they have started and the game nominates during
///   adjustments)
/// - Fall Retreats -> Adjustments, combined or followed by Nominations
/// - Adjustments -> Nominations once started, else Spring Orders
/// - Adjustments and Nominations -> Orders and Votes or Spring Orders
/// - Nominations -> Orders and Votes, or Votes followed by Spring Orders
/// - Votes -> Spring Orders
pub fn next_turns(
    phase: TurnPhase,
    units_in_retreat: bool,
    nominations_started: bool,
    nominate_during_adjustments: bool,
    vote_during_spring: bool,
) -> NextTurns {
    let combined = nominations_started && nominate_during_adjustments;
    let adjustments = if combined {
        TurnPhase::AdjustmentsAndNominations
    } else {
        TurnPhase::Adjustments
    };

    match phase {
        TurnPhase::SpringOrders | TurnPhase::OrdersAndVotes => {
            if units_in_retreat {
                NextTurns::with(TurnPhase::SpringRetreats, TurnPhase::FallOrders)
            } else {
                NextTurns::only(TurnPhase::FallOrders)
            }
        }
        TurnPhase::SpringRetreats => NextTurns::only(TurnPhase::FallOrders),
        TurnPhase::FallOrders => {
            if units_in_retreat {
                NextTurns::with(TurnPhase::FallRetreats, adjustments)
            } else {
                NextTurns::only(adjustments)
            }
        }
        TurnPhase::FallRetreats => {
            if nominations_started && !nominate_during_adjustments {
                NextTurns::with(TurnPhase::Adjustments, TurnPhase::Nominations)
            } else {
                NextTurns::only(adjustments)
            }
        }
        TurnPhase::Adjustments => {
            if nominations_started {
                NextTurns::only(TurnPhase::Nominations)
            } else {
                NextTurns::only(TurnPhase::SpringOrders)
            }
        }
        TurnPhase::AdjustmentsAndNominations => {
            if nominations_started && vote_during_spring {
                NextTurns::only(TurnPhase::OrdersAndVotes)
            } else {
                NextTurns::only(TurnPhase::SpringOrders)
            }
        }
        TurnPhase::Nominations => {
            if vote_during_spring {
                NextTurns::only(TurnPhase::OrdersAndVotes)
            } else {
                NextTurns::with(TurnPhase::Votes, TurnPhase::SpringOrders)
            }
        }
        TurnPhase::Votes => NextTurns::only(TurnPhase::SpringOrders),
    }
}

/// Whether coalition nominations are under way at `phase` of `year`.
///
/// Nominations start after the configured year. During the configured year
/// itself they start at Fall Retreats, or at Fall Orders when nobody has to
/// retreat.
pub fn nominations_started(
    config: &GameConfig,
    year: u32,
    phase: TurnPhase,
    units_in_retreat: bool,
) -> bool {
    if config.nomination_timing != NominationTiming::Set {
        return false;
    }
    let Some(start) = config.nomination_year else {
        return false;
    };
    if year > start {
        return true;
    }
    if year < start {
        return false;
    }
    match phase {
        TurnPhase::FallRetreats
        | TurnPhase::Adjustments
        | TurnPhase::AdjustmentsAndNominations
        | TurnPhase::Nominations => true,
        TurnPhase::FallOrders => !units_in_retreat,
        _ => false,
    }
}

/// Calendar year of `next` when it follows a turn of `phase` in `year`.
///
/// The year turns over whenever a new spring begins.
pub fn next_year(phase: TurnPhase, next: TurnPhase, year: u32) -> u32 {
    let spring = matches!(next, TurnPhase::SpringOrders | TurnPhase::OrdersAndVotes);
    let from_spring = matches!(
        phase,
        TurnPhase::SpringOrders | TurnPhase::OrdersAndVotes | TurnPhase::SpringRetreats
    );
    if spring && !from_spring {
        year + 1
    } else {
        year
    }
}

/// Next turns for a resolved turn under a game's configuration.
pub fn schedule(
    config: &GameConfig,
    phase: TurnPhase,
    year: u32,
    units_in_retreat: bool,
) -> NextTurns {
    next_turns(
        phase,
        units_in_retreat,
        nominations_started(config, year, phase, units_in_retreat),
        config.nominate_during_adjustments,
        config.vote_during_spring,
    )
}
