//! Retreat option generation.
//!
//! A dislodged unit may retreat to an adjacent node in a passable province
//! that is not where the attack came from, was not contested last turn, and
//! holds no active unit. It may always disband instead.

use std::collections::BTreeSet;

use crate::board::{Board, NodeId, Unit, UnitStatus};

/// Legal retreat destinations for a unit in `Retreat` status.
///
/// Returns an empty set for units not in retreat.
pub fn retreat_destinations(unit: &Unit, board: &Board) -> BTreeSet<NodeId> {
    let mut destinations = BTreeSet::new();
    if unit.status != UnitStatus::Retreat {
        return destinations;
    }
    let origin = board.unit_province(unit);
    let Some(node) = board.node(unit.node) else {
        return destinations;
    };

    for &adj in &node.adjacent {
        let Some(province) = board.province_of(adj) else {
            continue;
        };
        if Some(province.id) == origin
            || Some(province.id) == unit.displacer
            || !province.province_type.is_passable()
            || !province.valid_retreat
        {
            continue;
        }
        let occupied = board
            .units_in_province(province.id)
            .any(|u| u.status == UnitStatus::Active);
        if !occupied {
            destinations.insert(adj);
        }
    }
    destinations
}
