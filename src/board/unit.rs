//! Unit types, statuses, and ownership.
//!
//! A unit occupies exactly one node. Its status is only changed by the
//! adjudicator while a turn resolves.

use serde::{Deserialize, Serialize};

use super::province::{CountryId, NodeId, ProvinceId};

/// Identifies a unit across turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Army,
    Fleet,
    Wing,
    Garrison,
    Nuke,
}

impl UnitType {
    /// Whether a unit of this type takes control of the province it ends in.
    pub const fn can_capture(self) -> bool {
        matches!(self, UnitType::Army | UnitType::Fleet)
    }

    /// Garrisons never move and receive no option catalogue.
    pub const fn is_passive(self) -> bool {
        matches!(self, UnitType::Garrison)
    }
}

/// Lifecycle status of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    Active,
    Retreat,
    Detonated,
    Nuked,
    DisbandedAdjustment,
    DisbandedRetreat,
    DestroyedRetreat,
}

impl UnitStatus {
    /// Whether the unit is still on the board and can hold a province.
    pub const fn is_present(self) -> bool {
        matches!(self, UnitStatus::Active | UnitStatus::Retreat)
    }
}

/// A military unit on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub country: CountryId,
    pub node: NodeId,
    pub status: UnitStatus,
    /// Province the dislodging attack came from. Only set for retreating units.
    #[serde(default)]
    pub displacer: Option<ProvinceId>,
}
