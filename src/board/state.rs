//! Turn snapshot and its validated, indexed view.
//!
//! `TurnSnapshot` is the plain data handed over by storage for one turn of
//! one game: map graph, units, transport and air adjacency, and the prior
//! country ledger. `Board` validates every cross reference once and then
//! serves id lookups to the option generator and the adjudicator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::province::{CountryId, Node, NodeId, Province, ProvinceId};
use super::unit::{Unit, UnitId};

/// The fixed cycle of turn phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    SpringOrders,
    SpringRetreats,
    FallOrders,
    FallRetreats,
    Adjustments,
    Nominations,
    AdjustmentsAndNominations,
    Votes,
    OrdersAndVotes,
}

impl TurnPhase {
    pub const ALL: [TurnPhase; 9] = [
        TurnPhase::SpringOrders,
        TurnPhase::SpringRetreats,
        TurnPhase::FallOrders,
        TurnPhase::FallRetreats,
        TurnPhase::Adjustments,
        TurnPhase::Nominations,
        TurnPhase::AdjustmentsAndNominations,
        TurnPhase::Votes,
        TurnPhase::OrdersAndVotes,
    ];

    /// Human-readable phase name used in turn titles.
    pub const fn display_name(self) -> &'static str {
        match self {
            TurnPhase::SpringOrders => "Spring Orders",
            TurnPhase::SpringRetreats => "Spring Retreats",
            TurnPhase::FallOrders => "Fall Orders",
            TurnPhase::FallRetreats => "Fall Retreats",
            TurnPhase::Adjustments => "Adjustments",
            TurnPhase::Nominations => "Nominations",
            TurnPhase::AdjustmentsAndNominations => "Adjustments and Nominations",
            TurnPhase::Votes => "Votes",
            TurnPhase::OrdersAndVotes => "Orders and Votes",
        }
    }

    /// Phases in which units receive movement orders.
    pub const fn has_unit_orders(self) -> bool {
        matches!(
            self,
            TurnPhase::SpringOrders | TurnPhase::FallOrders | TurnPhase::OrdersAndVotes
        )
    }

    /// Phases in which retreating units are ordered.
    pub const fn is_retreat(self) -> bool {
        matches!(self, TurnPhase::SpringRetreats | TurnPhase::FallRetreats)
    }

    /// Phases in which tech and build transfers resolve.
    pub const fn has_transfers(self) -> bool {
        matches!(self, TurnPhase::SpringOrders | TurnPhase::OrdersAndVotes)
    }

    pub const fn has_adjustments(self) -> bool {
        matches!(
            self,
            TurnPhase::Adjustments | TurnPhase::AdjustmentsAndNominations
        )
    }

    pub const fn has_nominations(self) -> bool {
        matches!(
            self,
            TurnPhase::Nominations | TurnPhase::AdjustmentsAndNominations
        )
    }

    pub const fn has_votes(self) -> bool {
        matches!(self, TurnPhase::Votes | TurnPhase::OrdersAndVotes)
    }
}

/// The turn being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnDescriptor {
    pub phase: TurnPhase,
    pub year: u32,
    #[serde(default)]
    pub units_in_retreat: bool,
    #[serde(default)]
    pub has_captures: bool,
}

/// One-hop transport reach of a transport-capable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportAdjacency {
    pub unit: UnitId,
    /// Transports adjacent to this one, used to extend a chain.
    #[serde(default)]
    pub transports: Vec<UnitId>,
    /// Units this transport can pick up directly.
    #[serde(default)]
    pub transportables: Vec<UnitId>,
    /// Nodes this transport can deliver to.
    #[serde(default)]
    pub destinations: Vec<NodeId>,
}

/// Air adjacency of a province that owns an air node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirAdjacency {
    pub province: ProvinceId,
    pub node: NodeId,
    #[serde(default)]
    pub adjacent: Vec<ProvinceId>,
}

/// A country's standing as of the previous turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryLedger {
    pub country: CountryId,
    #[serde(default)]
    pub adjustments: i32,
    #[serde(default)]
    pub unit_count: i32,
    #[serde(default)]
    pub city_count: i32,
    /// Banked builds available for transfer.
    #[serde(default)]
    pub builds: i32,
    /// `Some` once the country possesses nuclear technology.
    #[serde(default)]
    pub nuke_range: Option<u32>,
}

impl CountryLedger {
    pub fn new(country: CountryId) -> Self {
        CountryLedger {
            country,
            adjustments: 0,
            unit_count: 0,
            city_count: 0,
            builds: 0,
            nuke_range: None,
        }
    }

    pub fn has_nukes(&self) -> bool {
        self.nuke_range.is_some()
    }
}

/// Everything storage hands over for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub game_id: u32,
    pub turn: TurnDescriptor,
    pub provinces: Vec<Province>,
    pub nodes: Vec<Node>,
    pub units: Vec<Unit>,
    #[serde(default)]
    pub transports: Vec<TransportAdjacency>,
    #[serde(default)]
    pub air_adjacency: Vec<AirAdjacency>,
    #[serde(default)]
    pub countries: Vec<CountryLedger>,
}

/// Errors found while indexing a snapshot.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("duplicate province id {0}")]
    DuplicateProvince(u32),

    #[error("duplicate node id {0}")]
    DuplicateNode(u32),

    #[error("duplicate unit id {0}")]
    DuplicateUnit(u32),

    #[error("node {node} references unknown province {province}")]
    UnknownProvince { node: u32, province: u32 },

    #[error("node {node} is adjacent to unknown node {adjacent}")]
    UnknownAdjacency { node: u32, adjacent: u32 },

    #[error("unit {unit} sits on unknown node {node}")]
    UnknownUnitNode { unit: u32, node: u32 },

    #[error("transport entry references unknown unit {0}")]
    UnknownTransportUnit(u32),

    #[error("transport {unit} delivers to unknown node {node}")]
    UnknownTransportDestination { unit: u32, node: u32 },

    #[error("air adjacency references unknown province {0}")]
    UnknownAirProvince(u32),
}

/// Validated, indexed view of a `TurnSnapshot`.
#[derive(Debug, Clone)]
pub struct Board {
    snapshot: TurnSnapshot,
    province_idx: HashMap<ProvinceId, usize>,
    node_idx: HashMap<NodeId, usize>,
    unit_idx: HashMap<UnitId, usize>,
    transport_idx: HashMap<UnitId, usize>,
    air_idx: HashMap<ProvinceId, usize>,
    ledger_idx: HashMap<CountryId, usize>,
}

impl Board {
    /// Indexes the snapshot, rejecting duplicate ids and dangling references.
    pub fn new(snapshot: TurnSnapshot) -> Result<Self, SnapshotError> {
        let mut province_idx = HashMap::with_capacity(snapshot.provinces.len());
        for (i, p) in snapshot.provinces.iter().enumerate() {
            if province_idx.insert(p.id, i).is_some() {
                return Err(SnapshotError::DuplicateProvince(p.id.0));
            }
        }

        let mut node_idx = HashMap::with_capacity(snapshot.nodes.len());
        for (i, n) in snapshot.nodes.iter().enumerate() {
            if node_idx.insert(n.id, i).is_some() {
                return Err(SnapshotError::DuplicateNode(n.id.0));
            }
            if !province_idx.contains_key(&n.province) {
                return Err(SnapshotError::UnknownProvince {
                    node: n.id.0,
                    province: n.province.0,
                });
            }
        }
        for n in &snapshot.nodes {
            if let Some(bad) = n.adjacent.iter().find(|a| !node_idx.contains_key(a)) {
                return Err(SnapshotError::UnknownAdjacency {
                    node: n.id.0,
                    adjacent: bad.0,
                });
            }
        }

        let mut unit_idx = HashMap::with_capacity(snapshot.units.len());
        for (i, u) in snapshot.units.iter().enumerate() {
            if unit_idx.insert(u.id, i).is_some() {
                return Err(SnapshotError::DuplicateUnit(u.id.0));
            }
            if !node_idx.contains_key(&u.node) {
                return Err(SnapshotError::UnknownUnitNode {
                    unit: u.id.0,
                    node: u.node.0,
                });
            }
        }

        let mut transport_idx = HashMap::with_capacity(snapshot.transports.len());
        for (i, t) in snapshot.transports.iter().enumerate() {
            let referenced = std::iter::once(&t.unit)
                .chain(t.transports.iter())
                .chain(t.transportables.iter());
            for unit in referenced {
                if !unit_idx.contains_key(unit) {
                    return Err(SnapshotError::UnknownTransportUnit(unit.0));
                }
            }
            if let Some(bad) = t.destinations.iter().find(|d| !node_idx.contains_key(d)) {
                return Err(SnapshotError::UnknownTransportDestination {
                    unit: t.unit.0,
                    node: bad.0,
                });
            }
            transport_idx.insert(t.unit, i);
        }

        let mut air_idx = HashMap::with_capacity(snapshot.air_adjacency.len());
        for (i, a) in snapshot.air_adjacency.iter().enumerate() {
            let referenced = std::iter::once(&a.province).chain(a.adjacent.iter());
            for province in referenced {
                if !province_idx.contains_key(province) {
                    return Err(SnapshotError::UnknownAirProvince(province.0));
                }
            }
            air_idx.insert(a.province, i);
        }

        let ledger_idx = snapshot
            .countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.country, i))
            .collect();

        Ok(Board {
            snapshot,
            province_idx,
            node_idx,
            unit_idx,
            transport_idx,
            air_idx,
            ledger_idx,
        })
    }

    pub fn snapshot(&self) -> &TurnSnapshot {
        &self.snapshot
    }

    pub fn turn(&self) -> &TurnDescriptor {
        &self.snapshot.turn
    }

    pub fn units(&self) -> &[Unit] {
        &self.snapshot.units
    }

    pub fn provinces(&self) -> &[Province] {
        &self.snapshot.provinces
    }

    pub fn air_adjacency(&self) -> &[AirAdjacency] {
        &self.snapshot.air_adjacency
    }

    pub fn ledgers(&self) -> &[CountryLedger] {
        &self.snapshot.countries
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.unit_idx.get(&id).map(|&i| &self.snapshot.units[i])
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_idx.get(&id).map(|&i| &self.snapshot.nodes[i])
    }

    pub fn province(&self, id: ProvinceId) -> Option<&Province> {
        self.province_idx.get(&id).map(|&i| &self.snapshot.provinces[i])
    }

    /// Province that owns the given node.
    pub fn province_of(&self, node: NodeId) -> Option<&Province> {
        self.node(node).and_then(|n| self.province(n.province))
    }

    /// Province the unit currently sits in.
    pub fn unit_province(&self, unit: &Unit) -> Option<ProvinceId> {
        self.node(unit.node).map(|n| n.province)
    }

    /// Units still on the board inside the given province.
    pub fn units_in_province(&self, province: ProvinceId) -> impl Iterator<Item = &Unit> + '_ {
        self.snapshot.units.iter().filter(move |u| {
            u.status.is_present() && self.unit_province(u) == Some(province)
        })
    }

    pub fn transport(&self, unit: UnitId) -> Option<&TransportAdjacency> {
        self.transport_idx
            .get(&unit)
            .map(|&i| &self.snapshot.transports[i])
    }

    pub fn transports(&self) -> &[TransportAdjacency] {
        &self.snapshot.transports
    }

    pub fn air(&self, province: ProvinceId) -> Option<&AirAdjacency> {
        self.air_idx
            .get(&province)
            .map(|&i| &self.snapshot.air_adjacency[i])
    }

    pub fn ledger(&self, country: CountryId) -> Option<&CountryLedger> {
        self.ledger_idx
            .get(&country)
            .map(|&i| &self.snapshot.countries[i])
    }
}
