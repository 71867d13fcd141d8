//! Legal option generation.
//!
//! Builds, once per turn, the catalogue of legal order types and targets for
//! every unit that can be ordered. The catalogue is what the order
//! classifier validates against and what clients are shown.

pub mod convoy;
pub mod nuke;
pub mod retreat;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::{Board, NodeId, OrderType, ProvinceId, Unit, UnitId, UnitStatus, UnitType};

pub use convoy::{ConvoyPathExplorer, ConvoyReach, TransportNetwork, TransportPathLink};
pub use nuke::NukeRangeExpander;
pub use retreat::retreat_destinations;

/// Legal orders for one unit in one turn.
///
/// Support and transport maps are keyed by the secondary unit; the value is
/// the destination set legal for that secondary unit. A support-hold target
/// is the supported unit's own node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCatalogue {
    pub unit: UnitId,
    pub order_types: BTreeSet<OrderType>,
    pub move_destinations: BTreeSet<NodeId>,
    pub move_convoyed_destinations: BTreeSet<NodeId>,
    pub support_standard: BTreeMap<UnitId, BTreeSet<NodeId>>,
    pub support_convoyed: BTreeMap<UnitId, BTreeSet<NodeId>>,
    pub transport: BTreeMap<UnitId, BTreeSet<NodeId>>,
    pub nuke_targets: BTreeSet<NodeId>,
}

impl OptionCatalogue {
    fn empty(unit: UnitId) -> Self {
        OptionCatalogue {
            unit,
            ..Default::default()
        }
    }

    pub fn allows(&self, order_type: OrderType) -> bool {
        self.order_types.contains(&order_type)
    }

    /// Legal destinations for a secondary unit under a support or transport
    /// order type.
    pub fn secondary_targets(
        &self,
        order_type: OrderType,
        secondary: UnitId,
    ) -> Option<&BTreeSet<NodeId>> {
        match order_type {
            OrderType::Support => self.support_standard.get(&secondary),
            OrderType::SupportConvoyed => self.support_convoyed.get(&secondary),
            OrderType::Convoy | OrderType::Airlift => self.transport.get(&secondary),
            _ => None,
        }
    }

    /// Recomputes `order_types` from the filled-in destination sets.
    fn seal(&mut self, unit_type: UnitType) {
        self.order_types.insert(OrderType::Hold);
        if !self.move_destinations.is_empty() {
            self.order_types.insert(OrderType::Move);
        }
        if !self.move_convoyed_destinations.is_empty() {
            self.order_types.insert(OrderType::MoveConvoyed);
        }
        if !self.support_standard.is_empty() {
            self.order_types.insert(OrderType::Support);
        }
        if !self.support_convoyed.is_empty() {
            self.order_types.insert(OrderType::SupportConvoyed);
        }
        if !self.transport.is_empty() {
            self.order_types.insert(if unit_type == UnitType::Fleet {
                OrderType::Convoy
            } else {
                OrderType::Airlift
            });
        }
        if !self.nuke_targets.is_empty() {
            self.order_types.insert(OrderType::Nuke);
        }
    }
}

/// Every unit's catalogue for one turn, keyed by unit id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOptions {
    pub catalogues: BTreeMap<UnitId, OptionCatalogue>,
}

impl TurnOptions {
    pub fn get(&self, unit: UnitId) -> Option<&OptionCatalogue> {
        self.catalogues.get(&unit)
    }

    pub fn len(&self) -> usize {
        self.catalogues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogues.is_empty()
    }
}

/// A unit able to reach a province, and through which node.
#[derive(Debug, Clone, Copy)]
struct Reach {
    unit: UnitId,
    node: NodeId,
    transported: bool,
}

/// Generates option catalogues from a validated board.
pub struct OptionGenerator<'a> {
    board: &'a Board,
}

impl<'a> OptionGenerator<'a> {
    pub fn new(board: &'a Board) -> Self {
        OptionGenerator { board }
    }

    /// Builds catalogues for every orderable unit in the current phase.
    pub fn generate(&self) -> TurnOptions {
        let phase = self.board.turn().phase;
        let catalogues = if phase.has_unit_orders() {
            self.order_catalogues()
        } else if phase.is_retreat() {
            self.retreat_catalogues()
        } else {
            BTreeMap::new()
        };
        debug!(
            "generated {} catalogue(s) for {}",
            catalogues.len(),
            phase.display_name()
        );
        TurnOptions { catalogues }
    }

    fn orderable(unit: &Unit) -> bool {
        unit.status == UnitStatus::Active && !unit.unit_type.is_passive()
    }

    fn order_catalogues(&self) -> BTreeMap<UnitId, OptionCatalogue> {
        let board = self.board;
        let units: Vec<&Unit> = board.units().iter().filter(|u| Self::orderable(u)).collect();

        let moves: HashMap<UnitId, BTreeSet<NodeId>> = units
            .par_iter()
            .map(|u| (u.id, self.standard_moves(u)))
            .collect();

        let network = TransportNetwork::from_board(board);
        let explorer = ConvoyPathExplorer::new(&network, |_| true);
        let convoys: HashMap<UnitId, ConvoyReach> = network
            .transportables()
            .into_par_iter()
            .filter(|id| board.unit(*id).map_or(false, Self::orderable))
            .map(|id| (id, self.trim_convoy_reach(id, explorer.explore(id))))
            .filter(|(_, reach)| !reach.destinations.is_empty())
            .collect();

        let shared = self.shared_reach(&units, &moves, &convoys);
        let expander = NukeRangeExpander::new(board.air_adjacency());

        units
            .par_iter()
            .map(|unit| {
                let mut catalogue = OptionCatalogue::empty(unit.id);
                if let Some(dests) = moves.get(&unit.id) {
                    catalogue.move_destinations = dests.clone();
                }
                if let Some(reach) = convoys.get(&unit.id) {
                    catalogue.move_convoyed_destinations = reach.destinations.clone();
                }
                if unit.unit_type != UnitType::Nuke {
                    self.fill_supports(unit, &moves, &shared, &mut catalogue);
                }
                for (carried, reach) in &convoys {
                    if let Some(nodes) = reach.contributions.get(&unit.id) {
                        catalogue.transport.insert(*carried, nodes.clone());
                    }
                }
                if unit.unit_type == UnitType::Nuke {
                    catalogue.nuke_targets = self.nuke_targets(unit, &expander);
                }
                if catalogue.move_destinations.is_empty()
                    && catalogue.move_convoyed_destinations.is_empty()
                {
                    debug!("unit {} has no movement adjacency", unit.id.0);
                }
                catalogue.seal(unit.unit_type);
                (unit.id, catalogue)
            })
            .collect()
    }

    /// Adjacent nodes in passable provinces other than the unit's own.
    fn standard_moves(&self, unit: &Unit) -> BTreeSet<NodeId> {
        let origin = self.board.unit_province(unit);
        let Some(node) = self.board.node(unit.node) else {
            return BTreeSet::new();
        };
        node.adjacent
            .iter()
            .copied()
            .filter(|&adj| {
                self.board.province_of(adj).map_or(false, |p| {
                    p.province_type.is_passable() && Some(p.id) != origin
                })
            })
            .collect()
    }

    /// Drops convoy destinations inside the carried unit's own province.
    fn trim_convoy_reach(&self, unit: UnitId, mut reach: ConvoyReach) -> ConvoyReach {
        let origin = self.board.unit(unit).and_then(|u| self.board.unit_province(u));
        let foreign = |n: &NodeId| self.board.province_of(*n).map(|p| p.id) != origin;
        reach.destinations.retain(|n| foreign(n));
        for nodes in reach.contributions.values_mut() {
            nodes.retain(|n| foreign(n));
        }
        reach.contributions.retain(|_, nodes| !nodes.is_empty());
        reach
    }

    /// Province -> every unit able to arrive there, directly or by transport.
    fn shared_reach(
        &self,
        units: &[&Unit],
        moves: &HashMap<UnitId, BTreeSet<NodeId>>,
        convoys: &HashMap<UnitId, ConvoyReach>,
    ) -> HashMap<ProvinceId, Vec<Reach>> {
        let mut shared: HashMap<ProvinceId, Vec<Reach>> = HashMap::new();
        for unit in units {
            for &node in moves.get(&unit.id).into_iter().flatten() {
                if let Some(p) = self.board.province_of(node) {
                    shared.entry(p.id).or_default().push(Reach {
                        unit: unit.id,
                        node,
                        transported: false,
                    });
                }
            }
        }
        for (&carried, reach) in convoys {
            for &node in &reach.destinations {
                if let Some(p) = self.board.province_of(node) {
                    shared.entry(p.id).or_default().push(Reach {
                        unit: carried,
                        node,
                        transported: true,
                    });
                }
            }
        }
        shared
    }

    /// Support options for `unit`: moves of others into provinces it can
    /// reach, and holds of units occupying them.
    fn fill_supports(
        &self,
        unit: &Unit,
        moves: &HashMap<UnitId, BTreeSet<NodeId>>,
        shared: &HashMap<ProvinceId, Vec<Reach>>,
        catalogue: &mut OptionCatalogue,
    ) {
        let reachable: BTreeSet<ProvinceId> = moves
            .get(&unit.id)
            .into_iter()
            .flatten()
            .filter_map(|n| self.board.province_of(*n).map(|p| p.id))
            .collect();

        for province in reachable {
            for other in shared.get(&province).into_iter().flatten() {
                if other.unit == unit.id {
                    continue;
                }
                let target = if other.transported {
                    &mut catalogue.support_convoyed
                } else {
                    &mut catalogue.support_standard
                };
                target.entry(other.unit).or_default().insert(other.node);
            }
            for occupant in self.board.units_in_province(province) {
                if occupant.id != unit.id && occupant.status == UnitStatus::Active {
                    catalogue
                        .support_standard
                        .entry(occupant.id)
                        .or_default()
                        .insert(occupant.node);
                }
            }
        }
    }

    fn nuke_targets(&self, unit: &Unit, expander: &NukeRangeExpander<'_>) -> BTreeSet<NodeId> {
        let Some(origin) = self.board.unit_province(unit) else {
            return BTreeSet::new();
        };
        // Without nuclear technology there is nothing to launch at.
        match self.board.ledger(unit.country).and_then(|l| l.nuke_range) {
            Some(range) => expander.targets(origin, range),
            None => BTreeSet::new(),
        }
    }

    fn retreat_catalogues(&self) -> BTreeMap<UnitId, OptionCatalogue> {
        self.board
            .units()
            .par_iter()
            .filter(|u| u.status == UnitStatus::Retreat)
            .map(|unit| {
                let mut catalogue = OptionCatalogue::empty(unit.id);
                catalogue.move_destinations = retreat_destinations(unit, self.board);
                if !catalogue.move_destinations.is_empty() {
                    catalogue.order_types.insert(OrderType::Move);
                }
                catalogue.order_types.insert(OrderType::Disband);
                (unit.id, catalogue)
            })
            .collect()
    }
}
