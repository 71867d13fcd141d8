//! Transport chain exploration.
//!
//! A transport (fleet or wing) picks up units it lists as transportable,
//! hands them on to adjacent transports, and delivers them to the nodes it
//! lists as destinations. A chain is a simple path through that graph
//! starting at a transport adjacent to the carried unit.
//!
//! The same depth-first walk serves option generation (every destination
//! reachable through any chain, and what each transport contributes) and
//! adjudication (chains made only of transports actually ordered to carry
//! the unit to one destination).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::trace;

use crate::board::{Board, NodeId, UnitId, UnitStatus};

/// Transport adjacency restricted to units still on the board.
#[derive(Debug, Clone, Default)]
pub struct TransportNetwork {
    /// Carried unit -> transports that can pick it up directly.
    carriers: HashMap<UnitId, Vec<UnitId>>,
    /// Transport -> adjacent transports.
    links: HashMap<UnitId, Vec<UnitId>>,
    /// Transport -> one-hop delivery nodes.
    destinations: HashMap<UnitId, Vec<NodeId>>,
}

impl TransportNetwork {
    /// Builds the network from active units only.
    pub fn from_board(board: &Board) -> Self {
        let active = |id: &UnitId| {
            board
                .unit(*id)
                .map_or(false, |u| u.status == UnitStatus::Active)
        };

        let mut network = TransportNetwork::default();
        for entry in board.transports() {
            if !active(&entry.unit) {
                continue;
            }
            for carried in entry.transportables.iter().filter(|u| active(u)) {
                network
                    .carriers
                    .entry(*carried)
                    .or_default()
                    .push(entry.unit);
            }
            network.links.insert(
                entry.unit,
                entry.transports.iter().copied().filter(|t| active(t)).collect(),
            );
            network
                .destinations
                .insert(entry.unit, entry.destinations.clone());
        }
        network
    }

    /// Transports that can pick up `unit` directly.
    pub fn carriers_of(&self, unit: UnitId) -> &[UnitId] {
        self.carriers.get(&unit).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transports adjacent to `transport`.
    pub fn links_of(&self, transport: UnitId) -> &[UnitId] {
        self.links.get(&transport).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn destinations_of(&self, transport: UnitId) -> &[NodeId] {
        self.destinations.get(&transport).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every unit some transport can carry, in id order.
    pub fn transportables(&self) -> Vec<UnitId> {
        let mut units: Vec<UnitId> = self.carriers.keys().copied().collect();
        units.sort_unstable();
        units
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }
}

/// One link of a chain under construction.
///
/// Owned by the exploring call stack and dropped when the branch returns.
#[derive(Debug, Clone, Default)]
pub struct TransportPathLink {
    /// Transports committed so far, in pick-up order.
    pub transports: Vec<UnitId>,
    /// Everything the chain can deliver to so far.
    pub destinations: BTreeSet<NodeId>,
    /// Per transport, the destinations reachable from it onward.
    pub contributions: BTreeMap<UnitId, BTreeSet<NodeId>>,
}

impl TransportPathLink {
    fn extend(&self, transport: UnitId, delivers: &[NodeId]) -> TransportPathLink {
        let mut next = self.clone();
        next.transports.push(transport);
        next.destinations.extend(delivers.iter().copied());
        for reach in next.contributions.values_mut() {
            reach.extend(delivers.iter().copied());
        }
        next.contributions
            .insert(transport, delivers.iter().copied().collect());
        next
    }
}

/// Everything reachable by one carried unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvoyReach {
    pub destinations: BTreeSet<NodeId>,
    /// Transport -> destinations it may be ordered to carry this unit to.
    pub contributions: BTreeMap<UnitId, BTreeSet<NodeId>>,
}

/// Depth-first chain explorer over a `TransportNetwork`.
///
/// `admit` decides whether a transport may join a chain. Option generation
/// admits every transport; adjudication admits only compliant ones.
pub struct ConvoyPathExplorer<'n, F> {
    network: &'n TransportNetwork,
    admit: F,
}

impl<'n, F> ConvoyPathExplorer<'n, F>
where
    F: Fn(UnitId) -> bool,
{
    pub fn new(network: &'n TransportNetwork, admit: F) -> Self {
        ConvoyPathExplorer { network, admit }
    }

    /// Explores every chain for `unit` and merges their reach.
    pub fn explore(&self, unit: UnitId) -> ConvoyReach {
        let mut reach = ConvoyReach::default();
        let root = TransportPathLink::default();
        for &carrier in self.network.carriers_of(unit) {
            self.walk(&root, carrier, &mut |link: &TransportPathLink| {
                reach.destinations.extend(link.destinations.iter().copied());
                for (transport, nodes) in &link.contributions {
                    reach
                        .contributions
                        .entry(*transport)
                        .or_default()
                        .extend(nodes.iter().copied());
                }
            });
        }
        trace!(
            "unit {} reaches {} node(s) by transport",
            unit.0,
            reach.destinations.len()
        );
        reach
    }

    /// Every chain that carries `unit` to `destination`.
    ///
    /// A chain ends at the first transport that delivers to `destination`.
    pub fn paths_to(&self, unit: UnitId, destination: NodeId) -> Vec<Vec<UnitId>> {
        let mut paths = Vec::new();
        let root = TransportPathLink::default();
        for &carrier in self.network.carriers_of(unit) {
            self.walk_until(&root, carrier, destination, &mut paths);
        }
        for path in &paths {
            trace!("unit {} -> node {} via {:?}", unit.0, destination.0, path);
        }
        paths
    }

    fn walk(
        &self,
        current: &TransportPathLink,
        transport: UnitId,
        record: &mut impl FnMut(&TransportPathLink),
    ) {
        if current.transports.contains(&transport) || !(self.admit)(transport) {
            return;
        }
        let next = current.extend(transport, self.network.destinations_of(transport));
        record(&next);
        for &onward in self.network.links_of(transport) {
            self.walk(&next, onward, record);
        }
    }

    fn walk_until(
        &self,
        current: &TransportPathLink,
        transport: UnitId,
        destination: NodeId,
        paths: &mut Vec<Vec<UnitId>>,
    ) {
        if current.transports.contains(&transport) || !(self.admit)(transport) {
            return;
        }
        let delivers = self.network.destinations_of(transport);
        let next = current.extend(transport, delivers);
        if delivers.contains(&destination) {
            paths.push(next.transports);
            return;
        }
        for &onward in self.network.links_of(transport) {
            self.walk_until(&next, onward, destination, paths);
        }
    }
}
