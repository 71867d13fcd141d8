//! Map fixtures shared by the integration test files.

#![allow(dead_code)]

use hegemon::board::*;

pub fn province(id: u32, province_type: ProvinceType) -> Province {
    Province {
        id: ProvinceId(id),
        name: format!("p{}", id),
        province_type,
        status: ProvinceStatus::Active,
        vote_type: VoteType::None,
        controller: None,
        capital_owner: None,
        valid_retreat: true,
    }
}

pub fn unit(id: u32, unit_type: UnitType, country: u32, node: u32) -> Unit {
    Unit {
        id: UnitId(id),
        unit_type,
        country: CountryId(country),
        node: NodeId(node),
        status: UnitStatus::Active,
        displacer: None,
    }
}

/// Incrementally assembles a turn snapshot.
pub struct MapBuilder {
    pub snapshot: TurnSnapshot,
}

impl MapBuilder {
    pub fn new(phase: TurnPhase) -> Self {
        MapBuilder {
            snapshot: TurnSnapshot {
                game_id: 1,
                turn: TurnDescriptor {
                    phase,
                    year: 1,
                    units_in_retreat: false,
                    has_captures: false,
                },
                provinces: Vec::new(),
                nodes: Vec::new(),
                units: Vec::new(),
                transports: Vec::new(),
                air_adjacency: Vec::new(),
                countries: Vec::new(),
            },
        }
    }

    /// A `side` x `side` grid of inland provinces numbered row-major from 1.
    /// Each province has land node `p * 10` linked to its orthogonal
    /// neighbours, and air node `p * 10 + 1` with the same air adjacency.
    pub fn grid(phase: TurnPhase, side: u32) -> Self {
        let mut map = MapBuilder::new(phase);
        for p in 1..=side * side {
            map = map.province(p, ProvinceType::Inland);
            map = map.node(p * 10, p, NodeKind::Land);
            map = map.node(p * 10 + 1, p, NodeKind::Air);
        }
        for p in 1..=side * side {
            let col = (p - 1) % side;
            let mut neighbours = Vec::new();
            if col + 1 < side {
                neighbours.push(p + 1);
            }
            if p + side <= side * side {
                neighbours.push(p + side);
            }
            for &n in &neighbours {
                map = map.link(p * 10, n * 10);
            }
            let adjacent: Vec<u32> = (1..=side * side)
                .filter(|&o| {
                    let (r, c) = ((p - 1) / side, (p - 1) % side);
                    let (or, oc) = ((o - 1) / side, (o - 1) % side);
                    r.abs_diff(or) + c.abs_diff(oc) == 1
                })
                .collect();
            map = map.air(p, p * 10 + 1, &adjacent);
        }
        map
    }

    pub fn province(mut self, id: u32, province_type: ProvinceType) -> Self {
        self.snapshot.provinces.push(province(id, province_type));
        self
    }

    pub fn node(mut self, id: u32, province: u32, kind: NodeKind) -> Self {
        self.snapshot.nodes.push(Node {
            id: NodeId(id),
            province: ProvinceId(province),
            kind,
            adjacent: Vec::new(),
        });
        self
    }

    /// Makes two nodes mutually adjacent.
    pub fn link(mut self, a: u32, b: u32) -> Self {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(node) = self.snapshot.nodes.iter_mut().find(|n| n.id == NodeId(from)) {
                if !node.adjacent.contains(&NodeId(to)) {
                    node.adjacent.push(NodeId(to));
                }
            }
        }
        self
    }

    pub fn air(mut self, province: u32, node: u32, adjacent: &[u32]) -> Self {
        self.snapshot.air_adjacency.push(AirAdjacency {
            province: ProvinceId(province),
            node: NodeId(node),
            adjacent: adjacent.iter().map(|&p| ProvinceId(p)).collect(),
        });
        self
    }

    pub fn unit(mut self, id: u32, unit_type: UnitType, country: u32, node: u32) -> Self {
        self.snapshot.units.push(unit(id, unit_type, country, node));
        self
    }

    pub fn army(self, id: u32, country: u32, node: u32) -> Self {
        self.unit(id, UnitType::Army, country, node)
    }

    pub fn transport(
        mut self,
        unit: u32,
        transports: &[u32],
        transportables: &[u32],
        destinations: &[u32],
    ) -> Self {
        self.snapshot.transports.push(TransportAdjacency {
            unit: UnitId(unit),
            transports: transports.iter().map(|&u| UnitId(u)).collect(),
            transportables: transportables.iter().map(|&u| UnitId(u)).collect(),
            destinations: destinations.iter().map(|&n| NodeId(n)).collect(),
        });
        self
    }

    pub fn country(mut self, ledger: CountryLedger) -> Self {
        self.snapshot.countries.push(ledger);
        self
    }

    pub fn captures(mut self, has_captures: bool) -> Self {
        self.snapshot.turn.has_captures = has_captures;
        self
    }

    pub fn board(self) -> Board {
        Board::new(self.snapshot).unwrap()
    }
}
