//! Retreat-phase resolution.
//!
//! Resolves retreat orders: if two or more dislodged units retreat to the
//! same province, all of them are destroyed. Dislodged units without a valid
//! order are disbanded (civil disorder).

use std::collections::BTreeMap;

use log::debug;

use crate::board::{
    Board, NodeId, OrderType, ProvinceId, ResolvedOrder, Unit, UnitId, UnitStatus,
};

use super::classify::Classification;

/// Retreat orders after resolution and every unit's resulting state.
#[derive(Debug, Clone)]
pub struct RetreatResolution {
    pub orders: Vec<ResolvedOrder>,
    pub units: Vec<Unit>,
}

/// Resolves classified retreat orders against the board.
pub fn resolve_retreats(board: &Board, classification: Classification) -> RetreatResolution {
    let mut records = classification.records;

    let mut arrivals: BTreeMap<ProvinceId, Vec<usize>> = BTreeMap::new();
    for &idx in &classification.buckets.moves {
        let target = records[idx]
            .order
            .destination
            .and_then(|n| board.province_of(n))
            .map(|p| p.id);
        if let Some(target) = target {
            arrivals.entry(target).or_default().push(idx);
        }
    }

    // unit -> (final status, node)
    let mut outcome: BTreeMap<UnitId, (UnitStatus, Option<NodeId>)> = BTreeMap::new();
    for (_, movers) in arrivals {
        let collision = movers.len() > 1;
        let tally = vec!["1"; movers.len()].join("v");
        for idx in movers {
            let record = &mut records[idx];
            if collision {
                record.success = Some(false);
                record.explanation = format!("Destroyed: Bounce {}", tally);
                record.unit_status = UnitStatus::DestroyedRetreat;
                outcome.insert(record.order.unit, (UnitStatus::DestroyedRetreat, None));
            } else {
                record.success = Some(true);
                record.explanation = "Success".to_string();
                record.unit_status = UnitStatus::Active;
                outcome.insert(
                    record.order.unit,
                    (UnitStatus::Active, record.order.destination),
                );
            }
        }
    }

    for &idx in &classification.buckets.disbands {
        let record = &mut records[idx];
        if record.order.order_type != OrderType::Disband {
            continue;
        }
        record.success = Some(true);
        record.explanation = "Disbanded".to_string();
        record.unit_status = UnitStatus::DisbandedRetreat;
        outcome.insert(record.order.unit, (UnitStatus::DisbandedRetreat, None));
    }

    for record in records.iter_mut().filter(|r| !r.valid) {
        record.unit_status = UnitStatus::DisbandedRetreat;
    }

    let mut disorder = 0;
    let units = board
        .units()
        .iter()
        .map(|unit| {
            let mut unit = unit.clone();
            if unit.status != UnitStatus::Retreat {
                return unit;
            }
            match outcome.get(&unit.id) {
                Some(&(status, node)) => {
                    unit.status = status;
                    if let Some(node) = node {
                        unit.node = node;
                    }
                }
                None => {
                    disorder += 1;
                    unit.status = UnitStatus::DisbandedRetreat;
                }
            }
            unit.displacer = None;
            unit
        })
        .collect();

    if disorder > 0 {
        debug!("{} retreating unit(s) disbanded in civil disorder", disorder);
    }
    RetreatResolution {
        orders: records,
        units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::*;
    use crate::movegen::OptionGenerator;
    use crate::resolve::classify::OrderClassifier;

    fn province(id: u32) -> Province {
        Province {
            id: ProvinceId(id),
            name: format!("p{}", id),
            province_type: ProvinceType::Inland,
            status: ProvinceStatus::Active,
            vote_type: VoteType::None,
            controller: None,
            capital_owner: None,
            valid_retreat: true,
        }
    }

    fn node(id: u32, province: u32, adjacent: &[u32]) -> Node {
        Node {
            id: NodeId(id),
            province: ProvinceId(province),
            kind: NodeKind::Land,
            adjacent: adjacent.iter().map(|&a| NodeId(a)).collect(),
        }
    }

    fn unit(id: u32, country: u32, node: u32, status: UnitStatus) -> Unit {
        Unit {
            id: UnitId(id),
            unit_type: UnitType::Army,
            country: CountryId(country),
            node: NodeId(node),
            status,
            displacer: None,
        }
    }

    /// Provinces 1 and 3 both border the open province 2; province 4 is
    /// reachable from 3 only.
    fn board() -> Board {
        Board::new(TurnSnapshot {
            game_id: 1,
            turn: TurnDescriptor {
                phase: TurnPhase::FallRetreats,
                year: 1,
                units_in_retreat: true,
                has_captures: true,
            },
            provinces: (1..=4).map(province).collect(),
            nodes: vec![
                node(10, 1, &[20]),
                node(20, 2, &[10, 30]),
                node(30, 3, &[20, 40]),
                node(40, 4, &[30]),
            ],
            units: vec![
                unit(1, 1, 10, UnitStatus::Retreat),
                unit(2, 2, 30, UnitStatus::Retreat),
                unit(3, 3, 10, UnitStatus::Active),
                unit(4, 3, 30, UnitStatus::Active),
            ],
            transports: Vec::new(),
            air_adjacency: Vec::new(),
            countries: Vec::new(),
        })
        .unwrap()
    }

    fn resolve(orders: &[Order]) -> RetreatResolution {
        let board = board();
        let options = OptionGenerator::new(&board).generate();
        let classification = OrderClassifier::new(&board, &options).classify(orders);
        resolve_retreats(&board, classification)
    }

    #[test]
    fn unique_retreat_succeeds() {
        let out = resolve(&[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 40),
        ]);
        assert!(out.orders.iter().all(|r| r.success == Some(true)));
        assert_eq!(out.units[0].node, NodeId(20));
        assert_eq!(out.units[0].status, UnitStatus::Active);
        assert_eq!(out.units[1].node, NodeId(40));
    }

    #[test]
    fn colliding_retreats_are_all_destroyed() {
        let out = resolve(&[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 20),
        ]);
        for record in &out.orders {
            assert_eq!(record.success, Some(false));
            assert_eq!(record.unit_status, UnitStatus::DestroyedRetreat);
        }
        assert_eq!(out.units[0].status, UnitStatus::DestroyedRetreat);
        assert_eq!(out.units[1].status, UnitStatus::DestroyedRetreat);
    }

    #[test]
    fn disband_and_civil_disorder() {
        let out = resolve(&[Order {
            id: OrderId(1),
            unit: UnitId(1),
            order_type: OrderType::Disband,
            secondary_unit: None,
            destination: None,
        }]);
        assert_eq!(out.orders[0].explanation, "Disbanded");
        assert_eq!(out.units[0].status, UnitStatus::DisbandedRetreat);
        // Unit 2 had no order.
        assert_eq!(out.units[1].status, UnitStatus::DisbandedRetreat);
        assert_eq!(out.units[2].status, UnitStatus::Active);
    }

    #[test]
    fn invalid_retreat_disbands() {
        let out = resolve(&[Order::new(1, 1, OrderType::Move, 40)]);
        assert!(!out.orders[0].valid);
        assert_eq!(out.orders[0].unit_status, UnitStatus::DisbandedRetreat);
        assert_eq!(out.units[0].status, UnitStatus::DisbandedRetreat);
    }
}
