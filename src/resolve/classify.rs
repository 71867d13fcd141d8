//! Order classification against the option catalogue.
//!
//! Every submitted order is checked against its unit's catalogue before any
//! conflict resolution runs. Orders that fail the check are closed out with
//! a reason; the rest are bucketed by type for the adjudicator.

use std::collections::BTreeSet;

use log::warn;

use crate::board::{Board, Order, OrderType, ResolvedOrder, UnitStatus};
use crate::movegen::TurnOptions;

/// Indices into the classified record list, grouped by order type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBuckets {
    pub holds: Vec<usize>,
    pub moves: Vec<usize>,
    pub move_convoyed: Vec<usize>,
    /// Standard and convoyed supports.
    pub supports: Vec<usize>,
    /// Convoys and airlifts.
    pub transports: Vec<usize>,
    pub nukes: Vec<usize>,
    pub disbands: Vec<usize>,
    pub invalid: Vec<usize>,
}

/// Records for every submitted order plus their buckets.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub records: Vec<ResolvedOrder>,
    pub buckets: OrderBuckets,
}

/// Validates orders against a turn's catalogues.
pub struct OrderClassifier<'a> {
    board: &'a Board,
    options: &'a TurnOptions,
}

impl<'a> OrderClassifier<'a> {
    pub fn new(board: &'a Board, options: &'a TurnOptions) -> Self {
        OrderClassifier { board, options }
    }

    /// Classifies orders in submission order.
    pub fn classify(&self, orders: &[Order]) -> Classification {
        let mut out = Classification::default();
        let mut ordered_units = BTreeSet::new();

        for order in orders {
            let status = self
                .board
                .unit(order.unit)
                .map_or(UnitStatus::Active, |u| u.status);
            let mut record = ResolvedOrder {
                order: *order,
                valid: true,
                success: None,
                explanation: String::new(),
                secondary_explanation: None,
                power: 1,
                support_cut: false,
                unit_status: status,
            };

            let verdict = if !ordered_units.insert(order.unit) {
                Err("Invalid Order: Duplicate Unit Order".to_string())
            } else {
                self.check(order)
            };

            let idx = out.records.len();
            match verdict {
                Ok(()) => {
                    let bucket = match order.order_type {
                        OrderType::Hold => &mut out.buckets.holds,
                        OrderType::Move => &mut out.buckets.moves,
                        OrderType::MoveConvoyed => &mut out.buckets.move_convoyed,
                        OrderType::Support | OrderType::SupportConvoyed => {
                            &mut out.buckets.supports
                        }
                        OrderType::Convoy | OrderType::Airlift => &mut out.buckets.transports,
                        OrderType::Nuke => &mut out.buckets.nukes,
                        _ => &mut out.buckets.disbands,
                    };
                    bucket.push(idx);
                }
                Err(reason) => {
                    record.valid = false;
                    record.success = Some(false);
                    record.explanation = reason;
                    out.buckets.invalid.push(idx);
                }
            }
            out.records.push(record);
        }
        out
    }

    fn check(&self, order: &Order) -> Result<(), String> {
        let Some(unit) = self.board.unit(order.unit) else {
            warn!("order {} names unknown unit {}", order.id.0, order.unit.0);
            return Err("Invalid Order: Unknown Unit".to_string());
        };

        let Some(catalogue) = self.options.get(order.unit) else {
            if unit.unit_type.is_passive() {
                return if order.order_type == OrderType::Hold {
                    Ok(())
                } else {
                    Err("Invalid Order Type".to_string())
                };
            }
            warn!(
                "order {} for unit {} has no matching options",
                order.id.0, order.unit.0
            );
            return Err("Invalid Order: No Matching Options".to_string());
        };

        if !catalogue.allows(order.order_type) {
            return Err("Invalid Order Type".to_string());
        }

        match order.order_type {
            OrderType::Move => check_destination(order, &catalogue.move_destinations, "Destination"),
            OrderType::MoveConvoyed => check_destination(
                order,
                &catalogue.move_convoyed_destinations,
                "Destination",
            ),
            OrderType::Nuke => check_destination(order, &catalogue.nuke_targets, "Target"),
            OrderType::Support
            | OrderType::SupportConvoyed
            | OrderType::Convoy
            | OrderType::Airlift => {
                let kind = match order.order_type {
                    OrderType::Convoy => "Convoy",
                    OrderType::Airlift => "Airlift",
                    _ => "Support",
                };
                let targets = order
                    .secondary_unit
                    .and_then(|s| catalogue.secondary_targets(order.order_type, s))
                    .ok_or_else(|| format!("Invalid {} Unit", kind))?;
                check_destination(order, targets, &format!("{} Destination", kind))
            }
            _ => Ok(()),
        }
    }
}

fn check_destination(
    order: &Order,
    legal: &BTreeSet<crate::board::NodeId>,
    what: &str,
) -> Result<(), String> {
    match order.destination {
        Some(dest) if legal.contains(&dest) => Ok(()),
        _ => Err(format!("Invalid {}", what)),
    }
}
