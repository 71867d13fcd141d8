//! Turn history derived from resolved orders.
//!
//! After a turn resolves, every province a unit ends in or bounced out of is
//! rewritten: control passes to capturing units, nuclear strikes leave
//! fallout, and contested provinces are closed to retreats next turn. The
//! country ledger absorbs lost units and cities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{
    Board, CountryId, CountryLedger, OrderType, Province, ProvinceId, ProvinceStatus,
    ResolvedOrder, Unit, UnitId, UnitStatus, UnitType,
};

/// A province's state after the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceHistory {
    pub province: ProvinceId,
    pub controller: Option<CountryId>,
    pub status: ProvinceStatus,
    pub capital_owner: Option<CountryId>,
    pub valid_retreat: bool,
}

impl ProvinceHistory {
    fn carried(province: &Province) -> Self {
        ProvinceHistory {
            province: province.id,
            controller: province.controller,
            status: province.status,
            capital_owner: province.capital_owner,
            valid_retreat: true,
        }
    }

    fn differs_from(&self, province: &Province) -> bool {
        self.controller != province.controller
            || self.status != province.status
            || self.capital_owner != province.capital_owner
            || self.valid_retreat != province.valid_retreat
    }
}

/// Fallout status left by a strike on `province`.
fn fallout_status(province: &Province) -> ProvinceStatus {
    if province.vote_type.has_vote() {
        ProvinceStatus::Nuked
    } else {
        ProvinceStatus::Inert
    }
}

/// Derives province rows and applies unit and city losses to `ledgers`.
///
/// `orders` are this turn's resolved unit orders and `units` the units as
/// they stand after resolution. Only provinces whose state changes are
/// returned, ordered by province id.
pub fn derive_history(
    board: &Board,
    orders: &[ResolvedOrder],
    units: &[Unit],
    ledgers: &mut BTreeMap<CountryId, CountryLedger>,
) -> Vec<ProvinceHistory> {
    let has_captures = board.turn().has_captures;
    let after: BTreeMap<UnitId, &Unit> = units.iter().map(|u| (u.id, u)).collect();

    let mut rows: BTreeMap<ProvinceId, ProvinceHistory> = board
        .provinces()
        .iter()
        .map(|p| (p.id, ProvinceHistory::carried(p)))
        .collect();

    // Occupation and capture.
    for record in orders {
        let Some(unit) = after.get(&record.order.unit) else {
            continue;
        };
        if !unit.status.is_present() {
            continue;
        }
        let Some(province) = board.province_of(unit.node) else {
            continue;
        };
        let Some(row) = rows.get_mut(&province.id) else {
            continue;
        };
        row.valid_retreat = false;
        if unit.status != UnitStatus::Active || !province.province_type.is_capturable() {
            continue;
        }

        let open = matches!(
            province.status,
            ProvinceStatus::Active | ProvinceStatus::Dormant | ProvinceStatus::Bombarded
        );
        if has_captures && unit.unit_type.can_capture() {
            row.controller = Some(unit.country);
            if open {
                row.status = ProvinceStatus::Active;
            }
        } else if province.status == ProvinceStatus::Inert {
            row.controller = Some(unit.country);
        } else if has_captures && unit.unit_type == UnitType::Wing && open {
            row.status = ProvinceStatus::Bombarded;
        }
    }

    // Bounces close the contested province.
    for record in orders {
        let bounced = record.valid
            && record.order.order_type.is_move()
            && record.success == Some(false)
            && matches!(
                record.unit_status,
                UnitStatus::Active | UnitStatus::Retreat
            );
        if !bounced {
            continue;
        }
        let mover = board.unit(record.order.unit).map(|u| u.unit_type);
        if !matches!(
            mover,
            Some(UnitType::Army | UnitType::Fleet | UnitType::Wing)
        ) {
            continue;
        }
        let target = record.order.destination.and_then(|n| board.province_of(n));
        if let Some(row) = target.and_then(|p| rows.get_mut(&p.id)) {
            row.valid_retreat = false;
        }
    }

    // Nuclear fallout and losses.
    for record in orders {
        let detonated = record.order.order_type == OrderType::Nuke && record.success == Some(true);
        if detonated {
            let target = record.order.destination.and_then(|n| board.province_of(n));
            if let Some(province) = target {
                if let Some(row) = rows.get_mut(&province.id) {
                    row.status = fallout_status(province);
                    row.valid_retreat = false;
                }
                if province.status == ProvinceStatus::Active {
                    if let Some(ledger) = province.controller.and_then(|c| ledgers.get_mut(&c)) {
                        ledger.adjustments -= 1;
                        ledger.city_count -= 1;
                    }
                }
            }
        }
    }

    for unit in units {
        let Some(before) = board.unit(unit.id) else {
            continue;
        };
        let lost = before.status.is_present()
            && matches!(
                unit.status,
                UnitStatus::Detonated
                    | UnitStatus::Nuked
                    | UnitStatus::DisbandedRetreat
                    | UnitStatus::DestroyedRetreat
            );
        if lost {
            if let Some(ledger) = ledgers.get_mut(&unit.country) {
                ledger.adjustments += 1;
                ledger.unit_count -= 1;
            }
        }
    }

    let mut changed: Vec<ProvinceHistory> = board
        .provinces()
        .iter()
        .filter_map(|p| rows.remove(&p.id).filter(|row| row.differs_from(p)))
        .collect();
    changed.sort_by_key(|row| row.province);
    changed
}
