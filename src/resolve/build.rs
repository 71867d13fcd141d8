//! Adjustment-phase resolution.
//!
//! Validates and applies build and disband orders against each country's
//! adjustment balance. A positive balance allows that many builds; a negative
//! balance requires that many disbands, and any shortfall is made up by
//! civil disorder (newest units first).

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::board::{
    Board, CountryId, CountryLedger, NodeId, NodeKind, ProvinceId, ProvinceStatus, Unit, UnitId,
    UnitStatus, UnitType,
};

/// An adjustment order submitted by a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AdjustmentOrder {
    Build {
        country: CountryId,
        node: NodeId,
        unit_type: UnitType,
    },
    Disband {
        country: CountryId,
        unit: UnitId,
    },
}

impl AdjustmentOrder {
    pub fn country(&self) -> CountryId {
        match *self {
            AdjustmentOrder::Build { country, .. } | AdjustmentOrder::Disband { country, .. } => {
                country
            }
        }
    }
}

/// The result of resolving an adjustment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentResult {
    pub order: AdjustmentOrder,
    pub success: bool,
    pub explanation: String,
}

/// Everything an adjustment turn changes.
#[derive(Debug, Clone)]
pub struct AdjustmentResolution {
    pub results: Vec<AdjustmentResult>,
    /// Units created by successful builds.
    pub built: Vec<Unit>,
    /// Every pre-existing unit, with disbanded ones marked.
    pub units: Vec<Unit>,
    /// Units disbanded because too few disbands were submitted.
    pub civil_disorder: Vec<UnitId>,
}

/// Resolves adjustment orders for every country and updates `ledgers`.
pub fn resolve_adjustments(
    board: &Board,
    orders: &[AdjustmentOrder],
    ledgers: &mut BTreeMap<CountryId, CountryLedger>,
) -> AdjustmentResolution {
    let mut results = Vec::with_capacity(orders.len());
    let mut built = Vec::new();
    let mut disbanded: BTreeSet<UnitId> = BTreeSet::new();
    let mut build_sites: BTreeSet<ProvinceId> = BTreeSet::new();
    let mut next_id = board.units().iter().map(|u| u.id.0).max().unwrap_or(0) + 1;

    // country -> (builds done, disbands done)
    let mut used: BTreeMap<CountryId, (i32, i32)> = BTreeMap::new();

    for order in orders {
        let country = order.country();
        let balance = ledgers.get(&country).map_or(0, |l| l.adjustments);
        let (builds_done, disbands_done) = used.entry(country).or_insert((0, 0));

        let verdict = match *order {
            AdjustmentOrder::Build {
                node, unit_type, ..
            } => {
                let checked = if *builds_done >= balance {
                    Err("No Builds Remaining")
                } else {
                    validate_build(board, ledgers.get(&country), country, node, unit_type)
                        .and_then(|province| {
                            if build_sites.insert(province) {
                                Ok(())
                            } else {
                                Err("Duplicate Build Location")
                            }
                        })
                };
                checked.map(|()| {
                    *builds_done += 1;
                    built.push(Unit {
                        id: UnitId(next_id),
                        unit_type,
                        country,
                        node,
                        status: UnitStatus::Active,
                        displacer: None,
                    });
                    next_id += 1;
                })
            }
            AdjustmentOrder::Disband { unit, .. } => {
                if *disbands_done >= -balance {
                    Err("No Disbands Required")
                } else {
                    validate_disband(board, &disbanded, country, unit).map(|()| {
                        *disbands_done += 1;
                        disbanded.insert(unit);
                    })
                }
            }
        };

        results.push(AdjustmentResult {
            order: *order,
            success: verdict.is_ok(),
            explanation: match verdict {
                Ok(()) => "Success".to_string(),
                Err(reason) => format!("Invalid Order: {}", reason),
            },
        });
    }

    // Civil disorder: auto-disband newest units when disbands fall short.
    let mut civil_disorder = Vec::new();
    for ledger in ledgers.values() {
        let needed = -ledger.adjustments;
        let done = used.get(&ledger.country).map_or(0, |&(_, d)| d);
        if needed <= done {
            continue;
        }
        let mut candidates: Vec<&Unit> = board
            .units()
            .iter()
            .filter(|u| {
                u.country == ledger.country
                    && u.status == UnitStatus::Active
                    && !disbanded.contains(&u.id)
            })
            .collect();
        candidates.sort_by(|a, b| b.id.cmp(&a.id));
        for unit in candidates.into_iter().take((needed - done) as usize) {
            disbanded.insert(unit.id);
            civil_disorder.push(unit.id);
        }
    }
    if !civil_disorder.is_empty() {
        debug!("{} unit(s) disbanded in civil disorder", civil_disorder.len());
    }

    for unit in &built {
        if let Some(ledger) = ledgers.get_mut(&unit.country) {
            ledger.adjustments -= 1;
            ledger.unit_count += 1;
        }
    }
    let units = board
        .units()
        .iter()
        .map(|unit| {
            let mut unit = unit.clone();
            if disbanded.contains(&unit.id) {
                unit.status = UnitStatus::DisbandedAdjustment;
                if let Some(ledger) = ledgers.get_mut(&unit.country) {
                    ledger.adjustments += 1;
                    ledger.unit_count -= 1;
                }
            }
            unit
        })
        .collect();

    AdjustmentResolution {
        results,
        built,
        units,
        civil_disorder,
    }
}

/// Checks a build site and returns its province.
///
/// The province must be active, controlled by the builder, hold the
/// builder's capital and be empty. The node layer must suit the unit type.
fn validate_build(
    board: &Board,
    ledger: Option<&CountryLedger>,
    country: CountryId,
    node: NodeId,
    unit_type: UnitType,
) -> Result<ProvinceId, &'static str> {
    let node = board.node(node).ok_or("Invalid Build Location")?;
    let province = board.province(node.province).ok_or("Invalid Build Location")?;
    if province.controller != Some(country)
        || province.capital_owner != Some(country)
        || province.status != ProvinceStatus::Active
    {
        return Err("Invalid Build Location");
    }
    if board
        .units_in_province(province.id)
        .any(|u| u.status == UnitStatus::Active)
    {
        return Err("Province Occupied");
    }
    let layer = match unit_type {
        UnitType::Fleet => NodeKind::Sea,
        UnitType::Wing | UnitType::Nuke => NodeKind::Air,
        UnitType::Army | UnitType::Garrison => NodeKind::Land,
    };
    if node.kind != layer {
        return Err("Invalid Unit Type");
    }
    if unit_type == UnitType::Nuke && !ledger.map_or(false, CountryLedger::has_nukes) {
        return Err("No Nuclear Technology");
    }
    Ok(province.id)
}

fn validate_disband(
    board: &Board,
    disbanded: &BTreeSet<UnitId>,
    country: CountryId,
    unit: UnitId,
) -> Result<(), &'static str> {
    match board.unit(unit) {
        Some(u) if u.country == country && u.status == UnitStatus::Active => {
            if disbanded.contains(&unit) {
                Err("Duplicate Disband")
            } else {
                Ok(())
            }
        }
        _ => Err("Invalid Disband Unit"),
    }
}
