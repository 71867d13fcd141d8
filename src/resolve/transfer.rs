//! Tech and build transfers between countries.
//!
//! Tech transfer is a handshake: a nuclear power names a partner without
//! nuclear technology, and that partner names it back. Build transfers move
//! banked builds from one country to another, in submission order, capped by
//! what the giver still has.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{CountryId, CountryLedger};

/// A transfer order submitted by one country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TransferOrder {
    /// Offer (holder) or request (non-holder) of nuclear technology.
    Tech { country: CountryId, partner: CountryId },
    /// Give `builds` banked builds to `to`.
    Build {
        from: CountryId,
        to: CountryId,
        builds: u32,
    },
}

/// Outcome of one transfer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub order: TransferOrder,
    pub success: bool,
    /// Builds actually moved for a build transfer, zero for tech.
    pub builds: u32,
}

/// Resolves every transfer and applies the effects to `ledgers`.
///
/// A successful tech handshake grants the recipient `default_nuke_range`.
pub fn resolve_transfers(
    orders: &[TransferOrder],
    ledgers: &mut BTreeMap<CountryId, CountryLedger>,
    default_nuke_range: u32,
) -> Vec<TransferResult> {
    let has_nukes = |c: CountryId, ledgers: &BTreeMap<CountryId, CountryLedger>| {
        ledgers.get(&c).map_or(false, CountryLedger::has_nukes)
    };

    let mut named: BTreeMap<CountryId, CountryId> = BTreeMap::new();
    for order in orders {
        if let TransferOrder::Tech { country, partner } = *order {
            named.insert(country, partner);
        }
    }

    let mut results = Vec::with_capacity(orders.len());
    let mut recipients = Vec::new();
    for order in orders {
        match *order {
            TransferOrder::Tech { country, partner } => {
                let mutual = named.get(&partner) == Some(&country);
                let holder = has_nukes(country, ledgers);
                let success = mutual && holder != has_nukes(partner, ledgers);
                if success && holder {
                    recipients.push(partner);
                }
                results.push(TransferResult {
                    order: *order,
                    success,
                    builds: 0,
                });
            }
            TransferOrder::Build { from, to, builds } => {
                let available = ledgers
                    .get(&from)
                    .map_or(0, |l| u32::try_from(l.builds).unwrap_or(0));
                let moved = if ledgers.contains_key(&to) && from != to {
                    builds.min(available)
                } else {
                    0
                };
                if moved > 0 {
                    if let Some(giver) = ledgers.get_mut(&from) {
                        giver.builds -= moved as i32;
                    }
                    if let Some(receiver) = ledgers.get_mut(&to) {
                        receiver.builds += moved as i32;
                    }
                }
                results.push(TransferResult {
                    order: *order,
                    success: moved > 0,
                    builds: moved,
                });
            }
        }
    }

    for country in recipients {
        if let Some(ledger) = ledgers.get_mut(&country) {
            ledger.nuke_range = Some(default_nuke_range);
        }
    }
    results
}
