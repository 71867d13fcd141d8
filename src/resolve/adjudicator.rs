//! Staged order adjudication.
//!
//! Resolution runs over an arena of order records and unit slots in a fixed
//! sequence of stages; each stage observes what the earlier ones wrote:
//!
//! 1. nuclear launches
//! 2. support compliance, cuts and crediting
//! 3. movement legality and convoy compliance
//! 4. movement contests
//! 5. holds (including failed movers and supports)
//! 6. dependency propagation; withdrawing a support reopens the movement
//!    contests, otherwise a settle pass runs for affected provinces
//!
//! Every contest goes through [`Adjudicator::judge`], so a move's outcome
//! and the defender's outcome are always computed from the same tally.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, warn};
use rayon::prelude::*;

use crate::board::{
    Board, CountryId, NodeId, OrderId, OrderType, ProvinceId, ResolvedOrder, Unit, UnitId,
    UnitStatus,
};
use crate::movegen::{ConvoyPathExplorer, TransportNetwork};

use super::classify::{Classification, OrderBuckets};
use super::dependency::DependencyGraph;

/// Full outcome of one orders turn.
#[derive(Debug, Clone)]
pub struct Adjudication {
    pub orders: Vec<ResolvedOrder>,
    /// Every unit after resolution: final node, status, and displacer.
    pub units: Vec<Unit>,
    pub dependencies: usize,
    pub dependency_cycles: usize,
}

/// A submitted order and its working state.
#[derive(Debug, Clone)]
struct Entry {
    record: ResolvedOrder,
    slot: Option<usize>,
    target: Option<ProvinceId>,
    /// Compliant transport chains for a convoyed move.
    chains: usize,
}

/// A unit and its working state.
#[derive(Debug, Clone)]
struct Slot {
    unit: Unit,
    origin: ProvinceId,
    status: UnitStatus,
    entry: Option<usize>,
    /// Supports credited to this unit's order: (support entry, its country).
    supporters: Vec<(usize, CountryId)>,
    displacer: Option<ProvinceId>,
}

/// Outcome of one attacker's contest.
#[derive(Debug, Clone)]
struct Verdict {
    win: bool,
    explanation: String,
}

/// Joins a power lineup, own power first and rivals strongest first.
fn lineup(own: u32, mut rivals: Vec<u32>) -> String {
    rivals.sort_unstable_by(|a, b| b.cmp(a));
    let mut out = own.to_string();
    for r in rivals {
        out.push('v');
        out.push_str(&r.to_string());
    }
    out
}

pub struct Adjudicator<'a> {
    board: &'a Board,
    entries: Vec<Entry>,
    slots: Vec<Slot>,
    buckets: OrderBuckets,
    entry_by_order: HashMap<OrderId, usize>,
    network: TransportNetwork,
    fallout: BTreeSet<ProvinceId>,
    graph: DependencyGraph,
    /// Moves whose outcome was set by a movement contest.
    judged: BTreeSet<usize>,
}

impl<'a> Adjudicator<'a> {
    /// Builds the arena from a classified order set.
    pub fn new(board: &'a Board, classification: Classification) -> Self {
        let mut slots = Vec::with_capacity(board.units().len());
        let mut slot_of: HashMap<UnitId, usize> = HashMap::new();
        for unit in board.units() {
            let Some(origin) = board.unit_province(unit) else {
                continue;
            };
            slot_of.insert(unit.id, slots.len());
            slots.push(Slot {
                unit: unit.clone(),
                origin,
                status: unit.status,
                entry: None,
                supporters: Vec::new(),
                displacer: unit.displacer,
            });
        }

        let mut entries = Vec::with_capacity(classification.records.len());
        let mut entry_by_order = HashMap::new();
        for (idx, record) in classification.records.into_iter().enumerate() {
            let slot = slot_of.get(&record.order.unit).copied();
            if record.valid {
                if let Some(s) = slot {
                    slots[s].entry = Some(idx);
                }
            }
            let target = record
                .order
                .destination
                .and_then(|n| board.province_of(n))
                .map(|p| p.id);
            entry_by_order.insert(record.order.id, idx);
            entries.push(Entry {
                record,
                slot,
                target,
                chains: 0,
            });
        }

        Adjudicator {
            board,
            entries,
            slots,
            buckets: classification.buckets,
            entry_by_order,
            network: TransportNetwork::from_board(board),
            fallout: BTreeSet::new(),
            graph: DependencyGraph::new(),
            judged: BTreeSet::new(),
        }
    }

    /// Runs every stage and emits the final records.
    pub fn resolve(mut self) -> Adjudication {
        debug!(
            "adjudicating {} order(s): {} hold, {} move, {} convoyed, {} support, {} transport, {} nuke, {} invalid",
            self.entries.len(),
            self.buckets.holds.len(),
            self.buckets.moves.len(),
            self.buckets.move_convoyed.len(),
            self.buckets.supports.len(),
            self.buckets.transports.len(),
            self.buckets.nukes.len(),
            self.buckets.invalid.len(),
        );

        self.resolve_nukes();
        self.scan_convoys();
        self.resolve_supports();
        self.check_movement_legality();
        if !self.buckets.transports.is_empty() || !self.buckets.move_convoyed.is_empty() {
            self.resolve_transports();
            // Disrupted convoys leave new stayers behind.
            self.check_movement_legality();
        }
        let leavers = self.resolve_movement();
        self.add_leaver_dependencies(&leavers);
        let stayers: Vec<usize> = (0..self.slots.len()).collect();
        self.resolve_holds(&stayers);
        let cycles = self.propagate_dependencies();

        let dependencies = self.graph.len();
        debug!(
            "{} dependency edge(s), {} cycle(s)",
            dependencies, cycles
        );
        self.finish(dependencies, cycles)
    }

    // ---------------------------------------------------------------
    // Arena queries
    // ---------------------------------------------------------------

    fn order_type(&self, e: usize) -> OrderType {
        self.entries[e].record.order.order_type
    }

    fn slot_of(&self, e: usize) -> Option<&Slot> {
        self.entries[e].slot.map(|s| &self.slots[s])
    }

    fn country_of(&self, e: usize) -> Option<CountryId> {
        self.slot_of(e).map(|s| s.unit.country)
    }

    fn origin_of(&self, e: usize) -> Option<ProvinceId> {
        self.slot_of(e).map(|s| s.origin)
    }

    /// A valid move whose outcome is still open or successful.
    fn is_live_move(&self, e: usize) -> bool {
        let entry = &self.entries[e];
        let order_type = entry.record.order.order_type;
        entry.record.valid
            && order_type.is_move()
            && entry.record.success != Some(false)
            && self
                .slot_of(e)
                .map_or(false, |s| s.status == UnitStatus::Active)
            && (order_type != OrderType::MoveConvoyed || entry.chains > 0)
    }

    fn is_leaving(&self, slot: usize) -> bool {
        self.slots[slot].entry.map_or(false, |e| self.is_live_move(e))
    }

    fn power(&self, e: usize) -> u32 {
        self.slot_of(e).map_or(1, |s| 1 + s.supporters.len() as u32)
    }

    /// Power of `e` against a defender of `country`: that country's own
    /// supports never count toward dislodging it.
    fn power_against(&self, e: usize, country: CountryId) -> u32 {
        self.slot_of(e).map_or(1, |s| {
            1 + s.supporters.iter().filter(|&&(_, c)| c != country).count() as u32
        })
    }

    /// Defensive strength of a unit staying in place.
    fn defense(&self, slot: usize) -> u32 {
        let s = &self.slots[slot];
        match s.entry {
            Some(e) if self.order_type(e).is_move() => 1,
            _ => 1 + s.supporters.len() as u32,
        }
    }

    fn stayers_at(&self, province: ProvinceId) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&s| {
                let slot = &self.slots[s];
                slot.origin == province && slot.status.is_present() && !self.is_leaving(s)
            })
            .collect()
    }

    fn attackers_into(&self, province: ProvinceId, standard_only: bool) -> Vec<usize> {
        (0..self.entries.len())
            .filter(|&e| {
                self.entries[e].target == Some(province)
                    && self.is_live_move(e)
                    && (!standard_only || self.order_type(e) == OrderType::Move)
            })
            .collect()
    }

    /// The standard move coming the other way along `e`'s path.
    fn head_to_head(&self, e: usize) -> Option<usize> {
        if self.order_type(e) != OrderType::Move {
            return None;
        }
        let origin = self.origin_of(e)?;
        let target = self.entries[e].target?;
        (0..self.entries.len()).find(|&f| {
            f != e
                && self.order_type(f) == OrderType::Move
                && self.is_live_move(f)
                && self.origin_of(f) == Some(target)
                && self.entries[f].target == Some(origin)
        })
    }

    /// Decides one attacker against everyone else contesting its target.
    ///
    /// Rivals are the other attackers, the units staying at the target and
    /// the head-to-head opponent. The attacker must be strictly stronger than
    /// each of them.
    fn judge(&self, e: usize, attackers: &[usize]) -> Verdict {
        let Some(target) = self.entries[e].target else {
            return Verdict {
                win: false,
                explanation: "Invalid Destination".to_string(),
            };
        };
        let full = self.power(e);
        // (rival strength, attacker strength against that rival)
        let mut rivals: Vec<(u32, u32)> = Vec::new();
        for &f in attackers.iter().filter(|&&f| f != e) {
            rivals.push((self.power(f), full));
        }
        for s in self.stayers_at(target) {
            rivals.push((self.defense(s), self.power_against(e, self.slots[s].unit.country)));
        }
        if let Some(h) = self.head_to_head(e) {
            let country = self.country_of(h).unwrap_or(CountryId(0));
            rivals.push((self.power(h), self.power_against(e, country)));
        }

        if rivals.is_empty() {
            return Verdict {
                win: true,
                explanation: "Success".to_string(),
            };
        }
        let win = rivals.iter().all(|&(rival, mine)| mine > rival);
        // Shown against the weakest strength the attacker brings; rivals it
        // meets with extra supports are reduced by that margin.
        let own = rivals.iter().map(|&(_, mine)| mine).min().unwrap_or(full);
        let summary = lineup(
            own,
            rivals
                .iter()
                .map(|&(rival, mine)| (rival + own).saturating_sub(mine))
                .collect(),
        );
        Verdict {
            win,
            explanation: if win {
                format!("Victory: {}", summary)
            } else {
                format!("Bounce: {}", summary)
            },
        }
    }

    fn fail(&mut self, e: usize, explanation: &str) {
        let record = &mut self.entries[e].record;
        record.success = Some(false);
        record.explanation = explanation.to_string();
    }

    fn invalidate(&mut self, e: usize, explanation: &str) {
        self.entries[e].record.valid = false;
        self.fail(e, explanation);
    }

    // ---------------------------------------------------------------
    // Stage 1: nuclear launches
    // ---------------------------------------------------------------

    fn resolve_nukes(&mut self) {
        let mut launches: Vec<(usize, ProvinceId)> = Vec::new();
        for &e in &self.buckets.nukes.clone() {
            let (Some(target), Some(country)) = (self.entries[e].target, self.country_of(e)) else {
                self.invalidate(e, "Invalid Target");
                continue;
            };
            let own = self.entries[e].slot;
            let self_strike = self.slots.iter().enumerate().any(|(i, s)| {
                Some(i) != own
                    && s.origin == target
                    && s.status.is_present()
                    && s.unit.country == country
            });
            if self_strike {
                self.invalidate(e, "Invalid Order: No Self Nuking");
            } else {
                launches.push((e, target));
            }
        }

        let launchers: BTreeSet<usize> = launches
            .iter()
            .filter_map(|&(e, _)| self.entries[e].slot)
            .collect();
        for &(e, target) in &launches {
            if let Some(s) = self.entries[e].slot {
                self.slots[s].status = UnitStatus::Detonated;
            }
            let record = &mut self.entries[e].record;
            record.success = Some(true);
            record.explanation = "Detonated".to_string();
            self.fallout.insert(target);

            let victims: Vec<usize> = (0..self.slots.len())
                .filter(|i| {
                    !launchers.contains(i)
                        && self.slots[*i].origin == target
                        && self.slots[*i].status.is_present()
                })
                .collect();
            for v in victims {
                self.slots[v].status = UnitStatus::Nuked;
                if let Some(ve) = self.slots[v].entry {
                    self.fail(ve, "Nuked");
                }
            }
        }
        if !launches.is_empty() {
            debug!("{} nuclear strike(s) detonated", launches.len());
        }
    }

    // ---------------------------------------------------------------
    // Stage 2: supports
    // ---------------------------------------------------------------

    fn resolve_supports(&mut self) {
        for e in self.buckets.supports.clone() {
            let entry = &self.entries[e];
            if entry.record.success.is_some() {
                continue;
            }
            let Some(us) = entry.slot else { continue };
            if self.slots[us].status != UnitStatus::Active {
                continue;
            }
            let order = entry.record.order;
            let (Some(supported), Some(dest), Some(dest_province)) =
                (order.secondary_unit, order.destination, entry.target)
            else {
                self.invalidate(e, "Invalid Order: Noncompliance");
                continue;
            };
            let Some(vs) = self.slots.iter().position(|s| s.unit.id == supported) else {
                self.invalidate(e, "Invalid Order: Noncompliance");
                continue;
            };

            if !self.support_complies(order.order_type, vs, dest) {
                self.invalidate(e, "Invalid Order: Noncompliance");
                continue;
            }
            if self.slots[vs].status == UnitStatus::Nuked {
                self.invalidate(e, "Invalid Order: Supported Unit Nuked");
                continue;
            }
            if self.fallout.contains(&dest_province) {
                self.invalidate(e, "Invalid Order: Can't Support Into Nuclear Fallout");
                continue;
            }
            if self.support_is_cut(us, vs, dest_province) {
                let record = &mut self.entries[e].record;
                record.support_cut = true;
                record.success = Some(false);
                record.explanation = "Failed: Support Cut".to_string();
                continue;
            }

            let country = self.slots[us].unit.country;
            if dest != self.slots[vs].unit.node {
                let mut blocked = false;
                for x in 0..self.slots.len() {
                    let slot = &self.slots[x];
                    if x == vs
                        || slot.origin != dest_province
                        || !slot.status.is_present()
                        || slot.unit.country != country
                    {
                        continue;
                    }
                    match slot.entry.filter(|&xe| self.is_live_move(xe)) {
                        Some(xe) => {
                            let blocker = self.entries[xe].record.order.id;
                            self.graph.add(
                                blocker,
                                order.id,
                                "Invalid Order: Can't Self-Dislodge",
                                true,
                            );
                        }
                        None => blocked = true,
                    }
                }
                if blocked {
                    self.invalidate(e, "Invalid Order: Can't Self-Dislodge");
                    continue;
                }
            }

            self.slots[vs].supporters.push((e, country));
            let power = 1 + self.slots[vs].supporters.len();
            let record = &mut self.entries[e].record;
            record.success = Some(true);
            record.explanation = format!("Supported Unit Power: {}", power);
        }
    }

    /// Whether the supported unit is doing what the support declares.
    fn support_complies(&self, support_type: OrderType, supported: usize, dest: NodeId) -> bool {
        let slot = &self.slots[supported];
        let moving = slot.entry.filter(|&ve| {
            self.entries[ve].record.valid && self.order_type(ve).is_move()
        });
        match (support_type, moving) {
            (OrderType::SupportConvoyed, Some(ve)) => {
                self.order_type(ve) == OrderType::MoveConvoyed
                    && self.entries[ve].record.order.destination == Some(dest)
            }
            (OrderType::Support, Some(ve)) => {
                self.order_type(ve) == OrderType::Move
                    && self.entries[ve].record.order.destination == Some(dest)
            }
            (OrderType::Support, None) => slot.unit.node == dest,
            _ => false,
        }
    }

    /// A foreign attack on the supporter's province cuts it, unless it comes
    /// from the province the support is aimed at or from the supported unit.
    fn support_is_cut(&self, supporter: usize, supported: usize, aimed_at: ProvinceId) -> bool {
        let home = self.slots[supporter].origin;
        let country = self.slots[supporter].unit.country;
        (0..self.entries.len()).any(|m| {
            let entry = &self.entries[m];
            let Some(ms) = entry.slot else { return false };
            let slot = &self.slots[ms];
            entry.record.valid
                && entry.record.success != Some(false)
                && self.order_type(m).is_move()
                && entry.target == Some(home)
                && slot.status == UnitStatus::Active
                && ms != supported
                && slot.unit.country != country
                && slot.origin != aimed_at
                && (self.order_type(m) == OrderType::Move || entry.chains > 0)
        })
    }

    // ---------------------------------------------------------------
    // Stage 3: movement legality and convoys
    // ---------------------------------------------------------------

    /// Transport unit -> (carried unit, destination) for every transport
    /// order still standing.
    fn transport_pledges(&self) -> HashMap<UnitId, (UnitId, NodeId)> {
        self.buckets
            .transports
            .iter()
            .filter(|&&t| {
                let entry = &self.entries[t];
                entry.record.valid
                    && entry.record.success != Some(false)
                    && self
                        .slot_of(t)
                        .map_or(false, |s| s.status == UnitStatus::Active)
            })
            .filter_map(|&t| {
                let order = self.entries[t].record.order;
                Some((order.unit, (order.secondary_unit?, order.destination?)))
            })
            .collect()
    }

    fn compliant_chains(
        &self,
        pledges: &HashMap<UnitId, (UnitId, NodeId)>,
        carried: UnitId,
        dest: NodeId,
    ) -> usize {
        let explorer = ConvoyPathExplorer::new(&self.network, |t| {
            pledges.get(&t) == Some(&(carried, dest))
        });
        explorer.paths_to(carried, dest).len()
    }

    /// Counts compliant chains for every convoyed move.
    fn scan_convoys(&mut self) {
        if self.buckets.move_convoyed.is_empty() {
            return;
        }
        let pledges = self.transport_pledges();
        for e in self.buckets.move_convoyed.clone() {
            let order = self.entries[e].record.order;
            let chains = match order.destination {
                Some(dest) if self.entries[e].record.success.is_none() => {
                    self.compliant_chains(&pledges, order.unit, dest)
                }
                _ => 0,
            };
            self.entries[e].chains = chains;
        }
    }

    /// Invalidates moves into fallout or onto the mover's own units,
    /// repeating until no new stayer appears.
    fn check_movement_legality(&mut self) {
        let movers: Vec<usize> = self
            .buckets
            .moves
            .iter()
            .chain(self.buckets.move_convoyed.iter())
            .copied()
            .collect();
        loop {
            let mut changed = false;
            for &e in &movers {
                let entry = &self.entries[e];
                if !entry.record.valid || entry.record.success.is_some() {
                    continue;
                }
                let (Some(target), Some(country)) = (entry.target, self.country_of(e)) else {
                    continue;
                };
                if self.fallout.contains(&target) {
                    self.invalidate(e, "Invalid Order: Can't Enter Nuclear Fallout");
                    changed = true;
                    continue;
                }
                let own_stayer = self
                    .stayers_at(target)
                    .into_iter()
                    .any(|s| self.slots[s].unit.country == country);
                let own_swap = self
                    .head_to_head(e)
                    .map_or(false, |h| self.country_of(h) == Some(country));
                if own_stayer || own_swap {
                    self.invalidate(e, "Invalid Order: Can't Self-Dislodge");
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn resolve_transports(&mut self) {
        let pledges = self.transport_pledges();

        let mut attempts: BTreeMap<(UnitId, NodeId), usize> = BTreeMap::new();
        for e in self.buckets.move_convoyed.clone() {
            let order = self.entries[e].record.order;
            let Some(dest) = order.destination else { continue };
            if !self.entries[e].record.valid || self.entries[e].record.success.is_some() {
                continue;
            }
            attempts.insert((order.unit, dest), self.entries[e].chains);
            if self.entries[e].chains == 0 {
                self.fail(e, "Failed: Transport Noncompliance");
            }
        }

        for t in self.buckets.transports.clone() {
            if self.entries[t].record.success.is_some() {
                continue;
            }
            let order = self.entries[t].record.order;
            let key = order.secondary_unit.zip(order.destination);
            match key.and_then(|k| attempts.get(&k)) {
                None => self.invalidate(t, "Invalid Order: Noncompliance"),
                Some(0) => self.invalidate(t, "Invalid Order: Insufficient Compliance"),
                Some(_) => self.hold_transport(t),
            }
        }

        // Dislodged transports drop out of every chain.
        let pledges_after = self.transport_pledges();
        if pledges_after.len() != pledges.len() {
            for e in self.buckets.move_convoyed.clone() {
                if self.entries[e].chains == 0 || self.entries[e].record.success.is_some() {
                    continue;
                }
                let order = self.entries[e].record.order;
                let Some(dest) = order.destination else { continue };
                let chains = self.compliant_chains(&pledges_after, order.unit, dest);
                self.entries[e].chains = chains;
                if chains == 0 {
                    self.fail(e, "Failed: Convoy Disrupted");
                }
            }
        }
    }

    /// A transport holds its own position against standard moves only.
    fn hold_transport(&mut self, t: usize) {
        let Some(ts) = self.entries[t].slot else { return };
        let province = self.slots[ts].origin;
        let attackers = self.attackers_into(province, true);
        if attackers.is_empty() {
            let record = &mut self.entries[t].record;
            record.success = Some(true);
            record.explanation = "Success".to_string();
            return;
        }

        let country = self.slots[ts].unit.country;
        let winner = attackers
            .iter()
            .copied()
            .find(|&a| self.judge(a, &attackers).win);
        let summary = lineup(
            self.defense(ts),
            attackers
                .iter()
                .map(|&a| self.power_against(a, country))
                .collect(),
        );
        match winner {
            Some(a) => {
                self.slots[ts].status = UnitStatus::Retreat;
                self.slots[ts].displacer = self.origin_of(a);
                self.fail(t, &format!("Hold Failed: {}", summary));
            }
            None => {
                let record = &mut self.entries[t].record;
                record.success = Some(true);
                record.explanation = format!("Hold Victory: {}", summary);
            }
        }
    }

    // ---------------------------------------------------------------
    // Stage 4: movement
    // ---------------------------------------------------------------

    /// Decides every open move. Returns the slots that were leaving their
    /// province when the contests were judged.
    fn resolve_movement(&mut self) -> BTreeSet<usize> {
        let leavers: BTreeSet<usize> = (0..self.slots.len())
            .filter(|&s| self.is_leaving(s))
            .collect();

        let mut by_target: BTreeMap<ProvinceId, Vec<usize>> = BTreeMap::new();
        for e in 0..self.entries.len() {
            if self.is_live_move(e) && self.entries[e].record.success.is_none() {
                if let Some(p) = self.entries[e].target {
                    by_target.entry(p).or_default().push(e);
                }
            }
        }
        let groups: Vec<(ProvinceId, Vec<usize>)> = by_target.into_iter().collect();

        let verdicts: Vec<(usize, Verdict)> = groups
            .par_iter()
            .flat_map_iter(|(province, _)| {
                let attackers = self.attackers_into(*province, false);
                attackers
                    .iter()
                    .map(|&e| (e, self.judge(e, &attackers)))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (e, verdict) in verdicts {
            if self.entries[e].record.success.is_some() {
                continue;
            }
            self.judged.insert(e);
            let record = &mut self.entries[e].record;
            record.success = Some(verdict.win);
            record.explanation = verdict.explanation;
        }
        leavers
    }

    /// A successful move into a province someone was leaving depends on
    /// that departure: if it fails, a lone or same-country mover fails too.
    fn add_leaver_dependencies(&mut self, leavers: &BTreeSet<usize>) {
        for e in 0..self.entries.len() {
            if !self.order_type(e).is_move() || self.entries[e].record.success != Some(true) {
                continue;
            }
            let (Some(target), Some(country)) = (self.entries[e].target, self.country_of(e)) else {
                continue;
            };
            let partner = self.head_to_head(e);
            for &l in leavers {
                let slot = &self.slots[l];
                let Some(le) = slot.entry else { continue };
                if slot.origin != target || Some(le) == partner {
                    continue;
                }
                let blocker = self.entries[le].record.order.id;
                let dependent = self.entries[e].record.order.id;
                if slot.unit.country == country {
                    self.graph
                        .add(blocker, dependent, "Invalid Order: Can't Self-Dislodge", true);
                } else if self.power_against(e, slot.unit.country) <= 1 {
                    self.graph.add(blocker, dependent, "Failed: Bounce 1v1", false);
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Stage 5: holds
    // ---------------------------------------------------------------

    /// Settles every staying unit among `candidates` against the moves
    /// aimed at its province.
    fn resolve_holds(&mut self, candidates: &[usize]) {
        for &s in candidates {
            let slot = &self.slots[s];
            if !slot.status.is_present() || self.is_leaving(s) {
                continue;
            }
            let province = slot.origin;
            let country = slot.unit.country;
            let entry = slot.entry;

            let attackers: Vec<usize> = (0..self.entries.len())
                .filter(|&e| {
                    let en = &self.entries[e];
                    en.record.valid
                        && self.order_type(e).is_move()
                        && en.target == Some(province)
                        && en.slot != Some(s)
                })
                .collect();
            let winner = attackers
                .iter()
                .copied()
                .find(|&a| self.entries[a].record.success == Some(true));

            match winner {
                Some(a) => {
                    self.slots[s].status = UnitStatus::Retreat;
                    self.slots[s].displacer = self.origin_of(a);
                }
                None if self.slots[s].status == UnitStatus::Retreat
                    && self.slots[s].unit.status == UnitStatus::Active =>
                {
                    self.slots[s].status = UnitStatus::Active;
                    self.slots[s].displacer = None;
                }
                None => {}
            }

            let Some(e) = entry else { continue };
            if attackers.is_empty() {
                if self.order_type(e) == OrderType::Hold {
                    let record = &mut self.entries[e].record;
                    record.success = Some(true);
                    record.explanation = "Success".to_string();
                }
                continue;
            }

            let summary = lineup(
                self.defense(s),
                attackers
                    .iter()
                    .map(|&a| self.power_against(a, country))
                    .collect(),
            );
            let dislodged = winner.is_some();
            let order_type = self.order_type(e);
            let record = &mut self.entries[e].record;
            if order_type == OrderType::Hold {
                record.success = Some(!dislodged);
                record.explanation = if dislodged {
                    format!("Dislodged: {}", summary)
                } else {
                    format!("Victory: {}", summary)
                };
            } else if order_type.is_transport() && record.valid {
                record.success = Some(!dislodged);
                record.explanation = if dislodged {
                    format!("Hold Failed: {}", summary)
                } else {
                    format!("Hold Victory: {}", summary)
                };
            } else {
                record.secondary_explanation = Some(if dislodged {
                    format!("Dislodged: {}", summary)
                } else {
                    format!("Victory: {}", summary)
                });
            }
        }
    }

    // ---------------------------------------------------------------
    // Stage 6: dependencies
    // ---------------------------------------------------------------

    fn propagate_dependencies(&mut self) -> usize {
        if self.graph.is_empty() {
            return 0;
        }
        let cycles = self.graph.cycles();
        for cycle in &cycles {
            let ids: Vec<u32> = cycle.iter().map(|o| o.0).collect();
            warn!("dependency cycle among orders {:?}", ids);
        }

        let mut forced_entries: BTreeSet<usize> = BTreeSet::new();
        loop {
            let forced = {
                let entries = &self.entries;
                let by_order = &self.entry_by_order;
                self.graph
                    .propagate(|id| by_order.get(&id).and_then(|&e| entries[e].record.success))
            };

            let mut touched: BTreeSet<ProvinceId> = BTreeSet::new();
            let mut withdrawn = false;
            for failure in forced {
                let Some(&e) = self.entry_by_order.get(&failure.order) else {
                    continue;
                };
                forced_entries.insert(e);
                if self.order_type(e).is_move() {
                    touched.extend(self.origin_of(e));
                    touched.extend(self.entries[e].target);
                }
                if self.order_type(e).is_support() {
                    withdrawn |= self.withdraw_support(e);
                }
                let record = &mut self.entries[e].record;
                record.success = Some(false);
                record.explanation = failure.explanation;
                if failure.invalidates {
                    record.valid = false;
                }
            }

            if withdrawn {
                // Contests were judged with supports that no longer stand.
                self.rejudge_movement(&forced_entries);
                continue;
            }
            if !touched.is_empty() {
                let affected: Vec<usize> = (0..self.slots.len())
                    .filter(|&s| touched.contains(&self.slots[s].origin))
                    .collect();
                self.resolve_holds(&affected);
            }
            break;
        }
        cycles.len()
    }

    /// Removes a failed support from the unit it was credited to.
    fn withdraw_support(&mut self, support: usize) -> bool {
        let mut withdrawn = false;
        for slot in &mut self.slots {
            let before = slot.supporters.len();
            slot.supporters.retain(|&(e, _)| e != support);
            withdrawn |= slot.supporters.len() != before;
        }
        withdrawn
    }

    /// Reopens every contested move that propagation did not force and
    /// decides movement and holds again.
    fn rejudge_movement(&mut self, forced: &BTreeSet<usize>) {
        let reopened: Vec<usize> = self
            .judged
            .iter()
            .copied()
            .filter(|e| !forced.contains(e))
            .collect();
        debug!("re-judging {} move(s) after withdrawn supports", reopened.len());
        for e in reopened {
            self.entries[e].record.success = None;
            if let Some(s) = self.entries[e].slot {
                let slot = &mut self.slots[s];
                if slot.status == UnitStatus::Retreat && slot.unit.status == UnitStatus::Active {
                    slot.status = UnitStatus::Active;
                    slot.displacer = None;
                }
            }
        }
        let leavers = self.resolve_movement();
        self.add_leaver_dependencies(&leavers);
        let stayers: Vec<usize> = (0..self.slots.len()).collect();
        self.resolve_holds(&stayers);
    }

    // ---------------------------------------------------------------
    // Output
    // ---------------------------------------------------------------

    fn finish(self, dependencies: usize, dependency_cycles: usize) -> Adjudication {
        let mut units = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let mut unit = slot.unit.clone();
            unit.status = slot.status;
            unit.displacer = if slot.status == UnitStatus::Retreat {
                slot.displacer
            } else {
                None
            };
            if let Some(e) = slot.entry {
                let record = &self.entries[e].record;
                let moved = record.order.order_type.is_move()
                    && record.success == Some(true)
                    && slot.status.is_present();
                if moved {
                    if let Some(dest) = record.order.destination {
                        unit.node = dest;
                    }
                }
            }
            units.push(unit);
        }

        // Only supports whose records stand count toward reported power.
        let powers: Vec<u32> = self
            .slots
            .iter()
            .map(|slot| {
                let standing = slot.supporters.iter().filter(|&&(support, _)| {
                    let support = &self.entries[support].record;
                    support.valid && support.success == Some(true)
                });
                1 + standing.count() as u32
            })
            .collect();

        let orders = self
            .entries
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| {
                let mut record = entry.record;
                if let Some(s) = entry.slot {
                    let slot = &self.slots[s];
                    record.unit_status = slot.status;
                    if slot.entry == Some(idx) {
                        record.power = powers[s];
                    }
                }
                record
            })
            .collect();

        Adjudication {
            orders,
            units,
            dependencies,
            dependency_cycles,
        }
    }
}
