//! Adjudication scenarios.
//!
//! Each test builds a small map, submits one turn of orders and checks the
//! resolved records and final unit positions.

mod common;

use common::MapBuilder;
use hegemon::board::*;
use hegemon::resolve::{self, Adjudication};

fn adjudicate(board: &Board, orders: &[Order]) -> Adjudication {
    resolve::adjudicate(board, orders)
}

fn record(adj: &Adjudication, id: u32) -> &ResolvedOrder {
    adj.orders
        .iter()
        .find(|r| r.order.id == OrderId(id))
        .unwrap()
}

fn unit(adj: &Adjudication, id: u32) -> &Unit {
    adj.units.iter().find(|u| u.id == UnitId(id)).unwrap()
}

fn assert_outcome(adj: &Adjudication, id: u32, success: bool, explanation: &str) {
    let r = record(adj, id);
    assert_eq!(r.success, Some(success), "order {}: {:?}", id, r);
    assert_eq!(r.explanation, explanation, "order {}", id);
}

/// 3x3 land grid, spring orders:
///
/// ```text
/// 1 2 3
/// 4 5 6
/// 7 8 9
/// ```
fn grid() -> MapBuilder {
    MapBuilder::grid(TurnPhase::SpringOrders, 3)
}

// ---------------------------------------------------------------------------
// Moves and supports
// ---------------------------------------------------------------------------

#[test]
fn unopposed_move_succeeds() {
    let board = grid().army(1, 1, 10).board();
    let adj = adjudicate(&board, &[Order::new(1, 1, OrderType::Move, 20)]);

    assert_outcome(&adj, 1, true, "Success");
    assert_eq!(unit(&adj, 1).node, NodeId(20));
    assert_eq!(unit(&adj, 1).status, UnitStatus::Active);
    assert_eq!(adj.dependency_cycles, 0);
}

#[test]
fn equal_moves_bounce() {
    let board = grid().army(1, 1, 10).army(2, 2, 30).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 20),
        ],
    );

    assert_outcome(&adj, 1, false, "Bounce: 1v1");
    assert_outcome(&adj, 2, false, "Bounce: 1v1");
    assert_eq!(unit(&adj, 1).node, NodeId(10));
    assert_eq!(unit(&adj, 2).node, NodeId(30));
    assert_eq!(unit(&adj, 2).status, UnitStatus::Active);
}

#[test]
fn three_way_standoff() {
    let board = grid().army(1, 1, 10).army(2, 2, 30).army(3, 3, 50).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 20),
            Order::new(3, 3, OrderType::Move, 20),
        ],
    );

    for id in 1..=3 {
        assert_outcome(&adj, id, false, "Bounce: 1v1v1");
    }
}

#[test]
fn support_breaks_standoff() {
    let board = grid().army(1, 1, 10).army(2, 2, 30).army(3, 1, 50).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 20),
            Order::with_secondary(3, 3, OrderType::Support, 1, 20),
        ],
    );

    assert_outcome(&adj, 1, true, "Victory: 2v1");
    assert_outcome(&adj, 2, false, "Bounce: 1v2");
    assert_outcome(&adj, 3, true, "Supported Unit Power: 2");
    assert_eq!(record(&adj, 1).power, 2);
    assert_eq!(unit(&adj, 1).node, NodeId(20));
    assert_eq!(unit(&adj, 2).node, NodeId(30));
}

#[test]
fn attack_on_supporter_cuts_support() {
    let board = grid()
        .army(1, 1, 10)
        .army(2, 2, 30)
        .army(3, 1, 50)
        .army(4, 2, 60)
        .board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 20),
            Order::with_secondary(3, 3, OrderType::Support, 1, 20),
            Order::new(4, 4, OrderType::Move, 50),
        ],
    );

    let support = record(&adj, 3);
    assert!(support.support_cut);
    assert_outcome(&adj, 3, false, "Failed: Support Cut");
    assert_eq!(support.secondary_explanation.as_deref(), Some("Victory: 1v1"));

    assert_outcome(&adj, 1, false, "Bounce: 1v1");
    assert_outcome(&adj, 2, false, "Bounce: 1v1");
    assert_outcome(&adj, 4, false, "Bounce: 1v1");
    assert_eq!(unit(&adj, 3).status, UnitStatus::Active);
}

#[test]
fn attack_from_supported_target_does_not_cut() {
    let board = grid().army(1, 1, 10).army(2, 2, 20).army(3, 1, 50).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 50),
            Order::with_secondary(3, 3, OrderType::Support, 1, 20),
        ],
    );

    assert!(!record(&adj, 3).support_cut);
    assert_outcome(&adj, 3, true, "Supported Unit Power: 2");
    assert_outcome(&adj, 1, true, "Success");
    assert_outcome(&adj, 2, false, "Bounce: 1v1");

    let dislodged = unit(&adj, 2);
    assert_eq!(dislodged.status, UnitStatus::Retreat);
    assert_eq!(dislodged.displacer, Some(ProvinceId(1)));
    assert_eq!(dislodged.node, NodeId(20));
    assert_eq!(record(&adj, 2).unit_status, UnitStatus::Retreat);
    assert_eq!(
        record(&adj, 2).secondary_explanation.as_deref(),
        Some("Dislodged: 1v2")
    );
}

#[test]
fn hold_against_equal_attack() {
    let board = grid().army(1, 1, 10).army(2, 2, 20).board();
    let adj = adjudicate(
        &board,
        &[Order::new(1, 1, OrderType::Move, 20), Order::hold(2, 2)],
    );

    assert_outcome(&adj, 1, false, "Bounce: 1v1");
    assert_outcome(&adj, 2, true, "Victory: 1v1");
}

#[test]
fn supported_attack_dislodges_holder() {
    let board = grid().army(1, 1, 10).army(2, 2, 20).army(3, 1, 30).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::hold(2, 2),
            Order::with_secondary(3, 3, OrderType::Support, 1, 20),
        ],
    );

    assert_outcome(&adj, 1, true, "Victory: 2v1");
    assert_outcome(&adj, 2, false, "Dislodged: 1v2");
    assert_eq!(unit(&adj, 2).status, UnitStatus::Retreat);
    assert_eq!(unit(&adj, 2).displacer, Some(ProvinceId(1)));
}

#[test]
fn support_hold_matches_supported_attack() {
    let board = grid()
        .army(1, 1, 10)
        .army(2, 2, 20)
        .army(3, 1, 30)
        .army(4, 2, 50)
        .board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::hold(2, 2),
            Order::with_secondary(3, 3, OrderType::Support, 1, 20),
            Order::with_secondary(4, 4, OrderType::Support, 2, 20),
        ],
    );

    assert_outcome(&adj, 1, false, "Bounce: 2v2");
    assert_outcome(&adj, 2, true, "Victory: 2v2");
    assert_outcome(&adj, 4, true, "Supported Unit Power: 2");
}

#[test]
fn support_for_a_different_move_is_noncompliant() {
    let board = grid().army(1, 1, 10).army(2, 1, 50).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::with_secondary(2, 2, OrderType::Support, 1, 40),
        ],
    );

    let support = record(&adj, 2);
    assert!(!support.valid);
    assert_eq!(support.explanation, "Invalid Order: Noncompliance");
    assert_outcome(&adj, 1, true, "Success");
}

// ---------------------------------------------------------------------------
// Self-dislodgement
// ---------------------------------------------------------------------------

#[test]
fn cannot_attack_own_unit() {
    let board = grid().army(1, 1, 10).army(2, 1, 20).board();
    let adj = adjudicate(
        &board,
        &[Order::new(1, 1, OrderType::Move, 20), Order::hold(2, 2)],
    );

    assert!(!record(&adj, 1).valid);
    assert_outcome(&adj, 1, false, "Invalid Order: Can't Self-Dislodge");
    assert_outcome(&adj, 2, true, "Success");
    assert_eq!(unit(&adj, 1).node, NodeId(10));
}

#[test]
fn support_against_own_unit_is_invalid() {
    let board = grid().army(1, 2, 10).army(2, 1, 20).army(3, 1, 50).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::hold(2, 2),
            Order::with_secondary(3, 3, OrderType::Support, 1, 20),
        ],
    );

    assert!(!record(&adj, 3).valid);
    assert_outcome(&adj, 3, false, "Invalid Order: Can't Self-Dislodge");
    assert_outcome(&adj, 1, false, "Bounce: 1v1");
    assert_outcome(&adj, 2, true, "Victory: 1v1");
    assert_eq!(unit(&adj, 2).status, UnitStatus::Active);
}

#[test]
fn own_units_cannot_swap() {
    let board = grid().army(1, 1, 10).army(2, 1, 20).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 10),
        ],
    );

    assert!(!record(&adj, 1).valid);
    assert!(!record(&adj, 2).valid);
    assert_eq!(unit(&adj, 1).node, NodeId(10));
    assert_eq!(unit(&adj, 2).node, NodeId(20));
}

// ---------------------------------------------------------------------------
// Head-to-head
// ---------------------------------------------------------------------------

#[test]
fn equal_head_to_head_bounces() {
    let board = grid().army(1, 1, 10).army(2, 2, 20).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 10),
        ],
    );

    assert_outcome(&adj, 1, false, "Bounce: 1v1");
    assert_outcome(&adj, 2, false, "Bounce: 1v1");
    assert_eq!(unit(&adj, 1).status, UnitStatus::Active);
    assert_eq!(unit(&adj, 2).status, UnitStatus::Active);
}

#[test]
fn supported_head_to_head_dislodges() {
    let board = grid().army(1, 1, 10).army(2, 2, 20).army(3, 1, 50).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 10),
            Order::with_secondary(3, 3, OrderType::Support, 1, 20),
        ],
    );

    assert_outcome(&adj, 1, true, "Victory: 2v1");
    assert_outcome(&adj, 2, false, "Bounce: 1v2");
    assert_eq!(unit(&adj, 1).node, NodeId(20));
    assert_eq!(unit(&adj, 2).status, UnitStatus::Retreat);
    assert_eq!(unit(&adj, 2).displacer, Some(ProvinceId(1)));
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

#[test]
fn rotation_succeeds() {
    // 1 -> 2 -> 5 -> 4 -> 1
    let board = grid()
        .army(1, 1, 10)
        .army(2, 2, 20)
        .army(3, 3, 50)
        .army(4, 4, 40)
        .board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 50),
            Order::new(3, 3, OrderType::Move, 40),
            Order::new(4, 4, OrderType::Move, 10),
        ],
    );

    for id in 1..=4 {
        assert_outcome(&adj, id, true, "Success");
    }
    assert_eq!(unit(&adj, 1).node, NodeId(20));
    assert_eq!(unit(&adj, 4).node, NodeId(10));
    assert_eq!(adj.dependency_cycles, 1);
    assert!(adj.units.iter().all(|u| u.status == UnitStatus::Active));
}

#[test]
fn rotation_with_own_units_succeeds() {
    let board = grid()
        .army(1, 1, 10)
        .army(2, 1, 20)
        .army(3, 1, 50)
        .army(4, 1, 40)
        .board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 50),
            Order::new(3, 3, OrderType::Move, 40),
            Order::new(4, 4, OrderType::Move, 10),
        ],
    );

    for id in 1..=4 {
        assert!(record(&adj, id).valid);
        assert_outcome(&adj, id, true, "Success");
    }
}

#[test]
fn follower_fails_when_leader_bounces() {
    let board = grid().army(1, 1, 10).army(2, 2, 20).army(3, 3, 30).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 30),
            Order::hold(3, 3),
        ],
    );

    assert_outcome(&adj, 2, false, "Bounce: 1v1");
    assert_outcome(&adj, 1, false, "Failed: Bounce 1v1");
    assert_outcome(&adj, 3, true, "Victory: 1v1");
    assert_eq!(
        record(&adj, 2).secondary_explanation.as_deref(),
        Some("Victory: 1v1")
    );

    assert_eq!(unit(&adj, 1).node, NodeId(10));
    let leader = unit(&adj, 2);
    assert_eq!(leader.node, NodeId(20));
    assert_eq!(leader.status, UnitStatus::Active);
    assert_eq!(leader.displacer, None);
}

#[test]
fn supported_follower_dislodges_bounced_leader() {
    let board = grid()
        .army(1, 1, 10)
        .army(2, 2, 20)
        .army(3, 3, 30)
        .army(4, 1, 50)
        .board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 30),
            Order::hold(3, 3),
            Order::with_secondary(4, 4, OrderType::Support, 1, 20),
        ],
    );

    assert_outcome(&adj, 1, true, "Success");
    assert_outcome(&adj, 2, false, "Bounce: 1v1");
    assert_eq!(unit(&adj, 1).node, NodeId(20));
    assert_eq!(unit(&adj, 2).status, UnitStatus::Retreat);
    assert_eq!(unit(&adj, 2).displacer, Some(ProvinceId(1)));
}

#[test]
fn follower_of_own_bounced_unit_is_invalidated() {
    let board = grid().army(1, 1, 10).army(2, 1, 20).army(3, 3, 30).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 30),
            Order::hold(3, 3),
        ],
    );

    assert!(!record(&adj, 1).valid);
    assert_outcome(&adj, 1, false, "Invalid Order: Can't Self-Dislodge");
    assert_eq!(unit(&adj, 1).node, NodeId(10));
    assert_eq!(unit(&adj, 2).status, UnitStatus::Active);
}

#[test]
fn support_lost_to_own_bounced_unit_reopens_the_contest() {
    // Province 5 also borders the diagonal corners.
    let board = grid()
        .link(10, 50)
        .link(70, 50)
        .link(90, 50)
        .army(1, 1, 50)
        .army(2, 2, 40)
        .army(3, 1, 10)
        .army(4, 2, 70)
        .army(5, 3, 60)
        .army(6, 3, 90)
        .army(7, 4, 20)
        .board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Move, 20),
            Order::new(2, 2, OrderType::Move, 50),
            Order::with_secondary(3, 3, OrderType::Support, 2, 50),
            Order::with_secondary(4, 4, OrderType::Support, 2, 50),
            Order::new(5, 5, OrderType::Move, 50),
            Order::with_secondary(6, 6, OrderType::Support, 5, 50),
            Order::hold(7, 7),
        ],
    );

    // Unit 1 stays home, so country 1's support would dislodge it.
    assert_outcome(&adj, 1, false, "Bounce: 1v1");
    assert!(!record(&adj, 3).valid);
    assert_outcome(&adj, 3, false, "Invalid Order: Can't Self-Dislodge");

    // Without it the two attacks on 5 are even.
    assert_outcome(&adj, 2, false, "Bounce: 2v2");
    assert_outcome(&adj, 5, false, "Bounce: 2v2");
    assert_eq!(record(&adj, 2).power, 2);
    assert_eq!(record(&adj, 5).power, 2);

    let home = unit(&adj, 1);
    assert_eq!(home.status, UnitStatus::Active);
    assert_eq!(home.node, NodeId(50));
    assert_eq!(unit(&adj, 2).node, NodeId(40));
    assert_eq!(unit(&adj, 5).node, NodeId(60));
}

// ---------------------------------------------------------------------------
// Nuclear strikes
// ---------------------------------------------------------------------------

/// Country 1 holds nuclear technology with unlimited range.
fn nuclear_grid() -> MapBuilder {
    grid()
        .country(CountryLedger {
            nuke_range: Some(0),
            ..CountryLedger::new(CountryId(1))
        })
        .unit(1, UnitType::Nuke, 1, 10)
}

#[test]
fn self_nuking_is_invalid() {
    let board = nuclear_grid().army(2, 1, 30).board();
    let adj = adjudicate(
        &board,
        &[Order::new(1, 1, OrderType::Nuke, 31), Order::hold(2, 2)],
    );

    assert!(!record(&adj, 1).valid);
    assert_outcome(&adj, 1, false, "Invalid Order: No Self Nuking");
    assert_eq!(unit(&adj, 1).status, UnitStatus::Active);
    assert_eq!(unit(&adj, 1).node, NodeId(10));
    assert_eq!(unit(&adj, 2).status, UnitStatus::Active);
}

#[test]
fn strike_destroys_occupants_and_closes_province() {
    let board = nuclear_grid()
        .army(2, 2, 30)
        .army(3, 3, 20)
        .army(4, 3, 60)
        .board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Nuke, 31),
            Order::hold(2, 2),
            Order::new(3, 3, OrderType::Move, 30),
            Order::with_secondary(4, 4, OrderType::Support, 3, 30),
        ],
    );

    assert_outcome(&adj, 1, true, "Detonated");
    let nuke = unit(&adj, 1);
    assert_eq!(nuke.status, UnitStatus::Detonated);
    // A spent launcher never occupies the struck province.
    assert_eq!(nuke.node, NodeId(10));

    assert_outcome(&adj, 2, false, "Nuked");
    assert_eq!(record(&adj, 2).unit_status, UnitStatus::Nuked);
    assert_eq!(unit(&adj, 2).status, UnitStatus::Nuked);

    assert!(!record(&adj, 3).valid);
    assert_outcome(&adj, 3, false, "Invalid Order: Can't Enter Nuclear Fallout");
    assert_outcome(
        &adj,
        4,
        false,
        "Invalid Order: Can't Support Into Nuclear Fallout",
    );
    assert_eq!(unit(&adj, 3).node, NodeId(20));
}

#[test]
fn support_for_struck_unit_is_invalid() {
    let board = nuclear_grid().army(2, 2, 30).army(3, 2, 20).board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::Nuke, 31),
            Order::hold(2, 2),
            Order::with_secondary(3, 3, OrderType::Support, 2, 30),
        ],
    );

    assert_outcome(&adj, 3, false, "Invalid Order: Supported Unit Nuked");
    assert_eq!(unit(&adj, 3).status, UnitStatus::Active);
}

#[test]
fn nuke_target_outside_catalogue_is_rejected() {
    let board = nuclear_grid().army(2, 2, 30).board();
    // Own province's air node is never a target.
    let adj = adjudicate(&board, &[Order::new(1, 1, OrderType::Nuke, 11)]);

    assert!(!record(&adj, 1).valid);
    assert_eq!(record(&adj, 1).success, Some(false));
    assert_eq!(unit(&adj, 2).status, UnitStatus::Active);
}

// ---------------------------------------------------------------------------
// Convoys
// ---------------------------------------------------------------------------

/// Coast 1 (army 1) -- sea 2 (fleet 2) -- sea 3 (fleet 3) -- coast 4.
/// Seas 5 and 6 hold enemy fleets 4 and 5, both adjacent to sea 3.
fn convoy_map() -> MapBuilder {
    MapBuilder::new(TurnPhase::SpringOrders)
        .province(1, ProvinceType::Coast)
        .province(2, ProvinceType::Sea)
        .province(3, ProvinceType::Sea)
        .province(4, ProvinceType::Coast)
        .province(5, ProvinceType::Sea)
        .province(6, ProvinceType::Sea)
        .node(10, 1, NodeKind::Land)
        .node(20, 2, NodeKind::Sea)
        .node(30, 3, NodeKind::Sea)
        .node(40, 4, NodeKind::Land)
        .node(50, 5, NodeKind::Sea)
        .node(60, 6, NodeKind::Sea)
        .link(20, 30)
        .link(50, 30)
        .link(60, 30)
        .army(1, 1, 10)
        .unit(2, UnitType::Fleet, 1, 20)
        .unit(3, UnitType::Fleet, 1, 30)
        .unit(4, UnitType::Fleet, 2, 50)
        .unit(5, UnitType::Fleet, 2, 60)
        .transport(2, &[3], &[1], &[])
        .transport(3, &[2], &[], &[40])
}

#[test]
fn compliant_chain_delivers() {
    let board = convoy_map().board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::MoveConvoyed, 40),
            Order::with_secondary(2, 2, OrderType::Convoy, 1, 40),
            Order::with_secondary(3, 3, OrderType::Convoy, 1, 40),
        ],
    );

    assert_outcome(&adj, 1, true, "Success");
    assert_outcome(&adj, 2, true, "Success");
    assert_outcome(&adj, 3, true, "Success");
    assert_eq!(unit(&adj, 1).node, NodeId(40));
    assert_eq!(unit(&adj, 2).node, NodeId(20));
}

#[test]
fn missing_link_breaks_chain() {
    let board = convoy_map().board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::MoveConvoyed, 40),
            Order::with_secondary(2, 2, OrderType::Convoy, 1, 40),
            Order::hold(3, 3),
        ],
    );

    assert_outcome(&adj, 1, false, "Failed: Transport Noncompliance");
    assert!(!record(&adj, 2).valid);
    assert_outcome(&adj, 2, false, "Invalid Order: Insufficient Compliance");
    assert_outcome(&adj, 3, true, "Success");
    assert_eq!(unit(&adj, 1).node, NodeId(10));
}

#[test]
fn convoy_for_stationary_unit_is_noncompliant() {
    let board = convoy_map().board();
    let adj = adjudicate(
        &board,
        &[
            Order::hold(1, 1),
            Order::with_secondary(2, 2, OrderType::Convoy, 1, 40),
            Order::with_secondary(3, 3, OrderType::Convoy, 1, 40),
        ],
    );

    assert_outcome(&adj, 2, false, "Invalid Order: Noncompliance");
    assert_outcome(&adj, 3, false, "Invalid Order: Noncompliance");
    assert_outcome(&adj, 1, true, "Success");
}

#[test]
fn dislodged_transport_disrupts_convoy() {
    let board = convoy_map().board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::MoveConvoyed, 40),
            Order::with_secondary(2, 2, OrderType::Convoy, 1, 40),
            Order::with_secondary(3, 3, OrderType::Convoy, 1, 40),
            Order::new(4, 4, OrderType::Move, 30),
            Order::with_secondary(5, 5, OrderType::Support, 4, 30),
        ],
    );

    assert_outcome(&adj, 3, false, "Hold Failed: 1v2");
    assert_outcome(&adj, 1, false, "Failed: Convoy Disrupted");
    assert_outcome(&adj, 4, true, "Victory: 2v1");
    assert_outcome(&adj, 2, true, "Success");

    assert_eq!(unit(&adj, 1).node, NodeId(10));
    assert_eq!(unit(&adj, 3).status, UnitStatus::Retreat);
    assert_eq!(unit(&adj, 3).displacer, Some(ProvinceId(5)));
    assert_eq!(unit(&adj, 4).node, NodeId(30));
}

#[test]
fn unsupported_attack_on_transport_fails() {
    let board = convoy_map().board();
    let adj = adjudicate(
        &board,
        &[
            Order::new(1, 1, OrderType::MoveConvoyed, 40),
            Order::with_secondary(2, 2, OrderType::Convoy, 1, 40),
            Order::with_secondary(3, 3, OrderType::Convoy, 1, 40),
            Order::new(4, 4, OrderType::Move, 30),
        ],
    );

    assert_outcome(&adj, 3, true, "Hold Victory: 1v1");
    assert_outcome(&adj, 4, false, "Bounce: 1v1");
    assert_outcome(&adj, 1, true, "Success");
    assert_eq!(unit(&adj, 1).node, NodeId(40));
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn orders_outside_the_catalogue_are_rejected() {
    let board = grid().army(1, 1, 10).army(2, 2, 50).board();
    let adj = adjudicate(
        &board,
        &[
            // 3 is not adjacent to 1.
            Order::new(1, 1, OrderType::Move, 30),
            Order::new(2, 2, OrderType::MoveConvoyed, 20),
        ],
    );

    assert!(!record(&adj, 1).valid);
    assert!(!record(&adj, 2).valid);
    assert_eq!(record(&adj, 2).explanation, "Invalid Order Type");
    assert_eq!(unit(&adj, 1).node, NodeId(10));
}

#[test]
fn second_order_for_a_unit_is_rejected() {
    let board = grid().army(1, 1, 10).board();
    let adj = adjudicate(
        &board,
        &[Order::new(1, 1, OrderType::Move, 20), Order::hold(2, 1)],
    );

    assert_outcome(&adj, 1, true, "Success");
    assert_outcome(&adj, 2, false, "Invalid Order: Duplicate Unit Order");
}
