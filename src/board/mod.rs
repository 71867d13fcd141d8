//! Board representation and turn-snapshot types.
//!
//! Contains the core data structures for provinces, nodes, units, orders,
//! and the validated per-turn board view.

pub mod order;
pub mod province;
pub mod state;
pub mod unit;

pub use order::{Order, OrderId, OrderType, ResolvedOrder};
pub use province::{
    CountryId, Node, NodeId, NodeKind, Province, ProvinceId, ProvinceStatus, ProvinceType,
    VoteType,
};
pub use state::{
    AirAdjacency, Board, CountryLedger, SnapshotError, TransportAdjacency, TurnDescriptor,
    TurnPhase, TurnSnapshot,
};
pub use unit::{Unit, UnitId, UnitStatus, UnitType};
