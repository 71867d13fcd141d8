//! Order types and resolution records.
//!
//! An `Order` is what a player submitted for one unit. A `ResolvedOrder` is
//! the same order after adjudication, carrying validity, the tri-state
//! success flag, the explanation shown to players, and the unit's final
//! status.

use serde::{Deserialize, Serialize};

use super::province::NodeId;
use super::unit::{UnitId, UnitStatus};

/// Identifies a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u32);

/// Every order type in the ruleset, including the adjustment-phase ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Hold,
    Move,
    MoveConvoyed,
    Support,
    SupportConvoyed,
    Convoy,
    Airlift,
    Nuke,
    Build,
    Disband,
    TechTransfer,
    BuildTransfer,
}

impl OrderType {
    /// Standard or convoyed movement.
    pub const fn is_move(self) -> bool {
        matches!(self, OrderType::Move | OrderType::MoveConvoyed)
    }

    /// Standard or convoyed support.
    pub const fn is_support(self) -> bool {
        matches!(self, OrderType::Support | OrderType::SupportConvoyed)
    }

    /// Convoy (by sea) or airlift (by air).
    pub const fn is_transport(self) -> bool {
        matches!(self, OrderType::Convoy | OrderType::Airlift)
    }

    /// Orders that name a second unit.
    pub const fn has_secondary_unit(self) -> bool {
        self.is_support() || self.is_transport()
    }

    /// Display label used in resolution explanations.
    pub const fn label(self) -> &'static str {
        match self {
            OrderType::Hold => "Hold",
            OrderType::Move => "Move",
            OrderType::MoveConvoyed => "Move Convoyed",
            OrderType::Support => "Support",
            OrderType::SupportConvoyed => "Support Convoyed",
            OrderType::Convoy => "Convoy",
            OrderType::Airlift => "Airlift",
            OrderType::Nuke => "Nuke",
            OrderType::Build => "Build",
            OrderType::Disband => "Disband",
            OrderType::TechTransfer => "Tech Transfer",
            OrderType::BuildTransfer => "Build Transfer",
        }
    }
}

/// A submitted unit order.
///
/// `secondary_unit` names the supported or transported unit.
/// `destination` is the move target, the supported unit's target (its own
/// node for a support-hold), the transport's delivery node, or the nuke target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub unit: UnitId,
    pub order_type: OrderType,
    #[serde(default)]
    pub secondary_unit: Option<UnitId>,
    #[serde(default)]
    pub destination: Option<NodeId>,
}

impl Order {
    pub fn hold(id: u32, unit: u32) -> Self {
        Order {
            id: OrderId(id),
            unit: UnitId(unit),
            order_type: OrderType::Hold,
            secondary_unit: None,
            destination: None,
        }
    }

    pub fn new(id: u32, unit: u32, order_type: OrderType, destination: u32) -> Self {
        Order {
            id: OrderId(id),
            unit: UnitId(unit),
            order_type,
            secondary_unit: None,
            destination: Some(NodeId(destination)),
        }
    }

    pub fn with_secondary(
        id: u32,
        unit: u32,
        order_type: OrderType,
        secondary: u32,
        destination: u32,
    ) -> Self {
        Order {
            id: OrderId(id),
            unit: UnitId(unit),
            order_type,
            secondary_unit: Some(UnitId(secondary)),
            destination: Some(NodeId(destination)),
        }
    }
}

/// An order after adjudication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOrder {
    pub order: Order,
    pub valid: bool,
    /// `None` only for orders no stage had reason to decide.
    pub success: Option<bool>,
    pub explanation: String,
    /// Outcome of defending the unit's own province, for orders whose primary
    /// explanation describes something else (supports, transports).
    pub secondary_explanation: Option<String>,
    /// Supports credited plus one.
    pub power: u32,
    pub support_cut: bool,
    pub unit_status: UnitStatus,
}
