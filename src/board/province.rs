//! Provinces, nodes, and the identifiers that tie the map together.
//!
//! A province is a map territory. It owns one or more nodes (land, sea, air)
//! and each node is a vertex a unit can occupy. Maps are data-driven: every
//! game ships its own provinces and nodes in the turn snapshot.

use serde::{Deserialize, Serialize};

/// Identifies a province on the game map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvinceId(pub u32);

/// Identifies a positional node within a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Identifies a country (player slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(pub u32);

/// Terrain classification of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvinceType {
    Coast,
    Sea,
    Inland,
    Island,
    Impassible,
    Decorative,
    Pole,
}

impl ProvinceType {
    /// Land provinces whose control can change hands.
    pub const fn is_capturable(self) -> bool {
        matches!(
            self,
            ProvinceType::Coast | ProvinceType::Inland | ProvinceType::Island
        )
    }

    /// Whether units may ever enter the province.
    pub const fn is_passable(self) -> bool {
        !matches!(self, ProvinceType::Impassible | ProvinceType::Decorative)
    }
}

/// Current condition of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvinceStatus {
    Active,
    Bombarded,
    Dormant,
    Nuked,
    Inert,
}

/// Whether the province carries a coalition vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteType {
    Capital,
    Vote,
    None,
}

impl VoteType {
    pub const fn has_vote(self) -> bool {
        matches!(self, VoteType::Capital | VoteType::Vote)
    }
}

/// The layer a node lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Land,
    Sea,
    Air,
}

/// A map territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub name: String,
    pub province_type: ProvinceType,
    pub status: ProvinceStatus,
    pub vote_type: VoteType,
    #[serde(default)]
    pub controller: Option<CountryId>,
    #[serde(default)]
    pub capital_owner: Option<CountryId>,
    /// False when the province was occupied or contested last turn.
    #[serde(default = "default_valid_retreat")]
    pub valid_retreat: bool,
}

fn default_valid_retreat() -> bool {
    true
}

/// A positional vertex with its direct movement adjacencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub province: ProvinceId,
    pub kind: NodeKind,
    #[serde(default)]
    pub adjacent: Vec<NodeId>,
}
