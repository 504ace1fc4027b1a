//! Core types and IDs for the market simulator.
//!
//! Node identifiers are newtype wrappers. [`Role`], [`Position`], and [`Match`]
//! describe market participants and the pairs algorithms commit.

use crate::error::SimError;

/// Unique node identifier. Assigned in insertion order, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Market side of a node. Fixed at insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub fn from_is_buyer(is_buyer: bool) -> Self {
        if is_buyer {
            Role::Buyer
        } else {
            Role::Seller
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Role::Buyer => Role::Seller,
            Role::Seller => Role::Buyer,
        }
    }
}

/// 2-D location of a node.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn squared_distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Committed (buyer, seller) pair returned by a matching algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Match {
    pub buyer: NodeId,
    pub seller: NodeId,
}

impl Match {
    pub fn new(buyer: NodeId, seller: NodeId) -> Self {
        Self { buyer, seller }
    }
}

/// Edge weight function: (buyer position, buyer departure countdown,
/// seller position, seller departure countdown) -> weight. Must be pure.
pub type WeightFn = Box<dyn Fn(Position, u32, Position, u32) -> f64>;

/// Squared euclidean distance between buyer and seller.
pub fn squared_distance(buyer: Position, _buyer_d: u32, seller: Position, _seller_d: u32) -> f64 {
    buyer.squared_distance(&seller)
}

/// `1 / (d² + 1)`: close pairs are worth more, always in `(0, 1]`.
pub fn inverse_squared_distance(buyer: Position, _buyer_d: u32, seller: Position, _seller_d: u32) -> f64 {
    1.0 / (buyer.squared_distance(&seller) + 1.0)
}

/// Squared distance scaled down by both departure countdowns.
pub fn distance_over_departure(buyer: Position, buyer_d: u32, seller: Position, seller_d: u32) -> f64 {
    buyer.squared_distance(&seller) / f64::from(buyer_d.max(1)) / f64::from(seller_d.max(1))
}

/// Built-in weight functions, selectable by name (e.g. from the environment).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WeightKind {
    SquaredDistance,
    InverseSquaredDistance,
    DistanceOverDeparture,
}

impl WeightKind {
    pub fn from_name(name: &str) -> Result<Self, SimError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "squared" | "squared_distance" => Ok(WeightKind::SquaredDistance),
            "inverse" | "inverse_squared_distance" => Ok(WeightKind::InverseSquaredDistance),
            "departure" | "distance_over_departure" => Ok(WeightKind::DistanceOverDeparture),
            other => Err(SimError::UnknownWeight(other.to_string())),
        }
    }

    pub fn weight_fn(self) -> WeightFn {
        match self {
            WeightKind::SquaredDistance => Box::new(squared_distance),
            WeightKind::InverseSquaredDistance => Box::new(inverse_squared_distance),
            WeightKind::DistanceOverDeparture => Box::new(distance_over_departure),
        }
    }
}
