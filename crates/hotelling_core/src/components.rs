//! Round entity definitions.
//!
//! Products and customers are plain data. The registry owns them and the
//! assignment engine is the only code that writes assignment state.

use serde::{Deserialize, Serialize};

use crate::math::MapPoint;

/// Index of a player within a session, in `[0, player_count)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// The first player.
    pub const FIRST: Self = Self(0);

    /// Raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// The player after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Players are numbered from 1 for people.
        write!(f, "Player {}", self.0 + 1)
    }
}

impl From<u32> for PlayerId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// A player's product on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Owning player.
    pub owner: PlayerId,
    /// Where the product sits in map space.
    pub position: MapPoint,
    /// Customers assigned in the last assignment pass.
    pub assigned_count: u32,
}

impl Product {
    /// Create a freshly placed product with no customers.
    #[must_use]
    pub const fn new(owner: PlayerId, position: MapPoint) -> Self {
        Self {
            owner,
            position,
            assigned_count: 0,
        }
    }
}

/// A simulated customer with a preference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// The customer's ideal product location.
    pub preference: MapPoint,
    /// Owner of the product this customer chose.
    ///
    /// Owners are unique per round, so the owner identifies the product.
    /// `None` until assigned, and after a pass with no products.
    pub assigned: Option<PlayerId>,
}

impl Customer {
    /// Create an unassigned customer.
    #[must_use]
    pub const fn new(preference: MapPoint) -> Self {
        Self {
            preference,
            assigned: None,
        }
    }

    /// Whether the customer picked a product.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.assigned.is_some()
    }
}
