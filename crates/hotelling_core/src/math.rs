//! Fixed-point geometry for the preference map.
//!
//! Product positions and customer preferences are stored in fixed-point so
//! that nearest-product selection, and therefore every tie-break, is
//! identical on all platforms. Floats only appear at the input boundary.

use fixed::types::{I32F32, I64F64};
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all map math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Wide fixed-point type for squared distances.
///
/// Twice the fractional bits of [`Fixed`], so the square of any coordinate
/// difference on the map is represented without rounding.
pub type WideFixed = I64F64;

/// A point in map space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MapPoint {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl MapPoint {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// The map origin.
    pub const ORIGIN: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Convert from floating-point coordinates at the input boundary.
    ///
    /// Returns `None` for NaN or values outside the fixed-point range.
    #[must_use]
    pub fn from_f64(x: f64, y: f64) -> Option<Self> {
        Some(Self {
            x: Fixed::checked_from_num(x)?,
            y: Fixed::checked_from_num(y)?,
        })
    }

    /// Coordinates as floats, for display and protocol output.
    #[must_use]
    pub fn to_f64(self) -> (f64, f64) {
        (self.x.to_num(), self.y.to_num())
    }

    /// Calculate squared distance (avoids sqrt for comparisons).
    ///
    /// Ordering by squared distance is the same as ordering by Euclidean
    /// distance. The result is exact for points within the map extent;
    /// further apart it saturates.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> WideFixed {
        let dx = WideFixed::from_num(self.x) - WideFixed::from_num(other.x);
        let dy = WideFixed::from_num(self.y) - WideFixed::from_num(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(Fixed::saturating_from_num(self.distance_squared(other)))
    }

    /// Whether the point lies in `[0, width] × [0, height]`.
    #[must_use]
    pub fn is_within(self, width: Fixed, height: Fixed) -> bool {
        self.x >= Fixed::ZERO && self.x <= width && self.y >= Fixed::ZERO && self.y <= height
    }
}

/// Computes the square root of a fixed-point number using binary search.
fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::from_num(1) {
        value
    } else {
        Fixed::from_num(1)
    };

    for _ in 0..64 {
        let mid = low + (high - low) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

impl std::fmt::Display for MapPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (x, y) = self.to_f64();
        write!(f, "({x:.2}, {y:.2})")
    }
}
