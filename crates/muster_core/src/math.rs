//! Fixed-point math utilities for deterministic simulation.
//!
//! All game simulation uses fixed-point arithmetic to ensure
//! deterministic behavior across platforms. Floating-point
//! operations can produce different results on different CPUs.
//!
//! Two coordinate spaces exist side by side:
//!
//! - **Cells** ([`CellPos`], [`CellVec`]): integer map coordinates used for
//!   occupancy, exits and rally points.
//! - **Pixels** ([`Vec2Fixed`]): fixed-point world positions used for
//!   rendering anchors and spawn animations. One cell is [`CELL_SIZE`]
//!   pixels on a side.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Width and height of one map cell in pixels.
pub const CELL_SIZE: i32 = 24;

/// Number of discrete facings in a full turn.
///
/// Facing 0 points north (up, negative y) and values increase clockwise:
/// 64 = east, 128 = south, 192 = west.
pub const FULL_TURN: i32 = 256;

/// Fixed-point 2D vector in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
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

/// Serde support for `Option<Fixed>`.
///
/// Serializes optional fixed-point numbers via their raw bit representation,
/// preserving `None` as a serialized `None` value.
pub mod option_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => v.to_bits().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<i64>::deserialize(deserializer)?;
        Ok(opt.map(Fixed::from_bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Length of this vector.
    #[must_use]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.x * self.x + self.y * self.y)
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Linearly interpolate between two vectors.
    #[must_use]
    pub fn lerp(self, other: Self, t: Fixed) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// A cell position on the map grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellPos {
    /// Cell column.
    pub x: i32,
    /// Cell row.
    pub y: i32,
}

impl CellPos {
    /// Create a new cell position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Pixel position of this cell's center.
    #[must_use]
    pub fn pixel_center(self) -> Vec2Fixed {
        Vec2Fixed::new(
            Fixed::from_num(self.x * CELL_SIZE + CELL_SIZE / 2),
            Fixed::from_num(self.y * CELL_SIZE + CELL_SIZE / 2),
        )
    }
}

/// An offset between cell positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellVec {
    /// Column offset.
    pub x: i32,
    /// Row offset.
    pub y: i32,
}

impl CellVec {
    /// Create a new cell offset.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero offset.
    pub const ZERO: Self = Self { x: 0, y: 0 };
}

impl std::ops::Add<CellVec> for CellPos {
    type Output = CellPos;

    fn add(self, rhs: CellVec) -> Self::Output {
        CellPos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for CellPos {
    type Output = CellVec;

    fn sub(self, rhs: Self) -> Self::Output {
        CellVec::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Derive a facing (0-255, 0 = north, clockwise) from a direction vector.
///
/// Returns `None` for the zero vector - callers substitute their own
/// default facing. Exact at the eight principal directions and monotonic
/// in between (piecewise-linear within each octant), which is all the
/// simulation needs from a heading.
#[must_use]
pub fn facing_from_dir(dir: Vec2Fixed) -> Option<u8> {
    if dir.x == Fixed::ZERO && dir.y == Fixed::ZERO {
        return None;
    }

    let ax = dir.x.abs();
    let ay = dir.y.abs();
    // Fraction of a quarter turn away from the vertical axis, 0..=64.
    let t = ax / (ax + ay) * Fixed::from_num(64);

    let south = Fixed::from_num(128);
    let facing = if dir.y < Fixed::ZERO {
        if dir.x >= Fixed::ZERO {
            t
        } else {
            Fixed::from_num(FULL_TURN) - t
        }
    } else if dir.x >= Fixed::ZERO {
        south - t
    } else {
        south + t
    };

    Some(facing.round().to_num::<i64>().rem_euclid(i64::from(FULL_TURN)) as u8)
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

    for _ in 0..32 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}
