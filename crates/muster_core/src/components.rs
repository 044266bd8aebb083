//! Actor component definitions.
//!
//! Components are pure data with no behavior. Actors carry a fixed set of
//! optional components; a `Some` component is the actor's bound capability,
//! `None` means the capability is absent. Systems query these instead of
//! downcasting.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, CellPos, Fixed, Vec2Fixed};
use crate::palette::RgbColor;

/// Unique identifier for actors.
pub type EntityId = u64;

/// Identifier of an owning player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }
}

/// Broad production category a unit type belongs to.
///
/// Producing buildings declare the categories they can turn out; build
/// queues match unit types to buildings through these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    /// Foot soldiers.
    Infantry,
    /// Ground vehicles.
    Vehicle,
    /// Flying units.
    Aircraft,
    /// Structures.
    Building,
}

/// Pixel position component in world space.
///
/// This is the actor's visual anchor. It normally tracks the occupied
/// cell but is adjusted independently during spawn animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// World position in pixels.
    pub value: Vec2Fixed,
}

impl Position {
    /// Create a new position at the given coordinates.
    #[must_use]
    pub const fn new(value: Vec2Fixed) -> Self {
        Self { value }
    }
}

/// Ground movement capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MobileInfo {
    /// Movement speed in pixels per tick on unmodified terrain.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
}

impl MobileInfo {
    /// Create a ground movement capability.
    #[must_use]
    pub const fn new(speed: Fixed) -> Self {
        Self { speed }
    }
}

/// Flight capability.
///
/// Flyers ignore ground occupancy; routing sends them straight to pixel
/// destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AircraftInfo;

/// Exclusive-claim state for actors that can be reserved.
///
/// A reservation is placed and released by whoever holds the claim (for
/// example a landing or docking operation). Production only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Reservable {
    /// Actor currently holding the claim, if any.
    pub reserved_by: Option<EntityId>,
}

impl Reservable {
    /// Whether the actor is currently claimed.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        self.reserved_by.is_some()
    }
}

/// Rally point owned by a producing building.
///
/// Freshly produced units are routed here after clearing the exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RallyPoint {
    /// Destination cell.
    pub cell: CellPos,
    /// Acceptance radius in cells - arriving anywhere this close counts.
    pub near_enough: u32,
}

impl RallyPoint {
    /// Create a rally point.
    #[must_use]
    pub const fn new(cell: CellPos, near_enough: u32) -> Self {
        Self { cell, near_enough }
    }
}

/// UI feedback line from an actor to its current destination.
///
/// Pure data for the render layer; the simulation only assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetLine {
    /// Line endpoint.
    pub target: CellPos,
    /// Line color.
    pub color: RgbColor,
    /// Whether the indicator repeats instead of showing once.
    pub looping: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservable_default_is_free() {
        let r = Reservable::default();
        assert!(!r.is_reserved());
    }

    #[test]
    fn test_reservable_claimed() {
        let r = Reservable {
            reserved_by: Some(17),
        };
        assert!(r.is_reserved());
    }

    #[test]
    fn test_rally_point_fields() {
        let rp = RallyPoint::new(CellPos::new(4, 9), 2);
        assert_eq!(rp.cell, CellPos::new(4, 9));
        assert_eq!(rp.near_enough, 2);
    }
}
