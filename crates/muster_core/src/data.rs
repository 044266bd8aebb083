//! Data-driven actor type declarations.
//!
//! This module contains pure data structures that define unit and
//! building types. All structs are designed to be deserialized from RON
//! files and converted into runtime [`Blueprint`]s.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses already-loaded text. File loading is the game layer's job.

use serde::{Deserialize, Serialize};

use crate::components::UnitCategory;
use crate::error::{GameError, Result};
use crate::math::{option_fixed_serde, CellVec, Fixed, Vec2Fixed};
use crate::production::{ExitInfo, ProductionInfo};
use crate::world::{Blueprint, BlueprintRegistry};

/// Declared exit on a building type.
///
/// # Example RON
///
/// ```ron
/// ExitData(
///     exit_cell: (0, 2),
///     spawn_offset: (0, 12),
///     facing: None,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitData {
    /// Exit cell relative to the building's top-left cell.
    pub exit_cell: (i32, i32),
    /// Spawn point in whole pixels relative to the building's position.
    #[serde(default)]
    pub spawn_offset: (i32, i32),
    /// Fixed facing, or `None` to derive from movement direction.
    #[serde(default)]
    pub facing: Option<u8>,
}

impl ExitData {
    /// Convert to the runtime exit descriptor.
    #[must_use]
    pub fn to_exit_info(self) -> ExitInfo {
        let mut exit = ExitInfo::new(CellVec::new(self.exit_cell.0, self.exit_cell.1))
            .with_spawn_offset(Vec2Fixed::new(
                Fixed::from_num(self.spawn_offset.0),
                Fixed::from_num(self.spawn_offset.1),
            ));
        if let Some(facing) = self.facing {
            exit = exit.with_facing(facing);
        }
        exit
    }
}

/// Data-driven unit type definition.
///
/// # Example RON
///
/// ```ron
/// UnitTypeData(
///     id: "rifleman",
///     category: Infantry,
///     speed: Some(8589934592),  // Fixed-point for 2.0
///     initial_facing: 0,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTypeData {
    /// Unique string identifier for this unit type.
    pub id: String,
    /// Production category.
    pub category: UnitCategory,
    /// Ground movement speed (fixed-point), `None` for immobile types.
    #[serde(default, with = "option_fixed_serde")]
    pub speed: Option<Fixed>,
    /// Whether the type flies.
    #[serde(default)]
    pub flies: bool,
    /// Facing assigned when no better heading is known.
    #[serde(default)]
    pub initial_facing: u8,
}

impl UnitTypeData {
    /// Convert to a runtime blueprint.
    #[must_use]
    pub fn to_blueprint(&self) -> Blueprint {
        let mut bp = Blueprint::new(self.id.clone(), self.category)
            .with_initial_facing(self.initial_facing);
        if let Some(speed) = self.speed {
            bp = bp.with_mobile(speed);
        }
        if self.flies {
            bp = bp.with_aircraft();
        }
        bp
    }
}

/// Data-driven building type definition.
///
/// # Example RON
///
/// ```ron
/// BuildingTypeData(
///     id: "barracks",
///     produces: [Infantry],
///     exits: [
///         ExitData(exit_cell: (0, 2), spawn_offset: (0, 12), facing: None),
///         ExitData(exit_cell: (1, 2)),
///     ],
///     footprint: (2, 2),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingTypeData {
    /// Unique string identifier for this building type.
    pub id: String,
    /// Categories this building produces; empty for non-producers.
    #[serde(default)]
    pub produces: Vec<UnitCategory>,
    /// Declared exits for produced units.
    #[serde(default)]
    pub exits: Vec<ExitData>,
    /// Footprint in cells.
    #[serde(default = "default_footprint")]
    pub footprint: (u8, u8),
    /// Whether instances can be exclusively claimed.
    #[serde(default)]
    pub reservable: bool,
}

fn default_footprint() -> (u8, u8) {
    (1, 1)
}

impl BuildingTypeData {
    /// Convert to a runtime blueprint.
    #[must_use]
    pub fn to_blueprint(&self) -> Blueprint {
        let mut bp = Blueprint::new(self.id.clone(), UnitCategory::Building)
            .with_footprint(self.footprint.0, self.footprint.1);
        for exit in &self.exits {
            bp = bp.with_exit(exit.to_exit_info());
        }
        if !self.produces.is_empty() {
            bp = bp.with_production(ProductionInfo::new(self.produces.clone()));
        }
        if self.reservable {
            bp = bp.with_reservable();
        }
        bp
    }
}

/// Top-level declaration set for one faction or mod.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDeclarations {
    /// Unit type declarations.
    #[serde(default)]
    pub units: Vec<UnitTypeData>,
    /// Building type declarations.
    #[serde(default)]
    pub buildings: Vec<BuildingTypeData>,
}

/// Parse a RON declaration set into a blueprint registry.
pub fn parse_blueprints(source: &str) -> Result<BlueprintRegistry> {
    let declarations: TypeDeclarations =
        ron::from_str(source).map_err(|e| GameError::DataParse {
            context: "type declarations".to_string(),
            message: e.to_string(),
        })?;

    let mut registry = BlueprintRegistry::new();
    for unit in &declarations.units {
        registry.register(unit.to_blueprint());
    }
    for building in &declarations.buildings {
        registry.register(building.to_blueprint());
    }
    Ok(registry)
}
