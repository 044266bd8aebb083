//! Test fixtures and helpers.
//!
//! Pre-built worlds, blueprints and producer configurations for
//! consistent testing across crates.

use fixed::types::I32F32;

use muster_core::components::{PlayerId, UnitCategory};
use muster_core::math::{CellPos, CellVec};
use muster_core::production::{ExitInfo, ProductionInfo};
use muster_core::terrain::TerrainGrid;
use muster_core::world::{ActorInit, Blueprint, World};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// An open 16x16 world with the given RNG seed.
#[must_use]
pub fn open_world(seed: u64) -> World {
    World::new(TerrainGrid::new(16, 16), seed)
}

/// A basic ground infantry blueprint.
#[must_use]
pub fn rifleman() -> Blueprint {
    Blueprint::new("rifleman", UnitCategory::Infantry).with_mobile(fixed(2))
}

/// A faster ground vehicle blueprint.
#[must_use]
pub fn scout_car() -> Blueprint {
    Blueprint::new("scout_car", UnitCategory::Vehicle).with_mobile(fixed(4))
}

/// A flying unit blueprint with no ground movement.
#[must_use]
pub fn gunship() -> Blueprint {
    Blueprint::new("gunship", UnitCategory::Aircraft).with_aircraft()
}

/// A 2x2 producer building with the given exits.
#[must_use]
pub fn barracks(exits: Vec<ExitInfo>) -> Blueprint {
    let mut bp = Blueprint::new("barracks", UnitCategory::Building)
        .with_footprint(2, 2)
        .with_production(ProductionInfo::new(vec![
            UnitCategory::Infantry,
            UnitCategory::Vehicle,
        ]))
        .with_reservable();
    for exit in exits {
        bp = bp.with_exit(exit);
    }
    bp
}

/// The standard single exit: one cell below a 2x2 footprint.
#[must_use]
pub fn south_exit() -> ExitInfo {
    ExitInfo::new(CellVec::new(0, 2))
}

/// Four exits around a 2x2 footprint.
#[must_use]
pub fn ring_exits() -> Vec<ExitInfo> {
    vec![
        ExitInfo::new(CellVec::new(0, 2)),
        ExitInfo::new(CellVec::new(1, 2)),
        ExitInfo::new(CellVec::new(2, 0)),
        ExitInfo::new(CellVec::new(2, 1)),
    ]
}

/// Spawn a producer building for player 1 at the given cell.
pub fn spawn_producer(world: &mut World, blueprint: &Blueprint, cell: CellPos) -> u64 {
    world.create_actor(
        blueprint,
        ActorInit {
            owner: PlayerId::new(1),
            location: cell,
            facing: 0,
        },
    )
}
