//! # Muster Core
//!
//! Deterministic production and player-color core for the Muster RTS
//! engine.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Lockstep multiplayer (identical simulation across clients)
//! - Headless server builds
//! - Replay systems
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`components`] - Actor component definitions
//! - [`production`] - Exit selection, unit spawning, rally routing
//! - [`palette`] - Player color remapping
//! - [`world`] - Actor storage and the world factory
//! - [`activity`] - Queued activity data for the external scheduler
//! - [`terrain`] - Terrain grid and cell passability
//! - [`data`] - RON-driven type declarations
//! - [`math`] - Fixed-point math utilities
//! - [`rng`] - Seeded random sequence

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod activity;
pub mod components;
pub mod data;
pub mod error;
pub mod math;
pub mod palette;
pub mod production;
pub mod rng;
pub mod terrain;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::activity::{Activity, ActivityQueue};
    pub use crate::components::{
        AircraftInfo, EntityId, MobileInfo, PlayerId, Position, RallyPoint, Reservable,
        TargetLine, UnitCategory,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::math::{CellPos, CellVec, Fixed, Vec2Fixed, CELL_SIZE};
    pub use crate::palette::{ColorRamp, HslColor, RemapTable, RgbColor};
    pub use crate::production::{
        ExitInfo, NotifyProduction, ObserverRegistry, Production, ProductionInfo,
    };
    pub use crate::rng::GameRng;
    pub use crate::terrain::{TerrainCell, TerrainGrid};
    pub use crate::world::{Actor, ActorInit, Blueprint, BlueprintRegistry, World};
}
