//! Terrain grid and cell passability.
//!
//! The grid distinguishes two kinds of blockage:
//!
//! - **Permanent**: unwalkable terrain and building footprints. These
//!   always block, even when planning ahead.
//! - **Transient**: mobile actors currently standing on a cell. Planning
//!   queries (exit validation, pathfinding goals) ignore these - the
//!   occupant will have moved on by the time the cell is needed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::math::CellPos;

/// A single terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainCell {
    /// Whether ground units can traverse this cell at all.
    pub walkable: bool,
    /// Movement speed modifier in percent (100 = unmodified).
    pub speed_percent: u8,
}

impl TerrainCell {
    /// Open ground with unmodified speed.
    #[must_use]
    pub const fn walkable() -> Self {
        Self {
            walkable: true,
            speed_percent: 100,
        }
    }

    /// Impassable terrain.
    #[must_use]
    pub const fn blocked() -> Self {
        Self {
            walkable: false,
            speed_percent: 0,
        }
    }

    /// Walkable terrain with a speed modifier (e.g. roads, rough ground).
    #[must_use]
    pub const fn with_speed_percent(speed_percent: u8) -> Self {
        Self {
            walkable: true,
            speed_percent,
        }
    }
}

impl Default for TerrainCell {
    fn default() -> Self {
        Self::walkable()
    }
}

/// The map's terrain layer plus permanent blockers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    cells: Vec<TerrainCell>,
    /// Building footprints, keyed by cell.
    blockers: HashMap<CellPos, EntityId>,
}

impl TerrainGrid {
    /// Create an all-walkable grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![TerrainCell::walkable(); (width * height) as usize],
            blockers: HashMap::new(),
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether a cell lies within the grid.
    #[must_use]
    pub fn in_bounds(&self, cell: CellPos) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    fn index(&self, cell: CellPos) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.y as u32 * self.width + cell.x as u32) as usize)
    }

    /// The terrain cell at a position, or `None` out of bounds.
    #[must_use]
    pub fn cell(&self, cell: CellPos) -> Option<&TerrainCell> {
        self.index(cell).map(|i| &self.cells[i])
    }

    /// Replace the terrain cell at a position. Out-of-bounds writes are
    /// ignored.
    pub fn set_cell(&mut self, cell: CellPos, value: TerrainCell) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = value;
        }
    }

    /// Register a permanent blocker (building footprint cell).
    pub fn add_blocker(&mut self, cell: CellPos, owner: EntityId) {
        self.blockers.insert(cell, owner);
    }

    /// Remove all blocker cells registered by an actor.
    pub fn remove_blockers_of(&mut self, owner: EntityId) {
        self.blockers.retain(|_, id| *id != owner);
    }

    /// Whether a permanent blocker occupies the cell.
    #[must_use]
    pub fn is_permanently_blocked(&self, cell: CellPos) -> bool {
        self.blockers.contains_key(&cell)
    }
}
