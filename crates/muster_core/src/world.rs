//! World state: actors, terrain, shared randomness.
//!
//! The world is a deterministic, tick-synchronous store. Actors are
//! composed of optional components ([`Actor`]); blueprints describe actor
//! types; [`World::create_actor`] is the single factory through which new
//! actors enter play.
//!
//! # Determinism
//!
//! - No floating-point math (fixed-point via [`Fixed`](crate::math::Fixed))
//! - All randomness flows through the world's seeded [`GameRng`]
//! - Iteration over actors uses sorted IDs
//! - Same inputs always produce same outputs

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityQueue};
use crate::components::{
    AircraftInfo, EntityId, MobileInfo, PlayerId, Position, RallyPoint, Reservable, TargetLine,
    UnitCategory,
};
use crate::error::{GameError, Result};
use crate::math::{CellPos, CellVec, Fixed, Vec2Fixed};
use crate::palette::RgbColor;
use crate::production::{ExitInfo, ObserverRegistry, ProductionInfo};
use crate::rng::GameRng;
use crate::terrain::TerrainGrid;

/// Cell footprint of a structure, anchored at its top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    /// Width in cells.
    pub width: u8,
    /// Height in cells.
    pub height: u8,
}

impl Footprint {
    /// Create a footprint.
    #[must_use]
    pub const fn new(width: u8, height: u8) -> Self {
        Self { width, height }
    }

    /// Iterate the cells covered when anchored at `top_left`.
    pub fn cells(self, top_left: CellPos) -> impl Iterator<Item = CellPos> {
        let (w, h) = (i32::from(self.width), i32::from(self.height));
        (0..h).flat_map(move |dy| (0..w).map(move |dx| top_left + CellVec::new(dx, dy)))
    }
}

/// Static description of an actor type.
///
/// Blueprints are the already-parsed form of per-type configuration:
/// which capabilities instances carry, where produced units leave, what
/// categories a producer turns out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Type name, unique within a registry.
    pub name: String,
    /// Production category this type belongs to.
    pub category: UnitCategory,
    /// Facing assigned when no better heading is known.
    pub initial_facing: u8,
    /// Ground movement capability, if any.
    pub mobile: Option<MobileInfo>,
    /// Flight capability, if any.
    pub aircraft: Option<AircraftInfo>,
    /// Whether instances can be exclusively claimed.
    pub reservable: bool,
    /// Exits declared for produced units (producers only).
    pub exits: Vec<ExitInfo>,
    /// Production configuration (producers only).
    pub production: Option<ProductionInfo>,
    /// Cell footprint (structures only).
    pub footprint: Option<Footprint>,
}

impl Blueprint {
    /// Create a minimal blueprint with no capabilities.
    #[must_use]
    pub fn new(name: impl Into<String>, category: UnitCategory) -> Self {
        Self {
            name: name.into(),
            category,
            initial_facing: 0,
            mobile: None,
            aircraft: None,
            reservable: false,
            exits: Vec::new(),
            production: None,
            footprint: None,
        }
    }

    /// Add ground movement with the given speed.
    #[must_use]
    pub fn with_mobile(mut self, speed: Fixed) -> Self {
        self.mobile = Some(MobileInfo::new(speed));
        self
    }

    /// Add flight capability.
    #[must_use]
    pub fn with_aircraft(mut self) -> Self {
        self.aircraft = Some(AircraftInfo);
        self
    }

    /// Set the default initial facing.
    #[must_use]
    pub const fn with_initial_facing(mut self, facing: u8) -> Self {
        self.initial_facing = facing;
        self
    }

    /// Mark instances as reservable.
    #[must_use]
    pub const fn with_reservable(mut self) -> Self {
        self.reservable = true;
        self
    }

    /// Declare an exit for produced units.
    #[must_use]
    pub fn with_exit(mut self, exit: ExitInfo) -> Self {
        self.exits.push(exit);
        self
    }

    /// Attach production configuration.
    #[must_use]
    pub fn with_production(mut self, production: ProductionInfo) -> Self {
        self.production = Some(production);
        self
    }

    /// Set the cell footprint.
    #[must_use]
    pub const fn with_footprint(mut self, width: u8, height: u8) -> Self {
        self.footprint = Some(Footprint::new(width, height));
        self
    }
}

/// Registry of blueprints, keyed by type name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlueprintRegistry {
    blueprints: HashMap<String, Blueprint>,
}

impl BlueprintRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blueprints: HashMap::new(),
        }
    }

    /// Register a blueprint, replacing any previous one with the same name.
    pub fn register(&mut self, blueprint: Blueprint) {
        self.blueprints.insert(blueprint.name.clone(), blueprint);
    }

    /// Look up a blueprint by type name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.get(name)
    }

    /// Number of registered blueprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// Iterate over all blueprints.
    pub fn iter(&self) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.values()
    }
}

/// Initialization parameters handed to the actor factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInit {
    /// Owning player.
    pub owner: PlayerId,
    /// Cell the actor occupies.
    pub location: CellPos,
    /// Initial facing.
    pub facing: u8,
}

/// A live actor: identity plus optional capabilities.
///
/// Absent components mean the capability does not apply; systems check
/// for `Some` rather than assuming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier.
    pub id: EntityId,
    /// Blueprint name this actor was created from.
    pub type_name: String,
    /// Owning player.
    pub owner: PlayerId,
    /// Production category.
    pub category: UnitCategory,
    /// Occupied cell.
    pub location: CellPos,
    /// Visual pixel position.
    pub position: Position,
    /// Current facing (0-255, 0 = north, clockwise).
    pub facing: u8,
    /// Ground movement capability.
    pub mobile: Option<MobileInfo>,
    /// Flight capability.
    pub aircraft: Option<AircraftInfo>,
    /// Exclusive-claim state.
    pub reservable: Option<Reservable>,
    /// Rally point for produced units (producers only).
    pub rally_point: Option<RallyPoint>,
    /// Declared exits (producers only).
    pub exits: Vec<ExitInfo>,
    /// Production configuration (producers only).
    pub production: Option<ProductionInfo>,
    /// Pending activities, consumed by the external scheduler.
    pub activities: ActivityQueue,
    /// UI target line, if one is currently assigned.
    pub target_line: Option<TargetLine>,
}

/// Storage for all actors in the world.
///
/// Uses a `HashMap` for O(1) lookup by ID, with deterministic iteration
/// via sorted keys when systems need ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorStorage {
    actors: HashMap<EntityId, Actor>,
    next_id: EntityId,
}

impl ActorStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actors: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new actor and return its assigned ID.
    pub fn insert(&mut self, mut actor: Actor) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        actor.id = id;
        self.actors.insert(id, actor);
        id
    }

    /// Remove an actor by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    /// Get an actor by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Get a mutable reference to an actor by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Whether an actor exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Number of actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Sorted actor IDs for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.actors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all actors (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Actor)> {
        self.actors.iter()
    }
}

/// The simulation world.
///
/// Owns all actors, the terrain layer and the shared random sequence.
/// Production and other systems operate through this struct so that
/// every mutation stays inside the deterministic core.
#[derive(Debug, Serialize, Deserialize)]
pub struct World {
    actors: ActorStorage,
    terrain: TerrainGrid,
    rng: GameRng,
    /// Observer callbacks are transient wiring owned by the game layer;
    /// they do not survive snapshots or clones.
    #[serde(skip)]
    observers: ObserverRegistry,
}

impl Clone for World {
    fn clone(&self) -> Self {
        Self {
            actors: self.actors.clone(),
            terrain: self.terrain.clone(),
            rng: self.rng.clone(),
            observers: ObserverRegistry::default(),
        }
    }
}

impl World {
    /// Create a world over the given terrain, seeding the shared RNG.
    #[must_use]
    pub fn new(terrain: TerrainGrid, seed: u64) -> Self {
        Self {
            actors: ActorStorage::new(),
            terrain,
            rng: GameRng::new(seed),
            observers: ObserverRegistry::default(),
        }
    }

    /// Actor storage.
    #[must_use]
    pub fn actors(&self) -> &ActorStorage {
        &self.actors
    }

    /// Mutable actor storage.
    pub fn actors_mut(&mut self) -> &mut ActorStorage {
        &mut self.actors
    }

    /// Terrain layer.
    #[must_use]
    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    /// Mutable terrain layer.
    pub fn terrain_mut(&mut self) -> &mut TerrainGrid {
        &mut self.terrain
    }

    /// The world's shared random sequence.
    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    /// Production observer registry.
    pub fn observers_mut(&mut self) -> &mut ObserverRegistry {
        &mut self.observers
    }

    /// Get an actor, or [`GameError::ActorNotFound`].
    pub fn actor(&self, id: EntityId) -> Result<&Actor> {
        self.actors.get(id).ok_or(GameError::ActorNotFound(id))
    }

    /// Get a mutable actor, or [`GameError::ActorNotFound`].
    pub fn actor_mut(&mut self, id: EntityId) -> Result<&mut Actor> {
        self.actors.get_mut(id).ok_or(GameError::ActorNotFound(id))
    }

    /// Create a new actor from a blueprint.
    ///
    /// The factory applies the blueprint's capabilities and the supplied
    /// init parameters. Default visual placement is the center of the
    /// occupied cell; callers with a better idea (spawn animations)
    /// adjust afterwards. Structure footprints register as permanent
    /// blockers.
    pub fn create_actor(&mut self, blueprint: &Blueprint, init: ActorInit) -> EntityId {
        let actor = Actor {
            id: 0, // assigned by storage
            type_name: blueprint.name.clone(),
            owner: init.owner,
            category: blueprint.category,
            location: init.location,
            position: Position::new(init.location.pixel_center()),
            facing: init.facing,
            mobile: blueprint.mobile,
            aircraft: blueprint.aircraft,
            reservable: blueprint.reservable.then(Reservable::default),
            rally_point: None,
            exits: blueprint.exits.clone(),
            production: blueprint.production.clone(),
            activities: ActivityQueue::new(),
            target_line: None,
        };
        let id = self.actors.insert(actor);

        if let Some(footprint) = blueprint.footprint {
            for cell in footprint.cells(init.location) {
                self.terrain.add_blocker(cell, id);
            }
        }

        tracing::trace!(id, type_name = %blueprint.name, "actor created");
        id
    }

    /// Remove an actor and any blocker cells it registered.
    pub fn remove_actor(&mut self, id: EntityId) -> Option<Actor> {
        self.terrain.remove_blockers_of(id);
        self.actors.remove(id)
    }

    /// Force an actor's visual pixel position.
    ///
    /// No-op if the actor does not exist.
    pub fn set_pixel_position(&mut self, id: EntityId, position: Vec2Fixed) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.position = Position::new(position);
        }
    }

    /// Append an activity to an actor's queue.
    ///
    /// No-op if the actor does not exist.
    pub fn queue_activity(&mut self, id: EntityId, activity: Activity) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.activities.push(activity);
        }
    }

    /// Assign an actor's UI target line.
    ///
    /// No-op if the actor does not exist.
    pub fn set_target_line(&mut self, id: EntityId, target: CellPos, color: RgbColor, looping: bool) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.target_line = Some(TargetLine {
                target,
                color,
                looping,
            });
        }
    }

    /// Whether any actor currently stands on a cell.
    ///
    /// Transient occupancy only - building footprints live in the terrain
    /// blocker layer instead.
    #[must_use]
    pub fn is_cell_occupied(&self, cell: CellPos) -> bool {
        self.actors.iter().any(|(_, a)| a.location == cell)
    }

    /// Whether a ground unit could enter a cell.
    ///
    /// Out-of-bounds, unwalkable terrain and permanent blockers always
    /// refuse. Transient occupants only refuse when `ignore_occupants` is
    /// false; planning queries pass true because the occupant will have
    /// moved by the time the cell is needed.
    #[must_use]
    pub fn can_enter_cell(&self, cell: CellPos, ignore_occupants: bool) -> bool {
        let Some(terrain_cell) = self.terrain.cell(cell) else {
            return false;
        };
        if !terrain_cell.walkable || self.terrain.is_permanently_blocked(cell) {
            return false;
        }
        if !ignore_occupants && self.is_cell_occupied(cell) {
            return false;
        }
        true
    }

    /// Effective movement speed for a ground unit entering a cell.
    ///
    /// Blueprint speed scaled by the cell's terrain modifier; zero when
    /// the cell cannot be traversed at all.
    #[must_use]
    pub fn movement_speed_at(&self, mobile: &MobileInfo, cell: CellPos) -> Fixed {
        match self.terrain.cell(cell) {
            Some(c) if c.walkable => {
                mobile.speed * Fixed::from_num(i32::from(c.speed_percent)) / Fixed::from_num(100)
            }
            _ => Fixed::ZERO,
        }
    }

    /// Broadcast a production notification to the producer's observers.
    pub fn notify_unit_produced(&mut self, producer: EntityId, unit: EntityId, exit_cell: CellPos) {
        self.observers.notify(producer, unit, exit_cell);
    }

    /// Hash of the full deterministic state.
    ///
    /// Actors are hashed in sorted-ID order; the RNG stream position is
    /// included so two worlds agree only if their futures do too.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for id in self.actors.sorted_ids() {
            if let Some(actor) = self.actors.get(id) {
                actor.hash(&mut hasher);
            }
        }
        self.rng.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the world for replays and lockstep verification.
    ///
    /// Observer wiring is not captured; the game layer re-registers after
    /// [`World::restore`].
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    /// Restore a world from a snapshot.
    pub fn restore(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| GameError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world() -> World {
        World::new(TerrainGrid::new(8, 8), 1)
    }

    fn rifleman() -> Blueprint {
        Blueprint::new("rifleman", UnitCategory::Infantry).with_mobile(Fixed::from_num(2))
    }

    fn barracks() -> Blueprint {
        Blueprint::new("barracks", UnitCategory::Building)
            .with_footprint(2, 2)
            .with_production(ProductionInfo::new(vec![UnitCategory::Infantry]))
    }

    #[test]
    fn test_create_actor_defaults() {
        let mut world = test_world();
        let id = world.create_actor(
            &rifleman(),
            ActorInit {
                owner: PlayerId::new(0),
                location: CellPos::new(3, 3),
                facing: 64,
            },
        );

        let actor = world.actor(id).unwrap();
        assert_eq!(actor.location, CellPos::new(3, 3));
        assert_eq!(actor.facing, 64);
        assert_eq!(actor.position.value, CellPos::new(3, 3).pixel_center());
        assert!(actor.mobile.is_some());
        assert!(actor.aircraft.is_none());
        assert!(actor.activities.is_empty());
    }

    #[test]
    fn test_actor_ids_ascend() {
        let mut world = test_world();
        let init = ActorInit {
            owner: PlayerId::new(0),
            location: CellPos::new(0, 0),
            facing: 0,
        };
        let a = world.create_actor(&rifleman(), init);
        let b = world.create_actor(&rifleman(), init);
        assert!(b > a);
    }

    #[test]
    fn test_footprint_blocks_cells() {
        let mut world = test_world();
        let id = world.create_actor(
            &barracks(),
            ActorInit {
                owner: PlayerId::new(0),
                location: CellPos::new(2, 2),
                facing: 0,
            },
        );

        for cell in [
            CellPos::new(2, 2),
            CellPos::new(3, 2),
            CellPos::new(2, 3),
            CellPos::new(3, 3),
        ] {
            assert!(!world.can_enter_cell(cell, true));
        }
        assert!(world.can_enter_cell(CellPos::new(4, 2), true));

        world.remove_actor(id);
        assert!(world.can_enter_cell(CellPos::new(2, 2), true));
    }

    #[test]
    fn test_transient_occupancy() {
        let mut world = test_world();
        world.create_actor(
            &rifleman(),
            ActorInit {
                owner: PlayerId::new(0),
                location: CellPos::new(5, 5),
                facing: 0,
            },
        );

        // Planning ignores the occupant, immediate entry does not.
        assert!(world.can_enter_cell(CellPos::new(5, 5), true));
        assert!(!world.can_enter_cell(CellPos::new(5, 5), false));
    }

    #[test]
    fn test_movement_speed_modifier() {
        let mut world = test_world();
        world
            .terrain_mut()
            .set_cell(CellPos::new(1, 1), crate::terrain::TerrainCell::with_speed_percent(50));

        let mobile = MobileInfo::new(Fixed::from_num(4));
        assert_eq!(
            world.movement_speed_at(&mobile, CellPos::new(0, 0)),
            Fixed::from_num(4)
        );
        assert_eq!(
            world.movement_speed_at(&mobile, CellPos::new(1, 1)),
            Fixed::from_num(2)
        );
        assert_eq!(
            world.movement_speed_at(&mobile, CellPos::new(-1, 0)),
            Fixed::ZERO
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut world = test_world();
        world.create_actor(
            &rifleman(),
            ActorInit {
                owner: PlayerId::new(1),
                location: CellPos::new(4, 4),
                facing: 128,
            },
        );
        world.rng_mut().next();

        let bytes = world.snapshot().unwrap();
        let restored = World::restore(&bytes).unwrap();

        assert_eq!(world.state_hash(), restored.state_hash());
    }

    #[test]
    fn test_clone_preserves_state_hash() {
        let mut world = test_world();
        world.create_actor(
            &rifleman(),
            ActorInit {
                owner: PlayerId::new(0),
                location: CellPos::new(1, 1),
                facing: 0,
            },
        );
        assert_eq!(world.state_hash(), world.clone().state_hash());
    }
}
