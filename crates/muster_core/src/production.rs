//! Unit production: exit selection, spawn, rally routing.
//!
//! A producing building turns a finished unit type into a live actor.
//! [`Production::produce`] picks a usable exit (deterministically
//! shuffled), creates the actor there, animates its emergence from the
//! building and routes it toward the producer's rally point. Failure is
//! a clean no-op reported as `false` - the caller retries on a later
//! tick.
//!
//! Queued activities are data only; an external scheduler executes them
//! over subsequent ticks.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::activity::Activity;
use crate::components::{EntityId, PlayerId, RallyPoint, Reservable, UnitCategory};
use crate::math::{facing_from_dir, CellPos, CellVec, Fixed, Vec2Fixed};
use crate::palette::RgbColor;
use crate::world::{ActorInit, Blueprint, World};

/// Where a produced unit leaves its building.
///
/// A building may declare any number of exits; a building with none
/// cannot complete production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExitInfo {
    /// Exit cell relative to the building's top-left cell.
    pub exit_cell: CellVec,
    /// Spawn point in pixels relative to the building's visual position.
    pub spawn_offset: Vec2Fixed,
    /// Fixed facing for units leaving here; `None` derives the facing
    /// from the movement direction.
    pub facing: Option<u8>,
}

impl ExitInfo {
    /// Create an exit at a cell offset with no spawn offset.
    #[must_use]
    pub const fn new(exit_cell: CellVec) -> Self {
        Self {
            exit_cell,
            spawn_offset: Vec2Fixed::ZERO,
            facing: None,
        }
    }

    /// Set the pixel spawn offset.
    #[must_use]
    pub const fn with_spawn_offset(mut self, spawn_offset: Vec2Fixed) -> Self {
        self.spawn_offset = spawn_offset;
        self
    }

    /// Fix the facing of units leaving through this exit.
    #[must_use]
    pub const fn with_facing(mut self, facing: u8) -> Self {
        self.facing = Some(facing);
        self
    }
}

/// Production configuration for a building type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductionInfo {
    /// Categories this building can produce.
    pub produces: Vec<UnitCategory>,
}

impl ProductionInfo {
    /// Create production configuration.
    #[must_use]
    pub fn new(produces: Vec<UnitCategory>) -> Self {
        Self { produces }
    }

    /// Whether a category is produced here. Build queues use this to
    /// match unit types to buildings.
    #[must_use]
    pub fn produces_category(&self, category: UnitCategory) -> bool {
        self.produces.contains(&category)
    }
}

/// Callback for the moment a unit leaves its producer.
///
/// Fired after the unit exists and its activities are queued; observers
/// may not veto or delay production.
pub trait NotifyProduction {
    /// A unit was produced: `producer` turned out `unit` at `exit_cell`.
    fn unit_produced(&mut self, producer: EntityId, unit: EntityId, exit_cell: CellPos);
}

/// Per-producer lists of production observers.
///
/// Observers are invoked synchronously in registration order. The
/// registry is transient wiring owned by the game layer - it is skipped
/// by snapshots and must be re-registered after a restore.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: HashMap<EntityId, Vec<Box<dyn NotifyProduction>>>,
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EntityId, usize> =
            self.observers.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("ObserverRegistry")
            .field("observers", &counts)
            .finish()
    }
}

impl ObserverRegistry {
    /// Register an observer for one producer.
    pub fn register(&mut self, producer: EntityId, observer: Box<dyn NotifyProduction>) {
        self.observers.entry(producer).or_default().push(observer);
    }

    /// Drop all observers registered for a producer.
    pub fn clear(&mut self, producer: EntityId) {
        self.observers.remove(&producer);
    }

    /// Number of observers registered for a producer.
    #[must_use]
    pub fn count(&self, producer: EntityId) -> usize {
        self.observers.get(&producer).map_or(0, Vec::len)
    }

    /// Invoke a producer's observers in registration order.
    pub fn notify(&mut self, producer: EntityId, unit: EntityId, exit_cell: CellPos) {
        if let Some(list) = self.observers.get_mut(&producer) {
            for observer in list.iter_mut() {
                observer.unit_produced(producer, unit, exit_cell);
            }
        }
    }
}

/// Snapshot of the producer fields production needs, taken before any
/// mutation of the world.
#[derive(Debug, Clone, Copy)]
struct ProducerState {
    location: CellPos,
    position: Vec2Fixed,
    owner: PlayerId,
    rally_point: Option<RallyPoint>,
}

/// The production controller for one building type.
///
/// Stateless beyond its configuration; all world effects go through the
/// [`World`] passed to [`Production::produce`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    info: ProductionInfo,
}

impl Production {
    /// Create a controller from production configuration.
    #[must_use]
    pub fn new(info: ProductionInfo) -> Self {
        Self { info }
    }

    /// The controller's configuration.
    #[must_use]
    pub fn info(&self) -> &ProductionInfo {
        &self.info
    }

    /// Produce one unit of `producee` at `producer`.
    ///
    /// Tries the producer's declared exits in an order shuffled from the
    /// world's shared random sequence; the first exit the unit could
    /// enter wins and is final for this call. Non-mobile unit types
    /// accept any exit; mobile types need the exit cell to be enterable
    /// with current occupants ignored.
    ///
    /// Returns `false` - with zero side effects on the actor set,
    /// activity queues and observers - when the producer is missing,
    /// exclusively claimed, or has no usable exit. On success exactly one
    /// actor is created, its emergence and rally activities are queued,
    /// and each registered observer is notified exactly once.
    pub fn produce(&self, world: &mut World, producer: EntityId, producee: &Blueprint) -> bool {
        let (state, mut exits) = {
            let Some(actor) = world.actors().get(producer) else {
                return false;
            };
            if actor.reservable.as_ref().is_some_and(Reservable::is_reserved) {
                trace!(producer, "production rejected: producer is reserved");
                return false;
            }
            (
                ProducerState {
                    location: actor.location,
                    position: actor.position.value,
                    owner: actor.owner,
                    rally_point: actor.rally_point,
                },
                actor.exits.clone(),
            )
        };

        world.rng_mut().shuffle(&mut exits);

        let chosen = exits
            .into_iter()
            .find(|exit| can_use_exit(world, &state, producee, exit));

        match chosen {
            Some(exit) => {
                do_production(world, producer, &state, producee, &exit);
                true
            }
            None => {
                trace!(producer, unit_type = %producee.name, "production rejected: no usable exit");
                false
            }
        }
    }
}

/// Whether a unit type could leave through an exit.
///
/// Immobile types can always use an exit; mobile types need to be able
/// to stand on the exit cell. Current occupants are ignored - they will
/// have moved on - but terrain and building footprints still refuse.
fn can_use_exit(world: &World, state: &ProducerState, producee: &Blueprint, exit: &ExitInfo) -> bool {
    producee.mobile.is_none() || world.can_enter_cell(state.location + exit.exit_cell, true)
}

/// Create the unit at a validated exit and queue its first activities.
fn do_production(
    world: &mut World,
    producer: EntityId,
    state: &ProducerState,
    producee: &Blueprint,
    exit: &ExitInfo,
) {
    let exit_cell = state.location + exit.exit_cell;
    let spawn = state.position + exit.spawn_offset;
    let to = exit_cell.pixel_center();

    let initial_facing = exit
        .facing
        .unwrap_or_else(|| facing_from_dir(to - spawn).unwrap_or(producee.initial_facing));

    let unit = world.create_actor(
        producee,
        ActorInit {
            owner: state.owner,
            location: exit_cell,
            facing: initial_facing,
        },
    );

    // The emergence animation starts at the building, not at the default
    // placement the factory chose.
    world.set_pixel_position(unit, spawn);

    if let Some(mobile) = &producee.mobile {
        let speed = world.movement_speed_at(mobile, exit_cell);
        let length = if speed > Fixed::ZERO {
            ((to - spawn).length() * Fixed::from_num(3) / speed)
                .to_num::<i64>()
                .clamp(0, i64::from(u32::MAX)) as u32
        } else {
            0
        };
        world.queue_activity(unit, Activity::Drag { from: spawn, to, length });
    }

    let target = move_to_rally_point(world, state.rally_point, unit, producee, exit_cell);

    world.set_target_line(unit, target, RgbColor::GREEN, false);
    world.notify_unit_produced(producer, unit, exit_cell);

    debug!(producer, unit, unit_type = %producee.name, ?exit_cell, "unit produced");
}

/// Route a fresh unit toward its producer's rally point.
///
/// Returns the cell the unit is ultimately headed for: the rally cell
/// when a route was queued, otherwise the exit cell it already stands on.
fn move_to_rally_point(
    world: &mut World,
    rally_point: Option<RallyPoint>,
    unit: EntityId,
    producee: &Blueprint,
    exit_cell: CellPos,
) -> CellPos {
    let Some(rally) = rally_point else {
        return exit_cell;
    };

    if producee.mobile.is_some() {
        world.queue_activity(
            unit,
            Activity::AttackMove {
                cell: rally.cell,
                near_enough: rally.near_enough,
            },
        );
        return rally.cell;
    }

    if producee.aircraft.is_some() {
        world.queue_activity(
            unit,
            Activity::Fly {
                to: rally.cell.pixel_center(),
            },
        );
        return rally.cell;
    }

    exit_cell
}
