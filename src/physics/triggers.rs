//! Trigger enter/exit tracking
//!
//! A [`TriggerHelper`] belongs to one entity. After the entity moves it
//! looks for overlaps where at least one side is a trigger and reports pairs
//! that started or stopped overlapping since the previous update.

use rustc_hash::FxHashSet;

use super::collider::{Collider, ColliderId, EntityId};
use super::world::PhysicsWorld;

/// Receives trigger notifications. `entity` is the entity being notified,
/// `local` its collider and `other` the collider on the far side.
pub trait TriggerListener {
    fn on_trigger_enter(&mut self, entity: EntityId, other: ColliderId, local: ColliderId);

    fn on_trigger_exit(&mut self, entity: EntityId, other: ColliderId, local: ColliderId);
}

/// A recorded trigger notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Enter {
        entity: EntityId,
        other: ColliderId,
        local: ColliderId,
    },
    Exit {
        entity: EntityId,
        other: ColliderId,
        local: ColliderId,
    },
}

impl TriggerListener for Vec<TriggerEvent> {
    fn on_trigger_enter(&mut self, entity: EntityId, other: ColliderId, local: ColliderId) {
        self.push(TriggerEvent::Enter {
            entity,
            other,
            local,
        });
    }

    fn on_trigger_exit(&mut self, entity: EntityId, other: ColliderId, local: ColliderId) {
        self.push(TriggerEvent::Exit {
            entity,
            other,
            local,
        });
    }
}

/// Ordered pair: `first` belongs to the tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct TriggerPair {
    first: ColliderId,
    first_entity: EntityId,
    second: ColliderId,
    second_entity: EntityId,
}

/// Tell both sides of a pair. The first collider's entity hears first.
pub(crate) fn notify_pair<L: TriggerListener + ?Sized>(
    listener: &mut L,
    (first, first_entity): (ColliderId, EntityId),
    (second, second_entity): (ColliderId, EntityId),
    entering: bool,
) {
    if entering {
        listener.on_trigger_enter(first_entity, second, first);
        listener.on_trigger_enter(second_entity, first, second);
    } else {
        listener.on_trigger_exit(first_entity, second, first);
        listener.on_trigger_exit(second_entity, first, second);
    }
}

/// Tracks trigger overlaps of one entity across updates
#[derive(Debug, Clone)]
pub struct TriggerHelper {
    entity: EntityId,
    active: FxHashSet<TriggerPair>,
    previous: FxHashSet<TriggerPair>,
    neighbors: Vec<ColliderId>,
    exited: Vec<TriggerPair>,
}

impl TriggerHelper {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            active: FxHashSet::default(),
            previous: FxHashSet::default(),
            neighbors: Vec::new(),
            exited: Vec::new(),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Whether `local` and `other` were overlapping as of the last update
    pub fn is_overlapping(&self, local: ColliderId, other: ColliderId) -> bool {
        self.previous
            .iter()
            .any(|p| p.first == local && p.second == other)
    }

    /// Forget every tracked overlap without reporting exits
    pub fn clear(&mut self) {
        self.active.clear();
        self.previous.clear();
    }

    /// Find the entity's trigger overlaps at its current position, report
    /// new ones as enters and vanished ones as exits
    pub fn update<C: Collider, L: TriggerListener + ?Sized>(
        &mut self,
        world: &mut PhysicsWorld<C>,
        listener: &mut L,
    ) {
        let collider_count = world.colliders_of(self.entity).len();

        for i in 0..collider_count {
            let id = world.colliders_of(self.entity)[i];
            let Some(mask) = world.collider(id).map(Collider::collides_with_layers) else {
                continue;
            };

            self.neighbors.clear();
            self.neighbors
                .extend_from_slice(world.boxcast_broadphase_excluding_self(id, mask));

            for &neighbor in &self.neighbors {
                let (Some(collider), Some(other)) = (world.collider(id), world.collider(neighbor))
                else {
                    continue;
                };
                if !collider.is_trigger() && !other.is_trigger() {
                    continue;
                }
                if !collider.overlaps(other) {
                    continue;
                }

                let pair = TriggerPair {
                    first: id,
                    first_entity: self.entity,
                    second: neighbor,
                    second_entity: other.entity(),
                };
                if !self.active.contains(&pair) && !self.previous.contains(&pair) {
                    log::debug!("Trigger enter {:?} <-> {:?}", id, neighbor);
                    notify_pair(
                        listener,
                        (pair.first, pair.first_entity),
                        (pair.second, pair.second_entity),
                        true,
                    );
                }
                self.active.insert(pair);
            }
        }

        self.check_for_exits(listener);
    }

    fn check_for_exits<L: TriggerListener + ?Sized>(&mut self, listener: &mut L) {
        self.exited.clear();
        self.exited
            .extend(self.previous.difference(&self.active).copied());
        self.exited.sort();

        for pair in &self.exited {
            log::debug!("Trigger exit {:?} <-> {:?}", pair.first, pair.second);
            notify_pair(
                listener,
                (pair.first, pair.first_entity),
                (pair.second, pair.second_entity),
                false,
            );
        }

        std::mem::swap(&mut self.previous, &mut self.active);
        self.active.clear();
    }
}
