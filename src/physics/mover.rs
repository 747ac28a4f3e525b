//! Kinematic movement helpers
//!
//! [`Mover`] clips an entity's motion against solid colliders before
//! committing it and keeps trigger state up to date. [`ProjectileMover`]
//! moves unconditionally and only reports what it touched.

use glam::Vec2;

use super::collider::{Collider, ColliderId, CollisionResult, EntityId};
use super::triggers::{TriggerHelper, TriggerListener, notify_pair};
use super::world::PhysicsWorld;

/// Moves an entity, stopping it at solid colliders
#[derive(Debug, Clone)]
pub struct Mover {
    entity: EntityId,
    triggers: TriggerHelper,
    neighbors: Vec<ColliderId>,
}

impl Mover {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            triggers: TriggerHelper::new(entity),
            neighbors: Vec::new(),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn triggers(&self) -> &TriggerHelper {
        &self.triggers
    }

    /// Shorten `motion` so the entity's solid colliders don't end up inside
    /// other solid colliders. Returns the first collision found.
    pub fn calculate_movement<C: Collider>(
        &mut self,
        world: &mut PhysicsWorld<C>,
        motion: &mut Vec2,
    ) -> Option<CollisionResult> {
        let mut first = None;
        self.clip_motion(world, motion, |hit| {
            first.get_or_insert(hit);
        });
        first
    }

    /// Like [`calculate_movement`](Self::calculate_movement) but pushes every
    /// collision into `results`. Returns true if there was any.
    pub fn advanced_calculate_movement<C: Collider>(
        &mut self,
        world: &mut PhysicsWorld<C>,
        motion: &mut Vec2,
        results: &mut Vec<CollisionResult>,
    ) -> bool {
        let before = results.len();
        self.clip_motion(world, motion, |hit| results.push(hit));
        results.len() > before
    }

    /// Commit `motion` and report trigger enters/exits
    pub fn apply_movement<C: Collider, L: TriggerListener + ?Sized>(
        &mut self,
        world: &mut PhysicsWorld<C>,
        motion: Vec2,
        listener: &mut L,
    ) {
        world.translate_entity(self.entity, motion);
        self.triggers.update(world, listener);
    }

    /// Calculate and apply in one go
    pub fn move_by<C: Collider, L: TriggerListener + ?Sized>(
        &mut self,
        world: &mut PhysicsWorld<C>,
        mut motion: Vec2,
        listener: &mut L,
    ) -> Option<CollisionResult> {
        let hit = self.calculate_movement(world, &mut motion);
        self.apply_movement(world, motion, listener);
        hit
    }

    fn clip_motion<C: Collider>(
        &mut self,
        world: &mut PhysicsWorld<C>,
        motion: &mut Vec2,
        mut on_hit: impl FnMut(CollisionResult),
    ) {
        let collider_count = world.colliders_of(self.entity).len();

        for i in 0..collider_count {
            let id = world.colliders_of(self.entity)[i];
            let Some(collider) = world.collider(id) else {
                continue;
            };
            if collider.is_trigger() {
                continue;
            }

            // Where this collider would end up with the motion so far
            let bounds = collider.bounds().translated(*motion);
            let mask = collider.collides_with_layers();

            self.neighbors.clear();
            self.neighbors
                .extend_from_slice(world.boxcast_broadphase_excluding_self_rect(id, &bounds, mask));

            for &neighbor in &self.neighbors {
                let (Some(collider), Some(other)) = (world.collider(id), world.collider(neighbor))
                else {
                    continue;
                };
                if other.is_trigger() {
                    continue;
                }

                if let Some(contact) = collider.collides_with(other, *motion) {
                    *motion += contact.minimum_translation_vector;
                    on_hit(CollisionResult::new(neighbor, contact));
                }
            }
        }
    }
}

/// Moves an entity without any collision response, reporting every
/// collider it ends up overlapping as a trigger enter on both sides
#[derive(Debug, Clone)]
pub struct ProjectileMover {
    entity: EntityId,
    neighbors: Vec<ColliderId>,
}

impl ProjectileMover {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            neighbors: Vec::new(),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Move by the full `motion`. Returns true if the entity's collider
    /// overlaps anything afterwards. An entity without colliders doesn't
    /// move.
    pub fn move_by<C: Collider, L: TriggerListener + ?Sized>(
        &mut self,
        world: &mut PhysicsWorld<C>,
        motion: Vec2,
        listener: &mut L,
    ) -> bool {
        let Some(&id) = world.colliders_of(self.entity).first() else {
            return false;
        };

        world.translate_entity(self.entity, motion);

        let Some(mask) = world.collider(id).map(Collider::collides_with_layers) else {
            return false;
        };
        self.neighbors.clear();
        self.neighbors
            .extend_from_slice(world.boxcast_broadphase_excluding_self(id, mask));

        let mut did_collide = false;
        for &neighbor in &self.neighbors {
            let (Some(collider), Some(other)) = (world.collider(id), world.collider(neighbor)) else {
                continue;
            };
            if collider.overlaps(other) {
                did_collide = true;
                notify_pair(
                    listener,
                    (neighbor, other.entity()),
                    (id, self.entity),
                    true,
                );
            }
        }

        did_collide
    }
}
