//! Arcade rigidbodies: gravity, simple overlap separation and an
//! elasticity/friction velocity response
//!
//! This is deliberately not a constraint solver. Each body is resolved once
//! per tick against whatever it overlaps after moving, in ascending entity
//! order, so results depend on that order and stacks don't settle perfectly.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collider::{Collider, ColliderId, EntityId};
use super::world::PhysicsWorld;
use crate::consts::{
    DEFAULT_ELASTICITY, DEFAULT_FRICTION, DEFAULT_GLUE, DEFAULT_MASS, IMMOVABLE_MASS_EPSILON,
    IMPULSE_SCALE, MAX_GLUE,
};

/// Per-entity rigidbody state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcadeRigidbody {
    mass: f32,
    inverse_mass: f32,
    elasticity: f32,
    friction: f32,
    glue: f32,
    /// Whether world gravity is applied every update
    pub use_gravity: bool,
    pub velocity: Vec2,
}

impl Default for ArcadeRigidbody {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            inverse_mass: 1.0 / DEFAULT_MASS,
            elasticity: DEFAULT_ELASTICITY,
            friction: DEFAULT_FRICTION,
            glue: DEFAULT_GLUE,
            use_gravity: true,
            velocity: Vec2::ZERO,
        }
    }
}

impl ArcadeRigidbody {
    pub fn new() -> Self {
        Self::default()
    }

    /// A body that never moves on its own but still pushes others around
    pub fn immovable() -> Self {
        Self::default().with_mass(0.0)
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.set_elasticity(elasticity);
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.set_friction(friction);
        self
    }

    pub fn with_glue(mut self, glue: f32) -> Self {
        self.set_glue(glue);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    #[inline]
    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }

    #[inline]
    pub fn friction(&self) -> f32 {
        self.friction
    }

    #[inline]
    pub fn glue(&self) -> f32 {
        self.glue
    }

    /// Mass 0 makes the body immovable
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.clamp(0.0, f32::MAX);
        self.inverse_mass = if self.mass > IMMOVABLE_MASS_EPSILON {
            1.0 / self.mass
        } else {
            0.0
        };
    }

    /// 0 = no bounce, 1 = perfectly elastic
    pub fn set_elasticity(&mut self, elasticity: f32) {
        self.elasticity = elasticity.clamp(0.0, 1.0);
    }

    /// 0 = slick, 1 = tangential velocity fully removed on contact
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction.clamp(0.0, 1.0);
    }

    /// Tangential speed² below which the body sticks instead of sliding
    pub fn set_glue(&mut self, glue: f32) {
        self.glue = glue.clamp(0.0, MAX_GLUE);
    }

    #[inline]
    pub fn is_immovable(&self) -> bool {
        self.inverse_mass == 0.0
    }

    /// Push the body. `force` is scaled so sensible values are small.
    /// Immovable bodies ignore impulses.
    pub fn add_impulse(&mut self, force: Vec2, dt: f32) {
        if self.is_immovable() {
            return;
        }
        self.velocity += force * IMPULSE_SCALE * (self.inverse_mass * dt * dt);
    }

    /// Velocity change for a contact whose MTV pushes this body out
    fn response_velocity(&self, relative_velocity: Vec2, mtv: Vec2) -> Vec2 {
        let normal = mtv.normalize_or_zero();
        let n = relative_velocity.dot(normal);

        let mut normal_component = normal * n;
        let tangential_component = relative_velocity - normal_component;

        // Already separating
        if n > 0.0 {
            normal_component = Vec2::ZERO;
        }

        let friction = if tangential_component.length_squared() < self.glue {
            1.01
        } else {
            self.friction
        };

        -(1.0 + self.elasticity) * normal_component - friction * tangential_component
    }
}

/// Rigidbodies keyed by entity
#[derive(Debug, Clone, Default)]
pub struct Rigidbodies {
    bodies: BTreeMap<EntityId, ArcadeRigidbody>,
    order: Vec<EntityId>,
    neighbors: Vec<ColliderId>,
}

impl Rigidbodies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: EntityId, body: ArcadeRigidbody) -> Option<ArcadeRigidbody> {
        self.bodies.insert(entity, body)
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<ArcadeRigidbody> {
        self.bodies.remove(&entity)
    }

    pub fn get(&self, entity: EntityId) -> Option<&ArcadeRigidbody> {
        self.bodies.get(&entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut ArcadeRigidbody> {
        self.bodies.get_mut(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.bodies.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Bodies in ascending entity order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &ArcadeRigidbody)> {
        self.bodies.iter().map(|(e, b)| (*e, b))
    }

    /// Step every body once, in ascending entity order
    pub fn update<C: Collider>(&mut self, world: &mut PhysicsWorld<C>, dt: f32) {
        let mut order = std::mem::take(&mut self.order);
        order.clear();
        order.extend(self.bodies.keys().copied());

        for &entity in &order {
            self.update_body(entity, world, dt);
        }

        self.order = order;
    }

    /// Integrate one body, then resolve it against whatever it overlaps
    pub fn update_body<C: Collider>(
        &mut self,
        entity: EntityId,
        world: &mut PhysicsWorld<C>,
        dt: f32,
    ) {
        let Some(&start) = self.bodies.get(&entity) else {
            return;
        };
        let mut body = start;

        if body.is_immovable() {
            body.velocity = Vec2::ZERO;
            self.bodies.insert(entity, body);
            return;
        }

        if body.use_gravity {
            body.velocity += world.gravity() * dt;
        }
        world.translate_entity(entity, body.velocity * dt);

        let Self {
            bodies, neighbors, ..
        } = self;

        let collider_count = world.colliders_of(entity).len();
        for i in 0..collider_count {
            let id = world.colliders_of(entity)[i];
            let Some(mask) = world
                .collider(id)
                .filter(|c| !c.is_trigger())
                .map(Collider::collides_with_layers)
            else {
                continue;
            };

            neighbors.clear();
            neighbors.extend_from_slice(world.boxcast_broadphase_excluding_self(id, mask));

            for &neighbor in neighbors.iter() {
                let (Some(me), Some(other)) = (world.collider(id), world.collider(neighbor)) else {
                    continue;
                };
                let other_entity = other.entity();
                if other_entity == entity || other.is_trigger() {
                    continue;
                }
                let Some(contact) = me.collides_with(other, Vec2::ZERO) else {
                    continue;
                };
                let mtv = contact.minimum_translation_vector;

                match bodies.get_mut(&other_entity) {
                    Some(other_body) => {
                        // Overlap: split the separation unless one side can't move
                        if other_body.is_immovable() {
                            world.translate_entity(entity, mtv);
                        } else {
                            world.translate_entity(entity, mtv * 0.5);
                            world.translate_entity(other_entity, -mtv * 0.5);
                        }

                        let relative_velocity = body.velocity - other_body.velocity;
                        let response = body.response_velocity(relative_velocity, mtv);
                        let total_inverse_mass = body.inverse_mass + other_body.inverse_mass;
                        if total_inverse_mass > 0.0 {
                            body.velocity += response * (body.inverse_mass / total_inverse_mass);
                            other_body.velocity -=
                                response * (other_body.inverse_mass / total_inverse_mass);
                        }
                    }
                    None => {
                        // No rigidbody: treat the neighbor as infinitely heavy
                        world.translate_entity(entity, mtv);
                        body.velocity += body.response_velocity(body.velocity, mtv);
                    }
                }
            }
        }

        bodies.insert(entity, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;
    use crate::physics::{Shape, ShapeCollider};
    use crate::settings::PhysicsSettings;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsSettings::default())
    }

    fn add_box(world: &mut PhysicsWorld, entity: u32, rect: Rect) -> ColliderId {
        world.add_collider(ShapeCollider::new(EntityId(entity), Shape::Box(rect)))
    }

    #[test]
    fn test_defaults_and_clamps() {
        let mut body = ArcadeRigidbody::new();
        assert_eq!(body.mass(), 10.0);
        assert!((body.inverse_mass() - 0.1).abs() < 1e-6);
        assert_eq!(body.elasticity(), 0.5);
        assert_eq!(body.friction(), 0.5);
        assert_eq!(body.glue(), 0.01);

        body.set_elasticity(2.0);
        body.set_friction(-1.0);
        body.set_glue(50.0);
        body.set_mass(-3.0);
        assert_eq!(body.elasticity(), 1.0);
        assert_eq!(body.friction(), 0.0);
        assert_eq!(body.glue(), 10.0);
        assert_eq!(body.mass(), 0.0);
        assert_eq!(body.inverse_mass(), 0.0);
        assert!(body.is_immovable());
    }

    #[test]
    fn test_mass_at_threshold_is_immovable() {
        let body = ArcadeRigidbody::new().with_mass(IMMOVABLE_MASS_EPSILON);
        assert_eq!(body.inverse_mass(), 0.0);
        assert!(body.is_immovable());

        let body = ArcadeRigidbody::new().with_mass(IMMOVABLE_MASS_EPSILON * 2.0);
        assert!(body.inverse_mass() > 0.0);
        assert!(!body.is_immovable());
    }

    #[test]
    fn test_tiny_mass_against_immovable_stays_finite() {
        for mass in [IMMOVABLE_MASS_EPSILON, IMMOVABLE_MASS_EPSILON * 2.0] {
            let mut w = world();
            let a = add_box(&mut w, 1, Rect::new(0.0, 0.0, 10.0, 10.0));
            add_box(&mut w, 2, Rect::new(6.0, 0.0, 10.0, 10.0));
            let mut bodies = Rigidbodies::new();
            bodies.insert(
                EntityId(1),
                ArcadeRigidbody::new()
                    .with_mass(mass)
                    .with_gravity(false)
                    .with_velocity(Vec2::new(1.0, 0.0)),
            );
            bodies.insert(EntityId(2), ArcadeRigidbody::immovable());

            bodies.update(&mut w, 1.0 / 60.0);

            let v = bodies.get(EntityId(1)).unwrap().velocity;
            assert!(v.is_finite(), "mass {mass}: velocity {v:?}");
            assert!(w.collider(a).unwrap().bounds().location().is_finite());
            assert_eq!(bodies.get(EntityId(2)).unwrap().velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_add_impulse() {
        let mut body = ArcadeRigidbody::new();
        body.add_impulse(Vec2::new(1.0, 0.0), 0.1);
        // 1 * 100000 * 0.1 * 0.01
        assert!((body.velocity.x - 100.0).abs() < 1e-3);

        let mut wall = ArcadeRigidbody::immovable();
        wall.add_impulse(Vec2::new(1.0, 0.0), 0.1);
        assert_eq!(wall.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_immovable_body_velocity_zeroed() {
        let mut w = world();
        let id = add_box(&mut w, 1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut bodies = Rigidbodies::new();
        bodies.insert(
            EntityId(1),
            ArcadeRigidbody::immovable().with_velocity(Vec2::new(50.0, -20.0)),
        );

        for _ in 0..3 {
            bodies.update(&mut w, 1.0 / 60.0);
        }
        assert_eq!(bodies.get(EntityId(1)).unwrap().velocity, Vec2::ZERO);
        assert_eq!(w.collider(id).unwrap().bounds().location(), Vec2::ZERO);
    }

    #[test]
    fn test_equal_masses_split_overlap() {
        let mut w = world();
        let a = add_box(&mut w, 1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = add_box(&mut w, 2, Rect::new(6.0, 0.0, 10.0, 10.0));
        let mut bodies = Rigidbodies::new();
        bodies.insert(EntityId(1), ArcadeRigidbody::new().with_gravity(false));
        bodies.insert(EntityId(2), ArcadeRigidbody::new().with_gravity(false));

        bodies.update(&mut w, 1.0 / 60.0);

        // 4 units of overlap, each body moves 2
        assert!((w.collider(a).unwrap().bounds().x - -2.0).abs() < 1e-4);
        assert!((w.collider(b).unwrap().bounds().x - 8.0).abs() < 1e-4);
        assert_eq!(bodies.get(EntityId(1)).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_immovable_neighbor_takes_no_push() {
        let mut w = world();
        let a = add_box(&mut w, 1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let wall = add_box(&mut w, 2, Rect::new(6.0, 0.0, 10.0, 10.0));
        let mut bodies = Rigidbodies::new();
        bodies.insert(EntityId(1), ArcadeRigidbody::new().with_gravity(false));
        bodies.insert(EntityId(2), ArcadeRigidbody::immovable());

        bodies.update(&mut w, 1.0 / 60.0);

        assert!((w.collider(a).unwrap().bounds().x - -4.0).abs() < 1e-4);
        assert_eq!(w.collider(wall).unwrap().bounds().x, 6.0);
    }

    #[test]
    fn test_bounce_off_static_floor() {
        let mut w = world();
        let a = add_box(&mut w, 1, Rect::new(0.0, 0.0, 10.0, 10.0));
        add_box(&mut w, 2, Rect::new(-50.0, 12.0, 100.0, 10.0));
        let mut bodies = Rigidbodies::new();
        bodies.insert(
            EntityId(1),
            ArcadeRigidbody::new()
                .with_gravity(false)
                .with_velocity(Vec2::new(0.0, 100.0)),
        );

        // Falls 10 units into the floor, 8 of them overlapping
        bodies.update(&mut w, 0.1);

        assert!((w.collider(a).unwrap().bounds().y - 2.0).abs() < 1e-3);
        // -(1 + 0.5) * 100 response on top of 100
        let v = bodies.get(EntityId(1)).unwrap().velocity;
        assert!((v - Vec2::new(0.0, -50.0)).length() < 1e-3);
    }

    #[test]
    fn test_friction_and_glue() {
        let body = ArcadeRigidbody::new().with_elasticity(0.0);
        let mtv = Vec2::new(0.0, -1.0);

        // Sliding: half the tangential speed removed, normal speed cancelled
        let response = body.response_velocity(Vec2::new(10.0, 5.0), mtv);
        assert!((response - Vec2::new(-5.0, -5.0)).length() < 1e-4);

        // Below glue: friction above 1 stops the slide outright
        let response = body.response_velocity(Vec2::new(0.05, 5.0), mtv);
        assert!((response.x - -0.0505).abs() < 1e-5);

        // Moving away: no normal response
        let response = body.response_velocity(Vec2::new(0.0, -5.0), mtv);
        assert_eq!(response, Vec2::ZERO);
    }

    #[test]
    fn test_gravity_integration() {
        let mut w = world();
        let a = add_box(&mut w, 1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut bodies = Rigidbodies::new();
        bodies.insert(EntityId(1), ArcadeRigidbody::new());

        bodies.update(&mut w, 0.5);
        // v = 300 * 0.5, moved v * 0.5
        assert_eq!(bodies.get(EntityId(1)).unwrap().velocity, Vec2::new(0.0, 150.0));
        assert!((w.collider(a).unwrap().bounds().y - 75.0).abs() < 1e-4);
    }
}
