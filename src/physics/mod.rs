//! Stateful physics: colliders, the spatial hash broadphase, and the
//! arcade-style helpers built on top of it
//!
//! Everything runs on one thread. The world owns reusable query scratch, so
//! a broadphase result must be copied out before the world is touched again.

pub mod collider;
pub mod mover;
pub mod rigidbody;
pub mod shape;
pub mod spatial_hash;
pub mod triggers;
pub mod world;

pub use collider::{
    Collider, ColliderId, ColliderSet, CollisionResult, EntityId, RaycastHit, ShapeCollision,
};
pub use mover::{Mover, ProjectileMover};
pub use rigidbody::{ArcadeRigidbody, Rigidbodies};
pub use shape::{Shape, ShapeCollider};
pub use spatial_hash::{RaycastOptions, SpatialHash, cell_key};
pub use triggers::{TriggerEvent, TriggerHelper, TriggerListener};
pub use world::PhysicsWorld;
