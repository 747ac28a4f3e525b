//! Collider capability, handles, and collider storage
//!
//! The world never looks inside a collider's geometry. It asks for bounds,
//! layer bits and the pairwise tests on the [`Collider`] trait, so an engine
//! can plug in its own collider type. [`ShapeCollider`](super::ShapeCollider)
//! is the built-in implementation.

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::geom::Rect;

/// Handle to a collider stored in a [`ColliderSet`]. Slots are reused after
/// removal, so a stale handle may name a newer collider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ColliderId(pub u32);

/// Owning entity of a collider. Entities themselves live outside this crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct EntityId(pub u32);

/// Contact produced by a narrow-phase shape test
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeCollision {
    /// Unit contact normal, pointing from the other collider toward this one
    pub normal: Vec2,
    /// Displacement that moves this collider out of the other one
    pub minimum_translation_vector: Vec2,
    /// Approximate contact point in world space
    pub point: Vec2,
}

/// A narrow-phase contact tagged with the collider that was hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub collider: ColliderId,
    pub normal: Vec2,
    /// Displacement that moves the querying collider out of `collider`
    pub minimum_translation_vector: Vec2,
    pub point: Vec2,
}

impl CollisionResult {
    pub fn new(collider: ColliderId, contact: ShapeCollision) -> Self {
        Self {
            collider,
            normal: contact.normal,
            minimum_translation_vector: contact.minimum_translation_vector,
            point: contact.point,
        }
    }
}

/// Result of a linecast against one collider
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RaycastHit {
    /// Collider that was hit; `None` on an empty hit
    pub collider: Option<ColliderId>,
    /// Fraction along the segment, in `[0, 1]`
    pub fraction: f32,
    /// Distance from the segment start to `point`
    pub distance: f32,
    pub point: Vec2,
    /// Surface normal at `point`
    pub normal: Vec2,
    /// Center of the cast shape when it hit (the point itself for lines)
    pub centroid: Vec2,
}

impl RaycastHit {
    /// Clear before reusing a hit slot
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_hit(&self) -> bool {
        self.collider.is_some()
    }
}

/// The capability the physics world needs from a collider
pub trait Collider {
    /// World-space axis-aligned bounds
    fn bounds(&self) -> Rect;

    /// Layer bits this collider lives on
    fn physics_layer(&self) -> u32;

    /// Layers this collider wants to collide with
    fn collides_with_layers(&self) -> u32;

    fn is_trigger(&self) -> bool;

    fn entity(&self) -> EntityId;

    /// Boolean overlap test at current positions
    fn overlaps(&self, other: &Self) -> bool;

    /// Narrow-phase test after moving this collider by `motion`
    /// (`Vec2::ZERO` for a static test)
    fn collides_with(&self, other: &Self, motion: Vec2) -> Option<ShapeCollision>;

    /// Nearest intersection of the segment `start -> end` with this collider.
    /// The returned hit's `collider` is filled in by the caller.
    fn collides_with_line(&self, start: Vec2, end: Vec2) -> Option<RaycastHit>;

    fn overlaps_rect(&self, rect: &Rect) -> bool;

    fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool;

    /// Whether `point` lies inside the collider's shape (not just its bounds)
    fn contains_point(&self, point: Vec2) -> bool;

    /// Move the collider's geometry along with its entity
    fn translate(&mut self, delta: Vec2);
}

#[derive(Debug, Clone)]
struct Slot<C> {
    collider: C,
    registered_bounds: Option<Rect>,
}

/// Slab of colliders keyed by [`ColliderId`], indexed by owning entity
#[derive(Debug, Clone)]
pub struct ColliderSet<C> {
    slots: Vec<Option<Slot<C>>>,
    free: Vec<u32>,
    by_entity: FxHashMap<EntityId, Vec<ColliderId>>,
    len: usize,
}

impl<C> Default for ColliderSet<C> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_entity: FxHashMap::default(),
            len: 0,
        }
    }
}

impl<C: Collider> ColliderSet<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, collider: C) -> ColliderId {
        let entity = collider.entity();
        let slot = Some(Slot {
            collider,
            registered_bounds: None,
        });

        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = slot;
                ColliderId(index)
            }
            None => {
                self.slots.push(slot);
                ColliderId(self.slots.len() as u32 - 1)
            }
        };

        self.by_entity.entry(entity).or_default().push(id);
        self.len += 1;
        id
    }

    pub fn remove(&mut self, id: ColliderId) -> Option<C> {
        let slot = self.slots.get_mut(id.0 as usize)?.take()?;
        let entity = slot.collider.entity();

        if let Some(ids) = self.by_entity.get_mut(&entity) {
            ids.retain(|c| *c != id);
            if ids.is_empty() {
                self.by_entity.remove(&entity);
            }
        }

        self.free.push(id.0);
        self.len -= 1;
        Some(slot.collider)
    }

    #[inline]
    pub fn get(&self, id: ColliderId) -> Option<&C> {
        self.slots
            .get(id.0 as usize)
            .and_then(|s| s.as_ref())
            .map(|s| &s.collider)
    }

    /// Mutable access. Changing geometry here does not touch the spatial
    /// hash; call `PhysicsWorld::update_collider` afterwards.
    #[inline]
    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut C> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(|s| s.as_mut())
            .map(|s| &mut s.collider)
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.get(id).is_some()
    }

    /// Colliders owned by `entity`, in insertion order
    pub fn of_entity(&self, entity: EntityId) -> &[ColliderId] {
        self.by_entity
            .get(&entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColliderId, &C)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.as_ref()
                .map(|slot| (ColliderId(i as u32), &slot.collider))
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.by_entity.clear();
        self.len = 0;
    }

    /// Bounds the collider was last registered in the spatial hash with
    pub fn registered_bounds(&self, id: ColliderId) -> Option<Rect> {
        self.slots
            .get(id.0 as usize)
            .and_then(|s| s.as_ref())
            .and_then(|s| s.registered_bounds)
    }

    pub(crate) fn set_registered_bounds(&mut self, id: ColliderId, bounds: Option<Rect>) {
        if let Some(Some(slot)) = self.slots.get_mut(id.0 as usize) {
            slot.registered_bounds = bounds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Shape, ShapeCollider};

    fn boxed(entity: u32, x: f32) -> ShapeCollider {
        ShapeCollider::new(EntityId(entity), Shape::Box(Rect::new(x, 0.0, 10.0, 10.0)))
    }

    #[test]
    fn test_insert_get_remove() {
        let mut set = ColliderSet::new();
        let a = set.insert(boxed(1, 0.0));
        let b = set.insert(boxed(1, 20.0));
        assert_eq!(set.len(), 2);
        assert_eq!(set.of_entity(EntityId(1)), &[a, b]);

        let removed = set.remove(a).unwrap();
        assert_eq!(removed.bounds().x, 0.0);
        assert!(set.get(a).is_none());
        assert_eq!(set.of_entity(EntityId(1)), &[b]);
        assert!(set.remove(a).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_slot_reuse_and_entity_index() {
        let mut set = ColliderSet::new();
        let a = set.insert(boxed(1, 0.0));
        set.remove(a);
        assert!(set.of_entity(EntityId(1)).is_empty());

        let c = set.insert(boxed(2, 5.0));
        assert_eq!(c, a);
        assert_eq!(set.of_entity(EntityId(2)), &[c]);
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn test_registered_bounds_tracking() {
        let mut set = ColliderSet::new();
        let a = set.insert(boxed(1, 0.0));
        assert!(set.registered_bounds(a).is_none());

        set.set_registered_bounds(a, Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(set.registered_bounds(a), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn test_raycast_hit_reset() {
        let mut hit = RaycastHit {
            collider: Some(ColliderId(3)),
            fraction: 0.5,
            distance: 10.0,
            ..Default::default()
        };
        assert!(hit.is_hit());
        hit.reset();
        assert!(!hit.is_hit());
        assert_eq!(hit.distance, 0.0);
    }
}
