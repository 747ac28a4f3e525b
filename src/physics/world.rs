//! The physics world: collider storage, the spatial hash and the query API
//!
//! The world is an explicit value owned by the caller. Every query reuses
//! scratch held by the world, so none of them may be called while a
//! previous broadphase result is still borrowed.

use glam::Vec2;
use rustc_hash::FxHashSet;

use super::collider::{Collider, ColliderId, ColliderSet, EntityId, RaycastHit};
use super::shape::ShapeCollider;
use super::spatial_hash::{RaycastOptions, SpatialHash};
use crate::geom::Rect;
use crate::settings::PhysicsSettings;

/// Colliders plus the broadphase grid that indexes them
#[derive(Debug)]
pub struct PhysicsWorld<C: Collider = ShapeCollider> {
    settings: PhysicsSettings,
    colliders: ColliderSet<C>,
    hash: SpatialHash,
}

impl<C: Collider> Default for PhysicsWorld<C> {
    fn default() -> Self {
        Self::new(PhysicsSettings::default())
    }
}

impl<C: Collider> PhysicsWorld<C> {
    pub fn new(settings: PhysicsSettings) -> Self {
        let settings = settings.sanitized();
        let hash = SpatialHash::new(settings.spatial_hash_cell_size);

        Self {
            settings,
            colliders: ColliderSet::new(),
            hash,
        }
    }

    /// Rebuild the spatial hash from the current cell size. Every collider
    /// is dropped; entities re-add theirs afterwards.
    pub fn reset(&mut self) {
        self.hash = SpatialHash::new(self.settings.spatial_hash_cell_size);
        self.colliders.clear();
        log::info!(
            "Physics world reset (cell size {})",
            self.settings.spatial_hash_cell_size
        );
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    /// Replace the settings. A new cell size applies from the next `reset`.
    pub fn set_settings(&mut self, settings: PhysicsSettings) {
        self.settings = settings.sanitized();
    }

    #[inline]
    pub fn gravity(&self) -> Vec2 {
        self.settings.gravity
    }

    pub fn spatial_hash(&self) -> &SpatialHash {
        &self.hash
    }

    pub fn colliders(&self) -> &ColliderSet<C> {
        &self.colliders
    }

    #[inline]
    pub fn collider(&self, id: ColliderId) -> Option<&C> {
        self.colliders.get(id)
    }

    /// Mutable access to a collider. The grid is not told about geometry
    /// changes; follow up with [`update_collider`](Self::update_collider).
    pub fn collider_mut(&mut self, id: ColliderId) -> Option<&mut C> {
        self.colliders.get_mut(id)
    }

    pub fn colliders_of(&self, entity: EntityId) -> &[ColliderId] {
        self.colliders.of_entity(entity)
    }

    /// Store a collider and register it with the grid at its current bounds
    pub fn add_collider(&mut self, collider: C) -> ColliderId {
        let bounds = collider.bounds();
        let id = self.colliders.insert(collider);
        self.hash.register(id, &bounds);
        self.colliders.set_registered_bounds(id, Some(bounds));
        log::debug!("Added collider {:?} at {:?}", id, bounds);
        id
    }

    /// Unregister and return a collider. Unknown ids are a no-op.
    pub fn remove_collider(&mut self, id: ColliderId) -> Option<C> {
        match self.colliders.registered_bounds(id) {
            Some(bounds) => self.hash.remove_with_bounds(id, &bounds),
            None => self.hash.remove(id),
        }
        self.colliders.remove(id)
    }

    /// Re-register a collider at its current bounds after it moved or
    /// changed shape. Scans every cell.
    pub fn update_collider(&mut self, id: ColliderId) {
        let Some(bounds) = self.colliders.get(id).map(Collider::bounds) else {
            return;
        };
        self.hash.update(id, &bounds);
        self.colliders.set_registered_bounds(id, Some(bounds));
    }

    /// Move every collider of `entity` by `delta`, keeping the grid current
    pub fn translate_entity(&mut self, entity: EntityId, delta: Vec2) {
        let count = self.colliders.of_entity(entity).len();

        for i in 0..count {
            let id = self.colliders.of_entity(entity)[i];
            self.translate_collider(id, delta);
        }
    }

    /// Move one collider by `delta` and re-register it
    pub fn translate_collider(&mut self, id: ColliderId, delta: Vec2) {
        match self.colliders.registered_bounds(id) {
            Some(old) => self.hash.remove_with_bounds(id, &old),
            None => self.hash.remove(id),
        }

        let Some(collider) = self.colliders.get_mut(id) else {
            return;
        };
        collider.translate(delta);
        let bounds = collider.bounds();

        self.hash.register(id, &bounds);
        self.colliders.set_registered_bounds(id, Some(bounds));
    }

    /// Every collider in the grid, deduplicated. Allocates.
    pub fn all_colliders(&self) -> FxHashSet<ColliderId> {
        self.hash.all_objects()
    }

    /// Closest collider hit by the segment `start -> end`
    pub fn linecast(&mut self, start: Vec2, end: Vec2, layer_mask: u32) -> Option<RaycastHit> {
        let mut hits = [RaycastHit::default()];
        let count = self.linecast_all(start, end, &mut hits, layer_mask);
        (count > 0).then_some(hits[0])
    }

    /// Fill `hits` with colliders along the segment, nearest cells first.
    /// Returns the number written.
    ///
    /// Panics if `hits` is empty.
    pub fn linecast_all(
        &mut self,
        start: Vec2,
        end: Vec2,
        hits: &mut [RaycastHit],
        layer_mask: u32,
    ) -> usize {
        let options = RaycastOptions::from(&self.settings);
        self.hash
            .linecast(start, end, hits, layer_mask, options, &self.colliders)
    }

    /// First collider whose shape overlaps `rect`
    pub fn overlap_rectangle(&mut self, rect: &Rect, layer_mask: u32) -> Option<ColliderId> {
        let mut results = [ColliderId::default()];
        let count = self.overlap_rectangle_all(rect, &mut results, layer_mask);
        (count > 0).then_some(results[0])
    }

    /// Colliders whose shape overlaps `rect`, up to `results.len()`
    pub fn overlap_rectangle_all(
        &mut self,
        rect: &Rect,
        results: &mut [ColliderId],
        layer_mask: u32,
    ) -> usize {
        if results.is_empty() {
            log::warn!("overlap_rectangle_all called with an empty results buffer");
            return 0;
        }
        self.hash
            .overlap_rectangle(rect, results, layer_mask, &self.colliders)
    }

    /// First collider whose shape overlaps the circle
    pub fn overlap_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        layer_mask: u32,
    ) -> Option<ColliderId> {
        let mut results = [ColliderId::default()];
        let count = self.overlap_circle_all(center, radius, &mut results, layer_mask);
        (count > 0).then_some(results[0])
    }

    /// Colliders whose shape overlaps the circle, up to `results.len()`
    pub fn overlap_circle_all(
        &mut self,
        center: Vec2,
        radius: f32,
        results: &mut [ColliderId],
        layer_mask: u32,
    ) -> usize {
        if results.is_empty() {
            log::warn!("overlap_circle_all called with an empty results buffer");
            return 0;
        }
        self.hash
            .overlap_circle(center, radius, results, layer_mask, &self.colliders)
    }

    /// Colliders whose bounds intersect `rect`. Broadphase only.
    pub fn boxcast_broadphase(&mut self, rect: &Rect, layer_mask: u32) -> &[ColliderId] {
        self.hash
            .aabb_broadphase(rect, None, layer_mask, &self.colliders)
    }

    /// Colliders whose bounds intersect `id`'s bounds, not counting `id`
    pub fn boxcast_broadphase_excluding_self(
        &mut self,
        id: ColliderId,
        layer_mask: u32,
    ) -> &[ColliderId] {
        let Some(bounds) = self.colliders.get(id).map(Collider::bounds) else {
            return &[];
        };
        self.boxcast_broadphase_excluding_self_rect(id, &bounds, layer_mask)
    }

    /// Colliders whose bounds intersect `rect`, not counting `id`
    pub fn boxcast_broadphase_excluding_self_rect(
        &mut self,
        id: ColliderId,
        rect: &Rect,
        layer_mask: u32,
    ) -> &[ColliderId] {
        self.hash
            .aabb_broadphase(rect, Some(id), layer_mask, &self.colliders)
    }

    /// Like [`boxcast_broadphase_excluding_self`](Self::boxcast_broadphase_excluding_self)
    /// with `id`'s bounds grown to cover a move by `delta`
    pub fn boxcast_broadphase_excluding_self_delta(
        &mut self,
        id: ColliderId,
        delta: Vec2,
        layer_mask: u32,
    ) -> &[ColliderId] {
        let Some(bounds) = self.colliders.get(id).map(Collider::bounds) else {
            return &[];
        };
        let swept = bounds.swept_broadphase_bounds(delta);
        self.boxcast_broadphase_excluding_self_rect(id, &swept, layer_mask)
    }
}
