//! Uniform-grid spatial hash for broadphase queries
//!
//! Cells are keyed by packed integer coordinates and hold the ids of every
//! collider whose bounds touch them. Cells are created on first insert and
//! never pruned. The grid doesn't track movement: membership is only as
//! fresh as the last register/remove/update.
//!
//! Query scratch (the broadphase result list, raycast bookkeeping) is owned
//! by the hash and reused, so steady-state queries don't allocate. Results
//! borrow that scratch, which keeps them from outliving the next query.

use glam::{IVec2, Vec2};
use rustc_hash::{FxHashMap, FxHashSet};

use super::collider::{Collider, ColliderId, ColliderSet, RaycastHit};
use crate::approach;
use crate::geom::{Ray2D, Rect};
use crate::settings::PhysicsSettings;

/// Linecast filtering flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RaycastOptions {
    /// Trigger colliders can be hit
    pub hit_triggers: bool,
    /// Colliders containing the segment start can be hit
    pub start_in_colliders: bool,
}

impl From<&PhysicsSettings> for RaycastOptions {
    fn from(settings: &PhysicsSettings) -> Self {
        Self {
            hit_triggers: settings.raycasts_hit_triggers,
            start_in_colliders: settings.raycasts_start_in_colliders,
        }
    }
}

/// Pack cell coordinates: x in the high 32 bits, y in the low 32 bits
#[inline]
pub fn cell_key(x: i32, y: i32) -> u64 {
    ((x as u32 as u64) << 32) | (y as u32 as u64)
}

/// Collects linecast hits cell by cell
#[derive(Debug, Default)]
struct RaycastParser {
    /// Colliders already tested during this cast
    checked: FxHashSet<ColliderId>,
    /// Hits found in the current cell, sorted before being handed out
    cell_hits: Vec<RaycastHit>,
    hit_count: usize,
}

impl RaycastParser {
    fn start(&mut self) {
        self.checked.clear();
        self.cell_hits.clear();
        self.hit_count = 0;
    }

    /// Test every untested collider in `cell`, appending its hits to `hits`
    /// nearest first. Returns true once `hits` is full.
    fn check_cell<C: Collider>(
        &mut self,
        cell: &[ColliderId],
        ray: &Ray2D,
        hits: &mut [RaycastHit],
        layer_mask: u32,
        options: RaycastOptions,
        colliders: &ColliderSet<C>,
    ) -> bool {
        self.cell_hits.clear();

        for &id in cell {
            if !self.checked.insert(id) {
                continue;
            }
            let Some(collider) = colliders.get(id) else {
                continue;
            };
            if collider.is_trigger() && !options.hit_triggers {
                continue;
            }
            if collider.physics_layer() & layer_mask == 0 {
                continue;
            }

            let bounds = collider.bounds();
            if !bounds.ray_intersects(ray).is_some_and(|f| f <= 1.0) {
                continue;
            }

            if let Some(mut hit) = collider.collides_with_line(ray.start, ray.end) {
                if !options.start_in_colliders && collider.contains_point(ray.start) {
                    continue;
                }
                hit.collider = Some(id);
                self.cell_hits.push(hit);
            }
        }

        if self.cell_hits.is_empty() {
            return false;
        }

        self.cell_hits
            .sort_by(|a, b| a.distance.total_cmp(&b.distance));

        for hit in &self.cell_hits {
            hits[self.hit_count] = *hit;
            self.hit_count += 1;
            if self.hit_count == hits.len() {
                return true;
            }
        }

        false
    }
}

/// Uniform grid of collider ids
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    cells: FxHashMap<u64, Vec<ColliderId>>,
    /// Dedup set for the current broadphase
    overlap_set: FxHashSet<ColliderId>,
    /// Shared broadphase result list, cleared by every query
    results: Vec<ColliderId>,
    raycast: RaycastParser,
}

impl SpatialHash {
    /// Panics if `cell_size` isn't a positive finite number
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "spatial hash cell size must be positive, got {cell_size}"
        );

        Self {
            cell_size,
            cells: FxHashMap::default(),
            overlap_set: FxHashSet::default(),
            results: Vec::new(),
            raycast: RaycastParser::default(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position to cell coordinates: `floor(coord / cell_size)`
    #[inline]
    pub fn cell_coords(&self, x: f32, y: f32) -> IVec2 {
        IVec2::new(
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Contents of a cell, if it was ever created
    pub fn cell_at(&self, x: i32, y: i32) -> Option<&[ColliderId]> {
        self.cells.get(&cell_key(x, y)).map(Vec::as_slice)
    }

    /// Number of cells created so far (including emptied ones)
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Inclusive cell range covered by `bounds`
    fn cell_range(&self, bounds: &Rect) -> (IVec2, IVec2) {
        (
            self.cell_coords(bounds.left(), bounds.top()),
            self.cell_coords(bounds.right(), bounds.bottom()),
        )
    }

    /// Add `id` to every cell `bounds` covers
    pub fn register(&mut self, id: ColliderId, bounds: &Rect) {
        let (p1, p2) = self.cell_range(bounds);

        for x in p1.x..=p2.x {
            for y in p1.y..=p2.y {
                self.cells.entry(cell_key(x, y)).or_default().push(id);
            }
        }
    }

    /// Remove `id` from the cells `bounds` covers. Cells that don't hold
    /// it are left alone.
    pub fn remove_with_bounds(&mut self, id: ColliderId, bounds: &Rect) {
        let (p1, p2) = self.cell_range(bounds);

        for x in p1.x..=p2.x {
            for y in p1.y..=p2.y {
                if let Some(cell) = self.cells.get_mut(&cell_key(x, y))
                    && let Some(index) = cell.iter().position(|c| *c == id)
                {
                    cell.remove(index);
                }
            }
        }
    }

    /// Remove `id` from every cell. O(total cells); use when the bounds it
    /// was registered with are unknown.
    pub fn remove(&mut self, id: ColliderId) {
        for cell in self.cells.values_mut() {
            cell.retain(|c| *c != id);
        }
    }

    /// Brute-force remove, then register with the current bounds
    pub fn update(&mut self, id: ColliderId, bounds: &Rect) {
        self.remove(id);
        self.register(id, bounds);
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.overlap_set.clear();
        self.results.clear();
    }

    /// Every collider currently in the grid, deduplicated
    pub fn all_objects(&self) -> FxHashSet<ColliderId> {
        self.cells.values().flatten().copied().collect()
    }

    /// Colliders in the cells covering `bounds` whose own bounds intersect
    /// it, skipping `exclude` and anything not on a layer in `layer_mask`.
    ///
    /// The returned slice is scratch owned by the hash and is overwritten by
    /// the next query. Order is unspecified.
    pub fn aabb_broadphase<C: Collider>(
        &mut self,
        bounds: &Rect,
        exclude: Option<ColliderId>,
        layer_mask: u32,
        colliders: &ColliderSet<C>,
    ) -> &[ColliderId] {
        self.overlap_set.clear();
        self.results.clear();

        let (p1, p2) = self.cell_range(bounds);
        for x in p1.x..=p2.x {
            for y in p1.y..=p2.y {
                let Some(cell) = self.cells.get(&cell_key(x, y)) else {
                    continue;
                };

                for &id in cell {
                    if Some(id) == exclude {
                        continue;
                    }
                    let Some(collider) = colliders.get(id) else {
                        continue;
                    };
                    if collider.physics_layer() & layer_mask == 0 {
                        continue;
                    }
                    if !bounds.intersects(&collider.bounds()) {
                        continue;
                    }
                    if self.overlap_set.insert(id) {
                        self.results.push(id);
                    }
                }
            }
        }

        &self.results
    }

    /// Walk the cells the segment passes through, nearest first, filling
    /// `hits` until it is full. Returns the number of hits written; slots
    /// past that are left untouched.
    ///
    /// Hits are sorted by distance within each cell only. A collider that
    /// spans several cells is tested once, in the first cell the walk visits
    /// that holds it, so its hit can be reported ahead of a nearer hit found
    /// in a later cell. Panics if `hits` is empty.
    pub fn linecast<C: Collider>(
        &mut self,
        start: Vec2,
        end: Vec2,
        hits: &mut [RaycastHit],
        layer_mask: u32,
        options: RaycastOptions,
        colliders: &ColliderSet<C>,
    ) -> usize {
        assert!(!hits.is_empty(), "linecast needs at least one hit slot");

        let ray = Ray2D::new(start, end);
        let cell_size = self.cell_size;
        let mut current = self.cell_coords(start.x, start.y);
        let last = self.cell_coords(end.x, end.y);

        let Self { cells, raycast, .. } = self;
        raycast.start();

        let step_x = if current.x == last.x {
            0
        } else {
            step_sign(ray.direction.x)
        };
        let step_y = if current.y == last.y {
            0
        } else {
            step_sign(ray.direction.y)
        };

        // Boundary of the current cell in the direction of travel
        let next_boundary_x = (current.x as f32 + step_x.max(0) as f32) * cell_size;
        let next_boundary_y = (current.y as f32 + step_y.max(0) as f32) * cell_size;

        // An axis with no cells left to cross never wins the comparison
        let (mut t_max_x, t_delta_x) = if step_x != 0 {
            (
                (next_boundary_x - start.x) / ray.direction.x,
                cell_size / (ray.direction.x * step_x as f32),
            )
        } else {
            (f32::MAX, f32::MAX)
        };
        let (mut t_max_y, t_delta_y) = if step_y != 0 {
            (
                (next_boundary_y - start.y) / ray.direction.y,
                cell_size / (ray.direction.y * step_y as f32),
            )
        } else {
            (f32::MAX, f32::MAX)
        };

        if let Some(cell) = cells.get(&cell_key(current.x, current.y))
            && raycast.check_cell(cell, &ray, hits, layer_mask, options, colliders)
        {
            return raycast.hit_count;
        }

        // Every step moves one axis closer to `last`, so the walk is bounded
        while current != last {
            let step_along_x =
                current.y == last.y || (current.x != last.x && t_max_x < t_max_y);
            if step_along_x {
                current.x = approach(current.x, last.x, step_x.abs());
                t_max_x += t_delta_x;
            } else {
                current.y = approach(current.y, last.y, step_y.abs());
                t_max_y += t_delta_y;
            }

            if let Some(cell) = cells.get(&cell_key(current.x, current.y))
                && raycast.check_cell(cell, &ray, hits, layer_mask, options, colliders)
            {
                return raycast.hit_count;
            }
        }

        raycast.hit_count
    }

    /// Colliders whose shape overlaps `rect`, up to `results.len()`
    pub fn overlap_rectangle<C: Collider>(
        &mut self,
        rect: &Rect,
        results: &mut [ColliderId],
        layer_mask: u32,
        colliders: &ColliderSet<C>,
    ) -> usize {
        if results.is_empty() {
            return 0;
        }

        let mut count = 0;
        for &id in self.aabb_broadphase(rect, None, layer_mask, colliders) {
            let Some(collider) = colliders.get(id) else {
                continue;
            };
            if collider.overlaps_rect(rect) {
                results[count] = id;
                count += 1;
                if count == results.len() {
                    break;
                }
            }
        }
        count
    }

    /// Colliders whose shape overlaps the circle, up to `results.len()`
    pub fn overlap_circle<C: Collider>(
        &mut self,
        center: Vec2,
        radius: f32,
        results: &mut [ColliderId],
        layer_mask: u32,
        colliders: &ColliderSet<C>,
    ) -> usize {
        if results.is_empty() {
            return 0;
        }

        let bounds = Rect::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        );

        let mut count = 0;
        for &id in self.aabb_broadphase(&bounds, None, layer_mask, colliders) {
            let Some(collider) = colliders.get(id) else {
                continue;
            };
            if collider.overlaps_circle(center, radius) {
                results[count] = id;
                count += 1;
                if count == results.len() {
                    break;
                }
            }
        }
        count
    }
}

#[inline]
fn step_sign(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}
