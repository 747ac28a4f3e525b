//! Convex polygon tests: segment, circle, and SAT polygon-vs-polygon
//!
//! Polygons are plain vertex slices in winding order; the closing edge from
//! the last vertex back to the first is implied.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collisions::{circle_to_point, closest_point_on_line, line_to_line};

/// Output of [`polygon_to_polygon`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolygonCollisionResult {
    /// Polygons overlap at their current positions
    pub intersect: bool,
    /// Polygons overlap once A is moved by the velocity
    pub will_intersect: bool,
    /// Push to apply to A to separate it from B (points from B toward A).
    /// Zero unless `will_intersect`.
    pub minimum_translation_vector: Vec2,
}

/// Iterate `(start, end)` for every edge including the closing one
pub fn edges(vertices: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

/// Average of the vertices
pub fn polygon_center(vertices: &[Vec2]) -> Vec2 {
    if vertices.is_empty() {
        return Vec2::ZERO;
    }
    vertices.iter().copied().sum::<Vec2>() / vertices.len() as f32
}

/// Crossing-number containment test
pub fn polygon_contains_point(vertices: &[Vec2], point: Vec2) -> bool {
    let mut inside = false;
    for (a, b) in edges(vertices) {
        if crosses_ray(a, b, point) {
            inside = !inside;
        }
    }
    inside
}

/// Whether the edge `a -> b` crosses the horizontal ray cast to +x from `p`
#[inline]
fn crosses_ray(a: Vec2, b: Vec2, p: Vec2) -> bool {
    (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
}

/// Brute-force segment test against every edge
pub fn polygon_to_line(vertices: &[Vec2], line_from: Vec2, line_to: Vec2) -> bool {
    edges(vertices).any(|(a, b)| line_to_line(a, b, line_from, line_to))
}

/// Circle vs convex polygon in one pass over the edges.
///
/// Returns as soon as a vertex lies inside the circle or an edge passes
/// within the radius. If neither happens the circle can only collide by
/// being fully contained, which the crossing flag accumulated along the
/// way answers.
pub fn polygon_to_circle(vertices: &[Vec2], center: Vec2, radius: f32) -> bool {
    let radius_sq = radius * radius;
    let mut inside = false;

    for (a, b) in edges(vertices) {
        if circle_to_point(center, radius, a) {
            return true;
        }

        if crosses_ray(a, b, center) {
            inside = !inside;
        }

        let closest = closest_point_on_line(a, b, center);
        if center.distance_squared(closest) < radius_sq {
            return true;
        }
    }

    inside
}

/// Nearest point on the polygon outline to `point`, its squared distance,
/// and whether `point` is inside. `None` for an empty polygon.
pub fn polygon_nearest_point(vertices: &[Vec2], point: Vec2) -> Option<(Vec2, f32, bool)> {
    let mut best: Option<(Vec2, f32)> = None;
    let mut inside = false;

    for (a, b) in edges(vertices) {
        if crosses_ray(a, b, point) {
            inside = !inside;
        }

        let closest = closest_point_on_line(a, b, point);
        let dist_sq = point.distance_squared(closest);
        match best {
            Some((_, best_sq)) if dist_sq >= best_sq => {}
            _ => best = Some((closest, dist_sq)),
        }
    }

    best.map(|(nearest, dist_sq)| (nearest, dist_sq, inside))
}

/// Projection interval of the polygon on `axis`
fn project(axis: Vec2, vertices: &[Vec2]) -> (f32, f32) {
    vertices.iter().fold((f32::MAX, f32::MIN), |(min, max), v| {
        let d = axis.dot(*v);
        (min.min(d), max.max(d))
    })
}

/// Gap between two intervals; negative means they overlap by that much
#[inline]
fn interval_distance(min_a: f32, max_a: f32, min_b: f32, max_b: f32) -> f32 {
    if min_a < min_b {
        min_b - max_a
    } else {
        min_a - max_b
    }
}

/// Separating Axis Theorem with swept prediction.
///
/// Every edge normal of both polygons is a candidate axis. `intersect`
/// drops on the first axis where the raw projections are disjoint,
/// `will_intersect` on the first axis where A's projection, stretched by
/// `velocity`, is disjoint from B's. The axis with the smallest overlap
/// becomes the MTV, flipped to point from B toward A. Zero-length edges
/// contribute no axis; polygons with no usable axis never intersect.
pub fn polygon_to_polygon(a: &[Vec2], b: &[Vec2], velocity: Vec2) -> PolygonCollisionResult {
    let mut result = PolygonCollisionResult {
        intersect: true,
        will_intersect: true,
        minimum_translation_vector: Vec2::ZERO,
    };

    let mut min_interval_distance = f32::INFINITY;
    let mut translation_axis = Vec2::ZERO;
    let mut tested_axes = 0usize;
    let center_delta = polygon_center(a) - polygon_center(b);

    for (from, to) in edges(a).chain(edges(b)) {
        let edge = to - from;
        let axis = Vec2::new(-edge.y, edge.x).normalize_or_zero();
        if axis == Vec2::ZERO {
            continue;
        }
        tested_axes += 1;

        let (mut min_a, mut max_a) = project(axis, a);
        let (min_b, max_b) = project(axis, b);

        if interval_distance(min_a, max_a, min_b, max_b) > 0.0 {
            result.intersect = false;
        }

        let velocity_projection = axis.dot(velocity);
        if velocity_projection < 0.0 {
            min_a += velocity_projection;
        } else {
            max_a += velocity_projection;
        }

        let distance = interval_distance(min_a, max_a, min_b, max_b);
        if distance > 0.0 {
            result.will_intersect = false;
        }

        if !result.intersect && !result.will_intersect {
            break;
        }

        let distance = distance.abs();
        if distance < min_interval_distance {
            min_interval_distance = distance;
            translation_axis = if center_delta.dot(axis) < 0.0 {
                -axis
            } else {
                axis
            };
        }
    }

    if tested_axes == 0 {
        return PolygonCollisionResult::default();
    }

    if result.will_intersect {
        result.minimum_translation_vector = translation_axis * min_interval_distance;
    }

    result
}
