//! Built-in collider shapes: boxes, circles and convex polygons
//!
//! Narrow-phase dispatch lives here. Boxes are treated as four-vertex
//! polygons for SAT, so every polygonal pair goes through the same swept
//! test and a moving collider gets its motion clipped at the surface.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collider::{Collider, EntityId, RaycastHit, ShapeCollision};
use crate::consts::{ALL_LAYERS, DEFAULT_PHYSICS_LAYER};
use crate::geom::{
    Rect, circle_to_circle, circle_to_point, line_to_line_fraction, polygon, polygon_center,
    polygon_contains_point, polygon_nearest_point, polygon_to_circle, polygon_to_polygon,
    rect_to_circle, rect_to_point,
};

/// Collider geometry in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box(Rect),
    Circle { center: Vec2, radius: f32 },
    /// Convex, vertices in winding order
    Polygon(Vec<Vec2>),
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Shape::Circle { center, radius }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Box(rect) => *rect,
            Shape::Circle { center, radius } => Rect::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            ),
            Shape::Polygon(points) => Rect::from_points(points).unwrap_or_default(),
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Box(rect) => rect.center(),
            Shape::Circle { center, .. } => *center,
            Shape::Polygon(points) => polygon_center(points),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Shape::Box(rect) => *rect = rect.translated(delta),
            Shape::Circle { center, .. } => *center += delta,
            Shape::Polygon(points) => points.iter_mut().for_each(|p| *p += delta),
        }
    }

    /// Run `f` over the outline of a polygonal shape (boxes included).
    /// Circles have no vertices and yield `None`.
    fn with_vertices<R>(&self, f: impl FnOnce(&[Vec2]) -> R) -> Option<R> {
        match self {
            Shape::Box(rect) => Some(f(&rect.corners())),
            Shape::Polygon(points) => Some(f(points)),
            Shape::Circle { .. } => None,
        }
    }

    /// Boolean overlap at current positions
    pub fn overlaps(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Box(a), Shape::Box(b)) => a.intersects(b),
            (
                Shape::Circle {
                    center: ca,
                    radius: ra,
                },
                Shape::Circle {
                    center: cb,
                    radius: rb,
                },
            ) => circle_to_circle(*ca, *ra, *cb, *rb),
            (Shape::Circle { center, radius }, poly) | (poly, Shape::Circle { center, radius }) => {
                poly.overlaps_circle(*center, *radius)
            }
            (a, b) => a
                .with_vertices(|va| {
                    b.with_vertices(|vb| polygon_to_polygon(va, vb, Vec2::ZERO).intersect)
                })
                .flatten()
                .unwrap_or(false),
        }
    }

    pub fn overlaps_rect(&self, rect: &Rect) -> bool {
        match self {
            Shape::Box(b) => b.intersects(rect),
            Shape::Circle { center, radius } => rect_to_circle(rect, *center, *radius),
            Shape::Polygon(points) => polygon_to_polygon(points, &rect.corners(), Vec2::ZERO).intersect,
        }
    }

    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        match self {
            Shape::Box(rect) => rect_to_circle(rect, center, radius),
            Shape::Circle {
                center: c,
                radius: r,
            } => circle_to_circle(*c, *r, center, radius),
            Shape::Polygon(points) => polygon_to_circle(points, center, radius),
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        match self {
            Shape::Box(rect) => rect_to_point(rect, point),
            Shape::Circle { center, radius } => circle_to_point(*center, *radius, point),
            Shape::Polygon(points) => polygon_contains_point(points, point),
        }
    }

    /// Contact for `self` moved by `motion` against `other`.
    ///
    /// The MTV pushes `self` out of `other`. For polygonal pairs the test is
    /// the swept SAT, so the MTV also removes the part of `motion` that
    /// would carry `self` into `other`. Touching (zero MTV) is not a contact.
    pub fn collides_with(&self, other: &Shape, motion: Vec2) -> Option<ShapeCollision> {
        let contact = match (self, other) {
            (
                Shape::Circle {
                    center: ca,
                    radius: ra,
                },
                Shape::Circle {
                    center: cb,
                    radius: rb,
                },
            ) => circle_circle_contact(*ca + motion, *ra, *cb, *rb),
            (Shape::Circle { center, radius }, poly) => {
                let center = *center + motion;
                poly.with_vertices(|v| polygon_circle_contact(v, center, *radius))
                    .flatten()
                    .map(|c| ShapeCollision {
                        normal: -c.normal,
                        minimum_translation_vector: -c.minimum_translation_vector,
                        point: c.point,
                    })
            }
            (poly, Shape::Circle { center, radius }) => {
                // Moving the polygon is the same as moving the circle back
                let center = *center - motion;
                poly.with_vertices(|v| polygon_circle_contact(v, center, *radius))
                    .flatten()
                    .map(|c| ShapeCollision {
                        point: c.point + motion,
                        ..c
                    })
            }
            (a, b) => a
                .with_vertices(|va| b.with_vertices(|vb| polygon_contact(va, vb, motion)))
                .flatten()
                .flatten(),
        }?;

        (contact.minimum_translation_vector != Vec2::ZERO).then_some(contact)
    }

    /// Nearest hit of the segment `start -> end`
    pub fn collides_with_line(&self, start: Vec2, end: Vec2) -> Option<RaycastHit> {
        match self {
            Shape::Circle { center, radius } => line_circle_hit(start, end, *center, *radius),
            poly => poly
                .with_vertices(|v| line_polygon_hit(start, end, v))
                .flatten(),
        }
    }
}

fn circle_circle_contact(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<ShapeCollision> {
    if !circle_to_circle(ca, ra, cb, rb) {
        return None;
    }

    let delta = ca - cb;
    let dist = delta.length();
    // Concentric circles: pick "up" in screen space
    let normal = if dist > 0.0 { delta / dist } else { Vec2::NEG_Y };

    Some(ShapeCollision {
        normal,
        minimum_translation_vector: normal * (ra + rb - dist),
        point: cb + normal * rb,
    })
}

/// Contact that pushes the polygon out of the circle
fn polygon_circle_contact(vertices: &[Vec2], center: Vec2, radius: f32) -> Option<ShapeCollision> {
    let (nearest, dist_sq, inside) = polygon_nearest_point(vertices, center)?;
    if !inside && dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let mtv = if inside {
        // Circle center is inside: carry the nearest edge past the far side
        let dir = (center - nearest).normalize_or_zero();
        if dir == Vec2::ZERO {
            (polygon_center(vertices) - center).normalize_or_zero() * radius
        } else {
            dir * (dist + radius)
        }
    } else {
        (nearest - center).normalize_or_zero() * (radius - dist)
    };

    Some(ShapeCollision {
        normal: mtv.normalize_or_zero(),
        minimum_translation_vector: mtv,
        point: nearest,
    })
}

fn polygon_contact(a: &[Vec2], b: &[Vec2], motion: Vec2) -> Option<ShapeCollision> {
    let result = polygon_to_polygon(a, b, motion);
    if !result.will_intersect {
        return None;
    }

    let mtv = result.minimum_translation_vector;
    let normal = mtv.normalize_or_zero();
    // Deepest point of A along the push direction approximates the contact
    let point = a
        .iter()
        .copied()
        .min_by(|p, q| p.dot(normal).total_cmp(&q.dot(normal)))
        .unwrap_or_default()
        + motion;

    Some(ShapeCollision {
        normal,
        minimum_translation_vector: mtv,
        point,
    })
}

fn line_polygon_hit(start: Vec2, end: Vec2, vertices: &[Vec2]) -> Option<RaycastHit> {
    let mut best: Option<(f32, Vec2)> = None;

    for (a, b) in polygon::edges(vertices) {
        let Some(t) = line_to_line_fraction(start, end, a, b) else {
            continue;
        };
        if best.is_none_or(|(best_t, _)| t < best_t) {
            let edge = b - a;
            let mut normal = Vec2::new(edge.y, -edge.x).normalize_or_zero();
            if normal.dot(start - a) < 0.0 {
                normal = -normal;
            }
            best = Some((t, normal));
        }
    }

    let (fraction, normal) = best?;
    let point = start + (end - start) * fraction;
    Some(RaycastHit {
        collider: None,
        fraction,
        distance: start.distance(point),
        point,
        normal,
        centroid: point,
    })
}

fn line_circle_hit(start: Vec2, end: Vec2, center: Vec2, radius: f32) -> Option<RaycastHit> {
    let length = start.distance(end);
    if length == 0.0 {
        return None;
    }

    let d = (end - start) / length;
    let m = start - center;
    let b = m.dot(d);
    let c = m.dot(m) - radius * radius;

    // Starting outside and pointing away
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let distance = (-b - discriminant.sqrt()).max(0.0);
    if distance > length {
        return None;
    }

    let point = start + d * distance;
    Some(RaycastHit {
        collider: None,
        fraction: distance / length,
        distance,
        point,
        normal: (point - center).normalize_or_zero(),
        centroid: point,
    })
}

/// A [`Collider`] backed by a [`Shape`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeCollider {
    pub entity: EntityId,
    pub shape: Shape,
    pub physics_layer: u32,
    pub collides_with_layers: u32,
    pub is_trigger: bool,
}

impl ShapeCollider {
    pub fn new(entity: EntityId, shape: Shape) -> Self {
        Self {
            entity,
            shape,
            physics_layer: DEFAULT_PHYSICS_LAYER,
            collides_with_layers: ALL_LAYERS,
            is_trigger: false,
        }
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.physics_layer = layer;
        self
    }

    pub fn with_collides_with(mut self, mask: u32) -> Self {
        self.collides_with_layers = mask;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

impl Collider for ShapeCollider {
    fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    fn physics_layer(&self) -> u32 {
        self.physics_layer
    }

    fn collides_with_layers(&self) -> u32 {
        self.collides_with_layers
    }

    fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    fn entity(&self) -> EntityId {
        self.entity
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.shape.overlaps(&other.shape)
    }

    fn collides_with(&self, other: &Self, motion: Vec2) -> Option<ShapeCollision> {
        self.shape.collides_with(&other.shape, motion)
    }

    fn collides_with_line(&self, start: Vec2, end: Vec2) -> Option<RaycastHit> {
        self.shape.collides_with_line(start, end)
    }

    fn overlaps_rect(&self, rect: &Rect) -> bool {
        self.shape.overlaps_rect(rect)
    }

    fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        self.shape.overlaps_circle(center, radius)
    }

    fn contains_point(&self, point: Vec2) -> bool {
        self.shape.contains_point(point)
    }

    fn translate(&mut self, delta: Vec2) {
        self.shape.translate(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_bounds() {
        assert_eq!(
            Shape::circle(Vec2::new(5.0, 5.0), 2.0).bounds(),
            Rect::new(3.0, 3.0, 4.0, 4.0)
        );
        let tri = Shape::Polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 1.0),
            Vec2::new(1.0, 6.0),
        ]);
        assert_eq!(tri.bounds(), Rect::new(0.0, 0.0, 4.0, 6.0));
    }

    #[test]
    fn test_translate() {
        let mut shape = Shape::Polygon(vec![Vec2::ZERO, Vec2::X, Vec2::Y]);
        shape.translate(Vec2::new(2.0, 3.0));
        assert_eq!(shape.bounds(), Rect::new(2.0, 3.0, 1.0, 1.0));
    }

    #[test]
    fn test_box_box_contact_pushes_self_out() {
        let a = Shape::Box(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = Shape::Box(Rect::new(8.0, 0.0, 10.0, 10.0));

        let contact = a.collides_with(&b, Vec2::ZERO).unwrap();
        assert!(approx(contact.minimum_translation_vector, Vec2::new(-2.0, 0.0)));
        assert!(approx(contact.normal, Vec2::new(-1.0, 0.0)));
    }

    #[test]
    fn test_box_box_swept_contact_clips_motion() {
        let a = Shape::Box(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = Shape::Box(Rect::new(15.0, 0.0, 10.0, 10.0));
        let motion = Vec2::new(8.0, 0.0);

        let contact = a.collides_with(&b, motion).unwrap();
        let clipped = motion + contact.minimum_translation_vector;
        assert!(approx(clipped, Vec2::new(5.0, 0.0)), "clipped = {clipped}");

        assert!(a.collides_with(&b, Vec2::new(4.0, 0.0)).is_none());
    }

    #[test]
    fn test_touching_is_not_contact() {
        let a = Shape::Box(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = Shape::Box(Rect::new(10.0, 0.0, 10.0, 10.0));
        assert!(a.collides_with(&b, Vec2::ZERO).is_none());
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_circle_circle_contact() {
        let a = Shape::circle(Vec2::ZERO, 5.0);
        let b = Shape::circle(Vec2::new(8.0, 0.0), 5.0);

        let contact = a.collides_with(&b, Vec2::ZERO).unwrap();
        assert!(approx(contact.minimum_translation_vector, Vec2::new(-2.0, 0.0)));

        // Reversed order flips the push
        let contact = b.collides_with(&a, Vec2::ZERO).unwrap();
        assert!(approx(contact.minimum_translation_vector, Vec2::new(2.0, 0.0)));

        assert!(a.collides_with(&b, Vec2::new(-5.0, 0.0)).is_none());
    }

    #[test]
    fn test_circle_box_contact_both_orders() {
        let floor = Shape::Box(Rect::new(0.0, 10.0, 100.0, 10.0));
        // Ball sinking 2 units into the floor top
        let ball = Shape::circle(Vec2::new(50.0, 7.0), 5.0);

        let contact = ball.collides_with(&floor, Vec2::ZERO).unwrap();
        assert!(approx(contact.minimum_translation_vector, Vec2::new(0.0, -2.0)));

        let contact = floor.collides_with(&ball, Vec2::ZERO).unwrap();
        assert!(approx(contact.minimum_translation_vector, Vec2::new(0.0, 2.0)));

        // Motion carries the ball into the floor
        let hovering = Shape::circle(Vec2::new(50.0, 0.0), 5.0);
        assert!(hovering.collides_with(&floor, Vec2::ZERO).is_none());
        assert!(hovering.collides_with(&floor, Vec2::new(0.0, 8.0)).is_some());
    }

    #[test]
    fn test_overlap_queries() {
        let tri = Shape::Polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
        ]);
        assert!(tri.overlaps_rect(&Rect::new(1.0, 1.0, 2.0, 2.0)));
        assert!(!tri.overlaps_rect(&Rect::new(8.0, 8.0, 2.0, 2.0)));
        assert!(tri.overlaps_circle(Vec2::new(-1.0, 5.0), 2.0));
        assert!(!tri.overlaps_circle(Vec2::new(-5.0, 5.0), 2.0));

        let ball = Shape::circle(Vec2::new(2.0, 2.0), 1.0);
        assert!(ball.overlaps(&tri));
        assert!(tri.overlaps(&ball));
    }

    #[test]
    fn test_contains_point_uses_shape_not_bounds() {
        // Bounds corners lie outside both the circle and the triangle
        let ball = Shape::circle(Vec2::new(50.0, 50.0), 10.0);
        assert!(ball.contains_point(Vec2::new(48.0, 50.0)));
        assert!(!ball.contains_point(Vec2::new(41.0, 41.0)));
        assert!(ball.bounds().contains(Vec2::new(41.0, 41.0)));

        let tri = Shape::Polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
        ]);
        assert!(tri.contains_point(Vec2::new(2.0, 2.0)));
        assert!(!tri.contains_point(Vec2::new(8.0, 8.0)));

        let block = Shape::Box(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(block.contains_point(Vec2::new(5.0, 5.0)));
        assert!(!block.contains_point(Vec2::new(15.0, 5.0)));
    }

    #[test]
    fn test_line_hits_nearest_box_edge() {
        let b = Shape::Box(Rect::new(10.0, -5.0, 10.0, 10.0));
        let hit = b
            .collides_with_line(Vec2::ZERO, Vec2::new(40.0, 0.0))
            .unwrap();
        assert!((hit.fraction - 0.25).abs() < 1e-5);
        assert!((hit.distance - 10.0).abs() < 1e-4);
        assert!(approx(hit.point, Vec2::new(10.0, 0.0)));
        assert!(approx(hit.normal, Vec2::new(-1.0, 0.0)));

        assert!(b
            .collides_with_line(Vec2::new(0.0, 20.0), Vec2::new(40.0, 20.0))
            .is_none());
    }

    #[test]
    fn test_line_hits_circle() {
        let c = Shape::circle(Vec2::new(10.0, 0.0), 2.0);
        let hit = c
            .collides_with_line(Vec2::ZERO, Vec2::new(20.0, 0.0))
            .unwrap();
        assert!((hit.distance - 8.0).abs() < 1e-4);
        assert!((hit.fraction - 0.4).abs() < 1e-5);
        assert!(approx(hit.normal, Vec2::new(-1.0, 0.0)));

        // Segment stops short of the circle
        assert!(c.collides_with_line(Vec2::ZERO, Vec2::new(5.0, 0.0)).is_none());
        // Pointing away
        assert!(c.collides_with_line(Vec2::ZERO, Vec2::new(-20.0, 0.0)).is_none());
    }
}
