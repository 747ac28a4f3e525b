//! Exact intersection tests between points, segments, circles and rects
//!
//! Everything here is a pure function. Degenerate input (parallel or
//! zero-length segments) is reported as "no intersection", never a panic.
//! Distance comparisons are done squared so no square roots are taken.

use bitflags::bitflags;
use glam::Vec2;

use super::rect::Rect;

bitflags! {
    /// Classification of a point against the nine regions around a rect
    /// (Cohen-Sutherland outcodes). Inside is the empty set; corners are the
    /// union of their two edges.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PointSectors: u8 {
        const TOP = 1;
        const BOTTOM = 2;
        const RIGHT = 4;
        const LEFT = 8;
        const TOP_LEFT = Self::TOP.bits() | Self::LEFT.bits();
        const TOP_RIGHT = Self::TOP.bits() | Self::RIGHT.bits();
        const BOTTOM_LEFT = Self::BOTTOM.bits() | Self::LEFT.bits();
        const BOTTOM_RIGHT = Self::BOTTOM.bits() | Self::RIGHT.bits();
    }
}

impl PointSectors {
    /// Inside the rect
    pub const CENTER: Self = Self::empty();
}

/// Classify `point` against `rect`. Points on the right/bottom edge fall
/// outside, matching the half-open containment of [`rect_to_point`].
pub fn get_sector(rect: &Rect, point: Vec2) -> PointSectors {
    let mut sector = PointSectors::CENTER;

    if point.x < rect.left() {
        sector |= PointSectors::LEFT;
    } else if point.x >= rect.right() {
        sector |= PointSectors::RIGHT;
    }

    if point.y < rect.top() {
        sector |= PointSectors::TOP;
    } else if point.y >= rect.bottom() {
        sector |= PointSectors::BOTTOM;
    }

    sector
}

/// Parameter along `a1 -> a2` where the two segments cross.
///
/// Solves the 2x2 system with cross products. Exactly parallel segments
/// (`cross == 0`, no epsilon) and parameters outside `[0, 1]` on either
/// segment return `None`.
pub fn line_to_line_fraction(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<f32> {
    let b = a2 - a1;
    let d = b2 - b1;
    let b_dot_d_perp = b.perp_dot(d);

    if b_dot_d_perp == 0.0 {
        return None;
    }

    let c = b1 - a1;
    let t = c.perp_dot(d) / b_dot_d_perp;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let u = c.perp_dot(b) / b_dot_d_perp;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(t)
}

/// Intersection point of two segments, if they cross
pub fn line_to_line_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    line_to_line_fraction(a1, a2, b1, b2).map(|t| a1 + (a2 - a1) * t)
}

#[inline]
pub fn line_to_line(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    line_to_line_fraction(a1, a2, b1, b2).is_some()
}

/// Closest point to `closest_to` on the segment `line_a -> line_b`.
/// A zero-length segment collapses to `line_a`.
pub fn closest_point_on_line(line_a: Vec2, line_b: Vec2, closest_to: Vec2) -> Vec2 {
    let v = line_b - line_a;
    let len_sq = v.length_squared();
    if len_sq == 0.0 {
        return line_a;
    }

    let t = ((closest_to - line_a).dot(v) / len_sq).clamp(0.0, 1.0);
    line_a + v * t
}

/// Strict: circles exactly `r1 + r2` apart do not collide
#[inline]
pub fn circle_to_circle(center1: Vec2, radius1: f32, center2: Vec2, radius2: f32) -> bool {
    let r = radius1 + radius2;
    center1.distance_squared(center2) < r * r
}

#[inline]
pub fn circle_to_line(center: Vec2, radius: f32, line_from: Vec2, line_to: Vec2) -> bool {
    let closest = closest_point_on_line(line_from, line_to, center);
    center.distance_squared(closest) < radius * radius
}

#[inline]
pub fn circle_to_point(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) < radius * radius
}

/// Half-open containment: `x ∈ [rx, rx + w)` and `y ∈ [ry, ry + h)`
#[inline]
pub fn rect_to_point(rect: &Rect, point: Vec2) -> bool {
    rect.contains(point)
}

/// Circle vs rect using the center's sector to pick which edges to test.
///
/// A center inside the rect is an immediate hit. Otherwise only the one
/// or two edges facing the center can be closest, so the rest are skipped.
pub fn rect_to_circle(rect: &Rect, center: Vec2, radius: f32) -> bool {
    if rect_to_point(rect, center) {
        return true;
    }

    let sector = get_sector(rect, center);
    let [top_left, top_right, bottom_right, bottom_left] = rect.corners();

    if sector.intersects(PointSectors::TOP) && circle_to_line(center, radius, top_left, top_right) {
        return true;
    }

    if sector.intersects(PointSectors::BOTTOM)
        && circle_to_line(center, radius, bottom_left, bottom_right)
    {
        return true;
    }

    if sector.intersects(PointSectors::LEFT) && circle_to_line(center, radius, top_left, bottom_left)
    {
        return true;
    }

    if sector.intersects(PointSectors::RIGHT)
        && circle_to_line(center, radius, top_right, bottom_right)
    {
        return true;
    }

    false
}

/// Segment vs rect with outcode pruning.
///
/// An endpoint inside is a hit; endpoints sharing an outside half-plane
/// can't cross the rect; otherwise only the edges named by either
/// endpoint's sector are tested.
pub fn rect_to_line(rect: &Rect, line_from: Vec2, line_to: Vec2) -> bool {
    let from_sector = get_sector(rect, line_from);
    let to_sector = get_sector(rect, line_to);

    if from_sector.is_empty() || to_sector.is_empty() {
        return true;
    }

    if from_sector.intersects(to_sector) {
        return false;
    }

    let both = from_sector | to_sector;
    let [top_left, top_right, bottom_right, bottom_left] = rect.corners();

    if both.intersects(PointSectors::TOP) && line_to_line(top_left, top_right, line_from, line_to) {
        return true;
    }

    if both.intersects(PointSectors::BOTTOM)
        && line_to_line(bottom_left, bottom_right, line_from, line_to)
    {
        return true;
    }

    if both.intersects(PointSectors::LEFT)
        && line_to_line(top_left, bottom_left, line_from, line_to)
    {
        return true;
    }

    if both.intersects(PointSectors::RIGHT)
        && line_to_line(top_right, bottom_right, line_from, line_to)
    {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_line_to_line_crossing_point() {
        let p = line_to_line_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        )
        .unwrap();
        assert!(approx(p, Vec2::new(5.0, 5.0)));

        // Off-center crossing: y = 2 line against x = 7 line
        let p = line_to_line_intersection(
            Vec2::new(0.0, 2.0),
            Vec2::new(10.0, 2.0),
            Vec2::new(7.0, -5.0),
            Vec2::new(7.0, 5.0),
        )
        .unwrap();
        assert!(approx(p, Vec2::new(7.0, 2.0)));
    }

    #[test]
    fn test_line_to_line_parallel_and_out_of_range() {
        // Parallel, not collinear
        assert!(!line_to_line(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
        ));
        // Lines would cross, segments don't reach
        assert!(!line_to_line(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(5.0, -1.0),
            Vec2::new(5.0, 1.0),
        ));
        // Zero-length segment is degenerate
        assert!(!line_to_line(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0),
        ));
    }

    #[test]
    fn test_line_to_line_fraction() {
        let t = line_to_line_fraction(
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(5.0, -1.0),
            Vec2::new(5.0, 1.0),
        )
        .unwrap();
        assert!((t - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_closest_point_on_line_clamps() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(approx(closest_point_on_line(a, b, Vec2::new(5.0, 3.0)), Vec2::new(5.0, 0.0)));
        assert!(approx(closest_point_on_line(a, b, Vec2::new(-4.0, 3.0)), a));
        assert!(approx(closest_point_on_line(a, b, Vec2::new(14.0, -3.0)), b));
        assert_eq!(closest_point_on_line(a, a, Vec2::new(3.0, 3.0)), a);
    }

    #[test]
    fn test_circle_to_circle_is_strict() {
        assert!(circle_to_circle(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        // Exactly touching
        assert!(!circle_to_circle(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circle_to_circle(Vec2::ZERO, 5.0, Vec2::new(11.0, 0.0), 5.0));
    }

    #[test]
    fn test_circle_to_line_and_point() {
        let from = Vec2::new(-10.0, 0.0);
        let to = Vec2::new(10.0, 0.0);
        assert!(circle_to_line(Vec2::new(0.0, 4.0), 5.0, from, to));
        assert!(!circle_to_line(Vec2::new(0.0, 6.0), 5.0, from, to));
        // Beyond the endpoint, distance measured to the endpoint
        assert!(!circle_to_line(Vec2::new(14.0, 4.0), 5.0, from, to));

        assert!(circle_to_point(Vec2::ZERO, 2.0, Vec2::new(1.0, 1.0)));
        assert!(!circle_to_point(Vec2::ZERO, 2.0, Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_rect_to_point_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 5.0);
        assert!(rect_to_point(&r, Vec2::new(0.0, 0.0)));
        assert!(rect_to_point(&r, Vec2::new(9.99, 4.99)));
        assert!(!rect_to_point(&r, Vec2::new(10.0, 2.0)));
        assert!(!rect_to_point(&r, Vec2::new(2.0, 5.0)));
        assert!(!rect_to_point(&r, Vec2::new(-0.01, 2.0)));
    }

    #[test]
    fn test_get_sector() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(get_sector(&r, Vec2::new(5.0, 5.0)), PointSectors::CENTER);
        assert_eq!(get_sector(&r, Vec2::new(5.0, -1.0)), PointSectors::TOP);
        assert_eq!(get_sector(&r, Vec2::new(5.0, 10.0)), PointSectors::BOTTOM);
        assert_eq!(get_sector(&r, Vec2::new(-1.0, 5.0)), PointSectors::LEFT);
        assert_eq!(get_sector(&r, Vec2::new(12.0, 5.0)), PointSectors::RIGHT);
        assert_eq!(get_sector(&r, Vec2::new(-1.0, -1.0)), PointSectors::TOP_LEFT);
        assert_eq!(get_sector(&r, Vec2::new(11.0, -1.0)), PointSectors::TOP_RIGHT);
        assert_eq!(get_sector(&r, Vec2::new(-1.0, 11.0)), PointSectors::BOTTOM_LEFT);
        assert_eq!(get_sector(&r, Vec2::new(11.0, 11.0)), PointSectors::BOTTOM_RIGHT);
        assert_eq!(PointSectors::TOP_LEFT.bits(), 9);
        assert!(get_sector(&r, Vec2::new(5.0, 5.0)).is_empty());
        assert!(PointSectors::BOTTOM_RIGHT.intersects(PointSectors::RIGHT));
        assert!(!PointSectors::TOP_LEFT.intersects(PointSectors::BOTTOM_RIGHT));
    }

    #[test]
    fn test_rect_to_circle() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Center inside
        assert!(rect_to_circle(&r, Vec2::new(5.0, 5.0), 1.0));
        // Overlapping the top edge
        assert!(rect_to_circle(&r, Vec2::new(5.0, -2.0), 3.0));
        assert!(!rect_to_circle(&r, Vec2::new(5.0, -4.0), 3.0));
        // Corner region: distance to (10, 10) is sqrt(8) ~ 2.83
        assert!(rect_to_circle(&r, Vec2::new(12.0, 12.0), 3.0));
        assert!(!rect_to_circle(&r, Vec2::new(12.0, 12.0), 2.5));
    }

    #[test]
    fn test_rect_to_line() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Endpoint inside
        assert!(rect_to_line(&r, Vec2::new(5.0, 5.0), Vec2::new(50.0, 50.0)));
        // Straight through
        assert!(rect_to_line(&r, Vec2::new(-5.0, 5.0), Vec2::new(15.0, 5.0)));
        // Both endpoints above the rect share the TOP half-plane
        assert!(!rect_to_line(&r, Vec2::new(-5.0, -1.0), Vec2::new(15.0, -3.0)));
        // Diagonal past the top-right corner without touching
        assert!(!rect_to_line(&r, Vec2::new(5.0, -10.0), Vec2::new(25.0, 5.0)));
        // Diagonal clipping the top-left corner
        assert!(rect_to_line(&r, Vec2::new(-2.0, 3.0), Vec2::new(3.0, -2.0)));
    }
}
