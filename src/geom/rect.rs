//! Axis-aligned rectangle used for collider bounds and broadphase queries
//!
//! Uses screen-space orientation: `y` grows downward, so `top` is the
//! smaller `y` and `bottom` the larger.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ray::Ray2D;

/// An axis-aligned rectangle stored as location + size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rect spanning two corners (in any order)
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Smallest rect containing every point, or `None` for an empty slice
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self::from_corners(min, max))
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn location(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Top-left corner
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.location()
    }

    /// Bottom-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Corners in clockwise order (screen space), starting top-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left(), self.top()),
            Vec2::new(self.right(), self.top()),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.left(), self.bottom()),
        ]
    }

    /// Half-open containment: the right and bottom edges are outside
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.y >= self.y && point.x < self.right() && point.y < self.bottom()
    }

    /// Strict overlap test; rects that only share an edge don't intersect
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        other.left() < self.right()
            && self.left() < other.right()
            && other.top() < self.bottom()
            && self.top() < other.bottom()
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Smallest rect containing both
    pub fn union(&self, other: &Rect) -> Self {
        Self::from_corners(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Bounds covering this rect both before and after moving by `delta`
    pub fn swept_broadphase_bounds(&self, delta: Vec2) -> Self {
        Self {
            x: if delta.x > 0.0 { self.x } else { self.x + delta.x },
            y: if delta.y > 0.0 { self.y } else { self.y + delta.y },
            width: if delta.x > 0.0 {
                delta.x + self.width
            } else {
                self.width - delta.x
            },
            height: if delta.y > 0.0 {
                delta.y + self.height
            } else {
                self.height - delta.y
            },
        }
    }

    /// Slab test against a ray. Returns the entry fraction along
    /// `ray.direction` (0 when the ray starts inside), or `None` on a miss.
    ///
    /// The fraction is not clamped to 1; callers treating the ray as a
    /// segment must reject fractions above 1 themselves.
    pub fn ray_intersects(&self, ray: &Ray2D) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::MAX;

        for (start, dir, lo, hi) in [
            (ray.start.x, ray.direction.x, self.left(), self.right()),
            (ray.start.y, ray.direction.y, self.top(), self.bottom()),
        ] {
            if dir.abs() < 1e-6 {
                if start < lo || start > hi {
                    return None;
                }
            } else {
                let inv = 1.0 / dir;
                let mut near = (lo - start) * inv;
                let mut far = (hi - start) * inv;
                if near > far {
                    std::mem::swap(&mut near, &mut far);
                }
                t_min = t_min.max(near);
                t_max = t_max.min(far);
                if t_min > t_max {
                    return None;
                }
            }
        }

        Some(t_min)
    }
}
