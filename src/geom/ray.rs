use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A line segment used for raycasts. `direction` is `end - start`, so
/// fractions along it run from 0 at `start` to 1 at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray2D {
    pub start: Vec2,
    pub end: Vec2,
    pub direction: Vec2,
}

impl Ray2D {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            direction: end - start,
        }
    }

    /// Point at fraction `t` along the segment
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start + self.direction * t
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.direction.length()
    }
}
