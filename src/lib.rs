//! Arcade Physics - 2D collision detection and arcade-style physics
//!
//! Core modules:
//! - `geom`: Pure geometry (rects, rays, exact intersection tests, SAT)
//! - `physics`: Stateful world (spatial hash, colliders, rigidbodies, movers, triggers)
//! - `settings`: World configuration

pub mod geom;
pub mod physics;
pub mod settings;

pub use geom::Rect;
pub use physics::{
    ArcadeRigidbody, Collider, ColliderId, EntityId, Mover, PhysicsWorld, ProjectileMover,
    Rigidbodies, Shape, ShapeCollider,
};
pub use settings::PhysicsSettings;

/// Physics configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep used by the demo (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default gravity (pixels/s², y down)
    pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 300.0);
    /// Default spatial hash cell size
    pub const DEFAULT_CELL_SIZE: f32 = 100.0;

    /// Layer mask with every bit set
    pub const ALL_LAYERS: u32 = u32::MAX;
    /// Layer a new collider lives on
    pub const DEFAULT_PHYSICS_LAYER: u32 = 1;

    /// Multiplier that keeps impulse forces in a friendly range
    pub const IMPULSE_SCALE: f32 = 100_000.0;
    /// Bodies with mass at or below this are immovable
    pub const IMMOVABLE_MASS_EPSILON: f32 = 0.0001;

    /// Rigidbody defaults
    pub const DEFAULT_MASS: f32 = 10.0;
    pub const DEFAULT_ELASTICITY: f32 = 0.5;
    pub const DEFAULT_FRICTION: f32 = 0.5;
    /// Tangential speed² below which friction grips completely
    pub const DEFAULT_GLUE: f32 = 0.01;
    pub const MAX_GLUE: f32 = 10.0;
}

/// Step `start` toward `end` by `shift` without overshooting
#[inline]
pub fn approach(start: i32, end: i32, shift: i32) -> i32 {
    if start < end {
        (start + shift).min(end)
    } else {
        (start - shift).max(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_never_overshoots() {
        assert_eq!(approach(0, 5, 1), 1);
        assert_eq!(approach(4, 5, 3), 5);
        assert_eq!(approach(0, -5, 2), -2);
        assert_eq!(approach(-4, -5, 3), -5);
        assert_eq!(approach(3, 3, 1), 3);
    }
}
