//! Physics world configuration
//!
//! Read once when a world is built or reset. Changing the cell size only
//! takes effect on the next `PhysicsWorld::reset`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CELL_SIZE, DEFAULT_GRAVITY};

/// World-level physics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Gravity applied to rigidbodies that opt in (pixels/s², y down)
    pub gravity: Vec2,
    /// Spatial hash cell size. Roughly the size of a typical collider works
    /// best; too small and big colliders span many cells.
    pub spatial_hash_cell_size: f32,
    /// Linecasts report trigger colliders
    pub raycasts_hit_triggers: bool,
    /// Linecasts that start inside a collider report it
    pub raycasts_start_in_colliders: bool,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            spatial_hash_cell_size: DEFAULT_CELL_SIZE,
            raycasts_hit_triggers: false,
            raycasts_start_in_colliders: false,
        }
    }
}

impl PhysicsSettings {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a JSON file, falling back to defaults if it can't be read
    /// or parsed
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded physics settings from {}", path.display());
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Invalid physics settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Replace values the world can't run with by their defaults
    pub fn sanitized(mut self) -> Self {
        if !(self.spatial_hash_cell_size.is_finite() && self.spatial_hash_cell_size > 0.0) {
            log::warn!(
                "Spatial hash cell size {} is not positive, using {}",
                self.spatial_hash_cell_size,
                DEFAULT_CELL_SIZE
            );
            self.spatial_hash_cell_size = DEFAULT_CELL_SIZE;
        }

        if !self.gravity.is_finite() {
            log::warn!("Gravity {} is not finite, using {}", self.gravity, DEFAULT_GRAVITY);
            self.gravity = DEFAULT_GRAVITY;
        }

        self
    }
}
