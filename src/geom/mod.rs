//! Pure geometry: bounds, rays, and exact intersection tests
//!
//! Nothing in here holds state. The physics world builds its broadphase and
//! narrow-phase on top of these functions.

pub mod collisions;
pub mod polygon;
pub mod ray;
pub mod rect;

pub use collisions::{
    PointSectors, circle_to_circle, circle_to_line, circle_to_point, closest_point_on_line,
    get_sector, line_to_line, line_to_line_fraction, line_to_line_intersection, rect_to_circle,
    rect_to_line, rect_to_point,
};
pub use polygon::{
    PolygonCollisionResult, polygon_center, polygon_contains_point, polygon_nearest_point,
    polygon_to_circle, polygon_to_line, polygon_to_polygon,
};
pub use ray::Ray2D;
pub use rect::Rect;
