//! Glint math: glam re-exports, rays, and the ray intersection kernel.

// Re-export glam for convenience
pub use glam::*;

mod intersect;
mod ray;

pub use intersect::{ray_plane_intersection, ray_triangle_intersection, IntersectionResult, EPSILON};
pub use ray::Ray;
