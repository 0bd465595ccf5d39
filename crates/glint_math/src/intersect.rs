//! Ray/plane and ray/triangle intersection.
//!
//! Parallel and degenerate configurations are ordinary misses, never errors.

use crate::{DVec3, Ray};

/// Tolerance for the parallel test and the minimum accepted ray parameter.
pub const EPSILON: f64 = 1e-7;

/// Outcome of a ray/triangle test.
///
/// `normal` is the unit face normal of the triangle as wound (A, B, C) and is
/// filled in even on a miss. `barycentric` holds the weights of A, B and C in
/// that order; it and `position` are zero when `hit` is false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionResult {
    pub hit: bool,
    pub normal: DVec3,
    pub position: DVec3,
    pub barycentric: DVec3,
    /// Ray parameter of the hit (0 on a miss)
    pub t: f64,
}

impl IntersectionResult {
    /// A miss that still reports the triangle's face normal.
    pub fn miss(normal: DVec3) -> Self {
        Self {
            hit: false,
            normal,
            position: DVec3::ZERO,
            barycentric: DVec3::ZERO,
            t: 0.0,
        }
    }
}

/// Intersect a ray with the plane `normal · p = offset`.
///
/// Returns `None` only when the ray is exactly parallel to the plane
/// (`normal · direction == 0`). The returned parameter may be negative, since
/// this is a line/plane test.
pub fn ray_plane_intersection(ray: &Ray, normal: DVec3, offset: f64) -> Option<f64> {
    let nd = normal.dot(ray.direction());
    if nd == 0.0 {
        return None;
    }

    let np = normal.dot(ray.origin());
    Some((offset - np) / nd)
}

/// Möller-Trumbore ray-triangle intersection.
///
/// Both windings are accepted. Only hits with `t > EPSILON` count, so
/// intersections behind or exactly at the ray origin are rejected.
pub fn ray_triangle_intersection(ray: &Ray, a: DVec3, b: DVec3, c: DVec3) -> IntersectionResult {
    let edge1 = b - a;
    let edge2 = c - a;
    let face = edge1.cross(edge2);
    let normal = face.normalize_or_zero();

    let h = ray.direction().cross(edge2);
    let det = edge1.dot(h);

    // Ray is parallel to the triangle (or the triangle is degenerate)
    if det.abs() < EPSILON {
        return IntersectionResult::miss(normal);
    }

    let f = 1.0 / det;
    let s = ray.origin() - a;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return IntersectionResult::miss(normal);
    }

    let q = s.cross(edge1);
    let v = f * ray.direction().dot(q);
    if v < 0.0 || u + v > 1.0 {
        return IntersectionResult::miss(normal);
    }

    let t = f * edge2.dot(q);
    if t <= EPSILON {
        // Line intersection, but not a ray intersection
        return IntersectionResult::miss(normal);
    }

    let position = ray.at(t);

    // Sub-triangle areas projected on the face normal. The area opposite a
    // vertex is that vertex's weight.
    let opposite_c = (b - a).cross(position - a);
    let opposite_a = (c - b).cross(position - b);
    let opposite_b = (a - c).cross(position - c);
    let denominator = face.dot(normal);

    let barycentric = DVec3::new(
        opposite_a.dot(normal) / denominator,
        opposite_b.dot(normal) / denominator,
        opposite_c.dot(normal) / denominator,
    );

    IntersectionResult {
        hit: true,
        normal,
        position,
        barycentric,
        t,
    }
}
