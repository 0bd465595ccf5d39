//! Thin-lens camera for ray generation.

use glint_math::{DVec2, DVec3, Ray};

use crate::config::CameraConfig;
use crate::random::UniformSource;

/// A thin-lens camera. Immutable once built.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: DVec3,
    upper_left: DVec3,
    horizontal: DVec3,
    vertical: DVec3,
    u: DVec3,
    v: DVec3,
    lens_radius: f64,
}

impl Camera {
    /// Build a camera.
    ///
    /// `vfov` is the vertical field of view in degrees and `aperture` the
    /// lens diameter. The viewport is placed `focus_dist` in front of the
    /// lens, so geometry at that distance is in perfect focus.
    pub fn new(
        look_from: DVec3,
        look_at: DVec3,
        vup: DVec3,
        vfov: f64,
        aspect_ratio: f64,
        aperture: f64,
        focus_dist: f64,
    ) -> Self {
        let theta = vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        // Camera basis
        let w = (look_from - look_at).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = look_from;
        let horizontal = focus_dist * viewport_width * u;
        let vertical = focus_dist * viewport_height * v;
        let upper_left = origin - horizontal / 2.0 + vertical / 2.0 - focus_dist * w;

        Self {
            origin,
            upper_left,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: aperture / 2.0,
        }
    }

    /// Build a camera from settings and the image aspect ratio.
    pub fn from_config(config: &CameraConfig, image_aspect: f64) -> Self {
        Self::new(
            config.look_from,
            config.look_at,
            config.vup,
            config.vfov,
            config.aspect_ratio.unwrap_or(image_aspect),
            config.aperture,
            config.focus_distance(),
        )
    }

    /// Ray through normalized viewport coordinates.
    ///
    /// `(0, 0)` is the upper-left corner of the viewport and `(1, 1)` the
    /// lower-right. With a non-zero aperture the origin is jittered across
    /// the lens; the returned direction is not normalized.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn UniformSource) -> Ray {
        let offset = if self.lens_radius <= 0.0 {
            DVec3::ZERO
        } else {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        };

        Ray::new(
            self.origin + offset,
            self.upper_left + s * self.horizontal - t * self.vertical - self.origin - offset,
        )
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn lens_radius(&self) -> f64 {
        self.lens_radius
    }
}

/// Rejection-sample a point strictly inside the unit disk.
fn random_in_unit_disk(rng: &mut dyn UniformSource) -> DVec2 {
    loop {
        let p = DVec2::new(rng.next_range(-1.0, 1.0), rng.next_range(-1.0, 1.0));
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
