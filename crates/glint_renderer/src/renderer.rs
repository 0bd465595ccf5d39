//! Brute-force sampling and shading.
//!
//! Every sample ray is tested against every triangle in the registry. The
//! nearest hit is shaded with a half-Lambert term from a single point light;
//! misses contribute black.

use std::time::Instant;

use glint_core::TriangleRegistry;
use glint_math::{ray_triangle_intersection, DVec3, IntersectionResult, Ray};

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::output::{Color, ImageBuffer};
use crate::random::UniformSource;

/// The nearest intersection along a ray.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Index into the registry's triangle list
    pub triangle: usize,
    pub intersection: IntersectionResult,
}

/// Find the nearest triangle hit along `ray`.
///
/// Hits are ranked by ray parameter `t`; on a tie the earlier triangle wins.
pub fn closest_hit(ray: &Ray, registry: &TriangleRegistry) -> Option<Hit> {
    let mut closest: Option<Hit> = None;

    for index in 0..registry.triangle_count() {
        let [a, b, c] = registry.triangle_positions(index);
        let result = ray_triangle_intersection(ray, a.as_dvec3(), b.as_dvec3(), c.as_dvec3());

        if result.hit && closest.map_or(true, |c| result.t < c.intersection.t) {
            closest = Some(Hit {
                triangle: index,
                intersection: result,
            });
        }
    }

    closest
}

/// Shade a hit: interpolated vertex color times a half-Lambert light term.
pub fn shade(registry: &TriangleRegistry, hit: &Hit, light: DVec3) -> Color {
    let triangle = registry.triangles()[hit.triangle];
    let corners = [triangle.x as usize, triangle.y as usize, triangle.z as usize];
    let weights = hit.intersection.barycentric.as_vec3().to_array();

    let mut albedo = Color::ZERO;
    let mut normal = glint_math::Vec3::ZERO;
    for (&vertex, weight) in corners.iter().zip(weights) {
        albedo += registry.colors()[vertex].truncate() * weight;
        normal += registry.normals()[vertex] * weight;
    }
    let normal = normal.as_dvec3().normalize_or_zero();

    let to_light = (light - hit.intersection.position).normalize_or_zero();
    let light_factor = (to_light.dot(normal) / 2.0 + 0.5) as f32;

    albedo * light_factor
}

/// Color seen along one ray.
pub fn ray_color(ray: &Ray, registry: &TriangleRegistry, light: DVec3) -> Color {
    match closest_hit(ray, registry) {
        Some(hit) => shade(registry, &hit, light),
        None => Color::ZERO,
    }
}

/// Divisor that maps pixel coordinates onto `[0, 1]`.
///
/// A one-pixel-wide dimension would otherwise divide by zero.
fn normalizer(extent: u32) -> f64 {
    extent.saturating_sub(1).max(1) as f64
}

/// Render a single pixel with jittered multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    registry: &TriangleRegistry,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn UniformSource,
) -> Color {
    let width = normalizer(config.width);
    let height = normalizer(config.height);
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        let u = (x as f64 + rng.next_f64()) / width;
        let v = (y as f64 + rng.next_f64()) / height;
        let ray = camera.get_ray(u, v, rng);
        pixel_color += ray_color(&ray, registry, config.light);
    }

    pixel_color / config.samples_per_pixel.max(1) as f32
}

/// Render the registry to an image buffer, one row at a time.
pub fn render(
    camera: &Camera,
    registry: &TriangleRegistry,
    config: &RenderConfig,
    rng: &mut dyn UniformSource,
) -> ImageBuffer {
    if registry.is_empty() {
        log::warn!("Rendering an empty triangle registry; the image will be black");
    }

    log::info!(
        "Rendering {}x{} at {} spp against {} triangles",
        config.width,
        config.height,
        config.samples_per_pixel,
        registry.triangle_count()
    );

    let start = Instant::now();
    let mut image = ImageBuffer::new(config.width, config.height);

    for y in 0..config.height {
        for x in 0..config.width {
            let color = render_pixel(camera, registry, x, y, config, rng);
            image.set(x, y, color);
        }
        log::debug!("Row {}/{} done", y + 1, config.height);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());

    image
}
