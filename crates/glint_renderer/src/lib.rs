//! Glint Renderer - brute-force CPU ray tracing
//!
//! Casts jittered rays through a thin-lens camera, tests them against every
//! triangle of a `TriangleRegistry`, and shades the nearest hit with
//! interpolated vertex colors under a single point light.
//!
//! # Example
//!
//! ```ignore
//! use glint_renderer::{render, save_image, Camera, RenderConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let registry = glint_core::load_model("scene.glb")?;
//! let config = RenderConfig::default();
//! let camera = Camera::from_config(&config.camera, config.image_aspect());
//! let image = render(&camera, &registry, &config, &mut StdRng::seed_from_u64(1));
//! save_image(&image, "image.png")?;
//! ```

mod camera;
mod config;
mod output;
mod random;
mod renderer;

pub use camera::Camera;
pub use config::{CameraConfig, ConfigError, RenderConfig};
pub use output::{
    color_to_ppm, color_to_rgb8, save_image, save_png, save_ppm, write_png, write_ppm, Color,
    ImageBuffer, ImageError, OutputFormat,
};
pub use random::{FixedSource, SequenceSource, UniformSource};
pub use renderer::{closest_hit, ray_color, render, render_pixel, shade, Hit};

/// Re-export math types from glint_math
pub use glint_math::{DVec3, Ray, Vec3};
