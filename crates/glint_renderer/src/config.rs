//! Render settings.
//!
//! Settings files are JSON; every field is optional and falls back to the
//! defaults below.
//!
//! ```json
//! {
//!   "width": 640,
//!   "height": 360,
//!   "samplesPerPixel": 4,
//!   "light": [2.0, 4.0, -4.0],
//!   "camera": { "lookFrom": [10.0, 2.0, 3.0], "aperture": 0.0 }
//! }
//! ```

use std::path::Path;

use glint_math::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors in render settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image size {width}x{height} has a zero dimension")]
    ZeroDimension { width: u32, height: u32 },

    #[error("Samples per pixel must be at least 1")]
    NoSamples,

    #[error("Focus distance must be positive, got {0}")]
    NonPositiveFocus(f64),

    #[error("Aperture must not be negative, got {0}")]
    NegativeAperture(f64),

    #[error("Aspect ratio must be positive, got {0}")]
    NonPositiveAspect(f64),

    #[error("Field of view must be between 0 and 180 degrees, got {0}")]
    FieldOfView(f64),

    #[error("Setting '{0}' is not a finite number")]
    NonFinite(&'static str),

    #[error("Camera looks at its own position or along its up vector")]
    DegenerateView,
}

/// Camera placement and lens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub look_from: DVec3,
    pub look_at: DVec3,
    pub vup: DVec3,
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Lens diameter; 0 is a pinhole
    pub aperture: f64,
    /// Distance to the plane of focus; defaults to `|look_from|`
    pub focus_dist: Option<f64>,
    /// Viewport aspect ratio; defaults to the image aspect ratio
    pub aspect_ratio: Option<f64>,
}

impl CameraConfig {
    pub fn focus_distance(&self) -> f64 {
        self.focus_dist.unwrap_or_else(|| self.look_from.length())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: DVec3::new(10.0, 2.0, 3.0),
            look_at: DVec3::new(0.0, 0.0, 1.0),
            vup: DVec3::Y,
            vfov: 60.0,
            aperture: 0.1,
            focus_dist: None,
            aspect_ratio: None,
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    /// Point light position
    pub light: DVec3,
    pub camera: CameraConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            samples_per_pixel: 10,
            light: DVec3::new(2.0, 4.0, -4.0),
            camera: CameraConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Parse settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Image aspect ratio (width / height).
    pub fn image_aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::NoSamples);
        }

        let camera = &self.camera;
        let vectors = [
            ("light", self.light),
            ("camera.lookFrom", camera.look_from),
            ("camera.lookAt", camera.look_at),
            ("camera.vup", camera.vup),
        ];
        for (name, value) in vectors {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        let scalars = [
            ("camera.vfov", Some(camera.vfov)),
            ("camera.aperture", Some(camera.aperture)),
            ("camera.focusDist", camera.focus_dist),
            ("camera.aspectRatio", camera.aspect_ratio),
        ];
        for (name, value) in scalars {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(ConfigError::NonFinite(name));
            }
        }

        if camera.vfov <= 0.0 || camera.vfov >= 180.0 {
            return Err(ConfigError::FieldOfView(camera.vfov));
        }
        if camera.aperture < 0.0 {
            return Err(ConfigError::NegativeAperture(camera.aperture));
        }
        let focus = camera.focus_distance();
        if focus <= 0.0 {
            return Err(ConfigError::NonPositiveFocus(focus));
        }
        if let Some(aspect) = camera.aspect_ratio.filter(|&a| a <= 0.0) {
            return Err(ConfigError::NonPositiveAspect(aspect));
        }

        let view = camera.look_from - camera.look_at;
        if view.length_squared() == 0.0 || camera.vup.cross(view).length_squared() == 0.0 {
            return Err(ConfigError::DegenerateView);
        }

        Ok(())
    }
}
