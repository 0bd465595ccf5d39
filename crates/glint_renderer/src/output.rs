//! Render output: the pixel buffer and its two file encodings.
//!
//! - PNG: 8-bit RGB, rows top to bottom, columns left to right
//! - PPM (ASCII `P3`): rows top to bottom, columns right to left
//!
//! The PPM column order is part of the format contract and is kept as is.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use glint_math::Vec3;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use thiserror::Error;

/// Linear RGB color.
pub type Color = Vec3;

/// Highest channel value before scaling to 8 bits.
const CHANNEL_MAX: f32 = 0.999;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Unsupported output format '{0}' (expected .png or .ppm)")]
    UnsupportedFormat(String),
}

/// File encodings the renderer can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Ppm,
}

impl OutputFormat {
    /// Choose a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ImageError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("png") => Ok(Self::Png),
            Some("ppm") => Ok(Self::Ppm),
            _ => Err(ImageError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Row-major image buffer, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// 8-bit RGB bytes, left to right.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }
}

/// Scale a channel into 8 bits: clamp to `[0, 0.999]`, multiply, truncate.
#[inline]
fn quantize(channel: f32, scale: f32) -> u8 {
    // NaN clamps to NaN, which `as` saturates to 0
    (channel.clamp(0.0, CHANNEL_MAX) * scale) as u8
}

/// Convert a color to 8-bit RGB as stored in PNG output.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    [
        quantize(color.x, 255.0),
        quantize(color.y, 255.0),
        quantize(color.z, 255.0),
    ]
}

/// Convert a color to the integer triple written to PPM output.
pub fn color_to_ppm(color: Color) -> [u8; 3] {
    [
        quantize(color.x, 256.0),
        quantize(color.y, 256.0),
        quantize(color.z, 256.0),
    ]
}

/// Write an ASCII `P3` PPM, each row emitted right to left.
pub fn write_ppm<W: Write>(image: &ImageBuffer, writer: &mut W) -> std::io::Result<()> {
    write!(writer, "P3\n{} {}\n255\n", image.width, image.height)?;

    for y in 0..image.height {
        for (i, x) in (0..image.width).rev().enumerate() {
            let [r, g, b] = color_to_ppm(image.get(x, y));
            if i > 0 {
                writer.write_all(b" ")?;
            }
            write!(writer, "{r} {g} {b}")?;
        }
        writer.write_all(b"\n")?;
    }

    Ok(())
}

/// Encode an 8-bit RGB PNG.
pub fn write_png<W: Write>(image: &ImageBuffer, writer: W) -> Result<(), ImageError> {
    PngEncoder::new(writer).write_image(
        &image.to_rgb8(),
        image.width,
        image.height,
        ColorType::Rgb8,
    )?;
    Ok(())
}

pub fn save_ppm<P: AsRef<Path>>(image: &ImageBuffer, path: P) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_ppm(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn save_png<P: AsRef<Path>>(image: &ImageBuffer, path: P) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_png(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Save in the format implied by the file extension.
pub fn save_image<P: AsRef<Path>>(image: &ImageBuffer, path: P) -> Result<OutputFormat, ImageError> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)?;

    match format {
        OutputFormat::Png => save_png(image, path)?,
        OutputFormat::Ppm => save_ppm(image, path)?,
    }

    log::info!(
        "Wrote {}x{} image to {}",
        image.width,
        image.height,
        path.display()
    );

    Ok(format)
}
