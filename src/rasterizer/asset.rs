//! File import and export for packed surfaces
//!
//! Surfaces are converted through 8-bit RGBA. Alpha below one half maps to
//! `Transparent`, everything else to `Solid`.

use std::path::Path;

use super::color::{BlendMode, Color};

/// Error type for surface file IO
#[derive(Debug)]
pub enum AssetError {
    IoError(std::io::Error),
    ImageError(image::ImageError),
    /// The decoded image does not fit the target surface
    InvalidDimensions { width: u32, height: u32 },
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::IoError(e)
    }
}

impl From<image::ImageError> for AssetError {
    fn from(e: image::ImageError) -> Self {
        AssetError::ImageError(e)
    }
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::IoError(e) => write!(f, "IO error: {}", e),
            AssetError::ImageError(e) => write!(f, "Image error: {}", e),
            AssetError::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions: {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for AssetError {}

pub(crate) fn rgba_to_color(p: [u8; 4]) -> Color {
    let blend = if p[3] >= 128 { BlendMode::Solid } else { BlendMode::Transparent };
    Color::with_blend(p[0], p[1], p[2], blend)
}

pub(crate) fn color_to_rgba(c: Color) -> [u8; 4] {
    let a = if c.blend == BlendMode::Transparent { 0 } else { 255 };
    [c.r, c.g, c.b, a]
}

/// Decodes any supported image file into RGBA8.
pub(crate) fn read_rgba<P: AsRef<Path>>(path: P) -> Result<image::RgbaImage, AssetError> {
    let path = path.as_ref();
    let img = image::open(path)?;
    log::debug!("Decoded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.to_rgba8())
}

/// Decodes in-memory image bytes into RGBA8.
pub(crate) fn decode_rgba(bytes: &[u8]) -> Result<image::RgbaImage, AssetError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Encodes RGBA8 pixels to a file; the format follows the extension.
pub(crate) fn write_rgba<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
) -> Result<(), AssetError> {
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or(AssetError::InvalidDimensions { width, height })?;
    img.save(path.as_ref())?;
    Ok(())
}
