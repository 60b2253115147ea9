//! Render configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files. Missing
//! fields fall back to their defaults, so a partial file is valid.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::rasterizer::{BlendMode, Color, DitherKernel, RasterSettings, SampleMode, HEIGHT, WIDTH};

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    /// Internal resolution outside what an `Image` can hold
    InvalidResolution { width: u32, height: u32 },
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ConfigError::InvalidResolution { width, height } => {
                write!(f, "Invalid resolution: {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the demo needs to set up a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Internal resolution
    pub width: u32,
    pub height: u32,
    /// Window size as a multiple of the internal resolution
    pub window_scale: u32,
    pub dither: DitherKernel,
    pub sample_mode: SampleMode,
    /// Use the tiled triangle loop
    pub wide_rasterizer: bool,
    pub depth_test: bool,
    /// Inverted drop shadow behind HUD text
    pub hud_shadow: bool,
    pub clear_color: Color,
    /// Blend modes for texels with a clear and a set stencil bit
    pub texture_blend_modes: [BlendMode; 2],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            window_scale: 3,
            dither: DitherKernel::D2x2,
            sample_mode: SampleMode::Nearest,
            wide_rasterizer: false,
            depth_test: true,
            hud_shadow: true,
            clear_color: Color::new(0, 255, 255),
            texture_blend_modes: [BlendMode::Transparent, BlendMode::Solid],
        }
    }
}

impl RenderConfig {
    /// Rasterizer settings for the whole frame.
    pub fn raster_settings(&self) -> RasterSettings {
        RasterSettings {
            dither: self.dither,
            sample_mode: self.sample_mode,
            clip: None,
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let max = crate::rasterizer::Image::MAX_DIMENSION;
        if self.width == 0 || self.height == 0 || self.width > max || self.height > max {
            return Err(ConfigError::InvalidResolution { width: self.width, height: self.height });
        }
        Ok(self)
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    config_from_str(&contents)
}

/// Load a config, falling back to defaults on any error
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> RenderConfig {
    let path = path.as_ref();
    match load_config(path) {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("Using default config ({}): {}", path.display(), e);
            RenderConfig::default()
        }
    }
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a config from a RON string (for embedded configs or testing)
pub fn config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    let config: RenderConfig = ron::from_str(s)?;
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = config_from_str("(width: 160, dither: D4x4)").unwrap();
        assert_eq!(config.width, 160);
        assert_eq!(config.height, HEIGHT);
        assert_eq!(config.dither, DitherKernel::D4x4);
        assert!(config.depth_test);
    }

    #[test]
    fn test_round_trip_through_file() {
        let config = RenderConfig {
            wide_rasterizer: true,
            clear_color: Color::with_blend(1, 2, 3, BlendMode::Solid),
            texture_blend_modes: [BlendMode::AddAlpha, BlendMode::Emissive],
            ..Default::default()
        };
        let path = std::env::temp_dir().join("tiny3d_config_round_trip.ron");
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(config_from_str("(width: 0)"), Err(ConfigError::InvalidResolution { .. })));
        assert!(matches!(config_from_str("(width: 4096)"), Err(ConfigError::InvalidResolution { .. })));
        assert!(matches!(config_from_str("(width: \"wide\")"), Err(ConfigError::ParseError(_))));
        assert!(matches!(load_config("/nonexistent/tiny3d.ron"), Err(ConfigError::IoError(_))));
    }

    #[test_log::test]
    fn test_fallback_to_default() {
        let config = load_config_or_default("/nonexistent/tiny3d.ron");
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_raster_settings() {
        let config = RenderConfig { sample_mode: SampleMode::Bilinear, ..Default::default() };
        let settings = config.raster_settings();
        assert_eq!(settings.sample_mode, SampleMode::Bilinear);
        assert_eq!(settings.dither, DitherKernel::D2x2);
        assert!(settings.clip.is_none());
    }
}
