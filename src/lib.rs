//! tiny3d: deterministic fixed-point software rasterizer
//!
//! Renders into low-resolution 15-bit images with identical output on every
//! platform:
//! - 16.16 fixed-point math, no floats on any rendering path
//! - Perspective-correct triangles with a top-left fill rule
//! - Power-of-two textures, lightmaps, stencil masks and ordered dithering
//! - OBJ/MTL model loading and a built-in bitmap font for HUDs

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod config;
pub mod model;
pub mod text;
pub mod present;
