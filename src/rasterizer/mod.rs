//! Deterministic fixed-point software rasterizer
//!
//! Features:
//! - 16.16 fixed-point math with Inf/NaN sentinels, identical on every platform
//! - Perspective-correct edge-function triangles with a top-left fill rule
//! - 15-bit color with a 1-bit stencil and ordered dithering
//! - Morton-ordered power-of-two textures and color cell compression
//! - Optional depth buffer, scaled blits and a built-in 6x6 font

mod real;
mod math;
mod color;
mod types;
mod asset;
mod image;
mod texture;
mod ccc;
mod overlay;
mod render;
mod wide;
mod font;

pub use self::real::*;
pub use self::math::*;
pub use self::color::*;
pub use self::types::*;
pub use self::asset::AssetError;
pub use self::image::*;
pub use self::texture::*;
pub use self::ccc::*;
pub use self::overlay::*;
pub use self::render::{
    clear_depth_buffer, draw_line, draw_lightmap_triangle, draw_overlay, draw_point, draw_region,
    draw_triangle, new_depth_buffer, DepthBuffer, RegionSource,
};
pub use self::wide::*;
pub use self::font::*;

/// Default internal resolution
pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 240;
