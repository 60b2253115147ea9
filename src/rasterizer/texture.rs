//! Power-of-two square textures stored in Morton order
//!
//! Texels use the same 555+stencil packing as `Image`, but the stencil bit
//! selects one of two configurable blend modes instead of a fixed
//! Transparent/Solid pair. Coordinates wrap through the dimension mask,
//! which gives repeat addressing for free.

use std::path::Path;

use super::asset::AssetError;
use super::color::{decode_555, dither_uv_2x2, encode_555, BlendMode, Color, SampleMode};
use super::image::Image;
use super::math::Vector2;
use super::real::{interleave_16_bits, is_pow2, log2, Real};
use super::types::UPoint;

/// Anything the rasterizer can pull texels from
pub trait Sampler {
    /// Edge length in texels; zero for an empty texture.
    fn dimension(&self) -> u32;

    /// Texel at integer coordinates, wrapped into the texture.
    fn texel(&self, p: UPoint) -> Color;

    /// Samples at a texture-space coordinate (texel units, not normalized).
    /// `p` is the destination pixel, used by the dithered mode.
    fn sample(&self, uv: Vector2, mode: SampleMode, p: UPoint) -> Color {
        if self.dimension() == 0 {
            return Color::default();
        }
        match mode {
            SampleMode::Nearest => {
                self.texel(UPoint::new(uv.x.floor() as u32, uv.y.floor() as u32))
            }
            SampleMode::Dither => self.texel(dither_uv_2x2(uv, p)),
            SampleMode::Bilinear => bilinear(self, uv),
        }
    }
}

/// Four-texel blend weighted by the fractional coordinate. The blend mode
/// comes from the top-left texel.
pub fn bilinear<S: Sampler + ?Sized>(s: &S, uv: Vector2) -> Color {
    let x0 = uv.x.floor();
    let y0 = uv.y.floor();
    let fx = uv.x - x0;
    let fy = uv.y - y0;
    let (x0, y0) = (x0 as u32, y0 as u32);
    let (x1, y1) = (x0.wrapping_add(1), y0.wrapping_add(1));
    let top = Color::lerp(s.texel(UPoint::new(x0, y0)), s.texel(UPoint::new(x1, y0)), fx);
    let bottom = Color::lerp(s.texel(UPoint::new(x0, y1)), s.texel(UPoint::new(x1, y1)), fx);
    Color::lerp(top, bottom, fy)
}

/// Square power-of-two texture
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    texels: Vec<u16>,
    dimension: u32,
    dim_mask: u32,
    dim_shift: u32,
    blend_modes: [BlendMode; 2],
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            texels: Vec::new(),
            dimension: 0,
            dim_mask: 0,
            dim_shift: 0,
            blend_modes: [BlendMode::Transparent, BlendMode::Solid],
        }
    }
}

impl Texture {
    pub const MIN_DIMENSION: u32 = 1;
    pub const MAX_DIMENSION: u32 = 256;

    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a `dimension` x `dimension` texture, or an empty one if the
    /// dimension is invalid.
    pub fn with_dimension(dimension: u32) -> Self {
        let mut tex = Self::new();
        tex.create(dimension);
        tex
    }

    pub fn is_valid_dimension(dimension: u32) -> bool {
        (Self::MIN_DIMENSION..=Self::MAX_DIMENSION).contains(&dimension) && is_pow2(dimension)
    }

    /// Allocates storage. Returns false and leaves the texture empty unless
    /// the dimension is a power of two within the supported range.
    pub fn create(&mut self, dimension: u32) -> bool {
        if !Self::is_valid_dimension(dimension) {
            log::warn!("Rejected texture dimension {}", dimension);
            self.destroy();
            return false;
        }
        if dimension != self.dimension {
            self.texels = vec![0; (dimension * dimension) as usize];
            self.dimension = dimension;
            self.dim_mask = dimension - 1;
            self.dim_shift = log2(dimension);
        }
        true
    }

    /// Releases the texels. Blend modes are kept.
    pub fn destroy(&mut self) {
        self.texels = Vec::new();
        self.dimension = 0;
        self.dim_mask = 0;
        self.dim_shift = 0;
    }

    pub fn width(&self) -> u32 {
        self.dimension
    }

    pub fn height(&self) -> u32 {
        self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    /// log2 of the dimension.
    pub fn dimension_shift(&self) -> u32 {
        self.dim_shift
    }

    #[inline]
    fn morton_index(&self, p: UPoint) -> usize {
        let x = (p.x & self.dim_mask) as u16;
        let y = (p.y & self.dim_mask) as u16;
        interleave_16_bits(x, y) as usize
    }

    pub fn encode_texel(color: Color) -> u16 {
        encode_555(color)
    }

    pub fn decode_texel(&self, texel: u16) -> Color {
        decode_555(texel, self.blend_modes)
    }

    /// Texel at normalized coordinates, wrapping outside `[0, 1)`.
    pub fn get_color_uv(&self, uv: Vector2) -> Color {
        let t = self.project_uv(uv);
        self.get_color(UPoint::new(t.x.floor() as u32, t.y.floor() as u32))
    }

    /// Texel at integer coordinates, wrapping outside the texture.
    pub fn get_color(&self, p: UPoint) -> Color {
        if self.is_empty() {
            return Color::default();
        }
        self.decode_texel(self.texels[self.morton_index(p)])
    }

    pub fn set_color(&mut self, p: UPoint, color: Color) {
        if self.is_empty() {
            return;
        }
        let i = self.morton_index(p);
        self.texels[i] = Self::encode_texel(color);
    }

    /// Scales a normalized coordinate into texel space.
    pub fn project_uv(&self, uv: Vector2) -> Vector2 {
        uv * Real::from_int(self.dimension as i32)
    }

    pub fn blend_modes(&self) -> [BlendMode; 2] {
        self.blend_modes
    }

    /// Mode for texels whose stencil bit is clear.
    pub fn set_blend_mode_0(&mut self, mode: BlendMode) {
        self.blend_modes[0] = mode;
    }

    /// Mode for texels whose stencil bit is set.
    pub fn set_blend_mode_1(&mut self, mode: BlendMode) {
        self.blend_modes[1] = mode;
    }

    pub fn set_blend_modes(&mut self, modes: [BlendMode; 2]) {
        self.blend_modes = modes;
    }

    /// Replaces the contents with a nearest-neighbour resample of `img`.
    /// The dimension is the largest power of two not above the image's
    /// larger side, capped at `MAX_DIMENSION`.
    pub fn copy_image(&mut self, img: &Image) -> bool {
        let side = img.width().max(img.height());
        if img.is_empty() {
            self.destroy();
            return false;
        }
        let clamped = side.min(Self::MAX_DIMENSION);
        let dimension = 1 << log2(clamped);
        if dimension != side {
            log::debug!(
                "Resampling {}x{} image to {}x{} texture",
                img.width(), img.height(), dimension, dimension
            );
        }
        if !self.create(dimension) {
            return false;
        }
        for y in 0..dimension {
            for x in 0..dimension {
                let sx = x * img.width() / dimension;
                let sy = y * img.height() / dimension;
                self.set_color(UPoint::new(x, y), img.get_color(UPoint::new(sx, sy)));
            }
        }
        true
    }

    /// New texture resampled from `img`; empty if `img` is empty.
    pub fn from_image(img: &Image) -> Self {
        let mut tex = Self::new();
        tex.copy_image(img);
        tex
    }

    /// Row-major copy as an image. Blend modes collapse to the stencil bit.
    pub fn to_image(&self) -> Image {
        let mut img = Image::with_dimension(self.dimension);
        for y in 0..self.dimension {
            for x in 0..self.dimension {
                let p = UPoint::new(x, y);
                let texel = self.texels[self.morton_index(p)];
                img.pixels_mut()[(y * self.dimension + x) as usize] = texel;
            }
        }
        img
    }

    /// Loads an image file and resamples it into a texture.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let img = Image::load(path)?;
        let tex = Self::from_image(&img);
        if tex.is_empty() {
            return Err(AssetError::InvalidDimensions { width: img.width(), height: img.height() });
        }
        Ok(tex)
    }

    /// Decodes encoded image bytes held in memory into a texture.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = Image::from_bytes(bytes)?;
        let tex = Self::from_image(&img);
        if tex.is_empty() {
            return Err(AssetError::InvalidDimensions { width: img.width(), height: img.height() });
        }
        Ok(tex)
    }

    /// Two-color checkerboard with `cell` x `cell` squares.
    pub fn checkerboard(dimension: u32, cell: u32, a: Color, b: Color) -> Self {
        let mut tex = Self::with_dimension(dimension);
        let cell = cell.max(1);
        for y in 0..tex.dimension {
            for x in 0..tex.dimension {
                let c = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
                tex.set_color(UPoint::new(x, y), c);
            }
        }
        tex
    }
}

impl Sampler for Texture {
    fn dimension(&self) -> u32 {
        self.dimension
    }

    fn texel(&self, p: UPoint) -> Color {
        self.get_color(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validates_dimension() {
        let mut tex = Texture::new();
        assert!(tex.create(1));
        assert!(tex.create(256));
        assert_eq!(tex.dimension_shift(), 8);
        assert!(!tex.create(48));
        assert!(tex.is_empty());
        assert!(!tex.create(512));
        assert!(!tex.create(0));
    }

    #[test]
    fn test_wrapped_addressing() {
        let mut tex = Texture::with_dimension(4);
        tex.set_color(UPoint::new(1, 2), Color::RED);
        assert_eq!(tex.get_color(UPoint::new(5, 6)), Color::RED);
        assert_eq!(tex.get_color(UPoint::new(1u32.wrapping_sub(4), 2)), Color::RED);
        let uv = Vector2::new(Real::from_f32(0.25 + 1.0), Real::from_f32(0.5));
        assert_eq!(tex.get_color_uv(uv), Color::RED);
    }

    #[test]
    fn test_blend_mode_pair() {
        let mut tex = Texture::with_dimension(2);
        tex.set_color(UPoint::new(0, 0), Color::WHITE);
        tex.set_color(UPoint::new(1, 0), Color::with_blend(255, 255, 255, BlendMode::Transparent));
        tex.set_blend_modes([BlendMode::AddAlpha, BlendMode::Emissive]);
        assert_eq!(tex.get_color(UPoint::new(0, 0)).blend, BlendMode::Emissive);
        assert_eq!(tex.get_color(UPoint::new(1, 0)).blend, BlendMode::AddAlpha);
        tex.set_blend_mode_1(BlendMode::Solid);
        assert_eq!(tex.get_color(UPoint::new(0, 0)).blend, BlendMode::Solid);
    }

    #[test]
    fn test_image_round_trip() {
        let mut img = Image::with_dimension(8);
        img.fill(Color::BLACK);
        img.set_color(UPoint::new(7, 1), Color::WHITE);
        let tex = Texture::from_image(&img);
        assert_eq!(tex.width(), 8);
        assert_eq!(tex.get_color(UPoint::new(7, 1)), Color::WHITE);
        assert_eq!(tex.to_image(), img);
    }

    #[test]
    fn test_from_image_resamples() {
        let mut img = Image::with_dimensions(12, 6);
        img.fill(Color::BLUE);
        let tex = Texture::from_image(&img);
        assert_eq!(tex.width(), 8);
        assert_eq!(tex.get_color(UPoint::new(7, 7)), img.get_color(UPoint::new(0, 0)));

        let big = Image::with_dimensions(1000, 10);
        assert_eq!(Texture::from_image(&big).width(), 256);
        assert!(Texture::from_image(&Image::new()).is_empty());
    }

    #[test]
    fn test_empty_texture_samples_default() {
        let tex = Texture::new();
        let c = tex.sample(Vector2::from_ints(3, 3), SampleMode::Bilinear, UPoint::new(0, 0));
        assert_eq!(c, Color::default());
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut tex = Texture::with_dimension(2);
        tex.set_color(UPoint::new(0, 0), Color::BLACK);
        tex.set_color(UPoint::new(1, 0), Color::new(200, 200, 200));
        tex.set_color(UPoint::new(0, 1), Color::BLACK);
        tex.set_color(UPoint::new(1, 1), Color::new(200, 200, 200));
        let uv = Vector2::new(Real::ONE / 2, Real::ZERO);
        let c = tex.sample(uv, SampleMode::Bilinear, UPoint::new(0, 0));
        // black decodes to 7, 200 decodes to 207
        assert_eq!(c.r, 107);
        assert_eq!(tex.sample(uv, SampleMode::Nearest, UPoint::new(0, 0)).r, 7);
    }

    #[test]
    fn test_checkerboard() {
        let tex = Texture::checkerboard(4, 1, Color::WHITE, Color::BLACK);
        assert_eq!(tex.get_color(UPoint::new(0, 0)), Color::WHITE);
        assert_eq!(tex.get_color(UPoint::new(1, 0)).r, 7);
        assert_eq!(tex.get_color(UPoint::new(1, 1)), Color::WHITE);
    }
}
