//! Working color, blend modes and ordered dithering
//!
//! Colors are carried at 8 bits per channel while rendering and quantized to
//! 5 bits when packed into a surface. Dithering adds a position-dependent
//! offset before quantization so banding turns into a fixed pattern.

use std::ops::{Add, Div, Mul, Sub};
use serde::{Serialize, Deserialize};

use super::math::Vector2;
use super::real::Real;
use super::types::UPoint;

/// Per-pixel compositing rule carried by every color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlendMode {
    /// Never rendered
    #[default]
    Transparent = 0,
    /// Written as-is, ignoring vertex color
    Emissive = 1,
    /// Added on top of the destination
    AddAlpha = 2,
    /// Modulated by vertex color and written
    Solid = 3,
    /// Added on top of the destination, ignoring vertex color
    EmissiveAddAlpha = 4,
}

impl BlendMode {
    /// The bit packed into a surface's stencil position.
    pub fn stencil_bit(self) -> u16 {
        (self as u16) & 1
    }
}

/// 8-bit RGB color tagged with a blend mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub blend: BlendMode,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    /// Solid color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, blend: BlendMode::Solid }
    }

    pub const fn with_blend(r: u8, g: u8, b: u8, blend: BlendMode) -> Self {
        Self { r, g, b, blend }
    }

    pub fn blended(self, blend: BlendMode) -> Self {
        Self { blend, ..self }
    }

    /// Inverted channels, same blend mode.
    pub fn inverted(self) -> Self {
        Self { r: 255 - self.r, g: 255 - self.g, b: 255 - self.b, blend: self.blend }
    }

    /// Luminance approximation weighted 2:7:1.
    pub fn illum(self) -> u8 {
        ((self.r as u32 * 2 + self.g as u32 * 7 + self.b as u32) / 10) as u8
    }

    /// Linear interpolation from `a` (x = 0) to `b` (x = 1). Keeps `a`'s blend mode.
    pub fn lerp(a: Color, b: Color, x: Real) -> Color {
        let mix = |a: u8, b: u8| -> u8 {
            let d = (b as i32 - a as i32) * x;
            (a as i32 + d.to_int()).clamp(0, 255) as u8
        };
        Color { r: mix(a.r, b.r), g: mix(a.g, b.g), b: mix(a.b, b.b), blend: a.blend }
    }

    fn map(self, f: impl Fn(u8) -> u8) -> Self {
        Self { r: f(self.r), g: f(self.g), b: f(self.b), blend: self.blend }
    }

    fn zip(self, r: Color, f: impl Fn(u8, u8) -> u8) -> Self {
        Self { r: f(self.r, r.r), g: f(self.g, r.g), b: f(self.b, r.b), blend: self.blend }
    }
}

/// Saturating per-channel sum. Keeps the left blend mode.
impl Add for Color {
    type Output = Color;
    fn add(self, r: Color) -> Color {
        self.zip(r, |a, b| a.saturating_add(b))
    }
}

/// Per-channel difference clamped at zero. Keeps the left blend mode.
impl Sub for Color {
    type Output = Color;
    fn sub(self, r: Color) -> Color {
        self.zip(r, |a, b| a.saturating_sub(b))
    }
}

/// Exact normalized multiply, `((a+1)*(b+1)-1) >> 8`.
impl Mul for Color {
    type Output = Color;
    fn mul(self, r: Color) -> Color {
        self.zip(r, |a, b| (((a as u32 + 1) * (b as u32 + 1) - 1) >> 8) as u8)
    }
}

impl Mul<Real> for Color {
    type Output = Color;
    fn mul(self, r: Real) -> Color {
        self.map(|c| (c as i32 * r).to_int().clamp(0, 255) as u8)
    }
}

impl Div<Real> for Color {
    type Output = Color;
    fn div(self, r: Real) -> Color {
        self.map(|c| (c as i32 / r).to_int().clamp(0, 255) as u8)
    }
}

/// Distance between two adjacent 5-bit levels, in 8-bit units.
pub const COLOR_STEP: i32 = 256 / 32;

const fn offsets<const N: usize>(index: [i32; N]) -> [i32; N] {
    let mut out = [0; N];
    let mut i = 0;
    while i < N {
        out[i] = COLOR_STEP * index[i] / N as i32;
        i += 1;
    }
    out
}

const D2X2: [i32; 4] = offsets([0, 2, 3, 1]);

const D3X3: [i32; 9] = offsets([0, 7, 3, 6, 5, 2, 4, 1, 8]);

const D4X4: [i32; 16] = offsets([
    0, 8, 2, 10,
    12, 4, 14, 6,
    3, 11, 1, 9,
    15, 7, 13, 5,
]);

const D8X8: [i32; 64] = offsets([
    0, 48, 12, 60, 3, 51, 15, 63,
    32, 16, 44, 28, 35, 19, 47, 31,
    8, 56, 4, 52, 11, 59, 7, 55,
    40, 24, 36, 20, 43, 27, 39, 23,
    2, 50, 14, 62, 1, 49, 13, 61,
    34, 18, 46, 30, 33, 17, 45, 29,
    10, 58, 6, 54, 9, 57, 5, 53,
    42, 26, 38, 22, 41, 25, 37, 21,
]);

fn dither(c: Color, p: UPoint, d: &[i32], n: u32) -> Color {
    let offset = d[((p.y % n) * n + (p.x % n)) as usize];
    c.map(|ch| (ch as i32 + offset).clamp(0, 255) as u8)
}

pub fn dither_2x2(c: Color, p: UPoint) -> Color {
    dither(c, p, &D2X2, 2)
}

pub fn dither_3x3(c: Color, p: UPoint) -> Color {
    dither(c, p, &D3X3, 3)
}

pub fn dither_4x4(c: Color, p: UPoint) -> Color {
    dither(c, p, &D4X4, 4)
}

pub fn dither_8x8(c: Color, p: UPoint) -> Color {
    dither(c, p, &D8X8, 8)
}

/// Offsets a texture-space coordinate by a sub-texel amount that depends on
/// the destination pixel, approximating bilinear filtering.
pub fn dither_uv_2x2(texture_space_uv: Vector2, p: UPoint) -> UPoint {
    const X_OFFSET: [i32; 4] = [0, 2, 3, 1];
    const Y_OFFSET: [i32; 4] = [0, 3, 2, 1];
    let i = ((p.y % 2) * 2 + (p.x % 2)) as usize;
    let u = texture_space_uv.x + Real::from_int(X_OFFSET[i]) / 4;
    let v = texture_space_uv.y + Real::from_int(Y_OFFSET[i]) / 4;
    // negative coordinates wrap through two's complement, which the
    // power-of-two texture mask turns into repeat addressing
    UPoint::new(u.floor() as u32, v.floor() as u32)
}

/// Ordered-dither kernel applied on surface writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DitherKernel {
    None,
    #[default]
    D2x2,
    D3x3,
    D4x4,
    D8x8,
}

impl DitherKernel {
    pub fn apply(self, c: Color, p: UPoint) -> Color {
        match self {
            DitherKernel::None => c,
            DitherKernel::D2x2 => dither_2x2(c, p),
            DitherKernel::D3x3 => dither_3x3(c, p),
            DitherKernel::D4x4 => dither_4x4(c, p),
            DitherKernel::D8x8 => dither_8x8(c, p),
        }
    }
}

/// Texture sampling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleMode {
    /// Texel exactly where the coordinate lands
    #[default]
    Nearest,
    /// Coordinate jittered per destination pixel
    Dither,
    /// Four texels weighted by the fractional coordinate
    Bilinear,
}

#[inline]
fn to_5(c: u8) -> u16 {
    (((c as u32 + 1) * 256 - 1) >> 11) as u16
}

#[inline]
fn to_6(c: u8) -> u16 {
    (((c as u32 + 1) * 256 - 1) >> 10) as u16
}

#[inline]
fn from_5(c: u16) -> u8 {
    ((((c & 0x1F) as u32 + 1) * 256 - 1) >> 5) as u8
}

#[inline]
fn from_6(c: u16) -> u8 {
    ((((c & 0x3F) as u32 + 1) * 256 - 1) >> 6) as u8
}

/// Packs into `S BBBBB GGGGG RRRRR` with the blend mode's stencil bit on top.
pub fn encode_555(c: Color) -> u16 {
    (c.blend.stencil_bit() << 15) | (to_5(c.b) << 10) | (to_5(c.g) << 5) | to_5(c.r)
}

/// Unpacks `S BBBBB GGGGG RRRRR`, mapping the stencil bit through `modes`.
pub fn decode_555(pixel: u16, modes: [BlendMode; 2]) -> Color {
    Color {
        r: from_5(pixel),
        g: from_5(pixel >> 5),
        b: from_5(pixel >> 10),
        blend: modes[(pixel >> 15) as usize],
    }
}

/// Packs into `RRRRR GGGGGG BBBBB`. No stencil bit.
pub fn encode_565(c: Color) -> u16 {
    (to_5(c.r) << 11) | (to_6(c.g) << 5) | to_5(c.b)
}

/// Unpacks `RRRRR GGGGGG BBBBB` as a solid color.
pub fn decode_565(pixel: u16) -> Color {
    Color::new(from_5(pixel >> 11), from_6(pixel >> 5), from_5(pixel))
}

/// 256-entry color table
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub const SIZE: usize = 256;

    pub fn new() -> Self {
        Self { colors: vec![Color::BLACK; Self::SIZE] }
    }

    /// Gray ramp from black to white.
    pub fn grayscale() -> Self {
        let colors = (0..Self::SIZE).map(|i| Color::new(i as u8, i as u8, i as u8)).collect();
        Self { colors }
    }

    pub fn get(&self, index: u8) -> Color {
        self.colors[index as usize]
    }

    pub fn set(&mut self, index: u8, color: Color) {
        self.colors[index as usize] = color;
    }

    /// Index of the entry with the smallest squared RGB distance.
    pub fn nearest(&self, c: Color) -> u8 {
        let dist = |p: &Color| {
            let dr = p.r as i32 - c.r as i32;
            let dg = p.g as i32 - c.g as i32;
            let db = p.b as i32 - c.b as i32;
            dr * dr + dg * dg + db * db
        };
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| dist(p))
            .map(|(i, _)| i as u8)
            .unwrap_or(0)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STENCIL_MODES: [BlendMode; 2] = [BlendMode::Transparent, BlendMode::Solid];

    #[test]
    fn test_stencil_bits() {
        assert_eq!(BlendMode::Transparent.stencil_bit(), 0);
        assert_eq!(BlendMode::Emissive.stencil_bit(), 1);
        assert_eq!(BlendMode::AddAlpha.stencil_bit(), 0);
        assert_eq!(BlendMode::Solid.stencil_bit(), 1);
        assert_eq!(BlendMode::EmissiveAddAlpha.stencil_bit(), 0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Color::new(200, 100, 0);
        let b = Color::with_blend(100, 50, 10, BlendMode::Emissive);
        assert_eq!(a + b, Color::new(255, 150, 10));
        assert_eq!(b - a, Color::with_blend(0, 0, 10, BlendMode::Emissive));
        assert_eq!(Color::WHITE * a, a);
        assert_eq!(Color::BLACK * a, Color::BLACK);
        assert_eq!(a * Real::from_int(2), Color::new(255, 200, 0));
        assert_eq!(a / Real::from_int(2), Color::new(100, 50, 0));
    }

    #[test]
    fn test_lerp() {
        let a = Color::BLACK;
        let b = Color::new(200, 100, 50);
        assert_eq!(Color::lerp(a, b, Real::ZERO), a);
        assert_eq!(Color::lerp(a, b, Real::ONE), b);
        assert_eq!(Color::lerp(a, b, Real::ONE / 2), Color::new(100, 50, 25));
    }

    #[test]
    fn test_illum() {
        assert_eq!(Color::WHITE.illum(), 255);
        assert_eq!(Color::BLACK.illum(), 0);
        assert_eq!(Color::GREEN.illum(), 178);
    }

    #[test]
    fn test_dither_tables() {
        assert_eq!(D2X2, [0, 4, 6, 2]);
        assert_eq!(D3X3, [0, 6, 2, 5, 4, 1, 3, 0, 7]);
        assert_eq!(D4X4[1], 4);
        assert_eq!(D8X8[7], 7);
        assert!(D8X8.iter().all(|&d| (0..COLOR_STEP).contains(&d)));
    }

    #[test]
    fn test_dither_is_periodic() {
        let c = Color::new(100, 120, 140);
        for y in 0..8 {
            for x in 0..8 {
                let p = UPoint::new(x, y);
                let q = UPoint::new(x + 2 * 17, y + 2 * 9);
                assert_eq!(dither_2x2(c, p), dither_2x2(c, q));
                assert_eq!(dither_8x8(c, p), dither_8x8(c, UPoint::new(x + 64, y + 8)));
            }
        }
        assert_eq!(dither_2x2(Color::WHITE, UPoint::new(1, 0)), Color::WHITE);
    }

    #[test]
    fn test_dither_kernel_none_is_identity() {
        let c = Color::new(1, 2, 3);
        assert_eq!(DitherKernel::None.apply(c, UPoint::new(5, 7)), c);
        assert_eq!(DitherKernel::D4x4.apply(c, UPoint::new(1, 0)), dither_4x4(c, UPoint::new(1, 0)));
    }

    #[test]
    fn test_555_round_trip() {
        for v in 0..=255u8 {
            for blend in [BlendMode::Solid, BlendMode::Transparent] {
                let c = Color::with_blend(v, 255 - v, v / 2, blend);
                let packed = encode_555(c);
                let decoded = decode_555(packed, STENCIL_MODES);
                assert_eq!(encode_555(decoded), packed);
                assert_eq!(decoded.blend, blend);
            }
        }
    }

    #[test]
    fn test_555_extremes() {
        assert_eq!(encode_555(Color::WHITE), 0xFFFF);
        assert_eq!(encode_555(Color::BLACK), 0x8000);
        assert_eq!(decode_555(0x7FFF, STENCIL_MODES), Color::with_blend(255, 255, 255, BlendMode::Transparent));
        assert_eq!(decode_555(0, STENCIL_MODES).r, 7);
        assert_eq!(encode_555(Color::new(248, 247, 0)) & 0x3FF, (30 << 5) | 31);
    }

    #[test]
    fn test_565_round_trip() {
        for v in 0..=255u8 {
            let c = Color::new(v, v, v);
            let packed = encode_565(c);
            assert_eq!(encode_565(decode_565(packed)), packed);
        }
        assert_eq!(encode_565(Color::WHITE), 0xFFFF);
        assert_eq!(decode_565(0xFFFF), Color::WHITE);
    }

    #[test]
    fn test_dither_uv_offsets() {
        let uv = Vector2::from_ints(3, 5);
        assert_eq!(dither_uv_2x2(uv, UPoint::new(0, 0)), UPoint::new(3, 5));
        let moved = Vector2::new(Real::from_f32(3.5), Real::from_f32(5.5));
        assert_eq!(dither_uv_2x2(moved, UPoint::new(1, 0)), UPoint::new(4, 6));
    }

    #[test]
    fn test_palette() {
        let p = Palette::grayscale();
        assert_eq!(p.get(128), Color::new(128, 128, 128));
        assert_eq!(p.nearest(Color::new(10, 12, 11)), 11);
        let mut q = Palette::new();
        q.set(3, Color::RED);
        assert_eq!(q.nearest(Color::new(250, 10, 10)), 3);
    }
}
