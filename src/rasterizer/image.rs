//! Packed 16-bit render target
//!
//! Each pixel is `S BBBBB GGGGG RRRRR`. The stencil bit `S` decodes to
//! `Solid` when set and `Transparent` when clear, and gates every
//! rasterizer write into the pixel.

use std::path::Path;

use super::asset::{self, AssetError};
use super::color::{decode_555, encode_555, BlendMode, Color};
use super::types::{UPoint, URect};

const STENCIL_MASK: u16 = 0x8000;
const STENCIL_MODES: [BlendMode; 2] = [BlendMode::Transparent, BlendMode::Solid];

/// 16-bit RGB555 surface with a 1-bit stencil
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Image {
    pixels: Vec<u16>,
    width: u32,
    height: u32,
}

impl Image {
    pub const MAX_DIMENSION: u32 = 1024;

    /// Empty image with zero dimensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a `width` x `height` image. Invalid sizes yield an empty image.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        let mut img = Self::new();
        img.create(width, height);
        img
    }

    /// Allocates a square image.
    pub fn with_dimension(dimension: u32) -> Self {
        Self::with_dimensions(dimension, dimension)
    }

    /// Allocates storage. Returns false and leaves the image empty when
    /// either dimension exceeds `MAX_DIMENSION`.
    pub fn create(&mut self, width: u32, height: u32) -> bool {
        if width > Self::MAX_DIMENSION || height > Self::MAX_DIMENSION {
            log::warn!("Rejected image size {}x{} (max {})", width, height, Self::MAX_DIMENSION);
            self.destroy();
            return false;
        }
        let len = (width * height) as usize;
        if len != self.pixels.len() {
            self.pixels = vec![0; len];
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn destroy(&mut self) {
        self.pixels = Vec::new();
        self.width = 0;
        self.height = 0;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Full-surface rectangle.
    pub fn bounds(&self) -> URect {
        URect::from_coords(0, 0, self.width, self.height)
    }

    pub fn encode_pixel(color: Color) -> u16 {
        encode_555(color)
    }

    pub fn decode_pixel(pixel: u16) -> Color {
        decode_555(pixel, STENCIL_MODES)
    }

    #[inline]
    fn index(&self, p: UPoint) -> usize {
        assert!(
            p.x < self.width && p.y < self.height,
            "pixel ({}, {}) outside {}x{} image",
            p.x, p.y, self.width, self.height
        );
        (p.x + self.width * p.y) as usize
    }

    pub fn get_color(&self, p: UPoint) -> Color {
        Self::decode_pixel(self.pixels[self.index(p)])
    }

    /// Bounds-checked lookup for callers probing outside the surface.
    pub fn try_get_color(&self, p: UPoint) -> Option<Color> {
        if p.x < self.width && p.y < self.height {
            Some(self.get_color(p))
        } else {
            None
        }
    }

    pub fn set_color(&mut self, p: UPoint, color: Color) {
        let i = self.index(p);
        self.pixels[i] = Self::encode_pixel(color);
    }

    pub fn get_stencil(&self, p: UPoint) -> BlendMode {
        STENCIL_MODES[(self.pixels[self.index(p)] >> 15) as usize]
    }

    /// Overwrites only the stencil bit of one pixel.
    pub fn set_stencil(&mut self, p: UPoint, stencil: BlendMode) {
        let i = self.index(p);
        self.pixels[i] = (self.pixels[i] & !STENCIL_MASK) | (stencil.stencil_bit() << 15);
    }

    fn clamped(&self, rect: URect) -> URect {
        rect.clip(self.bounds())
    }

    fn for_each_in(&mut self, rect: URect, mut f: impl FnMut(&mut u16)) {
        let r = self.clamped(rect);
        if r.is_empty() {
            return;
        }
        let w = self.width as usize;
        for y in r.a.y as usize..r.b.y as usize {
            let row = &mut self.pixels[y * w..(y + 1) * w];
            row[r.a.x as usize..r.b.x as usize].iter_mut().for_each(&mut f);
        }
    }

    /// Fills a rectangle, silently clamped to the surface.
    pub fn fill_rect(&mut self, rect: URect, color: Color) {
        let pixel = Self::encode_pixel(color);
        self.for_each_in(rect, |p| *p = pixel);
    }

    pub fn fill(&mut self, color: Color) {
        let pixel = Self::encode_pixel(color);
        self.pixels.iter_mut().for_each(|p| *p = pixel);
    }

    /// Sets the stencil bit inside a rectangle, keeping colors.
    pub fn clear_stencil(&mut self, rect: URect, stencil: BlendMode) {
        let bit = stencil.stencil_bit() << 15;
        self.for_each_in(rect, |p| *p = (*p & !STENCIL_MASK) | bit);
    }

    /// Marks every pixel whose packed color equals `key` as transparent.
    pub fn set_color_key(&mut self, key: Color) {
        let key = Self::encode_pixel(key) & !STENCIL_MASK;
        for p in self.pixels.iter_mut() {
            if *p & !STENCIL_MASK == key {
                *p &= !STENCIL_MASK;
            }
        }
    }

    pub fn flip_x(&mut self) {
        let w = self.width as usize;
        if w == 0 {
            return;
        }
        for row in self.pixels.chunks_exact_mut(w) {
            row.reverse();
        }
    }

    pub fn flip_y(&mut self) {
        let w = self.width as usize;
        let h = self.height as usize;
        for y in 0..h / 2 {
            let (top, bottom) = self.pixels.split_at_mut((h - 1 - y) * w);
            top[y * w..(y + 1) * w].swap_with_slice(&mut bottom[..w]);
        }
    }

    /// Raw packed pixels, row-major.
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u16] {
        &mut self.pixels
    }

    /// Builds an image from 8-bit RGBA; alpha below one half becomes transparent.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Self, AssetError> {
        let mut img = Self::new();
        if !img.create(width, height) || rgba.len() != (width * height * 4) as usize {
            return Err(AssetError::InvalidDimensions { width, height });
        }
        for (dst, src) in img.pixels.iter_mut().zip(rgba.chunks_exact(4)) {
            *dst = Self::encode_pixel(asset::rgba_to_color([src[0], src[1], src[2], src[3]]));
        }
        Ok(img)
    }

    /// Expands to 8-bit RGBA; transparent pixels get zero alpha.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&p| asset::color_to_rgba(Self::decode_pixel(p)))
            .collect()
    }

    /// Loads a PNG (or any format the image crate decodes).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let rgba = asset::read_rgba(path)?;
        Self::from_rgba8(rgba.width(), rgba.height(), rgba.as_raw())
    }

    /// Decodes an encoded image held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let rgba = asset::decode_rgba(bytes)?;
        Self::from_rgba8(rgba.width(), rgba.height(), rgba.as_raw())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AssetError> {
        asset::write_rgba(path, self.width, self.height, self.to_rgba8())
    }
}
