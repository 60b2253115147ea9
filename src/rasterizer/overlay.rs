//! One bit per pixel mask layer
//!
//! Rows are packed least-significant bit first and padded to a whole byte.
//! A bit maps to one of two colors when the overlay is read or blitted.

use super::color::{BlendMode, Color};
use super::types::{UPoint, URect};

const BIT_COUNT: u32 = 8;

/// 1bpp bitmap with a two-entry color table
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    bits: Vec<u8>,
    width: u32,
    height: u32,
    byte_width: u32,
    colors: [Color; 2],
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            bits: Vec::new(),
            width: 0,
            height: 0,
            byte_width: 0,
            colors: [
                Color::with_blend(0, 0, 0, BlendMode::Transparent),
                Color::WHITE,
            ],
        }
    }
}

impl Overlay {
    pub const MAX_DIMENSION: u32 = 1024;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(width: u32, height: u32) -> Self {
        let mut o = Self::new();
        o.create(width, height);
        o
    }

    /// Allocates a cleared bitmap. Returns false and leaves the overlay
    /// empty when either dimension exceeds `MAX_DIMENSION`.
    pub fn create(&mut self, width: u32, height: u32) -> bool {
        self.destroy();
        if width > Self::MAX_DIMENSION || height > Self::MAX_DIMENSION {
            log::warn!("Rejected overlay size {}x{}", width, height);
            return false;
        }
        self.width = width;
        self.height = height;
        self.byte_width = width.div_ceil(BIT_COUNT);
        self.bits = vec![0; (self.byte_width * height) as usize];
        true
    }

    /// Copies a row-padded bit field. Fails if `bit_field` is too short.
    pub fn load_bits(&mut self, bit_field: &[u8], width: u32, height: u32) -> bool {
        if !self.create(width, height) {
            return false;
        }
        let count = self.bits.len();
        if bit_field.len() < count {
            log::warn!("Bit field holds {} bytes, {} needed", bit_field.len(), count);
            self.destroy();
            return false;
        }
        self.bits.copy_from_slice(&bit_field[..count]);
        true
    }

    pub fn destroy(&mut self) {
        self.bits = Vec::new();
        self.width = 0;
        self.height = 0;
        self.byte_width = 0;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline]
    fn locate(&self, p: UPoint) -> (usize, u8) {
        assert!(
            p.x < self.width && p.y < self.height,
            "bit ({}, {}) outside {}x{} overlay",
            p.x, p.y, self.width, self.height
        );
        let i = (p.y * self.byte_width + p.x / BIT_COUNT) as usize;
        (i, 1 << (p.x % BIT_COUNT))
    }

    pub fn get_bit(&self, p: UPoint) -> bool {
        let (i, mask) = self.locate(p);
        self.bits[i] & mask != 0
    }

    pub fn set_bit(&mut self, p: UPoint, bit: bool) {
        let (i, mask) = self.locate(p);
        if bit {
            self.bits[i] |= mask;
        } else {
            self.bits[i] &= !mask;
        }
    }

    pub fn get_color(&self, p: UPoint) -> Color {
        self.colors[self.get_bit(p) as usize]
    }

    pub fn colors(&self) -> [Color; 2] {
        self.colors
    }

    pub fn set_color_0(&mut self, c: Color) {
        self.colors[0] = c;
    }

    pub fn set_color_1(&mut self, c: Color) {
        self.colors[1] = c;
    }

    pub fn set_colors(&mut self, c0: Color, c1: Color) {
        self.colors = [c0, c1];
    }

    pub fn fill(&mut self, bit: bool) {
        let byte = if bit { 0xFF } else { 0 };
        self.bits.iter_mut().for_each(|b| *b = byte);
    }

    /// Sets every bit in a rectangle, silently clamped to the overlay.
    /// Whole bytes are written directly, the ragged ends bit by bit.
    pub fn fill_rect(&mut self, rect: URect, bit: bool) {
        let r = rect.clip(URect::from_coords(0, 0, self.width, self.height));
        if r.is_empty() {
            return;
        }
        let byte = if bit { 0xFF } else { 0 };
        let first_full = r.a.x.div_ceil(BIT_COUNT);
        let last_full = r.b.x / BIT_COUNT;
        for y in r.a.y..r.b.y {
            if first_full >= last_full {
                for x in r.a.x..r.b.x {
                    self.set_bit(UPoint::new(x, y), bit);
                }
                continue;
            }
            for x in r.a.x..first_full * BIT_COUNT {
                self.set_bit(UPoint::new(x, y), bit);
            }
            let row = (y * self.byte_width) as usize;
            self.bits[row + first_full as usize..row + last_full as usize].fill(byte);
            for x in last_full * BIT_COUNT..r.b.x {
                self.set_bit(UPoint::new(x, y), bit);
            }
        }
    }

    pub fn flip_x(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width / 2 {
                let p0 = UPoint::new(x, y);
                let p1 = UPoint::new(self.width - x - 1, y);
                let (b0, b1) = (self.get_bit(p0), self.get_bit(p1));
                self.set_bit(p0, b1);
                self.set_bit(p1, b0);
            }
        }
    }

    pub fn flip_y(&mut self) {
        let w = self.byte_width as usize;
        let h = self.height as usize;
        for y in 0..h / 2 {
            let (top, bottom) = self.bits.split_at_mut((h - 1 - y) * w);
            top[y * w..(y + 1) * w].swap_with_slice(&mut bottom[..w]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(o: &Overlay) -> usize {
        let mut n = 0;
        for y in 0..o.height() {
            for x in 0..o.width() {
                n += o.get_bit(UPoint::new(x, y)) as usize;
            }
        }
        n
    }

    #[test]
    fn test_row_padding() {
        let o = Overlay::with_dimensions(10, 3);
        assert_eq!(o.byte_width, 2);
        assert_eq!(o.bits.len(), 6);
        assert!(!Overlay::new().create(2000, 1));
    }

    #[test]
    fn test_bits_are_lsb_first() {
        let mut o = Overlay::new();
        assert!(o.load_bits(&[0b0000_0101, 0b1000_0000], 9, 1));
        assert!(o.get_bit(UPoint::new(0, 0)));
        assert!(!o.get_bit(UPoint::new(1, 0)));
        assert!(o.get_bit(UPoint::new(2, 0)));
        assert!(!o.get_bit(UPoint::new(8, 0)));
        assert!(!o.load_bits(&[0], 9, 1));
        assert!(o.is_empty());
    }

    #[test]
    fn test_set_bit_and_colors() {
        let mut o = Overlay::with_dimensions(4, 4);
        o.set_bit(UPoint::new(3, 3), true);
        assert_eq!(o.get_color(UPoint::new(3, 3)), Color::WHITE);
        assert_eq!(o.get_color(UPoint::new(0, 0)).blend, BlendMode::Transparent);
        o.set_colors(Color::RED, Color::BLUE);
        assert_eq!(o.get_color(UPoint::new(3, 3)), Color::BLUE);
        o.set_bit(UPoint::new(3, 3), false);
        assert_eq!(o.get_color(UPoint::new(3, 3)), Color::RED);
    }

    #[test]
    fn test_fill_rect_spans_bytes() {
        let mut o = Overlay::with_dimensions(40, 6);
        o.fill_rect(URect::from_coords(3, 1, 29, 4), true);
        assert_eq!(count(&o), 26 * 3);
        for y in 0..6 {
            for x in 0..40 {
                let inside = (3..29).contains(&x) && (1..4).contains(&y);
                assert_eq!(o.get_bit(UPoint::new(x, y)), inside, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_fill_rect_within_one_byte_and_clamped() {
        let mut o = Overlay::with_dimensions(12, 2);
        o.fill_rect(URect::from_coords(2, 0, 5, 1), true);
        assert_eq!(count(&o), 3);
        o.fill(true);
        o.fill_rect(URect::from_coords(10, 1, 100, 100), false);
        assert_eq!(count(&o), 24 - 2);
    }

    #[test]
    fn test_flips() {
        let mut o = Overlay::with_dimensions(9, 3);
        o.set_bit(UPoint::new(0, 0), true);
        o.flip_x();
        assert!(o.get_bit(UPoint::new(8, 0)));
        assert!(!o.get_bit(UPoint::new(0, 0)));
        o.flip_y();
        assert!(o.get_bit(UPoint::new(8, 2)));
        assert_eq!(count(&o), 1);
    }
}
