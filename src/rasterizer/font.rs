//! Built-in 6x6 bitmap font
//!
//! Glyphs for `!` through `~` plus one fallback box are packed into a 24x144
//! XBM bitmap, four glyphs per row. A clear bit marks an inked pixel.

use super::color::{dither_2x2, Color};
use super::image::Image;
use super::types::{Point, Rect, UPoint, URect};

pub const CHAR_WIDTH: u32 = 6;
pub const CHAR_HEIGHT: u32 = 6;

const FIRST_CHAR: u8 = b'!';
const LAST_CHAR: u8 = b'~';
/// Glyph drawn for anything outside `FIRST_CHAR..=LAST_CHAR`
const FALLBACK_GLYPH: u32 = (LAST_CHAR - FIRST_CHAR + 1) as u32;
const GLYPHS_PER_ROW: u32 = 4;
const FONT_WIDTH: u32 = 24;

#[rustfmt::skip]
static FONT_BITS: [u8; 432] = [
    0xff, 0xff, 0xff, 0x7d, 0xbd, 0x06, 0x7d, 0x1d, 0xa4, 0xfd, 0xbf, 0x06,
    0xff, 0x1f, 0x2c, 0xfd, 0xbf, 0x06, 0xff, 0xff, 0xff, 0x77, 0xdc, 0xef,
    0xff, 0xde, 0xf7, 0x41, 0xf5, 0xf7, 0x7f, 0xfb, 0xf7, 0x77, 0xf4, 0xef,
    0xff, 0xff, 0xff, 0xfd, 0xff, 0xff, 0xfb, 0xbe, 0xff, 0x7b, 0x1d, 0xff,
    0xfb, 0xbe, 0xef, 0xfd, 0xff, 0xf7, 0xff, 0xff, 0xff, 0xff, 0xff, 0x05,
    0xff, 0xff, 0x76, 0xf1, 0x7f, 0x57, 0xff, 0xbf, 0x77, 0x7f, 0xdf, 0x07,
    0xff, 0xff, 0xff, 0x77, 0x10, 0x74, 0xf3, 0xf7, 0x75, 0x77, 0x30, 0x04,
    0x77, 0xff, 0x7d, 0x41, 0x10, 0x7c, 0xff, 0xff, 0xff, 0x41, 0x10, 0x04,
    0x7d, 0xff, 0x75, 0x41, 0xf0, 0x04, 0x5f, 0xf7, 0x75, 0x41, 0xf0, 0x05,
    0xff, 0xff, 0xff, 0xc1, 0xff, 0xdf, 0x5d, 0xbf, 0xef, 0xc1, 0xff, 0xf7,
    0x5f, 0xbf, 0xef, 0xdf, 0xdf, 0xdf, 0xff, 0xff, 0xff, 0x7f, 0x1f, 0x04,
    0xf1, 0xfe, 0x75, 0xff, 0x1d, 0x34, 0xf1, 0xfe, 0x57, 0x7f, 0xdf, 0x17,
    0xff, 0xff, 0xff, 0x41, 0x38, 0x84, 0x5d, 0xdb, 0x77, 0x41, 0xd0, 0x77,
    0x5d, 0xd7, 0x77, 0x5d, 0x10, 0x04, 0xff, 0xff, 0xff, 0x41, 0x10, 0x74,
    0x7d, 0xdf, 0x77, 0x61, 0x58, 0x04, 0x7d, 0xdf, 0x75, 0x41, 0x1f, 0x74,
    0xff, 0xff, 0xff, 0x41, 0xd0, 0xf5, 0xf7, 0xd7, 0xf5, 0xf7, 0x17, 0xf6,
    0x77, 0xd7, 0xf5, 0x41, 0xd0, 0x05, 0xff, 0xff, 0xff, 0x49, 0x17, 0x04,
    0x55, 0xd6, 0x75, 0x5d, 0xd5, 0x05, 0x5d, 0xd3, 0xf5, 0x5d, 0x17, 0xf4,
    0xff, 0xff, 0xff, 0x41, 0x30, 0x04, 0x5d, 0xd7, 0xdf, 0x5d, 0x10, 0xdc,
    0x4d, 0xfb, 0xdd, 0x41, 0x17, 0xde, 0xff, 0xff, 0xff, 0x5d, 0xd7, 0x75,
    0x5d, 0xd7, 0x75, 0x5d, 0xd7, 0x8d, 0xdd, 0x5a, 0x75, 0xc1, 0x9d, 0x74,
    0xff, 0xff, 0xff, 0x5d, 0x90, 0xf7, 0xdd, 0xd7, 0xef, 0xeb, 0xd8, 0xdf,
    0x77, 0xdf, 0xbf, 0x77, 0x90, 0x7f, 0xff, 0xff, 0xff, 0xf9, 0xfe, 0xf7,
    0x7b, 0xfd, 0xef, 0xfb, 0xff, 0xff, 0xfb, 0xff, 0xff, 0xf9, 0x1f, 0xfc,
    0xff, 0xff, 0xff, 0x41, 0x38, 0x84, 0x5d, 0xdb, 0x77, 0x41, 0xd0, 0x77,
    0x5d, 0xd7, 0x77, 0x5d, 0x10, 0x04, 0xff, 0xff, 0xff, 0x41, 0x10, 0x74,
    0x7d, 0xdf, 0x77, 0x61, 0x58, 0x04, 0x7d, 0xdf, 0x75, 0x41, 0x1f, 0x74,
    0xff, 0xff, 0xff, 0x41, 0xd0, 0xf5, 0xf7, 0xd7, 0xf5, 0xf7, 0x17, 0xf6,
    0x77, 0xd7, 0xf5, 0x41, 0xd0, 0x05, 0xff, 0xff, 0xff, 0x49, 0x17, 0x04,
    0x55, 0xd6, 0x75, 0x5d, 0xd5, 0x05, 0x5d, 0xd3, 0xf5, 0x5d, 0x17, 0xf4,
    0xff, 0xff, 0xff, 0x41, 0x30, 0x04, 0x5d, 0xd7, 0xdf, 0x5d, 0x10, 0xdc,
    0x4d, 0xfb, 0xdd, 0x41, 0x17, 0xde, 0xff, 0xff, 0xff, 0x5d, 0xd7, 0x75,
    0x5d, 0xd7, 0x75, 0x5d, 0xd7, 0x8d, 0xdd, 0x5a, 0x75, 0xc1, 0x9d, 0x74,
    0xff, 0xff, 0xff, 0x5d, 0x30, 0xf7, 0xdd, 0xb7, 0xf7, 0xeb, 0xd8, 0xf7,
    0x77, 0xbf, 0xf7, 0x77, 0x30, 0xf7, 0xff, 0xff, 0xff, 0xf9, 0x1a, 0x04,
    0x7b, 0x1d, 0x04, 0xf7, 0x1f, 0x04, 0xfb, 0x1f, 0x04, 0xf9, 0x1f, 0x04,
];

fn glyph_index(c: u8) -> u32 {
    if (FIRST_CHAR..=LAST_CHAR).contains(&c) {
        (c - FIRST_CHAR) as u32
    } else {
        FALLBACK_GLYPH
    }
}

/// Whether pixel (`gx`, `gy`) of glyph `index` is inked.
fn glyph_pixel(index: u32, gx: u32, gy: u32) -> bool {
    let fx = (index % GLYPHS_PER_ROW) * CHAR_WIDTH + gx;
    let fy = (index / GLYPHS_PER_ROW) * CHAR_HEIGHT + gy;
    let i = (fx + fy * FONT_WIDTH) as usize;
    FONT_BITS[i >> 3] & (1 << (i & 7)) == 0
}

/// Pixel extent of `count` glyph cells of size `dim` at `scale`, saturated
/// to the i32 range.
pub fn glyph_extent(dim: u32, scale: u32, count: usize) -> i32 {
    let span = dim as u64 * scale as u64 * count.min(u32::MAX as usize) as u64;
    span.min(i32::MAX as u64) as i32
}

fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// Draws one line of glyph codes and returns the caret after it.
fn draw_run(
    dst: &mut Image,
    p: Point,
    chars: &[u8],
    color: Color,
    scale: u32,
    clip: Option<URect>,
) -> Point {
    let glyph_h = glyph_extent(CHAR_HEIGHT, scale, 1);
    let run_w = glyph_extent(CHAR_WIDTH, scale, chars.len());
    let caret = Point::new(p.x.saturating_add(run_w), p.y);
    if scale == 0 || chars.is_empty() {
        return caret;
    }

    let mut writable = Rect::from(dst.bounds());
    if let Some(clip) = clip {
        writable = writable.clip(Rect::from(clip));
    }
    let visible = Rect::new(p, Point::new(caret.x, p.y.saturating_add(glyph_h))).clip(writable);
    if visible.is_empty() {
        return caret;
    }

    let scale = scale as i64;
    let glyph_w = CHAR_WIDTH as i64 * scale;
    for y in visible.a.y..visible.b.y {
        let gy = ((y as i64 - p.y as i64) / scale) as u32;
        for x in visible.a.x..visible.b.x {
            let dx = x as i64 - p.x as i64;
            let Some(&c) = chars.get((dx / glyph_w) as usize) else { break };
            if is_blank(c) {
                continue;
            }
            let gx = ((dx % glyph_w) / scale) as u32;
            if glyph_pixel(glyph_index(c), gx, gy) {
                // the destination keeps its own stencil
                let q = UPoint::new(x as u32, y as u32);
                let ink = color.blended(dst.get_stencil(q));
                dst.set_color(q, dither_2x2(ink, q));
            }
        }
    }
    caret
}

/// Draws `text` with its top-left corner at `p`, each glyph scaled by
/// `scale`. Line breaks return the caret to `x_margin` one line down.
/// Returns the caret position after the last character.
pub fn draw_chars(
    dst: &mut Image,
    p: Point,
    x_margin: i32,
    text: &str,
    color: Color,
    scale: u32,
    clip: Option<URect>,
) -> Point {
    let line_h = glyph_extent(CHAR_HEIGHT, scale, 1);
    let mut caret = p;
    let mut run: Vec<u8> = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            draw_run(dst, caret, &run, color, scale, clip);
            run.clear();
            caret = Point::new(x_margin, caret.y.saturating_add(line_h));
        } else {
            run.push(if ch.is_ascii() { ch as u8 } else { 0x7F });
        }
    }
    draw_run(dst, caret, &run, color, scale, clip)
}

/// Draws a single character and returns the caret after it.
pub fn draw_char(
    dst: &mut Image,
    p: Point,
    ch: char,
    color: Color,
    scale: u32,
    clip: Option<URect>,
) -> Point {
    let mut buf = [0u8; 4];
    draw_chars(dst, p, p.x, ch.encode_utf8(&mut buf), color, scale, clip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::color::BlendMode;

    fn canvas(w: u32, h: u32) -> Image {
        let mut img = Image::with_dimensions(w, h);
        img.fill(Color::BLACK);
        img
    }

    fn inked(img: &Image) -> usize {
        let mut n = 0;
        for y in 0..img.height() {
            for x in 0..img.width() {
                n += (img.get_color(UPoint::new(x, y)) == Color::WHITE) as usize;
            }
        }
        n
    }

    #[test]
    fn test_glyph_a() {
        let rows: Vec<String> = (0..CHAR_HEIGHT)
            .map(|y| {
                (0..CHAR_WIDTH)
                    .map(|x| if glyph_pixel(glyph_index(b'A'), x, y) { '#' } else { '.' })
                    .collect()
            })
            .collect();
        assert_eq!(rows, ["......", ".#####", ".#...#", ".#####", ".#...#", ".#...#"]);
    }

    #[test]
    fn test_unknown_maps_to_fallback() {
        assert_eq!(glyph_index(b'!'), 0);
        assert_eq!(glyph_index(b'~'), 93);
        assert_eq!(glyph_index(0x7F), FALLBACK_GLYPH);
        assert_eq!(glyph_index(b'\x01'), FALLBACK_GLYPH);
    }

    #[test]
    fn test_caret_advances() {
        let mut img = canvas(64, 32);
        let end = draw_chars(&mut img, Point::new(2, 3), 2, "AB C", Color::WHITE, 1, None);
        assert_eq!(end, Point::new(2 + 4 * 6, 3));
        let end = draw_chars(&mut img, Point::new(2, 3), 5, "AB\nC", Color::WHITE, 2, None);
        assert_eq!(end, Point::new(5 + 12, 3 + 12));
        let end = draw_char(&mut img, Point::new(0, 0), 'x', Color::WHITE, 1, None);
        assert_eq!(end, Point::new(6, 0));
    }

    #[test]
    fn test_ink_count_and_scale() {
        let mut img = canvas(16, 16);
        draw_chars(&mut img, Point::new(0, 0), 0, "A", Color::WHITE, 1, None);
        assert_eq!(inked(&img), 16);

        let mut img = canvas(16, 16);
        draw_chars(&mut img, Point::new(0, 0), 0, "A", Color::WHITE, 2, None);
        assert_eq!(inked(&img), 16 * 4);
    }

    #[test]
    fn test_huge_scale_saturates_caret() {
        let mut img = canvas(16, 16);
        let end = draw_chars(&mut img, Point::new(4, 4), 4, "AB\nC", Color::WHITE, u32::MAX, None);
        assert_eq!(end, Point::new(i32::MAX, i32::MAX));
        // every visible pixel maps to the blank top-left corner of 'A'
        assert_eq!(inked(&img), 0);
        assert_eq!(glyph_extent(CHAR_WIDTH, 2, 3), 36);
        assert_eq!(glyph_extent(CHAR_WIDTH, u32::MAX, usize::MAX), i32::MAX);
    }

    #[test]
    fn test_blank_draws_nothing() {
        let mut img = canvas(32, 8);
        draw_chars(&mut img, Point::new(0, 0), 0, " \t ", Color::WHITE, 1, None);
        assert_eq!(inked(&img), 0);
    }

    #[test]
    fn test_clipping_and_stencil() {
        let mut img = canvas(16, 16);
        img.clear_stencil(URect::from_coords(0, 0, 16, 2), BlendMode::Transparent);
        let clip = Some(URect::from_coords(0, 0, 16, 4));
        draw_chars(&mut img, Point::new(-3, 0), 0, "A", Color::WHITE, 1, clip);
        // rows 1..2 are ink on a transparent stencil, which is preserved
        assert_eq!(img.get_stencil(UPoint::new(0, 1)), BlendMode::Transparent);
        assert_eq!(img.get_color(UPoint::new(0, 1)).r, 255);
        assert_eq!(img.get_color(UPoint::new(0, 3)), Color::WHITE);
        assert_ne!(img.get_color(UPoint::new(0, 4)), Color::WHITE);
    }
}
