//! Caret-based HUD text writer

use std::fmt::Display;

use crate::rasterizer::{
    draw_char, glyph_extent, BlendMode, Color, Image, Point, Real, URect, CHAR_HEIGHT, CHAR_WIDTH,
};

/// Writes text left to right from a caret, optionally with an
/// inverted-color drop shadow one pixel down and right.
#[derive(Debug, Clone)]
pub struct TextWriter {
    caret: Point,
    origin: Point,
    color: Color,
    shadow_color: Color,
    shadow: bool,
    scale: u32,
    clip: Option<URect>,
}

impl Default for TextWriter {
    fn default() -> Self {
        let color = Color::with_blend(255, 255, 255, BlendMode::Emissive);
        Self {
            caret: Point::default(),
            origin: Point::default(),
            color,
            shadow_color: color.inverted(),
            shadow: true,
            scale: 1,
            clip: None,
        }
    }
}

impl TextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the caret and makes the new position the line origin.
    pub fn set_caret(&mut self, caret: Point) -> &mut Self {
        self.caret = caret;
        self.origin = caret;
        self
    }

    pub fn caret(&self) -> Point {
        self.caret
    }

    pub fn reset_caret(&mut self) -> &mut Self {
        self.caret = self.origin;
        self
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self.shadow_color = color.inverted();
        self
    }

    pub fn set_shadow(&mut self, enabled: bool) -> &mut Self {
        self.shadow = enabled;
        self
    }

    pub fn set_scale(&mut self, scale: u32) -> &mut Self {
        self.scale = scale.max(1);
        self
    }

    pub fn set_clip(&mut self, clip: Option<URect>) -> &mut Self {
        self.clip = clip;
        self
    }

    pub fn write(&mut self, dst: &mut Image, text: &str) -> &mut Self {
        let advance = glyph_extent(CHAR_WIDTH, self.scale, 1);
        let line = glyph_extent(CHAR_HEIGHT, self.scale, 1);
        for ch in text.chars() {
            match ch {
                '\n' | '\r' => {
                    self.caret = Point::new(self.origin.x, self.caret.y.saturating_add(line));
                    continue;
                }
                ' ' | '\t' => {}
                _ => {
                    if self.shadow {
                        let offset = self.scale.min(i32::MAX as u32) as i32;
                        let p = Point::new(
                            self.caret.x.saturating_add(offset),
                            self.caret.y.saturating_add(offset),
                        );
                        draw_char(dst, p, ch, self.shadow_color, self.scale, self.clip);
                    }
                    draw_char(dst, self.caret, ch, self.color, self.scale, self.clip);
                }
            }
            self.caret.x = self.caret.x.saturating_add(advance);
        }
        self
    }

    pub fn write_int(&mut self, dst: &mut Image, num: i32) -> &mut Self {
        self.write_value(dst, num)
    }

    pub fn write_real(&mut self, dst: &mut Image, num: Real) -> &mut Self {
        self.write_value(dst, num)
    }

    fn write_value(&mut self, dst: &mut Image, value: impl Display) -> &mut Self {
        self.write(dst, &value.to_string())
    }
}
