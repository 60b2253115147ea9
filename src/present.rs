//! Screen-space helpers and frame presentation
//!
//! The rasterizer draws into a low-resolution `Image`. These helpers project
//! view-space points onto that image and blow the finished frame up into an
//! RGBA8 buffer sized for the window.

use crate::rasterizer::{Color, Image, Real, UPoint, Vector3};

/// Perspective projection onto a `width` x `height` screen. Both screen axes
/// point opposite to the view axes, and z is carried through unchanged for
/// the depth test.
pub fn project_vertex(v: Vector3, width: u32, height: u32) -> Vector3 {
    let (w, h) = (Real::from_int(width as i32), Real::from_int(height as i32));
    let projection = w.min(-h);
    Vector3::new(
        v.x / v.z * projection + w / 2,
        v.y / v.z * projection + h / 2,
        v.z,
    )
}

/// True when the projected triangle winds clockwise on screen, the same
/// orientation the triangle rasterizer accepts.
pub fn is_front_facing(a: Vector3, b: Vector3, c: Vector3) -> bool {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x) > Real::ZERO
}

/// Scales a color by a light factor clamped to [0.5, 1].
pub fn shade_color(c: Color, light: Real) -> Color {
    let d = light.clamp(Real::ONE / 2, Real::ONE);
    let scale = |ch: u8| (ch as i32 * d).to_int().clamp(0, 255) as u8;
    Color::with_blend(scale(c.r), scale(c.g), scale(c.b), c.blend)
}

/// Largest whole-number scale of `src` that fits in `dst`, centered.
/// Returns `(x, y, width, height)` of the scaled frame.
pub fn fit_integer_scale(src: (u32, u32), dst: (u32, u32)) -> (u32, u32, u32, u32) {
    if src.0 == 0 || src.1 == 0 {
        return (0, 0, 0, 0);
    }
    let scale = (dst.0 / src.0).min(dst.1 / src.1).max(1);
    let (w, h) = (src.0 * scale, src.1 * scale);
    (dst.0.saturating_sub(w) / 2, dst.1.saturating_sub(h) / 2, w, h)
}

/// Nearest-neighbour upscale into a tightly packed RGBA8 buffer. Source
/// coordinates advance in 16.16 fixed point. An empty source yields a
/// transparent buffer.
pub fn upscale_rgba(src: &Image, out_width: u32, out_height: u32) -> Vec<u8> {
    let mut out = vec![0u8; (out_width as usize) * (out_height as usize) * 4];
    if src.is_empty() || out_width == 0 || out_height == 0 {
        return out;
    }

    let step_x = ((src.width() as u64) << 16) / out_width as u64;
    let step_y = ((src.height() as u64) << 16) / out_height as u64;

    let mut sy = 0u64;
    for row in out.chunks_exact_mut(out_width as usize * 4) {
        let y = (sy >> 16) as u32;
        let mut sx = 0u64;
        for px in row.chunks_exact_mut(4) {
            let c = src.get_color(UPoint::new((sx >> 16) as u32, y));
            px.copy_from_slice(&[c.r, c.g, c.b, 255]);
            sx += step_x;
        }
        sy += step_y;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::BlendMode;

    #[test]
    fn test_project_center_and_axes() {
        let p = project_vertex(Vector3::from_ints(0, 0, 1), 320, 240);
        assert_eq!(p, Vector3::from_ints(160, 120, 1));

        // projection scale is min(320, -240) = -240
        let p = project_vertex(Vector3::from_ints(1, 1, 2), 320, 240);
        assert_eq!(p.x.to_int(), 160 - 120);
        assert_eq!(p.y.to_int(), 120 - 120);
        assert_eq!(p.z, Real::from_int(2));
    }

    #[test]
    fn test_front_facing_winding() {
        let a = Vector3::from_ints(0, 0, 1);
        let b = Vector3::from_ints(10, 0, 1);
        let c = Vector3::from_ints(0, 10, 1);
        assert!(is_front_facing(a, b, c));
        assert!(!is_front_facing(a, c, b));
        assert!(!is_front_facing(a, a, c));
    }

    #[test]
    fn test_shade_clamps_light() {
        let c = Color::with_blend(200, 100, 50, BlendMode::Emissive);
        assert_eq!(shade_color(c, Real::from_int(2)), c);
        assert_eq!(shade_color(c, Real::ZERO), Color::with_blend(100, 50, 25, BlendMode::Emissive));
        assert_eq!(shade_color(c, -Real::ONE), shade_color(c, Real::ONE / 2));
    }

    #[test]
    fn test_fit_integer_scale() {
        assert_eq!(fit_integer_scale((320, 240), (960, 720)), (0, 0, 960, 720));
        assert_eq!(fit_integer_scale((320, 240), (1000, 800)), (20, 40, 960, 720));
        assert_eq!(fit_integer_scale((320, 240), (100, 100)), (0, 0, 320, 240));
        assert_eq!(fit_integer_scale((0, 240), (100, 100)), (0, 0, 0, 0));
    }

    #[test]
    fn test_upscale_repeats_pixels() {
        let mut img = Image::with_dimensions(2, 2);
        img.fill(Color::BLACK);
        img.set_color(UPoint::new(1, 0), Color::WHITE);
        let out = upscale_rgba(&img, 4, 4);
        assert_eq!(out.len(), 4 * 4 * 4);
        let at = |x: usize, y: usize| &out[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(at(2, 0), &[255, 255, 255, 255]);
        assert_eq!(at(3, 1), &[255, 255, 255, 255]);
        assert_eq!(at(1, 1)[3], 255);
        assert_ne!(at(1, 1)[0], 255);
        assert_ne!(at(2, 2)[0], 255);
    }

    #[test]
    fn test_upscale_empty_source() {
        let out = upscale_rgba(&Image::new(), 3, 2);
        assert_eq!(out, vec![0; 24]);
    }
}
