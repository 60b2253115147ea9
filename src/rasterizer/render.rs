//! Core rendering functions
//! Points, lines and edge-function triangles with perspective-correct
//! interpolation, plus scaled blits between surfaces.
//!
//! Screen x/y come straight from the vertex position (truncated to whole
//! pixels). The vertex z is view depth: its reciprocal is interpolated in
//! screen space and every other attribute is premultiplied by it, so the
//! per-pixel divide recovers perspective-correct values.
//!
//! The depth buffer holds `1 / interpolated(1/z)`. A fragment passes when its
//! value is `<=` the stored one. The destination stencil doubles as a write
//! mask: `Transparent` pixels are never touched.

use super::color::{BlendMode, Color};
use super::ccc::CccTexture;
use super::image::Image;
use super::math::Vector2;
use super::overlay::Overlay;
use super::real::Real;
use super::texture::{bilinear, Sampler, Texture};
use super::types::{Array, LVertex, Point, RasterSettings, Rect, UPoint, URect, Vertex};

/// Per-pixel stored depth, row-major like the image it belongs to
pub type DepthBuffer = Array<Real>;

/// Depth buffer sized for `dst`, cleared to `+Inf` so the first fragment wins.
pub fn new_depth_buffer(dst: &Image) -> DepthBuffer {
    Array::filled((dst.width() * dst.height()) as usize, Real::inf())
}

/// Resets every entry to `+Inf`.
pub fn clear_depth_buffer(zbuf: &mut DepthBuffer) {
    zbuf.fill(Real::inf());
}

const WHITE_TEXEL: Color = Color::with_blend(255, 255, 255, BlendMode::Solid);

#[inline]
fn channel(x: Real) -> u8 {
    x.to_int().clamp(0, 255) as u8
}

#[inline]
fn saturate(t: i128) -> Real {
    Real::from_bits(t.clamp(Real::ninf_bits() as i128, Real::inf_bits() as i128) as i32)
}

/// Destination surface, optional depth buffer and write settings for one draw call
pub(crate) struct Target<'a> {
    dst: &'a mut Image,
    zbuf: Option<&'a mut DepthBuffer>,
    settings: &'a RasterSettings,
}

impl<'a> Target<'a> {
    pub(crate) fn new(
        dst: &'a mut Image,
        zbuf: Option<&'a mut DepthBuffer>,
        settings: &'a RasterSettings,
    ) -> Self {
        Self { dst, zbuf, settings }
    }

    pub(crate) fn settings(&self) -> &RasterSettings {
        self.settings
    }

    /// Inclusive pixel bounds after the mask rectangle, or `None` if nothing is writable.
    pub(crate) fn bounds(&self) -> Option<(Point, Point)> {
        let mut min = Point::new(0, 0);
        let mut max = Point::new(self.dst.width() as i32 - 1, self.dst.height() as i32 - 1);
        if let Some(clip) = self.settings.clip {
            let clip = Rect::from(clip);
            min.x = min.x.max(clip.a.x);
            min.y = min.y.max(clip.a.y);
            max.x = max.x.min(clip.b.x - 1);
            max.y = max.y.min(clip.b.y - 1);
        }
        if min.x > max.x || min.y > max.y {
            None
        } else {
            Some((min, max))
        }
    }

    #[inline]
    fn depth_index(&self, q: UPoint) -> usize {
        (q.x + q.y * self.dst.width()) as usize
    }

    /// Depth and stencil test for one fragment.
    #[inline]
    pub(crate) fn accepts(&self, q: UPoint, sz: Real) -> bool {
        let dz = match &self.zbuf {
            Some(z) => z[self.depth_index(q)],
            None => Real::inf(),
        };
        sz <= dz && self.dst.get_stencil(q) != BlendMode::Transparent
    }

    /// Composites `texel` modulated by `col` according to the texel's blend mode.
    pub(crate) fn write(&mut self, q: UPoint, sz: Real, texel: Color, col: Color) {
        let dither = self.settings.dither;
        match texel.blend {
            BlendMode::Solid => {
                self.dst.set_color(q, dither.apply(texel * col, q));
                self.write_depth(q, sz);
            }
            BlendMode::AddAlpha => {
                let c = self.dst.get_color(q) + texel * col;
                self.dst.set_color(q, dither.apply(c, q));
            }
            BlendMode::Emissive => {
                self.dst.set_color(q, texel);
                self.write_depth(q, sz);
            }
            BlendMode::EmissiveAddAlpha => {
                let c = self.dst.get_color(q) + texel;
                self.dst.set_color(q, dither.apply(c, q));
            }
            BlendMode::Transparent => {}
        }
    }

    #[inline]
    fn write_depth(&mut self, q: UPoint, sz: Real) {
        let i = self.depth_index(q);
        if let Some(z) = self.zbuf.as_deref_mut() {
            z[i] = sz;
        }
    }
}

fn sample_or_white(tex: Option<&dyn Sampler>, uv: Vector2, target: &Target, q: UPoint) -> Color {
    match tex {
        Some(t) => t.sample(uv, target.settings().sample_mode, q),
        None => WHITE_TEXEL,
    }
}

fn dimension_of(tex: Option<&dyn Sampler>) -> i32 {
    tex.map_or(1, |t| t.dimension() as i32)
}

/// 2D cross product of `b - a` and `p - a`.
#[inline]
pub(crate) fn edge_function(a: Point, b: Point, p: Point) -> i64 {
    (b.x as i64 - a.x as i64) * (p.y as i64 - a.y as i64)
        - (b.y as i64 - a.y as i64) * (p.x as i64 - a.x as i64)
}

/// Top edges run left to right horizontally, left edges run upward in
/// screen space. Tied to the clockwise (positive area) winding.
#[inline]
pub(crate) fn is_top_left(a: Point, b: Point) -> bool {
    (a.x < b.x && a.y == b.y) || a.y > b.y
}

/// Edge-function state shared by the scalar and wide triangle loops.
/// `N` attributes are carried per vertex, already premultiplied by `w`.
pub(crate) struct Triangle<const N: usize> {
    w: [Real; 3],
    attrs: [[Real; 3]; N],
    area2: i64,
    pub(crate) min: Point,
    pub(crate) max: Point,
    /// Unbiased edge values at `min`
    pub(crate) origin: [i64; 3],
    pub(crate) step_x: [i64; 3],
    pub(crate) step_y: [i64; 3],
    /// -1 on edges that do not own their boundary pixels
    pub(crate) bias: [i64; 3],
}

impl<const N: usize> Triangle<N> {
    /// Clips the bounding box and prepares the edge functions.
    /// Returns `None` for empty boxes and back-facing or degenerate triangles.
    pub(crate) fn setup(
        bounds: (Point, Point),
        p: [Point; 3],
        w: [Real; 3],
        attrs: [[Real; 3]; N],
    ) -> Option<Self> {
        let (lo, hi) = bounds;

        // AABB clipped to the writable bounds
        let min_y = p[0].y.min(p[1].y).min(p[2].y).max(lo.y);
        let max_y = p[0].y.max(p[1].y).max(p[2].y).min(hi.y);
        let min_x = p[0].x.min(p[1].x).min(p[2].x).max(lo.x);
        let max_x = p[0].x.max(p[1].x).max(p[2].x).min(hi.x);
        if min_x > max_x || min_y > max_y {
            return None;
        }

        let area2 = edge_function(p[0], p[1], p[2]);
        if area2 <= 0 {
            return None;
        }

        let min = Point::new(min_x, min_y);
        let (a, b, c) = (p[0], p[1], p[2]);
        let edges = [(b, c), (c, a), (a, b)];
        let origin = edges.map(|(s, e)| edge_function(s, e, min));
        let step_x = edges.map(|(s, e)| s.y as i64 - e.y as i64);
        let step_y = edges.map(|(s, e)| e.x as i64 - s.x as i64);
        let bias = edges.map(|(s, e)| if is_top_left(s, e) { 0 } else { -1 });

        Some(Self {
            w,
            attrs,
            area2,
            min,
            max: Point::new(max_x, max_y),
            origin,
            step_x,
            step_y,
            bias,
        })
    }

    /// Barycentric blend of three vertex values, exact in a wide intermediate.
    #[inline]
    fn blend(&self, v: [Real; 3], e: [i64; 3]) -> Real {
        if v.iter().any(|x| x.is_nan()) {
            return Real::nan();
        }
        let sum: i128 = (0..3).map(|i| v[i].to_bits() as i128 * e[i] as i128).sum();
        saturate(sum / self.area2 as i128)
    }

    #[inline]
    pub(crate) fn covers(&self, e: [i64; 3]) -> bool {
        ((e[0] + self.bias[0]) | (e[1] + self.bias[1]) | (e[2] + self.bias[2])) >= 0
    }

    /// Reciprocal of the interpolated `w`, the value stored in the depth buffer.
    #[inline]
    pub(crate) fn depth(&self, e: [i64; 3]) -> Real {
        self.blend(self.w, e).recip()
    }

    /// Perspective-corrected attributes at the pixel with edge values `e`.
    #[inline]
    pub(crate) fn attributes(&self, e: [i64; 3], sz: Real) -> [Real; N] {
        self.attrs.map(|v| self.blend(v, e) * sz)
    }

    /// Calls `f` for every covered pixel with its unbiased edge values.
    pub(crate) fn rasterize(&self, mut f: impl FnMut(UPoint, [i64; 3])) {
        let mut row = self.origin;
        for y in self.min.y..=self.max.y {
            let mut e = row;
            for x in self.min.x..=self.max.x {
                if self.covers(e) {
                    f(UPoint::new(x as u32, y as u32), e);
                }
                for i in 0..3 {
                    e[i] += self.step_x[i];
                }
            }
            for i in 0..3 {
                row[i] += self.step_y[i];
            }
        }
    }
}

/// Interpolated attributes of a flat-colored triangle: texel u, v and r, g, b.
pub(crate) const VERTEX_ATTRS: usize = 5;

/// Interpolated attributes of a lightmapped triangle: texel u, v and lightmap u, v.
pub(crate) const LVERTEX_ATTRS: usize = 4;

#[inline]
fn screen_point(v: &Vertex) -> Point {
    Point::new(v.v.x.trunc(), v.v.y.trunc())
}

/// Perspective-divides a vertex into `(w, [u, v, r, g, b] * w)`.
fn premultiply(v: &Vertex, dim: i32) -> (Real, [Real; VERTEX_ATTRS]) {
    let w = v.v.z.recip();
    (
        w,
        [
            v.t.x * dim * w,
            v.t.y * dim * w,
            Real::from_int(v.c.r as i32) * w,
            Real::from_int(v.c.g as i32) * w,
            Real::from_int(v.c.b as i32) * w,
        ],
    )
}

fn transpose<const N: usize>(v: [[Real; N]; 3]) -> [[Real; 3]; N] {
    std::array::from_fn(|i| [v[0][i], v[1][i], v[2][i]])
}

pub(crate) fn vertex_triangle(
    target: &Target,
    a: &Vertex,
    b: &Vertex,
    c: &Vertex,
    tex: Option<&dyn Sampler>,
) -> Option<Triangle<VERTEX_ATTRS>> {
    let bounds = target.bounds()?;
    let dim = dimension_of(tex);
    let (wa, ta) = premultiply(a, dim);
    let (wb, tb) = premultiply(b, dim);
    let (wc, tc) = premultiply(c, dim);
    Triangle::setup(
        bounds,
        [screen_point(a), screen_point(b), screen_point(c)],
        [wa, wb, wc],
        transpose([ta, tb, tc]),
    )
}

/// Depth test, color reconstruction and blend for one covered pixel.
pub(crate) fn shade_vertex_fragment(
    target: &mut Target,
    tri: &Triangle<VERTEX_ATTRS>,
    tex: Option<&dyn Sampler>,
    q: UPoint,
    e: [i64; 3],
) {
    let sz = tri.depth(e);
    if !target.accepts(q, sz) {
        return;
    }
    let [u, v, r, g, b] = tri.attributes(e, sz);
    let col = Color::new(channel(r), channel(g), channel(b));
    let texel = sample_or_white(tex, Vector2::new(u, v), target, q);
    target.write(q, sz, texel, col);
}

/// Draws a single vertex. The stored depth is the vertex z itself.
pub fn draw_point(
    dst: &mut Image,
    zbuf: Option<&mut DepthBuffer>,
    a: &Vertex,
    tex: Option<&dyn Sampler>,
    settings: &RasterSettings,
) {
    let mut target = Target::new(dst, zbuf, settings);
    let Some((min, max)) = target.bounds() else { return };
    let p = screen_point(a);
    if p.x < min.x || p.y < min.y || p.x > max.x || p.y > max.y {
        return;
    }

    let q = UPoint::new(p.x as u32, p.y as u32);
    let sz = a.v.z;
    if target.accepts(q, sz) {
        let uv = a.t * dimension_of(tex);
        let texel = sample_or_white(tex, uv, &target, q);
        target.write(q, sz, texel, a.c);
    }
}

/// First and last step index whose position can land inside `[lo, hi]`.
/// Conservative by one pixel; the loop still checks every position.
fn visible_steps(start: Real, inc: Real, lo: i32, hi: i32, steps: i32) -> Option<(i32, i32)> {
    let one = Real::ONE.to_bits() as i64;
    let lo = (lo as i64 - 1) * one;
    let hi = (hi as i64 + 1) * one;
    let s = start.to_bits() as i64;
    let d = inc.to_bits() as i64;
    let (first, last) = if d == 0 {
        if s < lo || s > hi {
            return None;
        }
        (0, steps as i64)
    } else if d > 0 {
        ((lo - s).div_euclid(d), (hi - s).div_euclid(d) + 1)
    } else {
        ((hi - s).div_euclid(d), (lo - s).div_euclid(d) + 1)
    };
    let first = first.max(0);
    let last = last.min(steps as i64);
    if first > last {
        None
    } else {
        Some((first as i32, last as i32))
    }
}

/// DDA line between two vertices. Attributes step linearly in screen space
/// and are divided by the interpolated `w` once per pixel.
pub fn draw_line(
    dst: &mut Image,
    zbuf: Option<&mut DepthBuffer>,
    a: &Vertex,
    b: &Vertex,
    tex: Option<&dyn Sampler>,
    settings: &RasterSettings,
) {
    let mut target = Target::new(dst, zbuf, settings);
    let Some((min, max)) = target.bounds() else { return };

    let dim = dimension_of(tex);
    let (pa, pb) = (screen_point(a), screen_point(b));
    let (wa, ta) = premultiply(a, dim);
    let (wb, tb) = premultiply(b, dim);

    // Majority axis decides the step count
    let dx = pb.x - pa.x;
    let dy = pb.y - pa.y;
    let steps = dx.abs().max(dy.abs());
    let n = steps.max(1);

    // Start and increment of x, y, w, u, v, r, g, b
    let start: [Real; 8] = [
        Real::from_int(pa.x), Real::from_int(pa.y), wa,
        ta[0], ta[1], ta[2], ta[3], ta[4],
    ];
    let end: [Real; 8] = [
        Real::from_int(pb.x), Real::from_int(pb.y), wb,
        tb[0], tb[1], tb[2], tb[3], tb[4],
    ];
    let inc: [Real; 8] = std::array::from_fn(|i| (end[i] - start[i]) / n);

    // Skip straight to the part of the line that can be visible
    let Some((fx, lx)) = visible_steps(start[0], inc[0], min.x, max.x, steps) else { return };
    let Some((fy, ly)) = visible_steps(start[1], inc[1], min.y, max.y, steps) else { return };
    let first = fx.max(fy);
    let last = lx.min(ly);
    if first > last {
        return;
    }

    let mut cur: [Real; 8] = std::array::from_fn(|i| start[i] + inc[i] * first);
    for _ in first..=last {
        let [x, y, w, u, v, r, g, bl] = cur;
        let p = Point::new(x.trunc(), y.trunc());
        if p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y {
            let q = UPoint::new(p.x as u32, p.y as u32);
            let sz = w.recip();
            if target.accepts(q, sz) {
                let col = Color::new(channel(r * sz), channel(g * sz), channel(bl * sz));
                let texel = sample_or_white(tex, Vector2::new(u * sz, v * sz), &target, q);
                target.write(q, sz, texel, col);
            }
        }
        for i in 0..8 {
            cur[i] += inc[i];
        }
    }
}

/// Edge-function triangle with per-vertex colors and an optional texture.
/// Only clockwise triangles (positive screen-space area) are drawn.
pub fn draw_triangle(
    dst: &mut Image,
    zbuf: Option<&mut DepthBuffer>,
    a: &Vertex,
    b: &Vertex,
    c: &Vertex,
    tex: Option<&dyn Sampler>,
    settings: &RasterSettings,
) {
    let mut target = Target::new(dst, zbuf, settings);
    let Some(tri) = vertex_triangle(&target, a, b, c, tex) else { return };
    tri.rasterize(|q, e| shade_vertex_fragment(&mut target, &tri, tex, q, e));
}

/// Triangle whose color comes from a bilinearly sampled lightmap instead of
/// vertex colors. An empty lightmap lights everything fully.
pub fn draw_lightmap_triangle(
    dst: &mut Image,
    zbuf: Option<&mut DepthBuffer>,
    a: &LVertex,
    b: &LVertex,
    c: &LVertex,
    tex: Option<&dyn Sampler>,
    lightmap: &dyn Sampler,
    settings: &RasterSettings,
) {
    let mut target = Target::new(dst, zbuf, settings);
    let Some(bounds) = target.bounds() else { return };

    let dim = dimension_of(tex);
    let ldim = lightmap.dimension() as i32;
    let convert = |v: &LVertex| {
        let w = v.v.z.recip();
        (w, [v.t.x * dim * w, v.t.y * dim * w, v.l.x * ldim * w, v.l.y * ldim * w])
    };
    let (wa, ta) = convert(a);
    let (wb, tb) = convert(b);
    let (wc, tc) = convert(c);
    let p = |v: &LVertex| Point::new(v.v.x.trunc(), v.v.y.trunc());
    let Some(tri) = Triangle::<LVERTEX_ATTRS>::setup(
        bounds,
        [p(a), p(b), p(c)],
        [wa, wb, wc],
        transpose([ta, tb, tc]),
    ) else {
        return;
    };

    tri.rasterize(|q, e| {
        let sz = tri.depth(e);
        if !target.accepts(q, sz) {
            return;
        }
        let [u, v, lu, lv] = tri.attributes(e, sz);
        let light = if ldim == 0 {
            WHITE_TEXEL
        } else {
            bilinear(lightmap, Vector2::new(lu, lv))
        };
        let texel = sample_or_white(tex, Vector2::new(u, v), &target, q);
        target.write(q, sz, texel, light);
    });
}

/// Any surface `draw_region` can read from
pub trait RegionSource {
    fn region_width(&self) -> u32;
    fn region_height(&self) -> u32;
    /// Color at an in-bounds coordinate.
    fn region_color(&self, p: UPoint) -> Color;
}

impl RegionSource for Image {
    fn region_width(&self) -> u32 {
        self.width()
    }

    fn region_height(&self) -> u32 {
        self.height()
    }

    fn region_color(&self, p: UPoint) -> Color {
        self.get_color(p)
    }
}

impl RegionSource for Texture {
    fn region_width(&self) -> u32 {
        self.width()
    }

    fn region_height(&self) -> u32 {
        self.height()
    }

    fn region_color(&self, p: UPoint) -> Color {
        self.get_color(p)
    }
}

impl RegionSource for CccTexture {
    fn region_width(&self) -> u32 {
        self.width()
    }

    fn region_height(&self) -> u32 {
        self.height()
    }

    fn region_color(&self, p: UPoint) -> Color {
        self.get_color(p)
    }
}

impl RegionSource for Overlay {
    fn region_width(&self) -> u32 {
        self.width()
    }

    fn region_height(&self) -> u32 {
        self.height()
    }

    fn region_color(&self, p: UPoint) -> Color {
        self.get_color(p)
    }
}

/// Maps an offset inside a destination span onto the source span. Both spans
/// reach 2^32, so the product is taken in i128.
fn scale_offset(offset: i64, src_span: i64, dst_span: i64) -> i64 {
    (offset as i128 * src_span as i128 / dst_span as i128) as i64
}

/// Nearest-neighbour scaled blit of `src_rect` onto `dst_rect`.
///
/// A destination rectangle with `b < a` on an axis mirrors the copy on that
/// axis. Writes happen only where both the source color and the destination
/// pixel carry a set stencil bit. No dithering is applied.
pub fn draw_region<S: RegionSource + ?Sized>(
    dst: &mut Image,
    dst_rect: Rect,
    src: &S,
    src_rect: Rect,
    clip: Option<URect>,
) {
    let mut drect = dst_rect;
    let flip_x = drect.b.x < drect.a.x;
    if flip_x {
        std::mem::swap(&mut drect.a.x, &mut drect.b.x);
    }
    let flip_y = drect.b.y < drect.a.y;
    if flip_y {
        std::mem::swap(&mut drect.a.y, &mut drect.b.y);
    }

    let (dst_w, dst_h) = (drect.width(), drect.height());
    let (src_w, src_h) = (src_rect.width(), src_rect.height());
    if dst_w <= 0 || dst_h <= 0 || src_w <= 0 || src_h <= 0 {
        return;
    }

    let mut visible = drect.clip(Rect::from(dst.bounds()));
    if let Some(clip) = clip {
        visible = visible.clip(Rect::from(clip));
    }
    if visible.is_empty() {
        return;
    }

    let (sw, sh) = (src.region_width() as i64, src.region_height() as i64);
    for y in visible.a.y..visible.b.y {
        let mut ry = y as i64 - drect.a.y as i64;
        if flip_y {
            ry = dst_h - 1 - ry;
        }
        let sy = src_rect.a.y as i64 + scale_offset(ry, src_h, dst_h);
        if sy < 0 || sy >= sh {
            continue;
        }
        for x in visible.a.x..visible.b.x {
            let mut rx = x as i64 - drect.a.x as i64;
            if flip_x {
                rx = dst_w - 1 - rx;
            }
            let sx = src_rect.a.x as i64 + scale_offset(rx, src_w, dst_w);
            if sx < 0 || sx >= sw {
                continue;
            }
            let c = src.region_color(UPoint::new(sx as u32, sy as u32));
            let q = UPoint::new(x as u32, y as u32);
            if c.blend.stencil_bit() & dst.get_stencil(q).stencil_bit() != 0 {
                dst.set_color(q, c);
            }
        }
    }
}

/// Copies an overlay 1:1 with its top-left corner at `p`. Bits mapped to a
/// transparent color leave the destination untouched.
pub fn draw_overlay(dst: &mut Image, p: Point, overlay: &Overlay, clip: Option<URect>) {
    let w = overlay.width() as i32;
    let h = overlay.height() as i32;
    draw_region(
        dst,
        Rect::from_coords(p.x, p.y, p.x.saturating_add(w), p.y.saturating_add(h)),
        overlay,
        Rect::from_coords(0, 0, w, h),
        clip,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::color::DitherKernel;
    use crate::rasterizer::math::Vector3;

    fn vertex(x: i32, y: i32, z: i32, c: Color) -> Vertex {
        Vertex::new(Vector3::from_ints(x, y, z), Vector2::default(), c)
    }

    fn black(w: u32, h: u32) -> Image {
        let mut img = Image::with_dimensions(w, h);
        img.fill(Color::BLACK);
        img
    }

    fn stored(c: Color) -> Color {
        Image::decode_pixel(Image::encode_pixel(c))
    }

    fn plain() -> RasterSettings {
        RasterSettings { dither: DitherKernel::None, ..Default::default() }
    }

    fn count(img: &Image, c: Color) -> usize {
        let mut n = 0;
        for y in 0..img.height() {
            for x in 0..img.width() {
                n += (img.get_color(UPoint::new(x, y)) == c) as usize;
            }
        }
        n
    }

    #[test]
    fn test_edge_function_sign() {
        let a = Point::new(0, 0);
        let b = Point::new(8, 0);
        assert!(edge_function(a, b, Point::new(4, 4)) > 0);
        assert!(edge_function(a, b, Point::new(4, -4)) < 0);
        assert_eq!(edge_function(a, b, Point::new(2, 0)), 0);
    }

    #[test]
    fn test_top_left_classification() {
        // top edge
        assert!(is_top_left(Point::new(0, 0), Point::new(8, 0)));
        // left edge (upward)
        assert!(is_top_left(Point::new(0, 8), Point::new(0, 0)));
        // right and bottom edges
        assert!(!is_top_left(Point::new(8, 0), Point::new(8, 8)));
        assert!(!is_top_left(Point::new(8, 8), Point::new(0, 8)));
    }

    #[test]
    fn test_triangle_fill_convention() {
        let mut img = black(16, 16);
        let (a, b, c) = (
            vertex(0, 0, 1, Color::WHITE),
            vertex(8, 0, 1, Color::WHITE),
            vertex(0, 8, 1, Color::WHITE),
        );
        draw_triangle(&mut img, None, &a, &b, &c, None, &plain());
        // the top and left edges are included, the diagonal is not
        assert_eq!(img.get_color(UPoint::new(0, 0)), Color::WHITE);
        assert_eq!(img.get_color(UPoint::new(7, 0)), Color::WHITE);
        assert_ne!(img.get_color(UPoint::new(8, 0)), Color::WHITE);
        assert_ne!(img.get_color(UPoint::new(4, 4)), Color::WHITE);
        assert_eq!(count(&img, Color::WHITE), (1..=8).sum::<usize>());
    }

    #[test]
    fn test_counter_clockwise_is_culled() {
        let mut img = black(16, 16);
        let (a, b, c) = (
            vertex(0, 0, 1, Color::WHITE),
            vertex(0, 8, 1, Color::WHITE),
            vertex(8, 0, 1, Color::WHITE),
        );
        draw_triangle(&mut img, None, &a, &b, &c, None, &plain());
        assert_eq!(count(&img, Color::WHITE), 0);
    }

    #[test]
    fn test_transparent_destination_is_masked() {
        let mut img = black(16, 16);
        img.clear_stencil(URect::from_coords(0, 0, 2, 16), BlendMode::Transparent);
        let (a, b, c) = (
            vertex(0, 0, 1, Color::WHITE),
            vertex(8, 0, 1, Color::WHITE),
            vertex(0, 8, 1, Color::WHITE),
        );
        draw_triangle(&mut img, None, &a, &b, &c, None, &plain());
        assert_eq!(img.get_stencil(UPoint::new(0, 0)), BlendMode::Transparent);
        assert_ne!(img.get_color(UPoint::new(1, 1)).r, 255);
        assert_eq!(img.get_color(UPoint::new(2, 2)), Color::WHITE);
    }

    #[test]
    fn test_clip_rect_limits_writes() {
        let mut img = black(16, 16);
        let settings = RasterSettings {
            clip: Some(URect::from_coords(2, 2, 4, 4)),
            ..plain()
        };
        let (a, b, c) = (
            vertex(0, 0, 1, Color::WHITE),
            vertex(16, 0, 1, Color::WHITE),
            vertex(0, 16, 1, Color::WHITE),
        );
        draw_triangle(&mut img, None, &a, &b, &c, None, &settings);
        assert_eq!(count(&img, Color::WHITE), 4);
    }

    #[test]
    fn test_depth_keeps_nearest() {
        let mut img = black(16, 16);
        let mut zbuf = new_depth_buffer(&img);
        let quad = |z: i32, c: Color| {
            [vertex(0, 0, z, c), vertex(16, 0, z, c), vertex(0, 16, z, c)]
        };
        let near = quad(2, Color::RED);
        let far = quad(8, Color::BLUE);
        draw_triangle(&mut img, Some(&mut zbuf), &near[0], &near[1], &near[2], None, &plain());
        draw_triangle(&mut img, Some(&mut zbuf), &far[0], &far[1], &far[2], None, &plain());
        assert_eq!(img.get_color(UPoint::new(1, 1)), stored(Color::RED));
        assert_eq!(zbuf[1 + 16], Real::from_int(2));
    }

    #[test]
    fn test_vertex_colors_interpolate() {
        let mut img = black(32, 32);
        let (a, b, c) = (
            vertex(0, 0, 1, Color::new(0, 0, 0)),
            vertex(32, 0, 1, Color::new(255, 0, 0)),
            vertex(0, 32, 1, Color::new(0, 0, 0)),
        );
        draw_triangle(&mut img, None, &a, &b, &c, None, &plain());
        let left = img.get_color(UPoint::new(1, 1)).r;
        let right = img.get_color(UPoint::new(20, 1)).r;
        assert!(left < right, "{} < {}", left, right);
    }

    #[test]
    fn test_textured_triangle_samples_texels() {
        let tex = Texture::checkerboard(2, 1, Color::RED, Color::BLUE);
        let mut img = black(8, 8);
        let mk = |x: i32, y: i32, u: i32, v: i32| {
            Vertex::new(Vector3::from_ints(x, y, 1), Vector2::from_ints(u, v), Color::WHITE)
        };
        let (a, b, c) = (mk(0, 0, 0, 0), mk(8, 0, 1, 0), mk(0, 8, 0, 1));
        draw_triangle(&mut img, None, &a, &b, &c, Some(&tex), &plain());
        assert_eq!(img.get_color(UPoint::new(1, 1)), stored(Color::RED));
        assert_eq!(img.get_color(UPoint::new(5, 1)), stored(Color::BLUE));
    }

    #[test]
    fn test_add_alpha_does_not_write_depth() {
        let mut tex = Texture::with_dimension(1);
        tex.set_blend_modes([BlendMode::AddAlpha, BlendMode::AddAlpha]);
        tex.set_color(UPoint::new(0, 0), Color::new(64, 0, 0));
        let mut img = black(4, 4);
        let mut zbuf = new_depth_buffer(&img);
        let a = Vertex::new(Vector3::from_ints(1, 1, 3), Vector2::default(), Color::WHITE);
        draw_point(&mut img, Some(&mut zbuf), &a, Some(&tex), &plain());
        draw_point(&mut img, Some(&mut zbuf), &a, Some(&tex), &plain());
        assert!(zbuf[1 + 4].is_inf());
        assert!(img.get_color(UPoint::new(1, 1)).r > 64);
    }

    #[test]
    fn test_point_depth_and_bounds() {
        let mut img = black(4, 4);
        let mut zbuf = new_depth_buffer(&img);
        draw_point(&mut img, Some(&mut zbuf), &vertex(2, 2, 5, Color::RED), None, &plain());
        draw_point(&mut img, Some(&mut zbuf), &vertex(2, 2, 9, Color::BLUE), None, &plain());
        draw_point(&mut img, Some(&mut zbuf), &vertex(9, 2, 1, Color::BLUE), None, &plain());
        assert_eq!(img.get_color(UPoint::new(2, 2)), stored(Color::RED));
        assert_eq!(zbuf[2 + 2 * 4], Real::from_int(5));
        assert_eq!(count(&img, stored(Color::BLUE)), 0);
    }

    #[test]
    fn test_line_covers_every_step() {
        let mut img = black(16, 16);
        draw_line(
            &mut img,
            None,
            &vertex(1, 1, 1, Color::WHITE),
            &vertex(12, 5, 1, Color::WHITE),
            None,
            &plain(),
        );
        assert_eq!(count(&img, Color::WHITE), 12);
        assert_eq!(img.get_color(UPoint::new(1, 1)), Color::WHITE);
        // y steps by 4/11, which rounds down in fixed point
        assert_eq!(img.get_color(UPoint::new(12, 4)), Color::WHITE);
    }

    #[test]
    fn test_line_clipped_matches_unclipped_inside() {
        let settings = RasterSettings {
            clip: Some(URect::from_coords(4, 0, 10, 16)),
            ..plain()
        };
        let a = vertex(-20, 3, 1, Color::WHITE);
        let b = vertex(30, 11, 1, Color::WHITE);

        let mut full = black(16, 16);
        draw_line(&mut full, None, &a, &b, None, &plain());
        let mut clipped = black(16, 16);
        draw_line(&mut clipped, None, &a, &b, None, &settings);

        for y in 0..16 {
            for x in 0..16 {
                let p = UPoint::new(x, y);
                let expected = if (4..10).contains(&x) { full.get_color(p) } else { stored(Color::BLACK) };
                assert_eq!(clipped.get_color(p), expected, "({}, {})", x, y);
            }
        }
        assert!(count(&clipped, Color::WHITE) > 0);
    }

    #[test]
    fn test_line_off_screen_draws_nothing() {
        let mut img = black(8, 8);
        draw_line(
            &mut img,
            None,
            &vertex(-10, -5, 1, Color::WHITE),
            &vertex(-2, -9, 1, Color::WHITE),
            None,
            &plain(),
        );
        assert_eq!(count(&img, Color::WHITE), 0);
    }

    #[test]
    fn test_lightmap_modulates_texture() {
        let mut lightmap = Texture::with_dimension(2);
        for y in 0..2 {
            for x in 0..2 {
                lightmap.set_color(UPoint::new(x, y), Color::new(255, 0, 0));
            }
        }
        let mut img = black(8, 8);
        let mk = |x: i32, y: i32| {
            LVertex::new(Vector3::from_ints(x, y, 1), Vector2::default(), Vector2::default())
        };
        draw_lightmap_triangle(
            &mut img, None, &mk(0, 0), &mk(8, 0), &mk(0, 8), None, &lightmap, &plain(),
        );
        assert_eq!(img.get_color(UPoint::new(1, 1)), stored(Color::RED));
    }

    #[test]
    fn test_region_upscale_and_mirror() {
        let tex = Texture::checkerboard(2, 1, Color::WHITE, Color::RED);
        let mut img = black(4, 4);
        draw_region(&mut img, Rect::from_coords(0, 0, 4, 4), &tex, Rect::from_coords(0, 0, 2, 2), None);
        assert_eq!(img.get_color(UPoint::new(1, 1)), Color::WHITE);
        assert_eq!(img.get_color(UPoint::new(2, 1)), stored(Color::RED));

        let mut mirrored = black(4, 4);
        draw_region(&mut mirrored, Rect::from_coords(4, 0, 0, 4), &tex, Rect::from_coords(0, 0, 2, 2), None);
        assert_eq!(mirrored.get_color(UPoint::new(1, 1)), stored(Color::RED));
        assert_eq!(mirrored.get_color(UPoint::new(2, 1)), Color::WHITE);
    }

    #[test]
    fn test_region_spanning_full_i32_range() {
        let tex = Texture::checkerboard(2, 1, Color::WHITE, Color::RED);
        let mut img = black(4, 4);
        draw_region(
            &mut img,
            Rect::from_coords(i32::MIN, 0, i32::MAX, 4),
            &tex,
            Rect::from_coords(0, 0, 2, 2),
            None,
        );
        // the visible columns all sit just past the midpoint, inside texel x = 1
        assert_eq!(img.get_color(UPoint::new(0, 0)), stored(Color::RED));
        assert_eq!(img.get_color(UPoint::new(3, 2)), Color::WHITE);

        let mut mirrored = black(4, 4);
        draw_region(
            &mut mirrored,
            Rect::from_coords(i32::MAX, i32::MAX, i32::MIN, i32::MIN),
            &tex,
            Rect::from_coords(0, 0, 2, 2),
            None,
        );
        assert_eq!(mirrored.get_color(UPoint::new(0, 0)), Color::WHITE);
    }

    #[test]
    fn test_region_respects_stencils() {
        let mut src = Image::with_dimension(2);
        src.fill(Color::WHITE);
        src.set_stencil(UPoint::new(0, 0), BlendMode::Transparent);
        let mut img = black(2, 2);
        img.set_stencil(UPoint::new(1, 1), BlendMode::Transparent);
        draw_region(&mut img, Rect::from_coords(0, 0, 2, 2), &src, Rect::from_coords(0, 0, 2, 2), None);
        assert_eq!(img.get_color(UPoint::new(0, 0)), stored(Color::BLACK));
        assert_eq!(img.get_color(UPoint::new(1, 0)), Color::WHITE);
        assert_ne!(img.get_color(UPoint::new(1, 1)).r, 255);
    }

    #[test]
    fn test_overlay_blit() {
        let mut overlay = Overlay::with_dimensions(3, 3);
        overlay.set_bit(UPoint::new(1, 1), true);
        let mut img = black(8, 8);
        draw_overlay(&mut img, Point::new(-1, 2), &overlay, None);
        assert_eq!(img.get_color(UPoint::new(0, 3)), Color::WHITE);
        assert_eq!(count(&img, Color::WHITE), 1);
    }
}
