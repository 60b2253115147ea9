//! Tiled triangle loop
//!
//! Walks each bounding-box row in tiles of `LANES` horizontally adjacent
//! pixels. The lane types are plain arrays with per-lane loops and no target
//! intrinsics, so any parallelism is left to the optimizer. Tiles with no
//! covered lane are skipped as a whole, and only covered lanes are shaded.
//! Setup, coverage and shading are shared with the scalar path, so the output
//! is bit-identical.

use std::ops::{Add, AddAssign, BitAnd};

use super::image::Image;
use super::render::{shade_vertex_fragment, vertex_triangle, DepthBuffer, Target, Triangle};
use super::texture::Sampler;
use super::types::{RasterSettings, UPoint, Vertex};

/// Pixels per tile
pub const LANES: usize = 8;

/// One edge value per lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WideInt(pub [i64; LANES]);

/// One coverage flag per lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WideBool(pub [bool; LANES]);

impl WideInt {
    pub fn splat(v: i64) -> Self {
        WideInt([v; LANES])
    }

    /// `base + lane * step` in every lane.
    pub fn ramp(base: i64, step: i64) -> Self {
        WideInt(std::array::from_fn(|i| base + i as i64 * step))
    }

    pub fn ge_zero(self) -> WideBool {
        WideBool(self.0.map(|v| v >= 0))
    }
}

impl Add for WideInt {
    type Output = WideInt;
    fn add(self, r: WideInt) -> WideInt {
        WideInt(std::array::from_fn(|i| self.0[i] + r.0[i]))
    }
}

impl AddAssign for WideInt {
    fn add_assign(&mut self, r: WideInt) {
        *self = *self + r;
    }
}

impl WideBool {
    pub fn any(self) -> bool {
        self.0.iter().any(|&b| b)
    }

    /// Lanes `0..n` set, the rest clear.
    pub fn first(n: usize) -> Self {
        WideBool(std::array::from_fn(|i| i < n))
    }
}

impl BitAnd for WideBool {
    type Output = WideBool;
    fn bitand(self, r: WideBool) -> WideBool {
        WideBool(std::array::from_fn(|i| self.0[i] && r.0[i]))
    }
}

impl<const N: usize> Triangle<N> {
    /// Same traversal as `rasterize`, `LANES` pixels per step.
    pub(crate) fn rasterize_wide(&self, mut f: impl FnMut(UPoint, [i64; 3])) {
        let tile_step: [WideInt; 3] =
            std::array::from_fn(|i| WideInt::splat(self.step_x[i] * LANES as i64));
        let bias: [WideInt; 3] = self.bias.map(WideInt::splat);

        let mut row = self.origin;
        for y in self.min.y..=self.max.y {
            let mut e: [WideInt; 3] = std::array::from_fn(|i| WideInt::ramp(row[i], self.step_x[i]));
            let mut x0 = self.min.x;
            while x0 <= self.max.x {
                // lanes past the right edge of the box are masked off
                let remaining = (self.max.x - x0 + 1) as usize;
                let mask = (e[0] + bias[0]).ge_zero()
                    & (e[1] + bias[1]).ge_zero()
                    & (e[2] + bias[2]).ge_zero()
                    & WideBool::first(remaining);
                if mask.any() {
                    for lane in 0..LANES {
                        if mask.0[lane] {
                            let q = UPoint::new((x0 + lane as i32) as u32, y as u32);
                            f(q, [e[0].0[lane], e[1].0[lane], e[2].0[lane]]);
                        }
                    }
                }
                for i in 0..3 {
                    e[i] += tile_step[i];
                }
                x0 += LANES as i32;
            }
            for i in 0..3 {
                row[i] += self.step_y[i];
            }
        }
    }
}

/// Tiled variant of `draw_triangle` with identical output.
pub fn draw_triangle_wide(
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
    tri.rasterize_wide(|q, e| shade_vertex_fragment(&mut target, &tri, tex, q, e));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_and_mask() {
        let w = WideInt::ramp(-3, 1);
        assert_eq!(w.0[0], -3);
        assert_eq!(w.0[7], 4);
        let m = w.ge_zero();
        assert_eq!(m.0, [false, false, false, true, true, true, true, true]);
        let m = m & WideBool::first(5);
        assert_eq!(m.0, [false, false, false, true, true, false, false, false]);
        assert!(m.any());
        assert!(!WideBool::first(0).any());
    }

    #[test]
    fn test_add_is_lane_wise() {
        let mut w = WideInt::ramp(0, 2);
        w += WideInt::splat(10);
        assert_eq!(w.0, [10, 12, 14, 16, 18, 20, 22, 24]);
    }
}
