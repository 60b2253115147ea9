//! Core types for the rasterizer

use std::ops::{Index, IndexMut};
use serde::{Serialize, Deserialize};

use super::color::{Color, DitherKernel, SampleMode};
use super::math::{Vector2, Vector3};

/// Point in signed screen space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Point in unsigned surface space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UPoint {
    pub x: u32,
    pub y: u32,
}

impl UPoint {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Rectangle from `a` (inclusive) to `b` (exclusive) in signed space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub a: Point,
    pub b: Point,
}

impl Rect {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub const fn from_coords(ax: i32, ay: i32, bx: i32, by: i32) -> Self {
        Self { a: Point::new(ax, ay), b: Point::new(bx, by) }
    }

    /// Overlap of two rectangles. Empty (b <= a) when they do not intersect.
    pub fn clip(self, r: Rect) -> Rect {
        Rect {
            a: Point::new(self.a.x.max(r.a.x), self.a.y.max(r.a.y)),
            b: Point::new(self.b.x.min(r.b.x), self.b.y.min(r.b.y)),
        }
    }

    /// Signed extent, widened so any pair of i32 corners fits.
    pub fn width(&self) -> i64 {
        self.b.x as i64 - self.a.x as i64
    }

    pub fn height(&self) -> i64 {
        self.b.y as i64 - self.a.y as i64
    }

    pub fn is_empty(&self) -> bool {
        self.b.x <= self.a.x || self.b.y <= self.a.y
    }
}

impl From<URect> for Rect {
    fn from(r: URect) -> Self {
        let c = |v: u32| v.min(i32::MAX as u32) as i32;
        Rect::from_coords(c(r.a.x), c(r.a.y), c(r.b.x), c(r.b.y))
    }
}

/// Rectangle from `a` (inclusive) to `b` (exclusive) in unsigned space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct URect {
    pub a: UPoint,
    pub b: UPoint,
}

impl URect {
    pub const fn new(a: UPoint, b: UPoint) -> Self {
        Self { a, b }
    }

    pub const fn from_coords(ax: u32, ay: u32, bx: u32, by: u32) -> Self {
        Self { a: UPoint::new(ax, ay), b: UPoint::new(bx, by) }
    }

    /// Overlap of two rectangles. Empty (b <= a) when they do not intersect.
    pub fn clip(self, r: URect) -> URect {
        URect {
            a: UPoint::new(self.a.x.max(r.a.x), self.a.y.max(r.a.y)),
            b: UPoint::new(self.b.x.min(r.b.x), self.b.y.min(r.b.y)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.b.x <= self.a.x || self.b.y <= self.a.y
    }

    pub fn contains(&self, p: UPoint) -> bool {
        p.x >= self.a.x && p.x < self.b.x && p.y >= self.a.y && p.y < self.b.y
    }
}

/// Vertex with a flat color
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Screen x/y in pixels, z is positive view depth
    pub v: Vector3,
    /// Normalized texture coordinate
    pub t: Vector2,
    pub c: Color,
}

impl Vertex {
    pub fn new(v: Vector3, t: Vector2, c: Color) -> Self {
        Self { v, t, c }
    }
}

/// Vertex with a lightmap coordinate instead of a color
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LVertex {
    pub v: Vector3,
    pub t: Vector2,
    /// Normalized lightmap coordinate
    pub l: Vector2,
}

impl LVertex {
    pub fn new(v: Vector3, t: Vector2, l: Vector2) -> Self {
        Self { v, t, l }
    }
}

/// Fixed-length owned buffer with deep-copy semantics
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array<T> {
    items: Vec<T>,
}

impl<T: Clone + Default> Array<T> {
    pub fn new(len: usize) -> Self {
        Self { items: vec![T::default(); len] }
    }

    pub fn filled(len: usize, value: T) -> Self {
        Self { items: vec![value; len] }
    }

    /// Resizes to `len` elements. Contents are unspecified after a size change.
    pub fn create(&mut self, len: usize) {
        if len != self.items.len() {
            self.items = vec![T::default(); len];
        }
    }

    pub fn fill(&mut self, value: T) {
        self.items.iter_mut().for_each(|v| *v = value.clone());
    }
}

impl<T> Array<T> {
    pub fn from_vec(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn destroy(&mut self) {
        self.items = Vec::new();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.items.get(i)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Index<usize> for Array<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        &self.items[i]
    }
}

impl<T> IndexMut<usize> for Array<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.items[i]
    }
}

/// Rasterizer settings
#[derive(Debug, Clone)]
pub struct RasterSettings {
    /// Ordered-dither kernel applied before packing
    pub dither: DitherKernel,
    /// Texel lookup strategy for triangles and lines
    pub sample_mode: SampleMode,
    /// Optional mask rectangle; nothing outside it is written
    pub clip: Option<URect>,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            dither: DitherKernel::D2x2,
            sample_mode: SampleMode::Nearest,
            clip: None,
        }
    }
}
