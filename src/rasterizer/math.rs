//! Vector and matrix math over fixed-point `Real`
//!
//! Matrices are row-major. Products are computed as `l * transpose(r)` so
//! every element is a row dot product, and vectors multiply from the left
//! (`v * m`). Rotation builders use the fixed-point `sin`/`cos`, so results
//! are identical on every platform.

use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Serialize, Deserialize};

use super::real::{cos, sin, sqrt, Real};

/// 2D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: Real,
    pub y: Real,
}

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: Real,
    pub y: Real,
    pub z: Real,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: Real::ZERO, y: Real::ZERO };

    pub fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    pub fn from_ints(x: i32, y: i32) -> Self {
        Self { x: Real::from_int(x), y: Real::from_int(y) }
    }

    pub fn dot(self, r: Vector2) -> Real {
        self.x * r.x + self.y * r.y
    }

    pub fn len(self) -> Real {
        sqrt(self.dot(self))
    }

    pub fn normalize(self) -> Vector2 {
        let inv_len = Real::ONE / self.len();
        Vector2::new(self.x * inv_len, self.y * inv_len)
    }

    pub fn is_normal(self) -> bool {
        self.dot(self) == Real::ONE
    }

    pub fn min(self, r: Vector2) -> Vector2 {
        Vector2::new(self.x.min(r.x), self.y.min(r.y))
    }

    pub fn max(self, r: Vector2) -> Vector2 {
        Vector2::new(self.x.max(r.x), self.y.max(r.y))
    }
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: Real::ZERO, y: Real::ZERO, z: Real::ZERO };
    pub const UP: Vector3 = Vector3 { x: Real::ZERO, y: Real::ONE, z: Real::ZERO };

    pub fn new(x: Real, y: Real, z: Real) -> Self {
        Self { x, y, z }
    }

    pub fn from_ints(x: i32, y: i32, z: i32) -> Self {
        Self { x: Real::from_int(x), y: Real::from_int(y), z: Real::from_int(z) }
    }

    pub fn dot(self, r: Vector3) -> Real {
        self.x * r.x + self.y * r.y + self.z * r.z
    }

    pub fn cross(self, r: Vector3) -> Vector3 {
        Vector3 {
            x: self.y * r.z - self.z * r.y,
            y: self.z * r.x - self.x * r.z,
            z: self.x * r.y - self.y * r.x,
        }
    }

    pub fn len(self) -> Real {
        sqrt(self.dot(self))
    }

    pub fn normalize(self) -> Vector3 {
        let inv_len = Real::ONE / self.len();
        Vector3::new(self.x * inv_len, self.y * inv_len, self.z * inv_len)
    }

    pub fn is_normal(self) -> bool {
        self.dot(self) == Real::ONE
    }

    pub fn min(self, r: Vector3) -> Vector3 {
        Vector3::new(self.x.min(r.x), self.y.min(r.y), self.z.min(r.z))
    }

    pub fn max(self, r: Vector3) -> Vector3 {
        Vector3::new(self.x.max(r.x), self.y.max(r.y), self.z.max(r.z))
    }

    pub fn xy(self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

// Component-wise operators shared by both vector types.
macro_rules! vector_ops {
    ($ty:ident { $($f:ident),+ }) => {
        impl AddAssign for $ty {
            fn add_assign(&mut self, r: $ty) { $(self.$f += r.$f;)+ }
        }
        impl SubAssign for $ty {
            fn sub_assign(&mut self, r: $ty) { $(self.$f -= r.$f;)+ }
        }
        impl MulAssign for $ty {
            fn mul_assign(&mut self, r: $ty) { $(self.$f *= r.$f;)+ }
        }
        impl DivAssign for $ty {
            fn div_assign(&mut self, r: $ty) { $(self.$f /= r.$f;)+ }
        }
        impl MulAssign<Real> for $ty {
            fn mul_assign(&mut self, r: Real) { $(self.$f *= r;)+ }
        }
        impl DivAssign<Real> for $ty {
            fn div_assign(&mut self, r: Real) { $(self.$f /= r;)+ }
        }
        impl MulAssign<i32> for $ty {
            fn mul_assign(&mut self, r: i32) { $(self.$f *= r;)+ }
        }
        impl DivAssign<i32> for $ty {
            fn div_assign(&mut self, r: i32) { $(self.$f /= r;)+ }
        }
        impl Add for $ty {
            type Output = $ty;
            fn add(mut self, r: $ty) -> $ty { self += r; self }
        }
        impl Sub for $ty {
            type Output = $ty;
            fn sub(mut self, r: $ty) -> $ty { self -= r; self }
        }
        impl Mul for $ty {
            type Output = $ty;
            fn mul(mut self, r: $ty) -> $ty { self *= r; self }
        }
        impl Div for $ty {
            type Output = $ty;
            fn div(mut self, r: $ty) -> $ty { self /= r; self }
        }
        impl Mul<Real> for $ty {
            type Output = $ty;
            fn mul(mut self, r: Real) -> $ty { self *= r; self }
        }
        impl Div<Real> for $ty {
            type Output = $ty;
            fn div(mut self, r: Real) -> $ty { self /= r; self }
        }
        impl Mul<i32> for $ty {
            type Output = $ty;
            fn mul(mut self, r: i32) -> $ty { self *= r; self }
        }
        impl Div<i32> for $ty {
            type Output = $ty;
            fn div(mut self, r: i32) -> $ty { self /= r; self }
        }
        impl Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty { $ty { $($f: -self.$f),+ } }
        }
    };
}

vector_ops!(Vector2 { x, y });
vector_ops!(Vector3 { x, y, z });

impl Index<usize> for Vector2 {
    type Output = Real;
    fn index(&self, i: usize) -> &Real {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Vector2 index {} out of range", i),
        }
    }
}

impl IndexMut<usize> for Vector2 {
    fn index_mut(&mut self, i: usize) -> &mut Real {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Vector2 index {} out of range", i),
        }
    }
}

impl Index<usize> for Vector3 {
    type Output = Real;
    fn index(&self, i: usize) -> &Real {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector3 index {} out of range", i),
        }
    }
}

impl IndexMut<usize> for Vector3 {
    fn index_mut(&mut self, i: usize) -> &mut Real {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vector3 index {} out of range", i),
        }
    }
}

/// Row-major 2x2 matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix2x2 {
    pub x: Vector2,
    pub y: Vector2,
}

impl Matrix2x2 {
    pub fn new(xx: Real, xy: Real, yx: Real, yy: Real) -> Self {
        Self { x: Vector2::new(xx, xy), y: Vector2::new(yx, yy) }
    }

    pub fn from_rows(x: Vector2, y: Vector2) -> Self {
        Self { x, y }
    }

    pub fn identity() -> Self {
        Self::new(Real::ONE, Real::ZERO, Real::ZERO, Real::ONE)
    }

    pub fn transpose(&self) -> Self {
        Self::new(self.x.x, self.y.x, self.x.y, self.y.y)
    }

    /// Inverse; a singular matrix yields the identity.
    pub fn inverse(&self) -> Self {
        let m = self;
        let det = m.x.x * m.y.y - m.x.y * m.y.x;
        if det == Real::ZERO {
            return Self::identity();
        }
        let invdet = 1 / det;
        Self::new(
            m.y.y * invdet, -m.x.y * invdet,
            -m.y.x * invdet, m.x.x * invdet,
        )
    }

    pub fn rotate(angle: Real) -> Self {
        let s = sin(angle);
        let c = cos(angle);
        Self::new(c, -s, s, c)
    }
}

impl Index<usize> for Matrix2x2 {
    type Output = Vector2;
    fn index(&self, row: usize) -> &Vector2 {
        match row {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Matrix2x2 row {} out of range", row),
        }
    }
}

impl IndexMut<usize> for Matrix2x2 {
    fn index_mut(&mut self, row: usize) -> &mut Vector2 {
        match row {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Matrix2x2 row {} out of range", row),
        }
    }
}

impl Mul for Matrix2x2 {
    type Output = Matrix2x2;
    fn mul(self, r: Matrix2x2) -> Matrix2x2 {
        let r = r.transpose();
        Matrix2x2::new(
            self.x.dot(r.x), self.x.dot(r.y),
            self.y.dot(r.x), self.y.dot(r.y),
        )
    }
}

impl Mul<Real> for Matrix2x2 {
    type Output = Matrix2x2;
    fn mul(self, r: Real) -> Matrix2x2 {
        Matrix2x2::from_rows(self.x * r, self.y * r)
    }
}

impl Mul<Matrix2x2> for Vector2 {
    type Output = Vector2;
    fn mul(self, r: Matrix2x2) -> Vector2 {
        Vector2::new(self.dot(r.x), self.dot(r.y))
    }
}

/// Row-major 3x3 matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix3x3 {
    pub x: Vector3,
    pub y: Vector3,
    pub z: Vector3,
}

impl Matrix3x3 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        xx: Real, xy: Real, xz: Real,
        yx: Real, yy: Real, yz: Real,
        zx: Real, zy: Real, zz: Real,
    ) -> Self {
        Self {
            x: Vector3::new(xx, xy, xz),
            y: Vector3::new(yx, yy, yz),
            z: Vector3::new(zx, zy, zz),
        }
    }

    pub fn from_rows(x: Vector3, y: Vector3, z: Vector3) -> Self {
        Self { x, y, z }
    }

    pub fn identity() -> Self {
        let (o, l) = (Real::ZERO, Real::ONE);
        Self::new(
            l, o, o,
            o, l, o,
            o, o, l,
        )
    }

    pub fn transpose(&self) -> Self {
        let m = self;
        Self::new(
            m.x.x, m.y.x, m.z.x,
            m.x.y, m.y.y, m.z.y,
            m.x.z, m.y.z, m.z.z,
        )
    }

    /// Cofactor inverse; a singular matrix yields the identity.
    pub fn inverse(&self) -> Self {
        let m = self;
        let det = m.x.x * (m.y.y * m.z.z - m.z.y * m.y.z)
            - m.x.y * (m.y.x * m.z.z - m.y.z * m.z.x)
            + m.x.z * (m.y.x * m.z.y - m.y.y * m.z.x);
        if det == Real::ZERO {
            return Self::identity();
        }
        let invdet = 1 / det;
        Self::new(
            (m.y.y * m.z.z - m.z.y * m.y.z) * invdet,
            (m.x.z * m.z.y - m.x.y * m.z.z) * invdet,
            (m.x.y * m.y.z - m.x.z * m.y.y) * invdet,
            (m.y.z * m.z.x - m.y.x * m.z.z) * invdet,
            (m.x.x * m.z.z - m.x.z * m.z.x) * invdet,
            (m.y.x * m.x.z - m.x.x * m.y.z) * invdet,
            (m.y.x * m.z.y - m.z.x * m.y.y) * invdet,
            (m.z.x * m.x.y - m.x.x * m.z.y) * invdet,
            (m.x.x * m.y.y - m.y.x * m.x.y) * invdet,
        )
    }

    /// Rotation from heading, pitch and roll angles in radians.
    pub fn euler(head: Real, pitch: Real, roll: Real) -> Self {
        let (sh, sp, sr) = (sin(head), sin(pitch), sin(roll));
        let (ch, cp, cr) = (cos(head), cos(pitch), cos(roll));
        Self::new(
            cr * ch - sr * sp * sh, -sr * cp, cr * sh + sr * sp * ch,
            sr * ch + cr * sp * sh, cr * cp, sr * sh - cr * sp * ch,
            -cp * sh, sp, cp * ch,
        )
    }

    /// Rotation of `angle` radians around the unit vector `u`.
    pub fn axis_angle(u: Vector3, angle: Real) -> Self {
        let s = sin(angle);
        let c = cos(angle);
        let ic = 1 - c;
        let (ux_s, uy_s, uz_s) = (u.x * s, u.y * s, u.z * s);
        let ux_ic = u.x * ic;
        let uy_ic = u.y * ic;
        let uzux_ic = u.z * ux_ic;
        let uyux_ic = u.y * ux_ic;
        let uzuy_ic = u.z * uy_ic;
        Self::new(
            c + u.x * ux_ic, uyux_ic - uz_s, uzux_ic + uy_s,
            uyux_ic + uz_s, c + u.y * uy_ic, uzuy_ic - ux_s,
            uzux_ic - uy_s, uzuy_ic + ux_s, c + u.z * u.z * ic,
        )
    }

    pub fn rotate_x(angle: Real) -> Self {
        let (s, c) = (sin(angle), cos(angle));
        let (o, l) = (Real::ZERO, Real::ONE);
        Self::new(
            l, o, o,
            o, c, -s,
            o, s, c,
        )
    }

    pub fn rotate_y(angle: Real) -> Self {
        let (s, c) = (sin(angle), cos(angle));
        let (o, l) = (Real::ZERO, Real::ONE);
        Self::new(
            c, o, s,
            o, l, o,
            -s, o, c,
        )
    }

    pub fn rotate_z(angle: Real) -> Self {
        let (s, c) = (sin(angle), cos(angle));
        let (o, l) = (Real::ZERO, Real::ONE);
        Self::new(
            c, -s, o,
            s, c, o,
            o, o, l,
        )
    }
}

impl Index<usize> for Matrix3x3 {
    type Output = Vector3;
    fn index(&self, row: usize) -> &Vector3 {
        match row {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Matrix3x3 row {} out of range", row),
        }
    }
}

impl IndexMut<usize> for Matrix3x3 {
    fn index_mut(&mut self, row: usize) -> &mut Vector3 {
        match row {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Matrix3x3 row {} out of range", row),
        }
    }
}

impl Mul for Matrix3x3 {
    type Output = Matrix3x3;
    fn mul(self, r: Matrix3x3) -> Matrix3x3 {
        let r = r.transpose();
        let l = self;
        Matrix3x3::new(
            l.x.dot(r.x), l.x.dot(r.y), l.x.dot(r.z),
            l.y.dot(r.x), l.y.dot(r.y), l.y.dot(r.z),
            l.z.dot(r.x), l.z.dot(r.y), l.z.dot(r.z),
        )
    }
}

impl Mul<Real> for Matrix3x3 {
    type Output = Matrix3x3;
    fn mul(self, r: Real) -> Matrix3x3 {
        Matrix3x3::from_rows(self.x * r, self.y * r, self.z * r)
    }
}

impl Mul<Matrix3x3> for Vector3 {
    type Output = Vector3;
    fn mul(self, r: Matrix3x3) -> Vector3 {
        Vector3::new(self.dot(r.x), self.dot(r.y), self.dot(r.z))
    }
}

/// Row-major 4x4 affine transform
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix4x4 {
    pub m: [[Real; 4]; 4],
}

fn dot4(l: &[Real; 4], r: &[Real; 4]) -> Real {
    l[0] * r[0] + l[1] * r[1] + l[2] * r[2] + l[3] * r[3]
}

impl Matrix4x4 {
    pub fn from_rows(m: [[Real; 4]; 4]) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        let mut m = [[Real::ZERO; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            row[i] = Real::ONE;
        }
        Self { m }
    }

    pub fn transpose(&self) -> Self {
        let mut t = [[Real::ZERO; 4]; 4];
        for (y, row) in t.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                *v = self.m[x][y];
            }
        }
        Self { m: t }
    }

    /// Rotation in the upper 3x3 block and translation in the last column.
    pub fn transform(rot: &Matrix3x3, pos: Vector3) -> Self {
        let (o, l) = (Real::ZERO, Real::ONE);
        Self::from_rows([
            [rot.x.x, rot.x.y, rot.x.z, pos.x],
            [rot.y.x, rot.y.y, rot.y.z, pos.y],
            [rot.z.x, rot.z.y, rot.z.z, pos.z],
            [o, o, o, l],
        ])
    }

    pub fn rotation(&self) -> Matrix3x3 {
        let m = &self.m;
        Matrix3x3::new(
            m[0][0], m[0][1], m[0][2],
            m[1][0], m[1][1], m[1][2],
            m[2][0], m[2][1], m[2][2],
        )
    }

    pub fn translation(&self) -> Vector3 {
        Vector3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    /// Inverse through 2x2 sub-determinants; a singular matrix yields the identity.
    pub fn inverse(&self) -> Self {
        let m = &self.m;
        let s0 = m[0][0] * m[1][1] - m[1][0] * m[0][1];
        let s1 = m[0][0] * m[1][2] - m[1][0] * m[0][2];
        let s2 = m[0][0] * m[1][3] - m[1][0] * m[0][3];
        let s3 = m[0][1] * m[1][2] - m[1][1] * m[0][2];
        let s4 = m[0][1] * m[1][3] - m[1][1] * m[0][3];
        let s5 = m[0][2] * m[1][3] - m[1][2] * m[0][3];
        let c5 = m[2][2] * m[3][3] - m[3][2] * m[2][3];
        let c4 = m[2][1] * m[3][3] - m[3][1] * m[2][3];
        let c3 = m[2][1] * m[3][2] - m[3][1] * m[2][2];
        let c2 = m[2][0] * m[3][3] - m[3][0] * m[2][3];
        let c1 = m[2][0] * m[3][2] - m[3][0] * m[2][2];
        let c0 = m[2][0] * m[3][1] - m[3][0] * m[2][1];

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det == Real::ZERO {
            return Self::identity();
        }
        let invdet = 1 / det;

        let mut i = [[Real::ZERO; 4]; 4];
        i[0][0] = (m[1][1] * c5 - m[1][2] * c4 + m[1][3] * c3) * invdet;
        i[0][1] = (-m[0][1] * c5 + m[0][2] * c4 - m[0][3] * c3) * invdet;
        i[0][2] = (m[3][1] * s5 - m[3][2] * s4 + m[3][3] * s3) * invdet;
        i[0][3] = (-m[2][1] * s5 + m[2][2] * s4 - m[2][3] * s3) * invdet;

        i[1][0] = (-m[1][0] * c5 + m[1][2] * c2 - m[1][3] * c1) * invdet;
        i[1][1] = (m[0][0] * c5 - m[0][2] * c2 + m[0][3] * c1) * invdet;
        i[1][2] = (-m[3][0] * s5 + m[3][2] * s2 - m[3][3] * s1) * invdet;
        i[1][3] = (m[2][0] * s5 - m[2][2] * s2 + m[2][3] * s1) * invdet;

        i[2][0] = (m[1][0] * c4 - m[1][1] * c2 + m[1][3] * c0) * invdet;
        i[2][1] = (-m[0][0] * c4 + m[0][1] * c2 - m[0][3] * c0) * invdet;
        i[2][2] = (m[3][0] * s4 - m[3][1] * s2 + m[3][3] * s0) * invdet;
        i[2][3] = (-m[2][0] * s4 + m[2][1] * s2 - m[2][3] * s0) * invdet;

        i[3][0] = (-m[1][0] * c3 + m[1][1] * c1 - m[1][2] * c0) * invdet;
        i[3][1] = (m[0][0] * c3 - m[0][1] * c1 + m[0][2] * c0) * invdet;
        i[3][2] = (-m[3][0] * s3 + m[3][1] * s1 - m[3][2] * s0) * invdet;
        i[3][3] = (m[2][0] * s3 - m[2][1] * s1 + m[2][2] * s0) * invdet;

        Self { m: i }
    }
}

impl Index<usize> for Matrix4x4 {
    type Output = [Real; 4];
    fn index(&self, row: usize) -> &[Real; 4] {
        &self.m[row]
    }
}

impl IndexMut<usize> for Matrix4x4 {
    fn index_mut(&mut self, row: usize) -> &mut [Real; 4] {
        &mut self.m[row]
    }
}

impl Mul for Matrix4x4 {
    type Output = Matrix4x4;
    fn mul(self, r: Matrix4x4) -> Matrix4x4 {
        let r = r.transpose();
        let mut out = [[Real::ZERO; 4]; 4];
        for (y, row) in out.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                *v = dot4(&self.m[y], &r.m[x]);
            }
        }
        Matrix4x4 { m: out }
    }
}

impl Mul<Real> for Matrix4x4 {
    type Output = Matrix4x4;
    fn mul(mut self, r: Real) -> Matrix4x4 {
        for row in self.m.iter_mut() {
            for v in row.iter_mut() {
                *v *= r;
            }
        }
        self
    }
}

/// Point transform with an implicit `w = 1`.
impl Mul<Matrix4x4> for Vector3 {
    type Output = Vector3;
    fn mul(self, l: Matrix4x4) -> Vector3 {
        let m = &l.m;
        Vector3::new(
            self.dot(Vector3::new(m[0][0], m[0][1], m[0][2])) + m[0][3],
            self.dot(Vector3::new(m[1][0], m[1][1], m[1][2])) + m[1][3],
            self.dot(Vector3::new(m[2][0], m[2][1], m[2][2])) + m[2][3],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::real::pi;

    fn r(i: i32) -> Real {
        Real::from_int(i)
    }

    #[test]
    fn test_vector_ops() {
        let a = Vector3::from_ints(1, 2, 3);
        let b = Vector3::from_ints(4, 5, 6);
        assert_eq!(a + b, Vector3::from_ints(5, 7, 9));
        assert_eq!(b - a, Vector3::from_ints(3, 3, 3));
        assert_eq!(a * 2, Vector3::from_ints(2, 4, 6));
        assert_eq!(-a, Vector3::from_ints(-1, -2, -3));
        assert_eq!(a.dot(b), r(32));
        assert_eq!(a[2], r(3));
    }

    #[test]
    fn test_cross_product() {
        let x = Vector3::from_ints(1, 0, 0);
        let y = Vector3::from_ints(0, 1, 0);
        assert_eq!(x.cross(y), Vector3::from_ints(0, 0, 1));
        assert_eq!(y.cross(x), Vector3::from_ints(0, 0, -1));
    }

    #[test]
    fn test_normalize() {
        let v = Vector3::from_ints(3, 0, 4);
        assert_eq!(v.len(), r(5));
        let n = v.normalize();
        assert!(n.is_normal() || (n.dot(n) - Real::ONE).abs() < Real::from_f32(0.001));
        assert_eq!(Vector2::from_ints(0, 8).normalize(), Vector2::from_ints(0, 1));
    }

    #[test]
    fn test_matrix3_inverse() {
        let m = Matrix3x3::new(
            r(2), r(0), r(0),
            r(0), r(4), r(0),
            r(0), r(0), r(8),
        );
        let i = m.inverse();
        assert_eq!(m * i, Matrix3x3::identity());
        assert_eq!(i.x.x, Real::ONE / 2);
    }

    #[test]
    fn test_singular_inverse_is_identity() {
        let m = Matrix3x3::new(
            r(1), r(2), r(3),
            r(2), r(4), r(6),
            r(0), r(0), r(1),
        );
        assert_eq!(m.inverse(), Matrix3x3::identity());
        assert_eq!(Matrix2x2::default().inverse(), Matrix2x2::identity());
        assert_eq!(Matrix4x4::default().inverse(), Matrix4x4::identity());
    }

    #[test]
    fn test_matrix2_inverse() {
        let m = Matrix2x2::new(r(4), r(7), r(2), r(6));
        let p = m * m.inverse();
        let tolerance = Real::from_f32(0.001);
        assert!((p.x.x - Real::ONE).abs() < tolerance);
        assert!(p.x.y.abs() < tolerance);
        assert!(p.y.x.abs() < tolerance);
        assert!((p.y.y - Real::ONE).abs() < tolerance);
    }

    #[test]
    fn test_matrix_product_order() {
        let a = Matrix2x2::new(r(1), r(2), r(3), r(4));
        let b = Matrix2x2::new(r(5), r(6), r(7), r(8));
        assert_eq!(a * b, Matrix2x2::new(r(19), r(22), r(43), r(50)));
    }

    #[test]
    fn test_vector_times_matrix_uses_rows() {
        let m = Matrix3x3::new(
            r(1), r(2), r(3),
            r(4), r(5), r(6),
            r(7), r(8), r(9),
        );
        let v = Vector3::from_ints(1, 1, 1);
        assert_eq!(v * m, Vector3::from_ints(6, 15, 24));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let m = Matrix3x3::rotate_z(pi() / 2);
        let v = Vector3::from_ints(1, 0, 0) * m;
        let tolerance = Real::from_f32(0.01);
        assert!(v.x.abs() < tolerance);
        assert!((v.y - Real::ONE).abs() < tolerance);
    }

    #[test]
    fn test_euler_zero_is_identity() {
        let m = Matrix3x3::euler(Real::ZERO, Real::ZERO, Real::ZERO);
        let tolerance = Real::from_f32(0.001);
        let i = Matrix3x3::identity();
        for row in 0..3 {
            for col in 0..3 {
                assert!((m[row][col] - i[row][col]).abs() < tolerance);
            }
        }
    }

    #[test]
    fn test_axis_angle_matches_rotate_y() {
        let a = Matrix3x3::axis_angle(Vector3::UP, pi() / 3);
        let b = Matrix3x3::rotate_y(pi() / 3);
        let tolerance = Real::from_f32(0.001);
        for row in 0..3 {
            for col in 0..3 {
                assert!((a[row][col] - b[row][col]).abs() < tolerance);
            }
        }
    }

    #[test]
    fn test_transform_round_trip() {
        let rot = Matrix3x3::identity();
        let pos = Vector3::from_ints(3, -2, 10);
        let t = Matrix4x4::transform(&rot, pos);
        assert_eq!(t.translation(), pos);
        assert_eq!(t.rotation(), rot);

        let p = Vector3::from_ints(1, 1, 1) * t;
        assert_eq!(p, Vector3::from_ints(4, -1, 11));
        let back = p * t.inverse();
        assert_eq!(back, Vector3::from_ints(1, 1, 1));
    }
}
