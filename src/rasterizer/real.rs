//! Deterministic fixed-point scalar
//!
//! `Real` is a signed 32-bit value with `PRECISION` fractional bits. Three
//! raw bit patterns are reserved:
//! - `i32::MAX`      → `+Inf`
//! - `i32::MIN + 1`  → `-Inf`
//! - `i32::MIN`      → `NaN`
//!
//! Arithmetic never wraps. Every operation first propagates NaN, then computes
//! in a wider integer and clamps into `[NInf, Inf]`.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Serialize, Deserialize};

/// Number of fractional bits
pub const PRECISION: u32 = 16;

const ONE_BITS: i64 = 1 << PRECISION;
const INF_BITS: i32 = i32::MAX;
const NINF_BITS: i32 = i32::MIN + 1;
const NAN_BITS: i32 = i32::MIN;

// 16-bit precision constants
const PI_BITS: i32 = 205_887;
const TAU_BITS: i32 = 411_775;

#[inline]
fn saturate(t: i64) -> i32 {
    t.clamp(NINF_BITS as i64, INF_BITS as i64) as i32
}

/// Fixed-point number with explicit infinity and NaN encodings
#[derive(Clone, Copy, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Real(i32);

impl Real {
    pub const ZERO: Real = Real(0);
    pub const ONE: Real = Real(1 << PRECISION);

    /// Reinterprets raw fixed-point bits.
    pub const fn from_bits(bits: i32) -> Self {
        Real(bits)
    }

    /// The raw fixed-point bits.
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    pub const fn inf() -> Self {
        Real(INF_BITS)
    }

    pub const fn ninf() -> Self {
        Real(NINF_BITS)
    }

    pub const fn nan() -> Self {
        Real(NAN_BITS)
    }

    /// Widened bit pattern of `+Inf`, for saturating intermediates.
    pub const fn inf_bits() -> i64 {
        INF_BITS as i64
    }

    /// Widened bit pattern of `-Inf`, for saturating intermediates.
    pub const fn ninf_bits() -> i64 {
        NINF_BITS as i64
    }

    pub const fn precision() -> u32 {
        PRECISION
    }

    /// Integer to fixed point. Values outside the representable range saturate.
    pub const fn from_int(i: i32) -> Self {
        let t = (i as i64) << PRECISION;
        if t > INF_BITS as i64 {
            Real(INF_BITS)
        } else if t < NINF_BITS as i64 {
            Real(NINF_BITS)
        } else {
            Real(t as i32)
        }
    }

    pub fn from_f32(f: f32) -> Self {
        Real((f * ONE_BITS as f32) as i32)
    }

    /// Debug conversion, not used by any deterministic path.
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / ONE_BITS as f32
    }

    /// Integer part, rounding toward zero. NaN converts to 0.
    pub fn to_int(self) -> i32 {
        if self.is_nan() {
            0
        } else if self.0 >= 0 {
            self.0 >> PRECISION
        } else {
            -((-self.0) >> PRECISION)
        }
    }

    pub fn is_nan(self) -> bool {
        self.0 == NAN_BITS
    }

    pub fn is_inf(self) -> bool {
        self.0 == INF_BITS
    }

    pub fn is_ninf(self) -> bool {
        self.0 == NINF_BITS
    }

    pub fn is_finite(self) -> bool {
        !self.is_nan() && !self.is_inf() && !self.is_ninf()
    }

    fn is_infinite(self) -> bool {
        self.is_inf() || self.is_ninf()
    }

    pub fn abs(self) -> Self {
        if self.is_nan() || self.0 >= 0 {
            self
        } else {
            Real(-self.0)
        }
    }

    /// NaN-aware minimum; a NaN operand yields NaN.
    pub fn min(self, other: Real) -> Self {
        if self.is_nan() || other.is_nan() {
            Real::nan()
        } else if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// NaN-aware maximum; a NaN operand yields NaN.
    pub fn max(self, other: Real) -> Self {
        if self.is_nan() || other.is_nan() {
            Real::nan()
        } else if self.0 >= other.0 {
            self
        } else {
            other
        }
    }

    pub fn clamp(self, min: Real, max: Real) -> Self {
        self.max(min).min(max)
    }

    /// Fractional part, carrying the sign of the input.
    pub fn frac(self) -> Self {
        self - self.to_int()
    }

    pub fn trunc(self) -> i32 {
        self.to_int()
    }

    /// Rounds half away from zero.
    pub fn round(self) -> i32 {
        let half = Real::ONE / 2;
        if self > Real::ZERO {
            (self + half).to_int()
        } else {
            (self - half).to_int()
        }
    }

    pub fn ceil(self) -> i32 {
        let ri = self.to_int();
        if self != Real::from_int(ri) {
            if self.0 < 0 { ri } else { ri + 1 }
        } else {
            ri
        }
    }

    pub fn floor(self) -> i32 {
        let ri = self.to_int();
        if self != Real::from_int(ri) {
            if self.0 < 0 { ri - 1 } else { ri }
        } else {
            ri
        }
    }

    /// Multiplicative inverse, `1 / self`.
    pub fn recip(self) -> Self {
        Real::ONE / self
    }
}

impl From<i32> for Real {
    fn from(i: i32) -> Self {
        Real::from_int(i)
    }
}

impl From<f32> for Real {
    fn from(f: f32) -> Self {
        Real::from_f32(f)
    }
}

impl fmt::Debug for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            write!(f, "Real(NaN)")
        } else if self.is_inf() {
            write!(f, "Real(Inf)")
        } else if self.is_ninf() {
            write!(f, "Real(-Inf)")
        } else {
            write!(f, "Real({})", self.to_f32())
        }
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            write!(f, "nan")
        } else if self.is_inf() {
            write!(f, "inf")
        } else if self.is_ninf() {
            write!(f, "-inf")
        } else {
            write!(f, "{}", self.to_f32())
        }
    }
}

// Comparisons against NaN are always false, including `!=`.
impl PartialEq for Real {
    fn eq(&self, other: &Real) -> bool {
        !self.is_nan() && !other.is_nan() && self.0 == other.0
    }

    #[allow(clippy::partialeq_ne_impl)]
    fn ne(&self, other: &Real) -> bool {
        !self.is_nan() && !other.is_nan() && self.0 != other.0
    }
}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Real) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            None
        } else {
            Some(self.0.cmp(&other.0))
        }
    }
}

impl PartialEq<i32> for Real {
    fn eq(&self, other: &i32) -> bool {
        *self == Real::from_int(*other)
    }
}

impl PartialOrd<i32> for Real {
    fn partial_cmp(&self, other: &i32) -> Option<Ordering> {
        self.partial_cmp(&Real::from_int(*other))
    }
}

impl Neg for Real {
    type Output = Real;
    fn neg(self) -> Real {
        if self.is_nan() { self } else { Real(-self.0) }
    }
}

impl AddAssign for Real {
    fn add_assign(&mut self, r: Real) {
        self.0 = if self.is_nan() || r.is_nan() {
            NAN_BITS
        } else {
            saturate(self.0 as i64 + r.0 as i64)
        };
    }
}

impl SubAssign for Real {
    fn sub_assign(&mut self, r: Real) {
        self.0 = if self.is_nan() || r.is_nan() {
            NAN_BITS
        } else {
            saturate(self.0 as i64 - r.0 as i64)
        };
    }
}

impl MulAssign for Real {
    fn mul_assign(&mut self, r: Real) {
        self.0 = if self.is_nan() || r.is_nan() {
            NAN_BITS
        } else if self.is_infinite() || r.is_infinite() {
            // infinity keeps the sign of the product, zero absorbs it
            if self.0 == 0 || r.0 == 0 {
                0
            } else if (self.0 < 0) == (r.0 < 0) {
                INF_BITS
            } else {
                NINF_BITS
            }
        } else {
            saturate((self.0 as i64 * r.0 as i64) >> PRECISION)
        };
    }
}

impl DivAssign for Real {
    fn div_assign(&mut self, r: Real) {
        self.0 = if self.is_nan() || r.is_nan() {
            NAN_BITS
        } else if r.0 == 0 {
            match self.0.cmp(&0) {
                Ordering::Equal => 0,
                Ordering::Greater => INF_BITS,
                Ordering::Less => NINF_BITS,
            }
        } else {
            saturate(((self.0 as i64) << PRECISION) / r.0 as i64)
        };
    }
}

// Integer operands leave a saturated or NaN value untouched.
impl AddAssign<i32> for Real {
    fn add_assign(&mut self, r: i32) {
        if self.is_finite() {
            self.0 = saturate(self.0 as i64 + ((r as i64) << PRECISION));
        }
    }
}

impl SubAssign<i32> for Real {
    fn sub_assign(&mut self, r: i32) {
        if self.is_finite() {
            self.0 = saturate(self.0 as i64 - ((r as i64) << PRECISION));
        }
    }
}

impl MulAssign<i32> for Real {
    fn mul_assign(&mut self, r: i32) {
        if self.is_finite() {
            self.0 = saturate(self.0 as i64 * r as i64);
        }
    }
}

impl DivAssign<i32> for Real {
    fn div_assign(&mut self, r: i32) {
        if self.is_finite() {
            self.0 = if r != 0 {
                saturate(self.0 as i64 / r as i64)
            } else {
                match self.0.cmp(&0) {
                    Ordering::Equal => 0,
                    Ordering::Greater => INF_BITS,
                    Ordering::Less => NINF_BITS,
                }
            };
        }
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $assign:ident) => {
        impl $trait for Real {
            type Output = Real;
            fn $method(mut self, r: Real) -> Real {
                self.$assign(r);
                self
            }
        }

        impl $trait<i32> for Real {
            type Output = Real;
            fn $method(mut self, r: i32) -> Real {
                self.$assign(r);
                self
            }
        }
    };
}

binary_op!(Add, add, add_assign);
binary_op!(Sub, sub, sub_assign);
binary_op!(Mul, mul, mul_assign);
binary_op!(Div, div, div_assign);

impl Add<Real> for i32 {
    type Output = Real;
    fn add(self, r: Real) -> Real {
        r + self
    }
}

impl Sub<Real> for i32 {
    type Output = Real;
    fn sub(self, r: Real) -> Real {
        Real::from_int(self) - r
    }
}

impl Mul<Real> for i32 {
    type Output = Real;
    fn mul(self, r: Real) -> Real {
        r * self
    }
}

impl Div<Real> for i32 {
    type Output = Real;
    fn div(self, r: Real) -> Real {
        Real::from_int(self) / r
    }
}

pub fn pi() -> Real {
    Real::from_bits(PI_BITS)
}

pub fn tau() -> Real {
    Real::from_bits(TAU_BITS)
}

/// Wraps an integer into `[min, max)`.
pub fn wrap_int(min: i32, x: i32, max: i32) -> i32 {
    let (min, x, max) = (min as i128, x as i128, max as i128);
    let span = max - min;
    if span <= 0 {
        return min as i32;
    }
    (min + (x + x.abs() * span - min) % span) as i32
}

/// Wraps `x` into `[min, max)`, operating directly on raw bits.
pub fn wrap(min: Real, x: Real, max: Real) -> Real {
    if min.is_nan() || x.is_nan() || max.is_nan() {
        return Real::nan();
    }
    let smin = min.0 as i128;
    let y = x.0 as i128;
    let span = max.0 as i128 - smin;
    if span <= 0 {
        return min;
    }
    Real((smin + (y + y.abs() * span - smin) % span) as i32)
}

/// Quadratic sine approximation over `[-pi, pi]`.
pub fn sin(rad: Real) -> Real {
    let pi = pi();
    let magic1 = Real::from_int(4) / pi;
    let magic2 = magic1 / pi;
    let magic3 = Real::from_f32(0.225);

    let rad = wrap(-pi, rad, pi);

    let sin1 = if rad < Real::ZERO {
        magic1 * rad + magic2 * rad * rad
    } else {
        magic1 * rad - magic2 * rad * rad
    };
    if sin1 < Real::ZERO {
        magic3 * (sin1 * -sin1 - sin1) + sin1
    } else {
        magic3 * (sin1 * sin1 - sin1) + sin1
    }
}

pub fn cos(rad: Real) -> Real {
    sin(rad + pi() / 2)
}

/// Digit-by-digit square root. Negative, NaN and Inf yield NaN.
pub fn sqrt(x: Real) -> Real {
    if x.is_nan() || x < Real::ZERO || x.is_inf() {
        return Real::nan();
    }

    // remainder is kept wide so the shift never drops its top bit
    let mut r = x.0 as u64;
    let mut b: u64 = 0x4000_0000;
    let mut q: u64 = 0;
    while b > 0x40 {
        let t = q + b;
        if r >= t {
            r -= t;
            q = t + b;
        }
        r <<= 1;
        b >>= 1;
    }
    q >>= 8;
    Real(q as i32)
}

/// Integer logarithm, `floor(log_base(x))`.
pub fn log(base: u32, mut x: u32) -> u32 {
    if base < 2 {
        return 0;
    }
    let mut log = 0;
    while x >= base {
        x /= base;
        log += 1;
    }
    log
}

pub fn log10(x: u32) -> u32 {
    log(10, x)
}

pub fn log2(mut x: u32) -> u32 {
    let mut log = 0;
    while x >= 2 {
        x >>= 1;
        log += 1;
    }
    log
}

/// `x` raised to `n`, wrapping on overflow.
pub fn exp(x: u32, n: u32) -> u64 {
    let mut out: u64 = 1;
    for _ in 0..n {
        out = out.wrapping_mul(x as u64);
    }
    out
}

pub fn is_pow2(x: u32) -> bool {
    x != 0 && (x & (x - 1)) == 0
}

/// Morton-interleaves two 16-bit values; `a` takes the even bits.
pub fn interleave_16_bits(a: u16, b: u16) -> u32 {
    fn spread(v: u16) -> u32 {
        let mut v = v as u32;
        v = (v | (v << 8)) & 0x00FF_00FF;
        v = (v | (v << 4)) & 0x0F0F_0F0F;
        v = (v | (v << 2)) & 0x3333_3333;
        v = (v | (v << 1)) & 0x5555_5555;
        v
    }
    spread(a) | (spread(b) << 1)
}

/// Morton-interleaves two 8-bit values; `a` takes the even bits.
pub fn interleave_8_bits(a: u8, b: u8) -> u16 {
    fn spread(v: u8) -> u16 {
        let mut v = v as u16;
        v = (v | (v << 4)) & 0x0F0F;
        v = (v | (v << 2)) & 0x3333;
        v = (v | (v << 1)) & 0x5555;
        v
    }
    spread(a) | (spread(b) << 1)
}

/// Deterministic PCG32 generator
#[derive(Debug, Clone)]
pub struct Random {
    state: u64,
    inc: u64,
}

impl Random {
    pub fn new(state: u64, inc: u64) -> Self {
        let mut rng = Self { state: 0, inc: (inc << 1) | 1 };
        rng.next_u32();
        rng.state = rng.state.wrapping_add(state);
        rng.next_u32();
        rng
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = old
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(self.inc);
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform value in `[min, max)`.
    pub fn next_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64) as u64;
        (min as i64 + (self.next_u32() as u64 % span) as i64) as i32
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new(0x853c_49e6_748f_ea9b, 0xda3e_39cb_94b9_5bdb)
    }
}
