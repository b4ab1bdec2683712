use num_traits::{Float, FloatConst, FromPrimitive, ToPrimitive};
use std::fmt::{Debug, Display};

/// Tolerance below which merged coefficients and exponents count as zero
pub(crate) const FLOAT_TOLERANCE: f64 = 1e-12;

/// Scalar type accepted by the special-function kernels.
///
/// Aggregates `num_traits::Float` (sin, exp, ln, ...), `FloatConst` (PI, E) and
/// the conversions the kernels use for their literal coefficients.
pub trait MathScalar:
    Float + FloatConst + FromPrimitive + ToPrimitive + Debug + Display + Send + Sync + 'static
{
}

impl<T> MathScalar for T where
    T: Float + FloatConst + FromPrimitive + ToPrimitive + Debug + Display + Send + Sync + 'static
{
}

/// Convert an `f64` literal into `T` (NaN if unrepresentable)
#[inline]
pub(crate) fn lit<T: MathScalar>(x: f64) -> T {
    T::from_f64(x).unwrap_or_else(T::nan)
}

/// `|a - b|` within [`FLOAT_TOLERANCE`] scaled by magnitude
#[inline]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= FLOAT_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Integer value of `x` when it is a whole number
#[inline]
pub(crate) fn as_integer(x: f64) -> Option<i64> {
    (x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15).then_some(x as i64)
}
