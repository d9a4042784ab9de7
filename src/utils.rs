use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{AddAssign, MulAssign, Neg, SubAssign};

pub fn determine_chunk_size(nlanes: usize) -> usize {
    let num_threads = rayon::current_num_threads();

    let min_lanes_per_thread = 16;
    let desired_chunks_per_thread = 4;

    let target_total_chunks = num_threads * desired_chunks_per_thread;
    let chunk_size = nlanes.div_ceil(target_total_chunks);

    chunk_size.max(min_lanes_per_thread)
}

/// Trait for floating point types that can be used with the bidiagonal SVD
pub trait SvdFloat:
    Float + FromPrimitive + Debug + Send + Sync + AddAssign + SubAssign + MulAssign + Neg<Output = Self> + Sum + 'static
{
    /// Relative machine precision (`dlamch('E')`), half the unit roundoff gap.
    fn eps() -> Self;

    /// Safe minimum: smallest number whose reciprocal does not overflow.
    fn safe_min() -> Self;

    /// Converts an `f64` literal, rounding to nearest.
    fn lit(x: f64) -> Self;

    fn safe_max() -> Self {
        Self::safe_min().recip()
    }

    /// `max(10, min(100, eps^(-1/8)))`
    fn default_tolmul() -> Self {
        let ten = Self::lit(10.0);
        let hundred = Self::lit(100.0);
        ten.max(hundred.min(Self::eps().powf(Self::lit(-0.125))))
    }
}

impl SvdFloat for f32 {
    fn eps() -> Self {
        f32::EPSILON * 0.5
    }

    fn safe_min() -> Self {
        f32::MIN_POSITIVE
    }

    fn lit(x: f64) -> Self {
        x as f32
    }
}

impl SvdFloat for f64 {
    fn eps() -> Self {
        f64::EPSILON * 0.5
    }

    fn safe_min() -> Self {
        f64::MIN_POSITIVE
    }

    fn lit(x: f64) -> Self {
        x
    }
}

// returns |a| if b is non-negative; else -|a|
pub(crate) fn svd_fsign<T: Float>(a: T, b: T) -> T {
    match b >= T::zero() {
        true => a.abs(),
        false => -a.abs(),
    }
}
