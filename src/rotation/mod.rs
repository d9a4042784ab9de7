use crate::utils::{svd_fsign, SvdFloat};
use ndarray::{ArrayViewMut1, Zip};

mod sequence;

pub use sequence::*;

/// Generates a plane rotation so that
///
/// ```text
/// [  c  s ] [ f ]   [ r ]
/// [ -s  c ] [ g ] = [ 0 ]
/// ```
///
/// Returns `(c, s, r)`. `r` is non-negative except when `|f| > |g|` and `f < 0`:
/// then `c` is kept positive and `r` takes the sign of `f`. `(1, 0, f)` is returned
/// when `g == 0` and `(0, sign(g), |g|)` when `f == 0`. Inputs outside
/// `[sqrt(safmin), sqrt(safmax / 2)]` are scaled before squaring.
pub fn lartg<T: SvdFloat>(f: T, g: T) -> (T, T, T) {
    let zero = T::zero();
    let one = T::one();

    if g == zero {
        return (one, zero, f);
    }
    if f == zero {
        return (zero, svd_fsign(one, g), g.abs());
    }

    let safmin = T::safe_min();
    let safmax = T::safe_max();
    let rtmin = safmin.sqrt();
    let rtmax = (safmax / T::lit(2.0)).sqrt();

    let f1 = f.abs();
    let g1 = g.abs();
    let (c, s, r) = if f1 > rtmin && f1 < rtmax && g1 > rtmin && g1 < rtmax {
        let d = (f * f + g * g).sqrt();
        (f / d, g / d, d)
    } else {
        let u = safmax.min(safmin.max(f1).max(g1));
        let fs = f / u;
        let gs = g / u;
        let d = (fs * fs + gs * gs).sqrt();
        (fs / d, gs / d, d * u)
    };

    if f1 > g1 && c < zero {
        (-c, -s, -r)
    } else {
        (c, s, r)
    }
}

/// Applies a plane rotation to a pair of lanes:
/// `x <- c*x + s*y`, `y <- c*y - s*x`.
pub fn rot<T: SvdFloat>(x: ArrayViewMut1<'_, T>, y: ArrayViewMut1<'_, T>, c: T, s: T) {
    assert_eq!(x.len(), y.len(), "rot: lanes differ in length, x = {}, y = {}", x.len(), y.len());
    Zip::from(x).and(y).for_each(|xv, yv| {
        let t = c * *xv + s * *yv;
        *yv = c * *yv - s * *xv;
        *xv = t;
    });
}

/// Exchanges the contents of two lanes.
pub fn swap_lanes<T: SvdFloat>(x: ArrayViewMut1<'_, T>, y: ArrayViewMut1<'_, T>) {
    assert_eq!(x.len(), y.len(), "swap_lanes: lanes differ in length, x = {}, y = {}", x.len(), y.len());
    Zip::from(x).and(y).for_each(std::mem::swap);
}
