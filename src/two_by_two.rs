//! Closed-form singular values of the 2x2 upper triangular matrix
//!
//! ```text
//! [ f  g ]
//! [ 0  h ]
//! ```

use crate::utils::{svd_fsign, SvdFloat};
use std::mem;

/// Singular value decomposition of a 2x2 upper triangular matrix
///
/// # Fields
/// - ssmin, ssmax: singular values, `|ssmax| >= |ssmin|`; they may carry a sign
/// - csr, snr: right rotation
/// - csl, snl: left rotation
///
/// ```text
/// [  csl  snl ] [ f  g ] [ csr -snr ]   [ ssmax   0   ]
/// [ -snl  csl ] [ 0  h ] [ snr  csr ] = [   0   ssmin ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Svd2x2<T> {
    pub ssmin: T,
    pub ssmax: T,
    pub snr: T,
    pub csr: T,
    pub snl: T,
    pub csl: T,
}

/// Singular values `(ssmin, ssmax)` of `[f g; 0 h]` (LAPACK `dlas2`)
///
/// Both are non-negative. Accurate to a few ulps barring over/underflow, and
/// `ssmin` keeps full relative accuracy even when it is tiny.
pub fn las2<T: SvdFloat>(f: T, g: T, h: T) -> (T, T) {
    let zero = T::zero();
    let one = T::one();
    let two = T::lit(2.0);

    let fa = f.abs();
    let ga = g.abs();
    let ha = h.abs();
    let fhmn = fa.min(ha);
    let fhmx = fa.max(ha);

    if fhmn == zero {
        let ssmax = if fhmx == zero {
            ga
        } else {
            let big = fhmx.max(ga);
            big * (one + (fhmx.min(ga) / big).powi(2)).sqrt()
        };
        return (zero, ssmax);
    }

    if ga < fhmx {
        let as_ = one + fhmn / fhmx;
        let at = (fhmx - fhmn) / fhmx;
        let au = (ga / fhmx).powi(2);
        let c = two / ((as_ * as_ + au).sqrt() + (at * at + au).sqrt());
        (fhmn * c, fhmx / c)
    } else {
        let au = fhmx / ga;
        if au == zero {
            // fhmx/ga underflowed, so the 2x2 is dominated by g
            ((fhmn * fhmx) / ga, ga)
        } else {
            let as_ = one + fhmn / fhmx;
            let at = (fhmx - fhmn) / fhmx;
            let c = one / ((one + (as_ * au).powi(2)).sqrt() + (one + (at * au).powi(2)).sqrt());
            let ssmin = (fhmn * c) * au;
            (ssmin + ssmin, ga / (c + c))
        }
    }
}

/// Singular value decomposition of `[f g; 0 h]` (LAPACK `dlasv2`)
///
/// `ssmax` is the larger singular value in magnitude; the signs of `ssmin` and
/// `ssmax` are chosen so that the rotations are proper and the identity
/// documented on [`Svd2x2`] holds exactly in exact arithmetic.
pub fn lasv2<T: SvdFloat>(f: T, g: T, h: T) -> Svd2x2<T> {
    let zero = T::zero();
    let one = T::one();
    let two = T::lit(2.0);
    let four = T::lit(4.0);
    let half = T::lit(0.5);

    let mut ft = f;
    let mut fa = ft.abs();
    let mut ht = h;
    let mut ha = h.abs();

    // pmax points to the entry of largest magnitude: 1 = f, 2 = g, 3 = h
    let mut pmax = 1;
    let swap = ha > fa;
    if swap {
        pmax = 3;
        mem::swap(&mut ft, &mut ht);
        mem::swap(&mut fa, &mut ha);
    }
    let gt = g;
    let ga = gt.abs();

    let mut ssmin;
    let mut ssmax;
    let clt;
    let crt;
    let slt;
    let srt;
    if ga == zero {
        // diagonal
        ssmin = ha;
        ssmax = fa;
        clt = one;
        crt = one;
        slt = zero;
        srt = zero;
    } else if ga > fa && fa / ga < T::eps() {
        // g dominates to working precision
        pmax = 2;
        ssmax = ga;
        ssmin = if ha > one { fa / (ga / ha) } else { (fa / ga) * ha };
        clt = one;
        slt = ht / gt;
        srt = one;
        crt = ft / gt;
    } else {
        if ga > fa {
            pmax = 2;
        }
        let d = fa - ha;
        let mut l = if d == fa { one } else { d / fa };
        let m = gt / ft;
        let mut t = two - l;
        let mm = m * m;
        let tt = t * t;
        let s = (tt + mm).sqrt();
        let r = if l == zero { m.abs() } else { (l * l + mm).sqrt() };
        let a = half * (s + r);

        ssmin = ha / a;
        ssmax = fa * a;
        if mm == zero {
            // m is tiny
            t = if l == zero {
                svd_fsign(two, ft) * svd_fsign(one, gt)
            } else {
                gt / svd_fsign(d, ft) + m / t
            };
        } else {
            t = (m / (s + t) + m / (r + l)) * (one + a);
        }
        l = (t * t + four).sqrt();
        crt = two / l;
        srt = t / l;
        clt = (crt + srt * m) / a;
        slt = (ht / ft) * srt / a;
    }

    let (csl, snl, csr, snr) = if swap { (srt, crt, slt, clt) } else { (clt, slt, crt, srt) };

    // correct the signs of ssmax and ssmin
    let tsign = match pmax {
        1 => svd_fsign(one, csr) * svd_fsign(one, csl) * svd_fsign(one, f),
        2 => svd_fsign(one, snr) * svd_fsign(one, csl) * svd_fsign(one, g),
        _ => svd_fsign(one, snr) * svd_fsign(one, snl) * svd_fsign(one, h),
    };
    ssmax = svd_fsign(ssmax, tsign);
    ssmin = svd_fsign(ssmin, tsign * svd_fsign(one, f) * svd_fsign(one, h));

    Svd2x2 {
        ssmin,
        ssmax,
        snr,
        csr,
        snl,
        csl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn reconstructs(f: f64, g: f64, h: f64) {
        let sv = lasv2(f, g, h);
        let left: Array2<f64> = array![[sv.csl, sv.snl], [-sv.snl, sv.csl]];
        let right: Array2<f64> = array![[sv.csr, -sv.snr], [sv.snr, sv.csr]];
        let b: Array2<f64> = array![[f, g], [0.0, h]];
        let prod = left.dot(&b).dot(&right);

        let scale = f.abs().max(g.abs()).max(h.abs());
        let tol = 8.0 * f64::EPSILON * scale;
        assert!((prod[[0, 0]] - sv.ssmax).abs() <= tol, "({f}, {g}, {h}): {prod:?} vs {sv:?}");
        assert!((prod[[1, 1]] - sv.ssmin).abs() <= tol, "({f}, {g}, {h}): {prod:?} vs {sv:?}");
        assert!(prod[[0, 1]].abs() <= tol, "({f}, {g}, {h}): {prod:?}");
        assert!(prod[[1, 0]].abs() <= tol, "({f}, {g}, {h}): {prod:?}");

        assert_relative_eq!(sv.csl * sv.csl + sv.snl * sv.snl, 1.0, epsilon = 1e-15);
        assert_relative_eq!(sv.csr * sv.csr + sv.snr * sv.snr, 1.0, epsilon = 1e-15);
        assert!(sv.ssmax.abs() >= sv.ssmin.abs());

        let (ssmin, ssmax) = las2(f, g, h);
        assert_relative_eq!(ssmax, sv.ssmax.abs(), max_relative = 1e-14);
        assert_relative_eq!(ssmin, sv.ssmin.abs(), max_relative = 1e-14, epsilon = 1e-300);
    }

    #[test]
    fn las2_three_five_four() {
        let (ssmin, ssmax) = las2(3.0, 5.0, 4.0);
        // product is |det| and sum of squares is the Frobenius norm
        assert_relative_eq!(ssmin * ssmax, 12.0, max_relative = 1e-14);
        assert_relative_eq!(ssmin * ssmin + ssmax * ssmax, 50.0, max_relative = 1e-14);
        assert_relative_eq!(ssmax, (25.0 + 481f64.sqrt()).sqrt(), max_relative = 1e-14);
    }

    #[test]
    fn las2_zero_diagonal() {
        assert_eq!(las2(0.0, 0.0, 0.0), (0.0, 0.0));
        assert_eq!(las2(0.0, 2.0, 0.0), (0.0, 2.0));
        let (ssmin, ssmax) = las2(3.0, 4.0, 0.0);
        assert_eq!(ssmin, 0.0);
        assert_relative_eq!(ssmax, 5.0, max_relative = 1e-15);
    }

    #[test]
    fn las2_keeps_tiny_singular_value() {
        // det = 1e-20, largest ~ 1, smallest must be ~1e-20 to full accuracy
        let (ssmin, ssmax) = las2(1.0, 1.0e-3, 1.0e-20);
        assert_relative_eq!(ssmin * ssmax, 1.0e-20, max_relative = 1e-14);
    }

    #[test]
    fn lasv2_reconstructs() {
        for &(f, g, h) in &[
            (3.0, 5.0, 4.0),
            (4.0, 5.0, 3.0),
            (1.0, 0.0, 2.0),
            (2.0, 0.0, -1.0),
            (-3.0, 1.0, 7.0),
            (1.0, 1.0e20, 1.0),
            (1.0e-3, 1.0, 2.0e-3),
            (5.0, -2.0, 5.0),
            (-1.0, -1.0, -1.0),
            (1.0, 1.0e-12, 1.0),
        ] {
            reconstructs(f, g, h);
        }
    }

    #[test]
    fn lasv2_diagonal_is_identity_rotation() {
        let sv = lasv2(2.0, 0.0, 1.0);
        assert_eq!((sv.ssmax, sv.ssmin), (2.0, 1.0));
        assert_eq!((sv.csl, sv.snl, sv.csr, sv.snr), (1.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn lasv2_single_precision() {
        let sv = lasv2(3.0f32, 5.0, 4.0);
        assert_relative_eq!(sv.ssmax.abs() * sv.ssmin.abs(), 12.0, max_relative = 1e-6);
    }
}
