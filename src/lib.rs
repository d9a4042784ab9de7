pub mod error;
pub mod lapack;
pub mod params;
pub mod rotation;
pub mod two_by_two;
mod bdsqr;
mod decompose;
pub(crate) mod utils;

pub use bdsqr::*;
pub use decompose::*;
pub use error::BdsqrError;
pub use params::{Accuracy, BdsqrParams, Uplo, DEFAULT_MAX_SWEEPS};
pub use utils::SvdFloat;

#[cfg(test)]
mod simple_comparison_tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::DMatrix;
    use ndarray::{Array1, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    fn random_bidiagonal(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let d = (0..n).map(|_| rng.sample(StandardNormal)).collect();
        let e = (0..n - 1).map(|_| rng.sample(StandardNormal)).collect();
        (d, e)
    }

    fn reference_singular_values(b: &Array2<f64>) -> Vec<f64> {
        let (nrows, ncols) = b.dim();
        let m = DMatrix::from_fn(nrows, ncols, |i, j| b[[i, j]]);
        let mut s: Vec<f64> = m.singular_values().iter().copied().collect();
        s.sort_by(|a, b| b.total_cmp(a));
        s
    }

    #[test]
    fn random_matrix_comparison() -> anyhow::Result<()> {
        let n = 30;
        let (d, e) = random_bidiagonal(n, 12345);
        let b = bidiagonal_matrix(Uplo::Upper, &d, &e);

        let svd = bidiag_svd(Uplo::Upper, &d, &e)?;
        let expected = reference_singular_values(&b);
        let smax = expected[0];

        for (i, (ours, theirs)) in svd.s.iter().zip(&expected).enumerate() {
            let diff = (ours - theirs).abs();
            assert!(
                diff < 1e-12 * smax,
                "Singular value {} differs by {}: bdsqr = {}, nalgebra = {}",
                i, diff, ours, theirs
            );
        }

        assert_abs_diff_eq!(svd.recompose(), b, epsilon = 1e-12);
        assert_abs_diff_eq!(svd.u.t().dot(&svd.u), Array2::<f64>::eye(n), epsilon = 1e-12);
        assert_abs_diff_eq!(svd.vt.dot(&svd.vt.t()), Array2::<f64>::eye(n), epsilon = 1e-12);
        assert!(svd.diagnostics.sweeps > 0);
        assert!(svd.diagnostics.iterations <= svd.diagnostics.max_iterations + n);
        Ok(())
    }

    #[test]
    fn lower_matrix_comparison() -> anyhow::Result<()> {
        let n = 17;
        let (d, e) = random_bidiagonal(n, 99);
        let b = bidiagonal_matrix(Uplo::Lower, &d, &e);

        let svd = bidiag_svd(Uplo::Lower, &d, &e)?;
        let expected = reference_singular_values(&b);
        assert_abs_diff_eq!(svd.s, Array1::from(expected), epsilon = 1e-12);
        assert_abs_diff_eq!(svd.recompose(), b, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn scaling_by_power_of_two() -> anyhow::Result<()> {
        let (d, e) = random_bidiagonal(20, 7);
        let scaled_d: Vec<f64> = d.iter().map(|x| x * 8.0).collect();
        let scaled_e: Vec<f64> = e.iter().map(|x| x * 8.0).collect();

        let svd = bidiag_svd(Uplo::Upper, &d, &e)?;
        let scaled = bidiag_svd(Uplo::Upper, &scaled_d, &scaled_e)?;
        for (a, b) in svd.s.iter().zip(scaled.s.iter()) {
            assert_relative_eq!(a * 8.0, *b, max_relative = 1e-14);
        }
        // the rotations themselves do not change
        assert_abs_diff_eq!(svd.u, scaled.u, epsilon = 1e-13);
        assert_abs_diff_eq!(svd.vt, scaled.vt, epsilon = 1e-13);

        let values = bidiag_singular_values(Uplo::Upper, &scaled_d, &scaled_e)?;
        assert_abs_diff_eq!(values, scaled.s, epsilon = 1e-13);
        Ok(())
    }

    #[test]
    fn c_receives_transpose_of_u() -> anyhow::Result<()> {
        let n = 12;
        for uplo in [Uplo::Upper, Uplo::Lower] {
            let (mut d, mut e) = random_bidiagonal(n, 21);
            let mut u = Array2::<f64>::eye(n);
            let mut c = Array2::<f64>::eye(n);
            bdsqr(uplo, &mut d, &mut e, None, Some(u.view_mut()), Some(c.view_mut()))?;
            assert_eq!(c, u.t(), "{uplo:?}");
        }
        Ok(())
    }

    #[test]
    fn graded_matrix_keeps_relative_accuracy() -> anyhow::Result<()> {
        // det(B) = prod(d), so the product of the singular values must match it
        // even though they span 60 orders of magnitude
        let n = 13;
        let d: Vec<f64> = (0..n).map(|i| 10f64.powi(-5 * i as i32)).collect();
        let e: Vec<f64> = (0..n - 1).map(|i| 0.5 * 10f64.powi(-5 * i as i32)).collect();

        let svd = bidiag_svd(Uplo::Upper, &d, &e)?;
        let log_det: f64 = d.iter().map(|x| x.abs().ln()).sum();
        let log_prod: f64 = svd.s.iter().map(|x| x.ln()).sum();
        assert_relative_eq!(log_prod, log_det, max_relative = 1e-13);

        // the largest value does not depend on the accuracy mode
        let absolute = bidiag_svd_with_params(
            Uplo::Upper,
            &d,
            &e,
            &BdsqrParams::default().with_accuracy(Accuracy::Absolute),
        )?;
        assert_relative_eq!(svd.s[0], absolute.s[0], max_relative = 1e-14);
        assert!(svd.s[n - 1] > 0.0);
        Ok(())
    }

    #[test]
    fn absolute_and_relative_agree_on_large_values() -> anyhow::Result<()> {
        let n = 25;
        let (d, e) = random_bidiagonal(n, 3);
        let relative = bidiag_svd(Uplo::Upper, &d, &e)?;
        let params = BdsqrParams::default().with_accuracy(Accuracy::Absolute);
        let absolute = bidiag_svd_with_params(Uplo::Upper, &d, &e, &params)?;

        let smax = relative.s[0];
        assert_abs_diff_eq!(relative.s, absolute.s, epsilon = 1e-12 * smax);
        assert_abs_diff_eq!(absolute.recompose(), bidiagonal_matrix(Uplo::Upper, &d, &e), epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn single_precision_matches_double() -> anyhow::Result<()> {
        let (d, e) = random_bidiagonal(10, 5);
        let d32: Vec<f32> = d.iter().map(|x| *x as f32).collect();
        let e32: Vec<f32> = e.iter().map(|x| *x as f32).collect();

        let s64 = bidiag_singular_values(Uplo::Upper, &d, &e)?;
        let s32 = bidiag_singular_values(Uplo::Upper, &d32, &e32)?;
        for (a, b) in s64.iter().zip(s32.iter()) {
            assert_abs_diff_eq!(*a, *b as f64, epsilon = 1e-4 * s64[0]);
        }
        Ok(())
    }

    #[test]
    fn thread_count_does_not_change_results() -> anyhow::Result<()> {
        // tall U so the rotation sequences take the parallel path
        let (n, nru) = (40, 2000);
        let (d, e) = random_bidiagonal(n, 77);
        let mut rng = StdRng::seed_from_u64(78);
        let u0 = Array2::from_shape_fn((nru, n), |_| rng.random_range(-1.0..1.0));

        let run = |threads: usize| -> anyhow::Result<(Vec<f64>, Array2<f64>)> {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
            let (mut d, mut e, mut u) = (d.clone(), e.clone(), u0.clone());
            pool.install(|| bdsqr(Uplo::Upper, &mut d, &mut e, None, Some(u.view_mut()), None))?;
            Ok((d, u))
        };

        let (d1, u1) = run(1)?;
        let (d4, u4) = run(4)?;
        assert_eq!(d1, d4);
        assert_eq!(u1, u4);
        Ok(())
    }
}
