use crate::bdsqr::{bdsqr_with_params, Diagnostics};
use crate::error::BdsqrError;
use crate::params::{BdsqrParams, Uplo};
use crate::utils::SvdFloat;
use ndarray::{Array1, Array2};

/// Singular Value Decomposition of a bidiagonal matrix, `B = U * diag(s) * VT`
///
/// # Fields
/// - s: singular values in decreasing order (length `n`)
/// - u: left singular vectors, the vectors are the columns of `u`
/// - vt: transpose of right singular vectors, the vectors are the rows of `vt`
/// - diagnostics: Computational diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct BidiagSvd<T> {
    pub s: Array1<T>,
    pub u: Array2<T>,
    pub vt: Array2<T>,
    pub diagnostics: Diagnostics<T>,
}

impl<T: SvdFloat> BidiagSvd<T> {
    /// Rebuilds the dense `n x n` matrix from its factors
    pub fn recompose(&self) -> Array2<T> {
        let sdiag = Array2::from_diag(&self.s);
        self.u.dot(&sdiag).dot(&self.vt)
    }
}

/// Full SVD of a bidiagonal matrix with default parameters, calls `bidiag_svd_with_params`
///
/// # Parameters
/// - uplo: whether `e` is the super- or the sub-diagonal
/// - d: diagonal (length `n`)
/// - e: off-diagonal (length `n - 1`)
pub fn bidiag_svd<T: SvdFloat>(uplo: Uplo, d: &[T], e: &[T]) -> Result<BidiagSvd<T>, BdsqrError> {
    bidiag_svd_with_params(uplo, d, e, &BdsqrParams::default())
}

/// Full SVD of a bidiagonal matrix; the inputs are copied, not modified
///
/// # Parameters
/// - uplo: whether `e` is the super- or the sub-diagonal
/// - d: diagonal (length `n`)
/// - e: off-diagonal (length `n - 1`)
/// - params: accuracy mode, `tolmul` and sweep budget
pub fn bidiag_svd_with_params<T: SvdFloat>(
    uplo: Uplo,
    d: &[T],
    e: &[T],
    params: &BdsqrParams<T>,
) -> Result<BidiagSvd<T>, BdsqrError> {
    let n = d.len();
    let mut s = d.to_vec();
    let mut work = e.to_vec();
    let mut u = Array2::eye(n);
    let mut vt = Array2::eye(n);

    let diagnostics = bdsqr_with_params(uplo, &mut s, &mut work, Some(vt.view_mut()), Some(u.view_mut()), None, params)?;

    Ok(BidiagSvd {
        s: Array1::from(s),
        u,
        vt,
        diagnostics,
    })
}

/// Singular values only, in decreasing order
pub fn bidiag_singular_values<T: SvdFloat>(uplo: Uplo, d: &[T], e: &[T]) -> Result<Array1<T>, BdsqrError> {
    let mut s = d.to_vec();
    let mut work = e.to_vec();
    bdsqr_with_params(uplo, &mut s, &mut work, None, None, None, &BdsqrParams::default())?;
    Ok(Array1::from(s))
}

/// Dense `n x n` form of the bidiagonal matrix with diagonal `d` and off-diagonal `e`.
/// Entries of `e` past `n - 1` are ignored.
pub fn bidiagonal_matrix<T: SvdFloat>(uplo: Uplo, d: &[T], e: &[T]) -> Array2<T> {
    let n = d.len();
    let mut b = Array2::zeros((n, n));
    for (i, x) in d.iter().enumerate() {
        b[[i, i]] = *x;
    }
    for (i, x) in e.iter().take(n.saturating_sub(1)).enumerate() {
        match uplo {
            Uplo::Upper => b[[i, i + 1]] = *x,
            Uplo::Lower => b[[i + 1, i]] = *x,
        }
    }
    b
}
