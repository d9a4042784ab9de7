//! LAPACK-style calling convention over flat column-major buffers
//!
//! Argument positions in [`BdsqrError::InvalidArgument`] follow `dbdsqr`:
//! 1 uplo, 2 n, 3 ncvt, 4 nru, 5 ncc, 6 d, 7 e, 8 vt, 9 ldvt, 10 u, 11 ldu, 12 c, 13 ldc.

use crate::bdsqr::{bdsqr, Diagnostics};
use crate::error::BdsqrError;
use crate::params::Uplo;
use crate::utils::SvdFloat;
use ndarray::{ArrayViewMut2, ShapeBuilder};

/// `dbdsqr` over column-major storage
///
/// `vt` is `n x ncvt` with leading dimension `ldvt`, `u` is `nru x n` with leading
/// dimension `ldu`, `c` is `n x ncc` with leading dimension `ldc`. A factor with zero
/// columns (or rows, for `u`) is not referenced and its buffer may be empty.
/// On success the singular values are in `d[..n]` in decreasing order.
///
/// Use [`BdsqrError::info`] to recover the LAPACK `INFO` code from an error.
#[allow(clippy::too_many_arguments)]
pub fn bdsqr_col_major<T: SvdFloat>(
    uplo: Uplo,
    n: usize,
    ncvt: usize,
    nru: usize,
    ncc: usize,
    d: &mut [T],
    e: &mut [T],
    vt: &mut [T],
    ldvt: usize,
    u: &mut [T],
    ldu: usize,
    c: &mut [T],
    ldc: usize,
) -> Result<Diagnostics<T>, BdsqrError> {
    let off = n.saturating_sub(1);
    if d.len() < n {
        return Err(BdsqrError::invalid(6, "d", format!("need {n} entries, got {}", d.len())));
    }
    if e.len() < off {
        return Err(BdsqrError::invalid(7, "e", format!("need {off} entries, got {}", e.len())));
    }
    if ldvt < 1 || (ncvt > 0 && ldvt < n.max(1)) {
        return Err(BdsqrError::invalid(9, "ldvt", format!("{ldvt} is smaller than max(1, n = {n})")));
    }
    let vt_len = required_len(n, ncvt, ldvt);
    if vt.len() < vt_len {
        return Err(BdsqrError::invalid(8, "vt", format!("need {vt_len} entries, got {}", vt.len())));
    }
    if ldu < nru.max(1) {
        return Err(BdsqrError::invalid(11, "ldu", format!("{ldu} is smaller than max(1, nru = {nru})")));
    }
    let u_len = required_len(nru, n, ldu);
    if u.len() < u_len {
        return Err(BdsqrError::invalid(10, "u", format!("need {u_len} entries, got {}", u.len())));
    }
    if ldc < 1 || (ncc > 0 && ldc < n.max(1)) {
        return Err(BdsqrError::invalid(13, "ldc", format!("{ldc} is smaller than max(1, n = {n})")));
    }
    let c_len = required_len(n, ncc, ldc);
    if c.len() < c_len {
        return Err(BdsqrError::invalid(12, "c", format!("need {c_len} entries, got {}", c.len())));
    }

    let vt = col_major_view(&mut vt[..vt_len], n, ncvt, ldvt)?;
    let u = col_major_view(&mut u[..u_len], nru, n, ldu)?;
    let c = col_major_view(&mut c[..c_len], n, ncc, ldc)?;

    bdsqr(uplo, &mut d[..n], &mut e[..off], vt, u, c)
}

/// Entries spanned by a `rows x cols` column-major matrix with leading dimension `ld`
fn required_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        ld * (cols - 1) + rows
    }
}

fn col_major_view<T>(data: &mut [T], rows: usize, cols: usize, ld: usize) -> Result<Option<ArrayViewMut2<'_, T>>, BdsqrError> {
    if rows == 0 || cols == 0 {
        return Ok(None);
    }
    let view = ArrayViewMut2::from_shape((rows, cols).strides((1, ld)), data)?;
    Ok(Some(view))
}
