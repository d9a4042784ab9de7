use crate::error::BdsqrError;
use crate::params::{BdsqrParams, Uplo};
use crate::rotation::{apply_rotations, lartg, rot, swap_lanes, Direction, Pivot, Side};
use crate::two_by_two::{las2, lasv2};
use crate::utils::{svd_fsign, SvdFloat};
use log::{debug, trace, warn};
use ndarray::{s, ArrayViewMut2};

/// Computational Diagnostics
///
/// # Fields
/// - order: order `n` of the bidiagonal matrix
/// - sweeps: implicit QR sweeps performed (shifted and zero-shift)
/// - zero_shift_sweeps: sweeps that used a zero shift to protect relative accuracy
/// - direct_2x2: trailing 2x2 blocks solved in closed form
/// - deflations: off-diagonal entries set to zero by the convergence tests
/// - iterations: work-weighted iteration counter (rows touched by the sweeps)
/// - max_iterations: ceiling of `iterations`, `max_sweeps * n * n`
/// - threshold: absolute threshold below which entries count as zero
/// - rotated_lower: true if a lower bidiagonal input was rotated to upper form
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics<T> {
    pub order: usize,
    pub sweeps: usize,
    pub zero_shift_sweeps: usize,
    pub direct_2x2: usize,
    pub deflations: usize,
    pub iterations: usize,
    pub max_iterations: usize,
    pub threshold: T,
    pub rotated_lower: bool,
}

impl<T: SvdFloat> Diagnostics<T> {
    fn new(order: usize) -> Self {
        Self {
            order,
            sweeps: 0,
            zero_shift_sweeps: 0,
            direct_2x2: 0,
            deflations: 0,
            iterations: 0,
            max_iterations: 0,
            threshold: T::zero(),
            rotated_lower: false,
        }
    }
}

/// SVD of a bidiagonal matrix with default parameters, calls `bdsqr_with_params`
/// with `BdsqrParams::default()` (relative accuracy, default `tolmul`, 6 sweeps per
/// singular value).
///
/// # Parameters
/// - uplo: whether `e` is the super- or the sub-diagonal
/// - d: diagonal, length `n`; overwritten by the singular values in decreasing order
/// - e: off-diagonal, at least `n - 1` entries; destroyed
/// - vt: `n x ncvt`, replaced by `P^T * VT`
/// - u: `nru x n`, replaced by `U * Q`
/// - c: `n x ncc`, replaced by `Q^T * C`
pub fn bdsqr<'a, T: SvdFloat>(
    uplo: Uplo,
    d: &mut [T],
    e: &mut [T],
    vt: Option<ArrayViewMut2<'a, T>>,
    u: Option<ArrayViewMut2<'a, T>>,
    c: Option<ArrayViewMut2<'a, T>>,
) -> Result<Diagnostics<T>, BdsqrError> {
    bdsqr_with_params(uplo, d, e, vt, u, c, &BdsqrParams::default())
}

/// Computes the singular value decomposition `B = Q * S * P^T` of a real bidiagonal
/// matrix by implicit zero-shift and shifted QR iteration (LAPACK `dbdsqr`)
///
/// On success `d` holds the singular values in decreasing order, all non-negative,
/// and the factors have been multiplied by the accumulated rotations:
/// `vt <- P^T * vt`, `u <- u * Q`, `c <- Q^T * c`. Passing identities for `u` and
/// `vt` therefore yields the singular vectors of `B`; passing the outputs of a
/// bidiagonal reduction yields those of the original dense matrix.
///
/// Arguments are validated before anything is modified. If the sweep budget runs out,
/// `BdsqrError::NoConvergence` reports how many off-diagonal entries are still nonzero;
/// `d` and `e` then hold a bidiagonal matrix orthogonally equivalent to the input and the
/// factors hold the rotations applied so far.
///
/// # Parameters
/// - uplo: whether `e` is the super- or the sub-diagonal
/// - d: diagonal, length `n`
/// - e: off-diagonal, at least `n - 1` entries, only the first `n - 1` are used
/// - vt: optional `n x ncvt` matrix
/// - u: optional `nru x n` matrix
/// - c: optional `n x ncc` matrix
/// - params: accuracy mode, `tolmul` and sweep budget
#[allow(clippy::too_many_arguments)]
pub fn bdsqr_with_params<'a, T: SvdFloat>(
    uplo: Uplo,
    d: &mut [T],
    e: &mut [T],
    vt: Option<ArrayViewMut2<'a, T>>,
    u: Option<ArrayViewMut2<'a, T>>,
    c: Option<ArrayViewMut2<'a, T>>,
    params: &BdsqrParams<T>,
) -> Result<Diagnostics<T>, BdsqrError> {
    let n = d.len();
    let off = n.saturating_sub(1);

    if e.len() < off {
        return Err(BdsqrError::invalid(
            7,
            "e",
            format!("need at least {off} off-diagonal entries, got {}", e.len()),
        ));
    }
    if let Some(vt) = &vt {
        if vt.nrows() != n {
            return Err(BdsqrError::invalid(8, "vt", format!("expected {n} rows, got {}", vt.nrows())));
        }
    }
    if let Some(u) = &u {
        if u.ncols() != n {
            return Err(BdsqrError::invalid(10, "u", format!("expected {n} columns, got {}", u.ncols())));
        }
    }
    if let Some(c) = &c {
        if c.nrows() != n {
            return Err(BdsqrError::invalid(12, "c", format!("expected {n} rows, got {}", c.nrows())));
        }
    }
    params.validate()?;

    let mut factors = Factors { vt, u, c };
    debug!(
        "bdsqr: n = {n}, ncvt = {}, nru = {}, ncc = {}, {:?}, {:?}",
        factors.ncvt(),
        factors.nru(),
        factors.ncc(),
        uplo,
        params.accuracy
    );

    let mut diagnostics = Diagnostics::new(n);
    if n == 0 {
        return Ok(diagnostics);
    }

    let e = &mut e[..off];
    if n > 1 {
        let mut rotations = SweepRotations::new(off);
        if uplo == Uplo::Lower {
            rotate_lower_to_upper(d, e, &mut rotations, &mut factors);
            diagnostics.rotated_lower = true;
        }
        qr_iterate(d, e, &mut rotations, &mut factors, params, &mut diagnostics)?;
    }

    make_nonnegative(d, &mut factors);
    sort_decreasing(d, &mut factors);

    debug!(
        "bdsqr: converged after {} sweeps ({} zero-shift), {} closed-form 2x2 blocks, {} deflations",
        diagnostics.sweeps, diagnostics.zero_shift_sweeps, diagnostics.direct_2x2, diagnostics.deflations
    );
    Ok(diagnostics)
}

/// Caller-owned matrices that receive the rotations
struct Factors<'a, T> {
    vt: Option<ArrayViewMut2<'a, T>>,
    u: Option<ArrayViewMut2<'a, T>>,
    c: Option<ArrayViewMut2<'a, T>>,
}

impl<T: SvdFloat> Factors<'_, T> {
    fn ncvt(&self) -> usize {
        self.vt.as_ref().map_or(0, |vt| vt.ncols())
    }

    fn nru(&self) -> usize {
        self.u.as_ref().map_or(0, |u| u.nrows())
    }

    fn ncc(&self) -> usize {
        self.c.as_ref().map_or(0, |c| c.ncols())
    }

    /// Applies one sweep over rows/columns `lo..=hi`: `vt_rot` to the rows of VT,
    /// `uc_rot` to the columns of U and the rows of C.
    fn apply_sweep(&mut self, lo: usize, hi: usize, direction: Direction, vt_rot: (&[T], &[T]), uc_rot: (&[T], &[T])) {
        let len = hi - lo;
        if let Some(vt) = self.vt.as_mut() {
            let (cos, sin) = vt_rot;
            let block = vt.slice_mut(s![lo..=hi, ..]);
            apply_rotations(Side::Left, Pivot::Variable, direction, block, &cos[..len], &sin[..len]);
        }
        let (cos, sin) = uc_rot;
        if let Some(u) = self.u.as_mut() {
            let block = u.slice_mut(s![.., lo..=hi]);
            apply_rotations(Side::Right, Pivot::Variable, direction, block, &cos[..len], &sin[..len]);
        }
        if let Some(c) = self.c.as_mut() {
            let block = c.slice_mut(s![lo..=hi, ..]);
            apply_rotations(Side::Left, Pivot::Variable, direction, block, &cos[..len], &sin[..len]);
        }
    }

    /// Rotates planes `(i, i + 1)` after a closed-form 2x2 solve.
    fn rotate_pair(&mut self, i: usize, (cosr, sinr): (T, T), (cosl, sinl): (T, T)) {
        if let Some(vt) = self.vt.as_mut() {
            let (x, y) = vt.multi_slice_mut((s![i, ..], s![i + 1, ..]));
            rot(x, y, cosr, sinr);
        }
        if let Some(u) = self.u.as_mut() {
            let (x, y) = u.multi_slice_mut((s![.., i], s![.., i + 1]));
            rot(x, y, cosl, sinl);
        }
        if let Some(c) = self.c.as_mut() {
            let (x, y) = c.multi_slice_mut((s![i, ..], s![i + 1, ..]));
            rot(x, y, cosl, sinl);
        }
    }

    fn negate_right_vector(&mut self, i: usize) {
        if let Some(vt) = self.vt.as_mut() {
            vt.row_mut(i).mapv_inplace(|x| -x);
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        if let Some(vt) = self.vt.as_mut() {
            let (x, y) = vt.multi_slice_mut((s![i, ..], s![j, ..]));
            swap_lanes(x, y);
        }
        if let Some(u) = self.u.as_mut() {
            let (x, y) = u.multi_slice_mut((s![.., i], s![.., j]));
            swap_lanes(x, y);
        }
        if let Some(c) = self.c.as_mut() {
            let (x, y) = c.multi_slice_mut((s![i, ..], s![j, ..]));
            swap_lanes(x, y);
        }
    }
}

/// Cosines and sines of one bulge chase
///
/// Every step of a sweep generates two rotations; `first_*` holds the first of each
/// pair and `second_*` the second, indexed from the top of the active window.
#[derive(Debug, Clone, PartialEq)]
struct SweepRotations<T> {
    first_cos: Vec<T>,
    first_sin: Vec<T>,
    second_cos: Vec<T>,
    second_sin: Vec<T>,
}

impl<T: SvdFloat> SweepRotations<T> {
    fn new(len: usize) -> Self {
        Self {
            first_cos: vec![T::zero(); len],
            first_sin: vec![T::zero(); len],
            second_cos: vec![T::zero(); len],
            second_sin: vec![T::zero(); len],
        }
    }

    fn record(&mut self, k: usize, first: (T, T), second: (T, T)) {
        self.first_cos[k] = first.0;
        self.first_sin[k] = first.1;
        self.second_cos[k] = second.0;
        self.second_sin[k] = second.1;
    }

    fn first(&self) -> (&[T], &[T]) {
        (&self.first_cos, &self.first_sin)
    }

    fn second(&self) -> (&[T], &[T]) {
        (&self.second_cos, &self.second_sin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Looking for the bottom-most unreduced block
    Scanning,
    /// Rows `lo` and `lo + 1` form the last unreduced 2x2 block
    Direct2x2 { lo: usize },
    /// Rows `lo..=hi` get one implicit QR sweep
    ShiftAndChase { lo: usize },
    Converged,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chase {
    /// bulge travels from the top (big end) to the bottom
    Down,
    /// bulge travels from the bottom (big end) to the top
    Up,
}

fn rotate_lower_to_upper<T: SvdFloat>(d: &mut [T], e: &mut [T], rotations: &mut SweepRotations<T>, factors: &mut Factors<'_, T>) {
    let n = d.len();
    for i in 0..n - 1 {
        let (cs, sn, r) = lartg(d[i], e[i]);
        d[i] = r;
        e[i] = sn * d[i + 1];
        d[i + 1] = cs * d[i + 1];
        rotations.first_cos[i] = cs;
        rotations.first_sin[i] = sn;
    }
    let (cos, sin) = rotations.first();
    if let Some(u) = factors.u.as_mut() {
        apply_rotations(Side::Right, Pivot::Variable, Direction::Forward, u.view_mut(), cos, sin);
    }
    if let Some(c) = factors.c.as_mut() {
        apply_rotations(Side::Left, Pivot::Variable, Direction::Forward, c.view_mut(), cos, sin);
    }
}

/// Absolute threshold below which `d` and `e` entries are treated as zero
fn convergence_threshold<T: SvdFloat>(d: &[T], e: &[T], params: &BdsqrParams<T>) -> T {
    let n = d.len();
    let n_t = T::lit(n as f64);
    let floor = T::lit(params.max_sweeps as f64) * (n_t * (n_t * T::safe_min()));
    let tol = params.tol();

    if params.relative() {
        // estimate of the smallest singular value
        let mut sminoa = d[0].abs();
        if sminoa != T::zero() {
            let mut mu = sminoa;
            for i in 1..n {
                mu = d[i].abs() * (mu / (mu + e[i - 1].abs()));
                sminoa = sminoa.min(mu);
                if sminoa == T::zero() {
                    break;
                }
            }
        }
        sminoa = sminoa / n_t.sqrt();
        (tol * sminoa).max(floor)
    } else {
        let smax = d.iter().chain(e.iter()).fold(T::zero(), |acc, x| acc.max(x.abs()));
        (tol * smax).max(floor)
    }
}

fn qr_iterate<T: SvdFloat>(
    d: &mut [T],
    e: &mut [T],
    rotations: &mut SweepRotations<T>,
    factors: &mut Factors<'_, T>,
    params: &BdsqrParams<T>,
    diagnostics: &mut Diagnostics<T>,
) -> Result<(), BdsqrError> {
    let n = d.len();
    let eps = T::eps();
    let tol = params.tol();
    let relative = params.relative();
    let hundredth = T::lit(0.01);
    let n_t = T::lit(n as f64);

    let thresh = convergence_threshold(d, e, params);
    diagnostics.threshold = thresh;
    diagnostics.max_iterations = params.max_sweeps.saturating_mul(n).saturating_mul(n);

    // last row of the unconverged leading part
    let mut hi = n - 1;
    let mut previous: Option<(usize, usize)> = None;
    let mut chase = Chase::Down;
    let mut smax = T::zero();
    let mut phase = Phase::Scanning;

    loop {
        phase = match phase {
            Phase::Scanning => {
                if hi == 0 {
                    Phase::Converged
                } else if diagnostics.iterations > diagnostics.max_iterations {
                    Phase::Failed
                } else {
                    if !relative && d[hi].abs() <= thresh {
                        d[hi] = T::zero();
                    }
                    smax = d[hi].abs();
                    let mut split = None;
                    for i in (0..hi).rev() {
                        let abss = d[i].abs();
                        let abse = e[i].abs();
                        if !relative && abss <= thresh {
                            d[i] = T::zero();
                        }
                        if abse <= thresh {
                            split = Some(i);
                            break;
                        }
                        smax = smax.max(abss).max(abse);
                    }
                    match split {
                        Some(i) if i + 1 == hi => {
                            // bottom singular value converged
                            e[i] = T::zero();
                            hi -= 1;
                            Phase::Scanning
                        }
                        Some(i) => {
                            e[i] = T::zero();
                            trace!("bdsqr: split at {i}, active block {}..={hi}", i + 1);
                            if i + 2 == hi {
                                Phase::Direct2x2 { lo: i + 1 }
                            } else {
                                Phase::ShiftAndChase { lo: i + 1 }
                            }
                        }
                        None if hi == 1 => Phase::Direct2x2 { lo: 0 },
                        None => Phase::ShiftAndChase { lo: 0 },
                    }
                }
            }
            Phase::Direct2x2 { lo } => {
                let sv = lasv2(d[lo], e[lo], d[lo + 1]);
                d[lo] = sv.ssmax;
                e[lo] = T::zero();
                d[lo + 1] = sv.ssmin;
                factors.rotate_pair(lo, (sv.csr, sv.snr), (sv.csl, sv.snl));
                diagnostics.direct_2x2 += 1;
                if lo == 0 {
                    Phase::Converged
                } else {
                    hi = lo - 1;
                    Phase::Scanning
                }
            }
            Phase::ShiftAndChase { lo } => {
                // choose the chase direction only when the active block changed
                let changed = match previous {
                    None => true,
                    Some((old_lo, old_hi)) => lo > old_hi || hi < old_lo,
                };
                if changed {
                    chase = if d[lo].abs() >= d[hi].abs() { Chase::Down } else { Chase::Up };
                }

                match convergence_test(d, e, lo, hi, chase, tol, thresh, relative) {
                    Err(k) => {
                        trace!("bdsqr: e[{k}] negligible, deflating");
                        e[k] = T::zero();
                        diagnostics.deflations += 1;
                    }
                    Ok(sminl) => {
                        previous = Some((lo, hi));

                        // a zero shift keeps the small singular values relatively accurate,
                        // and is the only sweep that deflates a zero diagonal entry
                        let zero_diagonal = d[lo..=hi].iter().any(|x| *x == T::zero());
                        let shift = if zero_diagonal
                            || (relative && n_t * tol * (sminl / smax) <= eps.max(hundredth * tol))
                        {
                            T::zero()
                        } else {
                            choose_shift(d, e, lo, hi, chase)
                        };

                        diagnostics.iterations += hi - lo;
                        diagnostics.sweeps += 1;
                        if shift == T::zero() {
                            diagnostics.zero_shift_sweeps += 1;
                        }
                        trace!("bdsqr: {chase:?} sweep over {lo}..={hi}, shift {shift:?}");
                        chase_bulge(d, e, lo, hi, shift, chase, rotations, factors);

                        let last = match chase {
                            Chase::Down => hi - 1,
                            Chase::Up => lo,
                        };
                        if e[last].abs() <= thresh {
                            e[last] = T::zero();
                        }
                    }
                }
                Phase::Scanning
            }
            Phase::Converged => return Ok(()),
            Phase::Failed => {
                let unconverged = e.iter().filter(|x| **x != T::zero()).count();
                if unconverged == 0 {
                    // the last sweep finished the matrix on its own
                    return Ok(());
                }
                warn!(
                    "bdsqr: {unconverged} off-diagonal entries did not converge after {} iterations",
                    diagnostics.iterations
                );
                return Err(BdsqrError::NoConvergence { unconverged });
            }
        };
    }
}

/// Shift from the 2x2 block at the far end of the chase, or zero if it is
/// negligible next to the entry the chase starts from.
fn choose_shift<T: SvdFloat>(d: &[T], e: &[T], lo: usize, hi: usize, chase: Chase) -> T {
    let (sll, shift) = match chase {
        Chase::Down => (d[lo].abs(), las2(d[hi - 1], e[hi - 1], d[hi]).0),
        Chase::Up => (d[hi].abs(), las2(d[lo], e[lo], d[lo + 1]).0),
    };
    if sll > T::zero() && (shift / sll).powi(2) < T::eps() {
        T::zero()
    } else {
        shift
    }
}

/// One implicit QR sweep over `lo..=hi`, rotations applied to the factors.
#[allow(clippy::too_many_arguments)]
fn chase_bulge<T: SvdFloat>(
    d: &mut [T],
    e: &mut [T],
    lo: usize,
    hi: usize,
    shift: T,
    chase: Chase,
    rotations: &mut SweepRotations<T>,
    factors: &mut Factors<'_, T>,
) {
    match (chase, shift == T::zero()) {
        (Chase::Down, true) => zero_shift_sweep_down(d, e, lo, hi, rotations),
        (Chase::Up, true) => zero_shift_sweep_up(d, e, lo, hi, rotations),
        (Chase::Down, false) => shifted_sweep_down(d, e, lo, hi, shift, rotations),
        (Chase::Up, false) => shifted_sweep_up(d, e, lo, hi, shift, rotations),
    }
    match chase {
        Chase::Down => factors.apply_sweep(lo, hi, Direction::Forward, rotations.first(), rotations.second()),
        Chase::Up => factors.apply_sweep(lo, hi, Direction::Backward, rotations.second(), rotations.first()),
    }
}

/// Convergence test along the chase direction
///
/// Returns the running estimate of the smallest singular value of the block, or the
/// index of an off-diagonal entry that is negligible and must be zeroed.
#[allow(clippy::too_many_arguments)]
fn convergence_test<T: SvdFloat>(
    d: &[T],
    e: &[T],
    lo: usize,
    hi: usize,
    chase: Chase,
    tol: T,
    thresh: T,
    relative: bool,
) -> Result<T, usize> {
    let mut sminl = T::zero();
    match chase {
        Chase::Down => {
            // standard test at the bottom first
            if e[hi - 1].abs() <= tol * d[hi].abs() || (!relative && e[hi - 1].abs() <= thresh) {
                return Err(hi - 1);
            }
            if relative {
                let mut mu = d[lo].abs();
                sminl = mu;
                for i in lo..hi {
                    if e[i].abs() <= tol * mu {
                        return Err(i);
                    }
                    mu = d[i + 1].abs() * (mu / (mu + e[i].abs()));
                    sminl = sminl.min(mu);
                }
            }
        }
        Chase::Up => {
            // standard test at the top first
            if e[lo].abs() <= tol * d[lo].abs() || (!relative && e[lo].abs() <= thresh) {
                return Err(lo);
            }
            if relative {
                let mut mu = d[hi].abs();
                sminl = mu;
                for i in (lo..hi).rev() {
                    if e[i].abs() <= tol * mu {
                        return Err(i);
                    }
                    mu = d[i].abs() * (mu / (mu + e[i].abs()));
                    sminl = sminl.min(mu);
                }
            }
        }
    }
    Ok(sminl)
}

/// Demmel-Kahan zero-shift QR sweep, top to bottom.
/// first: rotations for VT, second: rotations for U and C.
fn zero_shift_sweep_down<T: SvdFloat>(d: &mut [T], e: &mut [T], lo: usize, hi: usize, rotations: &mut SweepRotations<T>) {
    let mut cs = T::one();
    let mut oldcs = T::one();
    let mut oldsn = T::zero();
    for i in lo..hi {
        let (c, sn, r) = lartg(d[i] * cs, e[i]);
        cs = c;
        if i > lo {
            e[i - 1] = oldsn * r;
        }
        let (c2, s2, r2) = lartg(oldcs * r, d[i + 1] * sn);
        oldcs = c2;
        oldsn = s2;
        d[i] = r2;
        rotations.record(i - lo, (cs, sn), (oldcs, oldsn));
    }
    let h = d[hi] * cs;
    d[hi] = h * oldcs;
    e[hi - 1] = h * oldsn;
}

/// Demmel-Kahan zero-shift QR sweep, bottom to top.
/// first: rotations for U and C, second: rotations for VT.
fn zero_shift_sweep_up<T: SvdFloat>(d: &mut [T], e: &mut [T], lo: usize, hi: usize, rotations: &mut SweepRotations<T>) {
    let mut cs = T::one();
    let mut oldcs = T::one();
    let mut oldsn = T::zero();
    for i in (lo + 1..=hi).rev() {
        let (c, sn, r) = lartg(d[i] * cs, e[i - 1]);
        cs = c;
        if i < hi {
            e[i] = oldsn * r;
        }
        let (c2, s2, r2) = lartg(oldcs * r, d[i - 1] * sn);
        oldcs = c2;
        oldsn = s2;
        d[i] = r2;
        rotations.record(i - lo - 1, (cs, -sn), (oldcs, -oldsn));
    }
    let h = d[lo] * cs;
    d[lo] = h * oldcs;
    e[lo] = h * oldsn;
}

/// Shifted implicit QR sweep, top to bottom.
/// first: rotations for VT, second: rotations for U and C.
fn shifted_sweep_down<T: SvdFloat>(d: &mut [T], e: &mut [T], lo: usize, hi: usize, shift: T, rotations: &mut SweepRotations<T>) {
    let mut f = (d[lo].abs() - shift) * (svd_fsign(T::one(), d[lo]) + shift / d[lo]);
    let mut g = e[lo];
    for i in lo..hi {
        let (cosr, sinr, r) = lartg(f, g);
        if i > lo {
            e[i - 1] = r;
        }
        f = cosr * d[i] + sinr * e[i];
        e[i] = cosr * e[i] - sinr * d[i];
        g = sinr * d[i + 1];
        d[i + 1] = cosr * d[i + 1];

        let (cosl, sinl, r) = lartg(f, g);
        d[i] = r;
        f = cosl * e[i] + sinl * d[i + 1];
        d[i + 1] = cosl * d[i + 1] - sinl * e[i];
        if i + 1 < hi {
            g = sinl * e[i + 1];
            e[i + 1] = cosl * e[i + 1];
        }
        rotations.record(i - lo, (cosr, sinr), (cosl, sinl));
    }
    e[hi - 1] = f;
}

/// Shifted implicit QR sweep, bottom to top.
/// first: rotations for U and C, second: rotations for VT.
fn shifted_sweep_up<T: SvdFloat>(d: &mut [T], e: &mut [T], lo: usize, hi: usize, shift: T, rotations: &mut SweepRotations<T>) {
    let mut f = (d[hi].abs() - shift) * (svd_fsign(T::one(), d[hi]) + shift / d[hi]);
    let mut g = e[hi - 1];
    for i in (lo + 1..=hi).rev() {
        let (cosr, sinr, r) = lartg(f, g);
        if i < hi {
            e[i] = r;
        }
        f = cosr * d[i] + sinr * e[i - 1];
        e[i - 1] = cosr * e[i - 1] - sinr * d[i];
        g = sinr * d[i - 1];
        d[i - 1] = cosr * d[i - 1];

        let (cosl, sinl, r) = lartg(f, g);
        d[i] = r;
        f = cosl * e[i - 1] + sinl * d[i - 1];
        d[i - 1] = cosl * d[i - 1] - sinl * e[i - 1];
        if i > lo + 1 {
            g = sinl * e[i - 2];
            e[i - 2] = cosl * e[i - 2];
        }
        rotations.record(i - lo - 1, (cosr, -sinr), (cosl, -sinl));
    }
    e[lo] = f;
}

fn make_nonnegative<T: SvdFloat>(d: &mut [T], factors: &mut Factors<'_, T>) {
    for (i, x) in d.iter_mut().enumerate() {
        if *x < T::zero() {
            *x = -*x;
            factors.negate_right_vector(i);
        }
    }
}

// selection sort: at most one swap of singular vectors per position
fn sort_decreasing<T: SvdFloat>(d: &mut [T], factors: &mut Factors<'_, T>) {
    let n = d.len();
    for i in 1..n {
        // move the smallest of d[..=last] to the end
        let last = n - i;
        let mut isub = 0;
        let mut smin = d[0];
        for (j, x) in d.iter().enumerate().take(last + 1).skip(1) {
            if *x <= smin {
                isub = j;
                smin = *x;
            }
        }
        if isub != last {
            d[isub] = d[last];
            d[last] = smin;
            factors.swap(isub, last);
        }
    }
}
