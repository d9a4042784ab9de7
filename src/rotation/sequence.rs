use crate::utils::{determine_chunk_size, SvdFloat};
use ndarray::parallel::prelude::*;
use ndarray::{ArrayViewMut1, ArrayViewMut2, Axis};

/// Which side of `A` the rotation sequence multiplies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `A := P * A`, rotating pairs of rows
    Left,
    /// `A := A * P^T`, rotating pairs of columns
    Right,
}

/// Plane in which rotation `k` acts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pivot {
    /// `(k, k + 1)`
    Variable,
    /// `(0, k + 1)`
    Top,
    /// `(k, z - 1)`
    Bottom,
}

/// Order in which the rotations are composed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `P = P(z-2) * ... * P(1) * P(0)`
    Forward,
    /// `P = P(0) * P(1) * ... * P(z-2)`
    Backward,
}

// below this many rotated entries the lanes are processed in order
const PARALLEL_MIN_WORK: usize = 1 << 16;

/// Applies a sequence of plane rotations to a matrix (the LAPACK `dlasr` kernel)
///
/// Rotation `k` is `[c_k s_k; -s_k c_k]` acting in the plane chosen by `pivot`.
/// With `z` the rotated dimension (rows for `Side::Left`, columns for
/// `Side::Right`), `cos` and `sin` must hold `z - 1` entries each.
///
/// Each lane (a column for `Left`, a row for `Right`) is independent of the others,
/// so large matrices are split across the rayon pool; every lane performs the same
/// arithmetic either way.
///
/// # Parameters
/// - side: multiply from the left or from the right
/// - pivot: plane of each rotation
/// - direction: composition order
/// - a: matrix updated in place, any strides
/// - cos, sin: the rotation sequence
pub fn apply_rotations<T: SvdFloat>(
    side: Side,
    pivot: Pivot,
    direction: Direction,
    mut a: ArrayViewMut2<'_, T>,
    cos: &[T],
    sin: &[T],
) {
    let (z, lane_axis) = match side {
        Side::Left => (a.nrows(), Axis(1)),
        Side::Right => (a.ncols(), Axis(0)),
    };
    if z < 2 || a.len_of(lane_axis) == 0 {
        return;
    }
    assert_eq!(cos.len(), z - 1, "apply_rotations: cos must hold {} rotations, got {}", z - 1, cos.len());
    assert_eq!(sin.len(), z - 1, "apply_rotations: sin must hold {} rotations, got {}", z - 1, sin.len());

    let nlanes = a.len_of(lane_axis);
    if nlanes * (z - 1) < PARALLEL_MIN_WORK || rayon::current_num_threads() < 2 {
        rotate_lanes_serial(pivot, direction, a, lane_axis, cos, sin);
        return;
    }

    let chunk = determine_chunk_size(nlanes);
    a.axis_chunks_iter_mut(lane_axis, chunk)
        .into_par_iter()
        .for_each(|block| rotate_lanes_serial(pivot, direction, block, lane_axis, cos, sin));
}

fn rotate_lanes_serial<T: SvdFloat>(
    pivot: Pivot,
    direction: Direction,
    mut a: ArrayViewMut2<'_, T>,
    lane_axis: Axis,
    cos: &[T],
    sin: &[T],
) {
    for lane in a.axis_iter_mut(lane_axis) {
        rotate_lane(pivot, direction, lane, cos, sin);
    }
}

#[rustfmt::skip]
fn rotate_lane<T: SvdFloat>(pivot: Pivot, direction: Direction, mut x: ArrayViewMut1<'_, T>, cos: &[T], sin: &[T]) {
    let z = x.len();
    let mut step = |j: usize| {
        let (c, s) = (cos[j], sin[j]);
        if c == T::one() && s == T::zero() {
            return;
        }
        match pivot {
            Pivot::Variable => {
                let t = x[j + 1];
                x[j + 1] = c * t - s * x[j];
                x[j] = s * t + c * x[j];
            }
            Pivot::Top => {
                let t = x[j + 1];
                x[j + 1] = c * t - s * x[0];
                x[0] = s * t + c * x[0];
            }
            Pivot::Bottom => {
                let t = x[j];
                x[j] = s * x[z - 1] + c * t;
                x[z - 1] = c * x[z - 1] - s * t;
            }
        }
    };
    match direction {
        Direction::Forward => (0..z - 1).for_each(&mut step),
        Direction::Backward => (0..z - 1).rev().for_each(&mut step),
    }
}
