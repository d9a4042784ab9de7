use ndarray::ShapeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BdsqrError {
    /// A precondition on argument `position` (LAPACK numbering) does not hold.
    /// Nothing was modified.
    #[error("bdsqr: argument {position} ({name}) is invalid: {reason}")]
    InvalidArgument {
        position: usize,
        name: &'static str,
        reason: String,
    },

    #[error("bdsqr: invalid parameters: {0}")]
    InvalidParameters(String),

    /// The sweep budget ran out with `unconverged` off-diagonal entries still nonzero.
    /// `d`/`e` hold a bidiagonal matrix orthogonally equivalent to the input.
    #[error("bdsqr: {unconverged} off-diagonal entries did not converge to zero")]
    NoConvergence { unconverged: usize },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl BdsqrError {
    pub(crate) fn invalid(position: usize, name: &'static str, reason: String) -> Self {
        BdsqrError::InvalidArgument {
            position,
            name,
            reason,
        }
    }

    /// The LAPACK `INFO` value for this error: `-position` for a bad argument,
    /// the unconverged count for a convergence failure.
    pub fn info(&self) -> Option<i32> {
        match self {
            BdsqrError::InvalidArgument { position, .. } => Some(-(*position as i32)),
            BdsqrError::NoConvergence { unconverged } => Some(*unconverged as i32),
            BdsqrError::InvalidParameters(_) | BdsqrError::Shape(_) => None,
        }
    }

    pub fn is_no_convergence(&self) -> bool {
        matches!(self, BdsqrError::NoConvergence { .. })
    }
}
