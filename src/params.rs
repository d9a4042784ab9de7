use crate::error::BdsqrError;
use crate::utils::SvdFloat;

/// Which off-diagonal of `B` holds `e`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Uplo {
    /// `e[i]` is `B[i][i + 1]`
    #[default]
    Upper,
    /// `e[i]` is `B[i + 1][i]`
    Lower,
}

/// How the convergence threshold is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accuracy {
    /// Every singular value to about `tolmul * eps` relative accuracy,
    /// including the tiny ones of graded matrices.
    #[default]
    Relative,
    /// Singular values to `tolmul * eps * sigma_max` absolute accuracy.
    Absolute,
}

/// Tuning knobs of the QR iteration
///
/// # Fields
/// - accuracy: relative or absolute convergence criterion
/// - tolmul: multiplier on machine precision, must lie in `[10, 1/eps]`;
///       values near 10 converge fastest, values near `0.1/eps` keep some accuracy
/// - max_sweeps: the iteration budget is `max_sweeps * n * n` rotated rows;
///       `0` stops after the first sweep that does not finish the matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BdsqrParams<T> {
    pub accuracy: Accuracy,
    pub tolmul: T,
    pub max_sweeps: usize,
}

pub const DEFAULT_MAX_SWEEPS: usize = 6;

impl<T: SvdFloat> Default for BdsqrParams<T> {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::Relative,
            tolmul: T::default_tolmul(),
            max_sweeps: DEFAULT_MAX_SWEEPS,
        }
    }
}

impl<T: SvdFloat> BdsqrParams<T> {
    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_tolmul(mut self, tolmul: T) -> Self {
        self.tolmul = tolmul;
        self
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    pub fn validate(&self) -> Result<(), BdsqrError> {
        let upper = T::eps().recip();
        if !self.tolmul.is_finite() || self.tolmul < T::lit(10.0) || self.tolmul > upper {
            return Err(BdsqrError::InvalidParameters(format!(
                "tolmul must lie in [10, {upper:?}], got {:?}",
                self.tolmul
            )));
        }
        Ok(())
    }

    /// Convergence tolerance `tolmul * eps`
    pub(crate) fn tol(&self) -> T {
        self.tolmul * T::eps()
    }

    pub(crate) fn relative(&self) -> bool {
        self.accuracy == Accuracy::Relative
    }
}
