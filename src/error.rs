use thiserror::Error;

/// Unified error type for `hsmodel` operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Raised when a model parameter lies outside the domain where utility is defined.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The value that was supplied.
        value: f64,
        /// Short description of the violated domain.
        reason: &'static str,
    },

    /// Raised when provided vectors have incompatible lengths.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required length, usually the length of the first input.
        expected: usize,
        /// The length that was actually supplied.
        found: usize,
    },

    /// Raised when an iterative optimizer stops before meeting its tolerance.
    #[error("optimizer did not converge after {iterations} iterations; residual {residual}")]
    OptimizerDidNotConverge {
        /// Number of iterations performed before termination.
        iterations: usize,
        /// Convergence measure at the last iterate: the projected gradient norm for the
        /// continuous solver, the simplex size for estimation.
        residual: f64,
    },

    /// Raised when a solved allocation cannot enter the log-log regression.
    #[error("home production at wage index {index} must be positive for the regression (HM = {hm}, HF = {hf})")]
    DegenerateRegression { index: usize, hm: f64, hf: f64 },

    /// Raised when linear algebra operations encounter a singular system.
    #[error("matrix in {context} is singular")]
    SingularMatrix { context: &'static str },

    /// Raised when numerical routines produce NaN or infinite values.
    #[error("encountered a non-finite value during {context}")]
    NumericalError { context: &'static str },
}

impl ModelError {
    /// Helper to format an [`InvalidParameter`](ModelError::InvalidParameter) error.
    pub fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    /// Helper to format a [`DimensionMismatch`](ModelError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper to raise when a matrix factorization fails due to singularity.
    pub fn singular(context: &'static str) -> Self {
        Self::SingularMatrix { context }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ModelError>;
