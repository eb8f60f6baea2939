use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Errors returned by the sign prediction routines.
#[derive(Debug, Error)]
pub enum SvpError {
    /// A precondition on the adjacency matrix or the configuration failed.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Test mode found a solution whose numerical rank differs from the requested rank.
    #[error("rank mismatch: expected rank {expected}, solution has numerical rank {actual}")]
    RankMismatch { expected: usize, actual: usize },

    #[error("SVD returned no singular vectors")]
    MissingSingularVectors,

    #[error("linear algebra failure: {0}")]
    Linalg(#[from] LinalgError),
}

impl SvpError {
    pub fn invalid_input<S: Into<String>>(reason: S) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SvpError>;
