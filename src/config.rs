use serde::{Deserialize, Serialize};

use crate::error::{Result, SvpError};

// Defaults
const RANK: usize = 1;
const TOLERANCE: f64 = 1e-3;
const MAX_ITERATIONS: usize = 100;
const STEP_SIZE: f64 = 1.0;
const RANK_EPSILON: f64 = 1e-10;

/// Run mode of the SVP driver.
///
/// `Test` adds a check after the loop that the low-rank estimate really has
/// the requested numerical rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Test,
}

/// Hyperparameters of a Singular Value Projection run.
///
/// # Fields
/// * `rank` - Rank of the estimate kept after every truncation
/// * `tolerance` - Stop once the observed residual falls below this value
/// * `max_iterations` - Iteration budget; the loop runs while the counter is `<= max_iterations`
/// * `step_size` - Gradient step on the observed entries
/// * `mode` - `Normal` or `Test`
/// * `rank_epsilon` - Relative threshold on singular values used by the test-mode rank check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvpConfig {
    pub rank: usize,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub step_size: f64,
    pub mode: Mode,
    pub rank_epsilon: f64,
}

impl Default for SvpConfig {
    fn default() -> Self {
        Self {
            rank: RANK,
            tolerance: TOLERANCE,
            max_iterations: MAX_ITERATIONS,
            step_size: STEP_SIZE,
            mode: Mode::Normal,
            rank_epsilon: RANK_EPSILON,
        }
    }
}

impl SvpConfig {
    pub fn new(rank: usize, tolerance: f64, max_iterations: usize, step_size: f64) -> Self {
        Self {
            rank,
            tolerance,
            max_iterations,
            step_size,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_rank_epsilon(mut self, rank_epsilon: f64) -> Self {
        self.rank_epsilon = rank_epsilon;
        self
    }

    /// Checks the configuration against an adjacency matrix of the given shape.
    pub fn validate(&self, shape: (usize, usize)) -> Result<()> {
        let (rows, cols) = shape;
        if rows != cols {
            return Err(SvpError::invalid_input(format!(
                "adjacency matrix must be square, got {}x{}",
                rows, cols
            )));
        }
        if rows == 0 {
            return Err(SvpError::invalid_input("adjacency matrix is empty"));
        }
        if self.rank == 0 || self.rank >= rows.min(cols) {
            return Err(SvpError::invalid_input(format!(
                "rank must satisfy 0 < rank < {}, got {}",
                rows.min(cols),
                self.rank
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SvpError::invalid_input(format!(
                "tolerance must be finite and nonnegative, got {}",
                self.tolerance
            )));
        }
        if !self.step_size.is_finite() || self.step_size < 0.0 {
            return Err(SvpError::invalid_input(format!(
                "step size must be finite and nonnegative, got {}",
                self.step_size
            )));
        }
        if !self.rank_epsilon.is_finite() || self.rank_epsilon < 0.0 {
            return Err(SvpError::invalid_input(format!(
                "rank epsilon must be finite and nonnegative, got {}",
                self.rank_epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid_for_small_network() {
        let config = SvpConfig::default();
        assert!(config.validate((4, 4)).is_ok());
        assert_eq!(config.mode, Mode::Normal);
    }

    #[test]
    fn test_rejects_non_square_matrix() {
        let config = SvpConfig::default();
        let err = config.validate((3, 4)).unwrap_err();
        assert!(matches!(err, SvpError::InvalidInput { .. }));
        assert!(err.to_string().contains("square"));
    }

    #[test]
    fn test_rank_bounds() {
        assert!(SvpConfig::new(0, 0.1, 10, 0.5).validate((4, 4)).is_err());
        assert!(SvpConfig::new(4, 0.1, 10, 0.5).validate((4, 4)).is_err());
        assert!(SvpConfig::new(3, 0.1, 10, 0.5).validate((4, 4)).is_ok());
        // a 1x1 network admits no valid rank
        assert!(SvpConfig::default().validate((1, 1)).is_err());
        assert!(SvpConfig::default().validate((0, 0)).is_err());
    }

    #[test]
    fn test_rejects_bad_scalars() {
        assert!(SvpConfig::new(1, -1e-3, 10, 0.5).validate((4, 4)).is_err());
        assert!(SvpConfig::new(1, f64::NAN, 10, 0.5).validate((4, 4)).is_err());
        assert!(SvpConfig::new(1, 0.1, 10, -0.5).validate((4, 4)).is_err());
        assert!(SvpConfig::new(1, 0.1, 10, f64::INFINITY).validate((4, 4)).is_err());
        assert!(SvpConfig::default()
            .with_rank_epsilon(-1.0)
            .validate((4, 4))
            .is_err());
        // zero tolerance and zero step are admissible
        assert!(SvpConfig::new(1, 0.0, 10, 0.0).validate((4, 4)).is_ok());
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: SvpConfig =
            serde_json::from_str(r#"{ "rank": 2, "step_size": 0.1, "mode": "test" }"#).unwrap();

        assert_eq!(config.rank, 2);
        assert_eq!(config.step_size, 0.1);
        assert_eq!(config.mode, Mode::Test);
        assert_eq!(config.tolerance, TOLERANCE);
        assert_eq!(config.max_iterations, MAX_ITERATIONS);
        assert_eq!(config.rank_epsilon, RANK_EPSILON);
    }
}
