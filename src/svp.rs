use ndarray::Array2;
use sprs::{CsMat, TriMat};
use std::time::Instant;

use crate::config::{Mode, SvpConfig};
use crate::convergence::{observed_residual, within_tolerance};
use crate::error::{Result, SvpError};
use crate::projection::{projection, ObservationMask};
use crate::truncation::{numerical_rank, truncate_rank};

/// Why the SVP loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvpStatus {
    /// The observed residual fell below the tolerance.
    Converged,
    /// The iteration budget ran out first.
    BudgetExhausted,
    /// A gradient step or a truncation produced non-finite entries; the estimate is the last finite one.
    Diverged,
}

/// Result of a sign prediction run.
#[derive(Debug, Clone)]
pub struct SvpOutcome {
    /// Element-wise sign of `estimate`, entries in {-1, 0, +1}; zeros are not stored.
    pub signs: CsMat<f64>,
    /// Low-rank estimate before taking signs.
    pub estimate: Array2<f64>,
    pub status: SvpStatus,
    /// Number of gradient step + truncation rounds completed.
    pub iterations: usize,
    /// Frobenius norm of the gap between `estimate` and the adjacency matrix on observed entries.
    pub residual: f64,
}

/// Predicts the signs of all edges of a signed network with Singular Value Projection.
///
/// Starting from the zero matrix, every iteration takes a gradient step on the
/// observed entries of `adjacency` and truncates the result back to
/// `config.rank` with an SVD. The loop stops once the observed residual is
/// within `config.tolerance`, once the iteration counter exceeds
/// `config.max_iterations`, or as soon as a gradient step or truncation
/// produces non-finite entries.
///
/// # Arguments
/// * `adjacency` - Square signed adjacency matrix; nonzero entries are the observed edges
/// * `config` - Rank, tolerance, iteration budget, step size and mode
///
/// # Returns
/// The predicted sign matrix together with how and when the loop stopped
pub fn sign_prediction_svp(adjacency: &CsMat<f64>, config: &SvpConfig) -> Result<SvpOutcome> {
    config.validate(adjacency.shape())?;
    check_finite(adjacency.data().iter())?;

    let mask = ObservationMask::from_sparse(adjacency);
    let target = adjacency.to_dense();
    run(&target, &mask, config)
}

/// Same as [`sign_prediction_svp`] for a dense adjacency matrix.
pub fn sign_prediction_svp_dense(
    adjacency: &Array2<f64>,
    config: &SvpConfig,
) -> Result<SvpOutcome> {
    config.validate(adjacency.dim())?;
    check_finite(adjacency.iter())?;

    let mask = ObservationMask::from_dense(adjacency);
    run(adjacency, &mask, config)
}

fn check_finite<'a, I>(values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a f64>,
{
    match values.into_iter().find(|v| !v.is_finite()) {
        Some(value) => Err(SvpError::invalid_input(format!(
            "adjacency matrix contains a non-finite entry ({})",
            value
        ))),
        None => Ok(()),
    }
}

fn run(target: &Array2<f64>, mask: &ObservationMask, config: &SvpConfig) -> Result<SvpOutcome> {
    let start_time = Instant::now();
    log::debug!(
        "svp: {:?} network, {} observed entries, rank {}, step size {}, tolerance {}",
        target.dim(),
        mask.len(),
        config.rank,
        config.step_size,
        config.tolerance
    );

    // Start from the zero matrix
    let mut solution = Array2::<f64>::zeros(target.dim());
    let mut iterations = 0;

    let status = loop {
        if within_tolerance(&solution, target, mask, config.tolerance) {
            break SvpStatus::Converged;
        }
        if iterations > config.max_iterations {
            break SvpStatus::BudgetExhausted;
        }

        // Gradient step on the observed entries
        let gradient = projection(&solution, mask) - target;
        let stepped = &solution - &(gradient * config.step_size);

        // Stop before a non-finite matrix reaches the SVD
        if has_diverged(&stepped, "gradient step", iterations + 1) {
            break SvpStatus::Diverged;
        }

        // Project back onto the matrices of rank `config.rank`
        let truncated = truncate_rank(&stepped, config.rank)?;

        // Recombining the factors can overflow even when the step did not
        if has_diverged(&truncated, "rank truncation", iterations + 1) {
            break SvpStatus::Diverged;
        }

        solution = truncated;
        iterations += 1;

        log::debug!(
            "svp: [{:>4}/{}] residual {:.10}",
            iterations,
            config.max_iterations,
            observed_residual(&solution, target, mask)
        );
    };

    // Test mode: the estimate must have exactly the requested numerical rank
    if config.mode == Mode::Test && status != SvpStatus::Diverged {
        let actual = numerical_rank(&solution, config.rank_epsilon)?;
        if actual != config.rank {
            return Err(SvpError::RankMismatch {
                expected: config.rank,
                actual,
            });
        }
    }

    // Residual of the returned estimate, and the total run time
    let residual = observed_residual(&solution, target, mask);
    log::info!(
        "svp: {:?} after {} iterations, residual {:.10}, in {}ms",
        status,
        iterations,
        residual,
        start_time.elapsed().as_millis()
    );

    Ok(SvpOutcome {
        signs: sign_matrix(&solution),
        estimate: solution,
        status,
        iterations,
        residual,
    })
}

/// Logs and returns true when `matrix` holds NaN or infinite entries.
fn has_diverged(matrix: &Array2<f64>, phase: &str, iteration: usize) -> bool {
    let non_finite = matrix.iter().filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        log::warn!(
            "svp: {} diverged at iteration {} ({} non-finite entries)",
            phase,
            iteration,
            non_finite
        );
    }
    non_finite > 0
}

/// Element-wise sign of `matrix` as a sparse matrix.
///
/// Negative entries map to -1, positive entries to +1. Zeros (and NaN) are left
/// out of the sparse structure.
pub fn sign_matrix(matrix: &Array2<f64>) -> CsMat<f64> {
    let mut signs = TriMat::new(matrix.dim());
    for ((i, j), &value) in matrix.indexed_iter() {
        if value > 0.0 {
            signs.add_triplet(i, j, 1.0);
        } else if value < 0.0 {
            signs.add_triplet(i, j, -1.0);
        }
    }
    signs.to_csr()
}
