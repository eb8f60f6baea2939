use ndarray::Array2;
use ndarray_linalg::Norm;

use crate::projection::{projection, ObservationMask};

/// Frobenius norm of `P(solution) - target`, the residual on the observed entries.
pub fn observed_residual(
    solution: &Array2<f64>,
    target: &Array2<f64>,
    mask: &ObservationMask,
) -> f64 {
    let diff = projection(solution, mask) - target;
    diff.norm_l2()
}

/// Returns true when `solution` matches `target` on the observed entries
/// closely enough to stop iterating.
///
/// An exact match counts as converged for every tolerance, including zero.
/// A NaN residual never converges; it is reported with the number of NaN
/// entries in `solution`.
pub fn within_tolerance(
    solution: &Array2<f64>,
    target: &Array2<f64>,
    mask: &ObservationMask,
    tolerance: f64,
) -> bool {
    let residual = observed_residual(solution, target, mask);
    if residual.is_nan() {
        let nan_count = solution.iter().filter(|v| v.is_nan()).count();
        log::warn!("{} NaNs in solution", nan_count);
        return false;
    }
    residual == 0.0 || residual < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn signed_target() -> Array2<f64> {
        arr2(&[
            [0.0, 1.0, 0.0],
            [1.0, 0.0, -1.0],
            [0.0, -1.0, 0.0],
        ])
    }

    #[test]
    fn test_exact_solution_is_within_any_tolerance() {
        let target = signed_target();
        let mask = ObservationMask::from_dense(&target);
        for tolerance in [0.0, 1e-12, 0.5, 10.0] {
            assert!(within_tolerance(&target, &target, &mask, tolerance));
        }
    }

    #[test]
    fn test_unobserved_entries_do_not_count() {
        let target = signed_target();
        let mask = ObservationMask::from_dense(&target);
        let mut solution = target.clone();
        solution[[0, 0]] = 100.0;
        solution[[2, 2]] = -7.0;

        assert_eq!(observed_residual(&solution, &target, &mask), 0.0);
        assert!(within_tolerance(&solution, &target, &mask, 0.0));
    }

    #[test]
    fn test_residual_is_frobenius_norm_of_observed_gap() {
        let target = signed_target();
        let mask = ObservationMask::from_dense(&target);
        let solution = arr2(&[
            [5.0, 0.5, 5.0],
            [1.0, 5.0, -1.0],
            [5.0, -0.5, 5.0],
        ]);

        // gaps of 0.5 at (0, 1) and (2, 1)
        let residual = observed_residual(&solution, &target, &mask);
        assert_relative_eq!(residual, 0.5_f64.hypot(0.5), epsilon = 1e-12);
        assert!(within_tolerance(&solution, &target, &mask, 0.71));
        assert!(!within_tolerance(&solution, &target, &mask, 0.7));
    }

    #[test]
    fn test_tolerance_comparison_is_strict() {
        let target = signed_target();
        let mask = ObservationMask::from_dense(&target);
        let mut solution = target.clone();
        solution[[0, 1]] = 0.0;

        assert_relative_eq!(observed_residual(&solution, &target, &mask), 1.0);
        assert!(!within_tolerance(&solution, &target, &mask, 1.0));
    }

    #[test]
    fn test_nan_solution_never_converges() {
        log_init_test();
        let target = signed_target();
        let mask = ObservationMask::from_dense(&target);
        let mut solution = target.clone();
        solution[[1, 2]] = f64::NAN;

        assert!(observed_residual(&solution, &target, &mask).is_nan());
        assert!(!within_tolerance(&solution, &target, &mask, f64::MAX));
    }
}
