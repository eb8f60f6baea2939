use ndarray::{s, Array2};
use ndarray_linalg::SVD;

use crate::error::{Result, SvpError};

/// Best rank-`rank` approximation of `matrix` in Frobenius norm.
///
/// Decomposes the matrix, keeps the top `rank` singular triples (singular
/// values come back in descending order) and recombines them into a dense
/// matrix. A `rank` larger than the number of singular values keeps all of them.
pub fn truncate_rank(matrix: &Array2<f64>, rank: usize) -> Result<Array2<f64>> {
    // Decompose the matrix into U, S and V^T
    let (u, s, vt) = matrix.svd(true, true)?;
    let (u, vt) = match (u, vt) {
        (Some(u), Some(vt)) => (u, vt),
        _ => return Err(SvpError::MissingSingularVectors),
    };
    let k = rank.min(s.len());

    // Recombine the top k singular triples
    Ok(u.slice(s![.., ..k])
        .dot(&Array2::from_diag(&s.slice(s![..k])))
        .dot(&vt.slice(s![..k, ..])))
}

/// Number of singular values above `epsilon` times the largest one.
///
/// The zero matrix has numerical rank zero.
pub fn numerical_rank(matrix: &Array2<f64>, epsilon: f64) -> Result<usize> {
    let (_, s, _) = matrix.svd(false, false)?;
    let sigma_max = s.iter().copied().fold(0.0, f64::max);
    if sigma_max == 0.0 {
        return Ok(0);
    }
    // Relative cutoff, so the count does not depend on the matrix scale
    let threshold = epsilon * sigma_max;
    Ok(s.iter().filter(|&&sigma| sigma > threshold).count())
}
