use itertools::iproduct;
use ndarray::Array2;
use rustc_hash::FxHashSet;
use sprs::CsMat;

use crate::error::{Result, SvpError};

/// The fixed set of observed `(row, col)` positions of a signed network.
///
/// Built once from the adjacency matrix and shared by the gradient step and
/// the convergence test. It never changes during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationMask {
    shape: (usize, usize),
    pairs: Vec<(usize, usize)>,
    lookup: FxHashSet<(usize, usize)>,
}

impl ObservationMask {
    /// Observed positions are the stored entries with a nonzero value.
    /// Explicitly stored zeros are unobserved.
    pub fn from_sparse(adjacency: &CsMat<f64>) -> Self {
        let pairs = adjacency
            .iter()
            .filter(|(value, _)| **value != 0.0)
            .map(|(_, (i, j))| (i, j));
        Self::build(adjacency.shape(), pairs)
    }

    pub fn from_dense(adjacency: &Array2<f64>) -> Self {
        let (rows, cols) = adjacency.dim();
        let pairs = iproduct!(0..rows, 0..cols).filter(|&(i, j)| adjacency[[i, j]] != 0.0);
        Self::build((rows, cols), pairs)
    }

    /// Builds a mask from an explicit list of positions. Duplicates are kept once.
    pub fn from_pairs(shape: (usize, usize), pairs: &[(usize, usize)]) -> Result<Self> {
        if let Some(&(i, j)) = pairs.iter().find(|&&(i, j)| i >= shape.0 || j >= shape.1) {
            return Err(SvpError::invalid_input(format!(
                "observed index ({}, {}) is outside a {}x{} matrix",
                i, j, shape.0, shape.1
            )));
        }
        Ok(Self::build(shape, pairs.iter().copied()))
    }

    fn build<I>(shape: (usize, usize), pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut lookup = FxHashSet::default();
        let pairs = pairs.into_iter().filter(|&p| lookup.insert(p)).collect();
        Self {
            shape,
            pairs,
            lookup,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.lookup.contains(&(i, j))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }
}

/// Keeps the observed entries of `matrix` and zeroes everything else.
///
/// Allocates a fresh matrix; `matrix` is not modified.
///
/// # Panics
/// If `matrix` and `mask` were built for different shapes.
pub fn projection(matrix: &Array2<f64>, mask: &ObservationMask) -> Array2<f64> {
    assert_eq!(
        matrix.dim(),
        mask.shape(),
        "matrix shape does not match the observation mask"
    );
    let mut projected = Array2::<f64>::zeros(matrix.dim());
    for (i, j) in mask.iter() {
        projected[[i, j]] = matrix[[i, j]];
    }
    projected
}
