//! Edge sign prediction in signed networks by low-rank matrix completion.
//!
//! The observed signs of a network are completed with Singular Value
//! Projection (SVP): a gradient step on the observed entries followed by a
//! hard truncation to a fixed rank, repeated until the observed residual is
//! small enough or the iteration budget runs out. The sign of the final
//! low-rank estimate is the prediction for every edge.
//!
//! ```no_run
//! use sprs::TriMat;
//! use svp_sign_prediction::{sign_prediction_svp, SvpConfig};
//!
//! let mut edges = TriMat::new((4, 4));
//! for &(i, j, sign) in &[(0, 1, 1.0), (1, 2, -1.0), (2, 3, 1.0)] {
//!     edges.add_triplet(i, j, sign);
//!     edges.add_triplet(j, i, sign);
//! }
//! let outcome = sign_prediction_svp(&edges.to_csr(), &SvpConfig::new(1, 0.01, 100, 0.1))?;
//! println!("{:?} after {} iterations", outcome.status, outcome.iterations);
//! # Ok::<(), svp_sign_prediction::SvpError>(())
//! ```

mod config;
mod convergence;
mod error;
mod projection;
mod svp;
mod truncation;

pub use config::{Mode, SvpConfig};
pub use convergence::{observed_residual, within_tolerance};
pub use error::{Result, SvpError};
pub use projection::{projection, ObservationMask};
pub use svp::{sign_matrix, sign_prediction_svp, sign_prediction_svp_dense, SvpOutcome, SvpStatus};
pub use truncation::{numerical_rank, truncate_rank};
