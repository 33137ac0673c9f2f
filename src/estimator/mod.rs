//! # Value Estimators
//!
//! The learning core never looks inside its function approximator. It only
//! needs something that maps a batch of states to a batch of action-value
//! vectors, can be fitted on one batch of targets, and can hand its weights
//! to another instance of the same architecture. That capability is the
//! [`ValueEstimator`] trait.
//!
//! [`MlpEstimator`] is the bundled implementation: a small dense network
//! with ReLU hidden layers and a linear output, trained on mean squared
//! error.
//!
//! ```rust
//! use snake_rl::estimator::{MlpEstimator, Optimizer, ValueEstimator};
//! use rand::{rngs::StdRng, SeedableRng};
//! use ndarray::array;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let (online, mut target) =
//!     MlpEstimator::pair(&[4, 16, 2], Optimizer::rmsprop(), 0.001, &mut rng).unwrap();
//! target.set_weights(&online.weights()).unwrap();
//!
//! let q = online.predict_one(array![0.1, 0.2, 0.3, 0.4].view()).unwrap();
//! assert_eq!(q.len(), 2);
//! ```

mod activation;
mod dense;
mod mlp;
mod optimizer;

pub use activation::Activation;
pub use dense::DenseLayer;
pub use mlp::{LayerWeights, MlpEstimator, MlpWeights};
pub use optimizer::{Adam, Optimizer, RmsProp};

use crate::checkpoint;
use crate::error::{Result, RlError};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Opaque, differentiable mapping from states to action values.
///
/// Both the online and the target estimator of an agent implement this
/// trait. Weight transfer between the two goes through [`weights`] and
/// [`set_weights`]; there is no incremental blending.
///
/// [`weights`]: ValueEstimator::weights
/// [`set_weights`]: ValueEstimator::set_weights
pub trait ValueEstimator {
    /// Complete, serializable parameter set of the estimator.
    type Weights: Clone + Serialize + DeserializeOwned;

    /// Length of a single state vector.
    fn state_dim(&self) -> usize;

    /// Number of discrete actions, i.e. the length of each value vector.
    fn num_actions(&self) -> usize;

    /// Predict a `(batch, num_actions)` matrix of action values.
    fn predict(&self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Fit one batch of `(states, targets)`; returns the loss measured
    /// before the update.
    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<f32>;

    fn weights(&self) -> Self::Weights;

    /// Overwrite all parameters. Fails without modifying `self` when the
    /// weights belong to a different architecture.
    fn set_weights(&mut self, weights: &Self::Weights) -> Result<()>;

    /// Predict the value vector of a single state.
    fn predict_one(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let batch = self.predict(state.insert_axis(Axis(0)))?;
        Ok(batch.row(0).to_owned())
    }

    fn save_weights(&self, path: &Path) -> Result<()> {
        checkpoint::write_weights(path, &self.weights())
    }

    /// Restore weights written by [`save_weights`](ValueEstimator::save_weights).
    fn load_weights(&mut self, path: &Path) -> Result<()> {
        let weights: Self::Weights = checkpoint::read_weights(path)?;
        self.set_weights(&weights)
            .map_err(|err| RlError::CheckpointIncompatible {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
    }
}

/// Check that `states` is a batch of `state_dim`-long rows.
pub fn check_state_batch(states: ArrayView2<f32>, state_dim: usize) -> Result<()> {
    if states.ncols() != state_dim {
        return Err(RlError::dimension_mismatch(
            format!("(batch, {})", state_dim),
            format!("{:?}", states.shape()),
        ));
    }
    Ok(())
}

/// Check a single state vector against `state_dim`.
pub fn check_state(state: ArrayView1<f32>, state_dim: usize) -> Result<()> {
    if state.len() != state_dim {
        return Err(RlError::dimension_mismatch(
            format!("state of length {}", state_dim),
            format!("state of length {}", state.len()),
        ));
    }
    Ok(())
}
