use ndarray::{array, Array1, Array2, ArrayView2};
use std::cell::{Cell, RefCell};

use crate::error::{Result, RlError};
use crate::estimator::{check_state_batch, ValueEstimator};
use crate::replay_memory::Transition;

/// Linear estimator `Q(s) = s · W` that records every call it receives.
pub struct RecordingEstimator {
    pub name: &'static str,
    pub weights: Array2<f32>,
    pub predict_inputs: RefCell<Vec<Array2<f32>>>,
    pub fits: Vec<(Array2<f32>, Array2<f32>)>,
    pub fail_fit: Cell<bool>,
}

impl RecordingEstimator {
    pub fn new(name: &'static str, weights: Array2<f32>) -> Self {
        RecordingEstimator {
            name,
            weights,
            predict_inputs: RefCell::new(Vec::new()),
            fits: Vec::new(),
            fail_fit: Cell::new(false),
        }
    }

    /// Number of single-row predict calls made with exactly `state`.
    pub fn single_predictions_of(&self, state: &Array1<f32>) -> usize {
        self.predict_inputs
            .borrow()
            .iter()
            .filter(|input| input.nrows() == 1 && input.row(0) == state.view())
            .count()
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_inputs.borrow().len()
    }
}

impl ValueEstimator for RecordingEstimator {
    type Weights = Array2<f32>;

    fn state_dim(&self) -> usize {
        self.weights.nrows()
    }

    fn num_actions(&self) -> usize {
        self.weights.ncols()
    }

    fn predict(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        check_state_batch(states, self.state_dim())?;
        self.predict_inputs.borrow_mut().push(states.to_owned());
        Ok(states.dot(&self.weights))
    }

    fn fit(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<f32> {
        if self.fail_fit.get() {
            return Err(RlError::Numerical(format!("{} refused to fit", self.name)));
        }
        self.fits.push((states.to_owned(), targets.to_owned()));
        Ok(0.0)
    }

    fn weights(&self) -> Array2<f32> {
        self.weights.clone()
    }

    fn set_weights(&mut self, weights: &Array2<f32>) -> Result<()> {
        if weights.dim() != self.weights.dim() {
            return Err(RlError::dimension_mismatch(
                format!("{:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights.assign(weights);
        Ok(())
    }
}

/// Online estimator preferring action 0 on `[1, 0]` states, target
/// estimator preferring action 1, so the two rules disagree.
pub fn disagreeing_pair() -> (RecordingEstimator, RecordingEstimator) {
    let online = RecordingEstimator::new("online", array![[3.0, 1.0, 0.0], [0.0, 2.0, 1.0]]);
    let target = RecordingEstimator::new("target", array![[1.0, 4.0, 2.0], [5.0, 0.0, 1.0]]);
    (online, target)
}

pub fn transition(state: [f32; 2], action: usize, reward: f32, next_state: [f32; 2], done: bool) -> Transition {
    Transition::new(Array1::from(state.to_vec()), action, reward, Array1::from(next_state.to_vec()), done)
}
