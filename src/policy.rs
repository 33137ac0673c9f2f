use ndarray::ArrayView1;
use rand::Rng;

use crate::error::{Result, RlError};
use crate::estimator::{check_state, ValueEstimator};

/// Epsilon-greedy action selection over an estimator's predictions.
///
/// With probability `epsilon` a uniformly random action is returned,
/// otherwise the action with the highest predicted value. Ties resolve to
/// the lowest index.
#[derive(Clone, Copy, Debug, Default)]
pub struct EpsilonGreedy;

impl EpsilonGreedy {
    pub fn new() -> Self {
        EpsilonGreedy
    }

    /// Pick an action for `state`. `epsilon` is clamped to `[0, 1]`.
    pub fn select<E, R>(&self, estimator: &E, state: ArrayView1<f32>, epsilon: f32, rng: &mut R) -> Result<usize>
    where
        E: ValueEstimator + ?Sized,
        R: Rng + ?Sized,
    {
        check_state(state, estimator.state_dim())?;
        let epsilon = if epsilon.is_nan() { 0.0 } else { epsilon.clamp(0.0, 1.0) };
        let num_actions = estimator.num_actions();
        if num_actions == 0 {
            return Err(RlError::invalid_parameter("num_actions", "estimator has no actions"));
        }

        if epsilon > 0.0 && rng.gen::<f32>() < epsilon {
            return Ok(rng.gen_range(0..num_actions));
        }

        let values = estimator.predict_one(state)?;
        argmax(values.view())
            .ok_or_else(|| RlError::Numerical(format!("no comparable action value in {}", values)))
    }
}

/// Index of the first maximal value. NaN entries are skipped; `None` when
/// no comparable value exists.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
