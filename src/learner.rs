//! # Temporal-Difference Learner
//!
//! One training step takes a sampled minibatch, turns every transition into
//! a target vector and issues a single `fit` call on the online estimator.
//!
//! The target vector of a transition `(s, a, r, s', done)` is the online
//! estimator's current prediction for `s` with only entry `a` replaced by
//! the bootstrapped target, so the fit only moves the value of the action
//! that was actually taken. The bootstrapped target is `r` for terminal
//! transitions. Otherwise it depends on the [`UpdateRule`]:
//!
//! - [`UpdateRule::Dqn`]: `r + γ · max_a' Q_target(s', a')`. The target
//!   estimator both selects and evaluates the next action, which is the
//!   source of the well-known overestimation bias.
//! - [`UpdateRule::DoubleDqn`]: `r + γ · Q_target(s', argmax_a' Q_online(s', a'))`.
//!   The online estimator selects, the target estimator evaluates.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Result, RlError};
use crate::estimator::{check_state, ValueEstimator};
use crate::policy::argmax;
use crate::replay_memory::Transition;

/// Which bootstrapping algorithm the learner runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// Single-network update
    #[default]
    Dqn,
    /// Double-network update
    DoubleDqn,
}

impl UpdateRule {
    /// Algorithm tag used in checkpoint file names.
    pub fn tag(&self) -> &'static str {
        match self {
            UpdateRule::Dqn => "dqn",
            UpdateRule::DoubleDqn => "ddqn",
        }
    }
}

impl fmt::Display for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for UpdateRule {
    type Err = RlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dqn" => Ok(UpdateRule::Dqn),
            "ddqn" | "double_dqn" | "double-dqn" => Ok(UpdateRule::DoubleDqn),
            other => Err(RlError::invalid_parameter(
                "update_rule",
                format!("unknown algorithm '{}', expected 'dqn' or 'ddqn'", other),
            )),
        }
    }
}

/// Summary of one training step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainStats {
    pub batch_size: usize,
    /// Loss reported by the online estimator's fit call
    pub loss: f32,
    /// Mean bootstrapped target over the batch
    pub mean_target: f32,
}

/// Computes bootstrapped targets and fits the online estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Learner {
    rule: UpdateRule,
    discount_factor: f32,
}

impl Learner {
    pub fn new(rule: UpdateRule, discount_factor: f32) -> Result<Self> {
        validate_discount(discount_factor)?;
        Ok(Learner { rule, discount_factor })
    }

    pub fn rule(&self) -> UpdateRule {
        self.rule
    }

    pub fn discount_factor(&self) -> f32 {
        self.discount_factor
    }

    pub fn set_discount_factor(&mut self, discount_factor: f32) -> Result<()> {
        validate_discount(discount_factor)?;
        self.discount_factor = discount_factor;
        Ok(())
    }

    /// Bootstrapped target for the action taken in `transition`.
    pub fn bootstrap<E: ValueEstimator>(&self, online: &E, target: &E, transition: &Transition) -> Result<f32> {
        if transition.done {
            return Ok(transition.reward);
        }

        let next_state = transition.next_state.view();
        let future_value = match self.rule {
            UpdateRule::Dqn => {
                let next_values = target.predict_one(next_state)?;
                next_values[best_action(&next_values)?]
            }
            UpdateRule::DoubleDqn => {
                let selection = online.predict_one(next_state)?;
                let best = best_action(&selection)?;
                let evaluation = target.predict_one(next_state)?;
                evaluation[best]
            }
        };

        Ok(transition.reward + self.discount_factor * future_value)
    }

    /// Stack the batch into `(states, target vectors)` ready for `fit`.
    pub fn build_targets<E: ValueEstimator>(
        &self,
        online: &E,
        target: &E,
        batch: &[&Transition],
    ) -> Result<(Array2<f32>, Array2<f32>)> {
        let state_dim = online.state_dim();
        let num_actions = online.num_actions();
        if target.state_dim() != state_dim || target.num_actions() != num_actions {
            return Err(RlError::dimension_mismatch(
                format!("target estimator {} -> {}", state_dim, num_actions),
                format!("target estimator {} -> {}", target.state_dim(), target.num_actions()),
            ));
        }

        let mut states = Array2::zeros((batch.len(), state_dim));
        for (mut row, transition) in states.axis_iter_mut(Axis(0)).zip(batch) {
            check_state(transition.state.view(), state_dim)?;
            check_state(transition.next_state.view(), state_dim)?;
            if transition.action >= num_actions {
                return Err(RlError::InvalidAction { action: transition.action, num_actions });
            }
            row.assign(&transition.state);
        }

        let mut targets = online.predict(states.view())?;
        for (i, transition) in batch.iter().enumerate() {
            targets[[i, transition.action]] = self.bootstrap(online, target, transition)?;
        }

        Ok((states, targets))
    }

    /// One training step: build targets and issue a single fit call.
    pub fn step<E: ValueEstimator>(&self, online: &mut E, target: &E, batch: &[&Transition]) -> Result<TrainStats> {
        if batch.is_empty() {
            return Err(RlError::EmptyBuffer("no transitions to train on".to_string()));
        }

        let (states, targets) = self.build_targets(online, target, batch)?;
        let mean_target = batch
            .iter()
            .enumerate()
            .map(|(i, transition)| targets[[i, transition.action]])
            .sum::<f32>()
            / batch.len() as f32;

        let loss = online.fit(states.view(), targets.view())?;
        debug!(rule = %self.rule, batch = batch.len(), loss, mean_target, "fitted online estimator");

        Ok(TrainStats { batch_size: batch.len(), loss, mean_target })
    }
}

fn best_action(values: &Array1<f32>) -> Result<usize> {
    argmax(values.view())
        .ok_or_else(|| RlError::Numerical(format!("no comparable action value in {}", values)))
}

fn validate_discount(discount_factor: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&discount_factor) {
        return Err(RlError::invalid_parameter(
            "discount_factor",
            format!("must be within [0, 1], got {}", discount_factor),
        ));
    }
    Ok(())
}
