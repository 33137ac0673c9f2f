use serde::{Deserialize, Serialize};

use crate::error::{Result, RlError};

/// Scalar schedules indexed by episode (or step).
///
/// The exploration rate handed to [`Agent::act`](crate::agent::Agent::act)
/// normally comes from [`Schedule::exponential`]; the discount factor is a
/// separate parameter and is never driven by this schedule implicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Same value at every step
    Constant { value: f32 },

    /// `min_rate + (max_rate - min_rate) * exp(-decay_rate * step)`
    ExponentialDecay {
        min_rate: f32,
        max_rate: f32,
        decay_rate: f32,
    },

    /// Linear interpolation from `start` to `end` over `steps`, then `end`
    LinearDecay { start: f32, end: f32, steps: usize },
}

impl Schedule {
    pub fn exponential(min_rate: f32, max_rate: f32, decay_rate: f32) -> Self {
        Schedule::ExponentialDecay { min_rate, max_rate, decay_rate }
    }

    /// Value at `step`.
    pub fn value(&self, step: usize) -> f32 {
        match self {
            Schedule::Constant { value } => *value,

            Schedule::ExponentialDecay { min_rate, max_rate, decay_rate } => {
                min_rate + (max_rate - min_rate) * (-decay_rate * step as f32).exp()
            }

            Schedule::LinearDecay { start, end, steps } => {
                if *steps == 0 || step >= *steps {
                    *end
                } else {
                    let progress = step as f32 / *steps as f32;
                    start + (end - start) * progress
                }
            }
        }
    }

    /// Check that the schedule stays within `[0, 1]`, as required for a
    /// probability such as the exploration rate.
    pub fn validate_probability(&self) -> Result<()> {
        let in_unit = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(RlError::invalid_parameter(
                    format!("exploration.{}", name),
                    format!("must be within [0, 1], got {}", v),
                ))
            }
        };

        match self {
            Schedule::Constant { value } => in_unit("value", *value),
            Schedule::ExponentialDecay { min_rate, max_rate, decay_rate } => {
                in_unit("min_rate", *min_rate)?;
                in_unit("max_rate", *max_rate)?;
                if min_rate > max_rate {
                    return Err(RlError::invalid_parameter(
                        "exploration",
                        format!("min_rate {} exceeds max_rate {}", min_rate, max_rate),
                    ));
                }
                if !(*decay_rate >= 0.0) {
                    return Err(RlError::invalid_parameter(
                        "exploration.decay_rate",
                        format!("must be non-negative, got {}", decay_rate),
                    ));
                }
                Ok(())
            }
            Schedule::LinearDecay { start, end, .. } => {
                in_unit("start", *start)?;
                in_unit("end", *end)
            }
        }
    }
}

impl Default for Schedule {
    /// Exploration defaults: from 1.0 down to 0.01 with decay 0.001 per episode.
    fn default() -> Self {
        Schedule::exponential(0.01, 1.0, 0.001)
    }
}
