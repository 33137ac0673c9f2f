//! Environment interface and built-in grid environments.
//!
//! The learning core never depends on this module; it only exists so the
//! episode driver in [`trainer`](crate::trainer) has something to step.

use ndarray::Array1;
use std::collections::HashMap;

use crate::error::Result;

pub mod grid_world;

pub use grid_world::GridWorld;

/// Core trait for discrete-action environments
pub trait Environment {
    /// Reset the environment and return the initial observation
    fn reset(&mut self) -> Result<Array1<f32>>;

    /// Apply `action` and advance one step
    fn step(&mut self, action: usize) -> Result<Step>;

    /// Size of the discrete action set
    fn num_actions(&self) -> usize;

    /// Length of a flattened observation
    fn observation_dim(&self) -> usize;

    /// Side-effecting display; ignored by the learning core
    fn render(&self) {}
}

/// Result of an environment step
#[derive(Debug, Clone)]
pub struct Step {
    pub observation: Array1<f32>,
    pub reward: f32,
    pub done: bool,
    /// Free-form diagnostics
    pub info: HashMap<String, f32>,
}

impl Step {
    pub fn new(observation: Array1<f32>, reward: f32, done: bool) -> Self {
        Step {
            observation,
            reward,
            done,
            info: HashMap::new(),
        }
    }

    pub fn with_info(mut self, key: &str, value: f32) -> Self {
        self.info.insert(key.to_string(), value);
        self
    }
}
