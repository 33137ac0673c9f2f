//! Hyperparameters for the agent and the episode driver.
//!
//! Both structs deserialize with `#[serde(default)]`, so a JSON file only
//! needs to list the fields it changes:
//!
//! ```json
//! {
//!   "agent": { "discount_factor": 0.99, "update_rule": "double_dqn" },
//!   "trainer": { "episodes": 500, "target_sync_interval": 10 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, RlError};
use crate::learner::UpdateRule;
use crate::schedule::Schedule;

/// Learning-core hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Step size for the estimator's optimizer. The agent never reads it;
    /// the caller hands it to the estimator at construction.
    pub learning_rate: f32,
    /// Weight of estimated future value, within `[0, 1]`
    pub discount_factor: f32,
    /// Upper bound on the minibatch size of one training step
    pub batch_size: usize,
    /// Replay memory capacity
    pub memory_size: usize,
    /// Exploration-rate schedule, indexed by episode
    pub exploration: Schedule,
    pub update_rule: UpdateRule,
    /// Seed for all randomness owned by the agent; `None` draws from the OS
    pub seed: Option<u64>,
    pub checkpoint_dir: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            learning_rate: 0.001,
            discount_factor: 0.95,
            batch_size: 16,
            memory_size: 100,
            exploration: Schedule::default(),
            update_rule: UpdateRule::Dqn,
            seed: None,
            checkpoint_dir: PathBuf::from("checkpoints"),
        }
    }
}

impl AgentConfig {
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f32) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_memory_size(mut self, memory_size: usize) -> Self {
        self.memory_size = memory_size;
        self
    }

    pub fn with_exploration(mut self, exploration: Schedule) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_update_rule(mut self, update_rule: UpdateRule) -> Self {
        self.update_rule = update_rule;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_checkpoint_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.checkpoint_dir = dir.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(RlError::invalid_parameter(
                "learning_rate",
                format!("must be positive and finite, got {}", self.learning_rate),
            ));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(RlError::invalid_parameter(
                "discount_factor",
                format!("must be within [0, 1], got {}", self.discount_factor),
            ));
        }
        if self.batch_size == 0 {
            return Err(RlError::invalid_parameter("batch_size", "must be at least 1"));
        }
        if self.memory_size == 0 {
            return Err(RlError::invalid_parameter("memory_size", "must be at least 1"));
        }
        self.exploration.validate_probability()
    }
}

/// Settings of the episode loop in [`Trainer`](crate::trainer::Trainer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub episodes: usize,
    /// Number of the first episode. Set to the checkpoint episode when
    /// resuming so exploration and checkpoint ids continue from there.
    pub start_episode: usize,
    /// Step limit per episode, on top of the environment's own termination
    pub max_steps: usize,
    /// Run one training step after every `train_every` observed transitions
    pub train_every: usize,
    /// Copy online weights into the target estimator every N episodes.
    /// `None` keeps the construction-time sync only.
    pub target_sync_interval: Option<usize>,
    /// Save a checkpoint every N episodes
    pub checkpoint_interval: Option<usize>,
    pub model_name: String,
    pub render: bool,
    /// Emit an `info` summary every N episodes
    pub log_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            episodes: 100,
            start_episode: 0,
            max_steps: 200,
            train_every: 1,
            target_sync_interval: None,
            checkpoint_interval: None,
            model_name: "grid".to_string(),
            render: false,
            log_interval: 10,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(RlError::invalid_parameter("max_steps", "must be at least 1"));
        }
        if self.train_every == 0 {
            return Err(RlError::invalid_parameter("train_every", "must be at least 1"));
        }
        if self.target_sync_interval == Some(0) {
            return Err(RlError::invalid_parameter("target_sync_interval", "must be at least 1 when set"));
        }
        if self.checkpoint_interval == Some(0) {
            return Err(RlError::invalid_parameter("checkpoint_interval", "must be at least 1 when set"));
        }
        if self.model_name.is_empty() {
            return Err(RlError::invalid_parameter("model_name", "must not be empty"));
        }
        Ok(())
    }
}

/// Complete run configuration as stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub agent: AgentConfig,
    pub trainer: TrainerConfig,
}

impl RunConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;
        self.trainer.validate()
    }
}
