use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::checkpoint;
use crate::config::AgentConfig;
use crate::error::{Result, RlError};
use crate::estimator::{check_state, ValueEstimator};
use crate::learner::{Learner, TrainStats, UpdateRule};
use crate::policy::EpsilonGreedy;
use crate::replay_memory::{ReplayMemory, Transition};

/// Where an agent is in its lifecycle.
///
/// Construction already performs the initial target sync, so an `Agent`
/// value is never observable before `Ready`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Ready,
    /// Ready, with the online weights saved at least once
    Checkpointed { episode: usize },
}

/// DQN / Double DQN agent over any [`ValueEstimator`].
pub struct Agent<E: ValueEstimator> {
    online: E,
    target: E,
    memory: ReplayMemory,
    policy: EpsilonGreedy,
    learner: Learner,
    config: AgentConfig,
    rng: StdRng,
    train_steps: usize,
    target_syncs: usize,
    last_checkpoint: Option<usize>,
}

impl<E: ValueEstimator> Agent<E> {
    /// Build an agent from two distinct estimators of the same shape and
    /// synchronize the target with the online weights.
    pub fn new(online: E, target: E, config: AgentConfig) -> Result<Self> {
        config.validate()?;
        if online.state_dim() == 0 || online.num_actions() == 0 {
            return Err(RlError::invalid_parameter(
                "estimator",
                format!(
                    "needs a non-empty state and action space, got {} -> {}",
                    online.state_dim(),
                    online.num_actions()
                ),
            ));
        }
        if online.state_dim() != target.state_dim() || online.num_actions() != target.num_actions() {
            return Err(RlError::dimension_mismatch(
                format!("target estimator {} -> {}", online.state_dim(), online.num_actions()),
                format!("target estimator {} -> {}", target.state_dim(), target.num_actions()),
            ));
        }

        let memory = ReplayMemory::new(config.memory_size)?;
        let learner = Learner::new(config.update_rule, config.discount_factor)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut agent = Agent {
            online,
            target,
            memory,
            policy: EpsilonGreedy::new(),
            learner,
            config,
            rng,
            train_steps: 0,
            target_syncs: 0,
            last_checkpoint: None,
        };
        agent.sync_target()?;
        info!(
            rule = %agent.learner.rule(),
            state_dim = agent.online.state_dim(),
            num_actions = agent.online.num_actions(),
            memory_size = agent.config.memory_size,
            batch_size = agent.config.batch_size,
            "agent ready"
        );
        Ok(agent)
    }

    /// Epsilon-greedy action for `state`.
    pub fn act(&mut self, state: ArrayView1<f32>, epsilon: f32) -> Result<usize> {
        self.policy.select(&self.online, state, epsilon, &mut self.rng)
    }

    /// Record one transition in replay memory.
    pub fn observe(
        &mut self,
        state: Array1<f32>,
        action: usize,
        reward: f32,
        next_state: Array1<f32>,
        done: bool,
    ) -> Result<()> {
        self.observe_transition(Transition::new(state, action, reward, next_state, done))
    }

    pub fn observe_transition(&mut self, transition: Transition) -> Result<()> {
        let state_dim = self.online.state_dim();
        check_state(transition.state.view(), state_dim)?;
        check_state(transition.next_state.view(), state_dim)?;
        let num_actions = self.online.num_actions();
        if transition.action >= num_actions {
            return Err(RlError::InvalidAction { action: transition.action, num_actions });
        }
        self.memory.push(transition);
        Ok(())
    }

    /// One learner step on `min(batch_size, len(memory))` sampled
    /// transitions. Returns `None` while the memory is empty.
    pub fn train(&mut self) -> Result<Option<TrainStats>> {
        if self.memory.is_empty() {
            debug!("replay memory empty, skipping training step");
            return Ok(None);
        }

        let batch = self.memory.sample(self.config.batch_size, &mut self.rng);
        let stats = self.learner.step(&mut self.online, &self.target, &batch)?;
        self.train_steps += 1;
        Ok(Some(stats))
    }

    /// Overwrite the target weights with the online weights.
    pub fn sync_target(&mut self) -> Result<()> {
        let weights = self.online.weights();
        self.target.set_weights(&weights)?;
        self.target_syncs += 1;
        debug!(syncs = self.target_syncs, train_steps = self.train_steps, "target estimator synchronized");
        Ok(())
    }

    /// Checkpoint path for `model_name` at `episode` under this agent's
    /// algorithm tag.
    pub fn checkpoint_path(&self, model_name: &str, episode: usize) -> PathBuf {
        checkpoint::path_for(&self.config.checkpoint_dir, self.learner.rule().tag(), model_name, episode)
    }

    /// Persist the online weights.
    pub fn save(&mut self, model_name: &str, episode: usize) -> Result<PathBuf> {
        let path = self.checkpoint_path(model_name, episode);
        self.online.save_weights(&path)?;
        self.last_checkpoint = Some(episode);
        info!(path = %path.display(), episode, "saved checkpoint");
        Ok(path)
    }

    /// Restore the online weights. The target estimator is left untouched;
    /// call [`sync_target`](Agent::sync_target) to propagate them.
    pub fn load(&mut self, model_name: &str, episode: usize) -> Result<PathBuf> {
        let path = self.checkpoint_path(model_name, episode);
        self.online.load_weights(&path)?;
        info!(path = %path.display(), episode, "loaded checkpoint");
        Ok(path)
    }

    /// Exploration rate of the configured schedule for `episode`.
    pub fn exploration_rate(&self, episode: usize) -> f32 {
        self.config.exploration.value(episode)
    }

    pub fn discount_factor(&self) -> f32 {
        self.learner.discount_factor()
    }

    pub fn set_discount_factor(&mut self, discount_factor: f32) -> Result<()> {
        self.learner.set_discount_factor(discount_factor)?;
        self.config.discount_factor = discount_factor;
        Ok(())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.last_checkpoint {
            Some(episode) => Lifecycle::Checkpointed { episode },
            None => Lifecycle::Ready,
        }
    }

    pub fn update_rule(&self) -> UpdateRule {
        self.learner.rule()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn online(&self) -> &E {
        &self.online
    }

    pub fn target(&self) -> &E {
        &self.target
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn train_steps(&self) -> usize {
        self.train_steps
    }

    pub fn target_syncs(&self) -> usize {
        self.target_syncs
    }

    pub fn last_checkpoint(&self) -> Option<usize> {
        self.last_checkpoint
    }
}
