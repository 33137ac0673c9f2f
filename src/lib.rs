//! # snake_rl - Value-Based Reinforcement Learning for Grid Worlds
//!
//! snake_rl is the learning core of a grid-world game agent. An environment
//! emits observations and rewards; the agent learns action values with
//! temporal-difference updates and acts epsilon-greedily on them.
//!
//! ## Key Features
//!
//! - **Replay Memory**: fixed-capacity ring buffer with FIFO eviction
//! - **Epsilon-Greedy Policy**: deterministic exploitation at `epsilon = 0`
//! - **Two Update Rules**: DQN and Double DQN behind one [`learner::Learner`]
//! - **Target Estimator**: synchronized only on explicit request
//! - **Pluggable Estimators**: anything implementing [`estimator::ValueEstimator`]
//! - **Checkpoints**: online weights saved as `{tag}_{model}_{episode}.bin`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snake_rl::agent::Agent;
//! use snake_rl::config::{AgentConfig, TrainerConfig};
//! use snake_rl::env::{Environment, GridWorld};
//! use snake_rl::estimator::{MlpEstimator, Optimizer};
//! use snake_rl::learner::UpdateRule;
//! use snake_rl::trainer::Trainer;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut env = GridWorld::new(5, 50).unwrap();
//! let config = AgentConfig::default()
//!     .with_learning_rate(0.001)
//!     .with_update_rule(UpdateRule::DoubleDqn)
//!     .with_seed(7);
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let layers = [env.observation_dim(), 256, env.num_actions()];
//! let (online, target) =
//!     MlpEstimator::pair(&layers, Optimizer::rmsprop(), config.learning_rate, &mut rng).unwrap();
//! let mut agent = Agent::new(online, target, config).unwrap();
//!
//! let mut trainer = Trainer::new(TrainerConfig::default()).unwrap();
//! let report = trainer.run(&mut env, &mut agent).unwrap();
//! println!("average reward: {:?}", report.final_average_reward(10));
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - Composition root: act, observe, train, sync, save/load
//! - [`checkpoint`] - Checkpoint naming and weight files
//! - [`config`] - Agent and trainer hyperparameters
//! - [`env`] - Environment trait and the built-in grid world
//! - [`error`] - Error types and result handling
//! - [`estimator`] - Value estimator capability and the bundled MLP
//! - [`learner`] - DQN and Double DQN target computation
//! - [`metrics`] - Episode statistics
//! - [`policy`] - Epsilon-greedy action selection
//! - [`replay_memory`] - Experience replay
//! - [`schedule`] - Exploration schedules
//! - [`trainer`] - Episode loop

pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod env;
pub mod error;
pub mod estimator;
pub mod learner;
pub mod metrics;
pub mod policy;
pub mod replay_memory;
pub mod schedule;
pub mod trainer;

pub use error::{Result, RlError};

#[cfg(test)]
mod tests;
