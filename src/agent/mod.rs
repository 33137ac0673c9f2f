//! # Value-Based Agent
//!
//! [`Agent`] is the composition root of the learning core. It owns the
//! replay memory, the online and target estimators, the epsilon-greedy
//! policy and the learner, and exposes the operations an episode loop needs:
//!
//! - `act`: pick an action for a state at a given exploration rate
//! - `observe`: record a transition in replay memory
//! - `train`: run one learner step on a sampled minibatch
//! - `sync_target`: copy online weights into the target estimator
//! - `save` / `load`: persist or restore the online weights
//!
//! `train` never synchronizes the target estimator. Construction performs
//! one sync; after that the cadence belongs to the caller.
//!
//! ## Example Usage
//!
//! ```rust
//! use snake_rl::agent::Agent;
//! use snake_rl::config::AgentConfig;
//! use snake_rl::estimator::{MlpEstimator, Optimizer};
//! use rand::{rngs::StdRng, SeedableRng};
//! use ndarray::array;
//!
//! let config = AgentConfig::default().with_seed(42).with_learning_rate(0.001);
//! let mut rng = StdRng::seed_from_u64(42);
//! let (online, target) =
//!     MlpEstimator::pair(&[4, 32, 2], Optimizer::rmsprop(), config.learning_rate, &mut rng).unwrap();
//! let mut agent = Agent::new(online, target, config).unwrap();
//!
//! let state = array![0.1, 0.2, -0.3, 0.4];
//! let action = agent.act(state.view(), 0.1).unwrap();
//! let next_state = array![0.2, 0.1, -0.2, 0.3];
//! agent.observe(state, action, 1.0, next_state, false).unwrap();
//! let stats = agent.train().unwrap();
//! assert_eq!(stats.map(|s| s.batch_size), Some(1));
//! ```

mod value_agent;

pub use value_agent::{Agent, Lifecycle};
