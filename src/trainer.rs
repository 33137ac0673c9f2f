//! Episode loop: act, step the environment, observe, train.
//!
//! The trainer owns every scheduling decision the learning core leaves open:
//! the exploration rate per episode, how often to train, when to copy the
//! online weights into the target estimator and when to checkpoint.

use rand::Rng;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::agent::Agent;
use crate::config::TrainerConfig;
use crate::env::Environment;
use crate::error::{Result, RlError};
use crate::estimator::ValueEstimator;
use crate::metrics::{EpisodeStats, EpisodeTracker};

const HISTORY_SIZE: usize = 1000;

/// Outcome of [`Trainer::run`]. Counts cover that run only.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub episodes: Vec<EpisodeStats>,
    pub total_steps: usize,
    pub train_steps: usize,
    /// Syncs issued by the trainer; the construction-time sync is not included
    pub target_syncs: usize,
    pub checkpoints: Vec<PathBuf>,
}

impl TrainingReport {
    /// Mean reward over the last `window` episodes
    pub fn final_average_reward(&self, window: usize) -> Option<f32> {
        let window = window.min(self.episodes.len());
        if window == 0 {
            return None;
        }
        let tail = &self.episodes[self.episodes.len() - window..];
        Some(tail.iter().map(|s| s.total_reward).sum::<f32>() / window as f32)
    }
}

pub struct Trainer {
    config: TrainerConfig,
    tracker: EpisodeTracker,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        let tracker = EpisodeTracker::starting_at(HISTORY_SIZE, config.start_episode);
        Ok(Trainer { config, tracker })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn tracker(&self) -> &EpisodeTracker {
        &self.tracker
    }

    /// Run `config.episodes` episodes of `env` with `agent`.
    ///
    /// Episode numbers continue across calls on the same trainer, so a
    /// second run neither restarts exploration nor overwrites checkpoints.
    pub fn run<E, V>(&mut self, env: &mut V, agent: &mut Agent<E>) -> Result<TrainingReport>
    where
        E: ValueEstimator,
        V: Environment + ?Sized,
    {
        check_compatible(env, agent)?;

        let mut episodes = Vec::with_capacity(self.config.episodes);
        let mut checkpoints = Vec::new();
        let steps_before = self.tracker.total_steps();
        let train_steps_before = agent.train_steps();
        let syncs_before = agent.target_syncs();

        for _ in 0..self.config.episodes {
            let stats = self.run_episode(env, agent)?;
            let completed = stats.episode + 1;

            if let Some(interval) = self.config.target_sync_interval {
                if completed % interval == 0 {
                    agent.sync_target()?;
                }
            }
            if let Some(interval) = self.config.checkpoint_interval {
                if completed % interval == 0 {
                    checkpoints.push(agent.save(&self.config.model_name, completed)?);
                }
            }
            if self.config.log_interval > 0 && completed % self.config.log_interval == 0 {
                info!(
                    episode = completed,
                    reward = stats.total_reward,
                    steps = stats.steps,
                    epsilon = stats.epsilon,
                    avg_reward = self.tracker.moving_average_reward(self.config.log_interval).unwrap_or(0.0),
                    loss = stats.mean_loss.unwrap_or(f32::NAN),
                    "episode finished"
                );
            }
            episodes.push(stats);
        }

        Ok(TrainingReport {
            episodes,
            total_steps: self.tracker.total_steps() - steps_before,
            train_steps: agent.train_steps() - train_steps_before,
            target_syncs: agent.target_syncs() - syncs_before,
            checkpoints,
        })
    }

    /// Run the next episode at the exploration rate the agent's schedule
    /// gives for its number.
    pub fn run_episode<E, V>(&mut self, env: &mut V, agent: &mut Agent<E>) -> Result<EpisodeStats>
    where
        E: ValueEstimator,
        V: Environment + ?Sized,
    {
        let episode = self.tracker.next_episode();
        let epsilon = agent.exploration_rate(episode);
        let mut state = env.reset()?;
        let mut observed = 0usize;

        for _ in 0..self.config.max_steps {
            let action = agent.act(state.view(), epsilon)?;
            let step = env.step(action)?;
            if self.config.render {
                env.render();
            }
            self.tracker.record_step(step.reward);

            agent.observe(state, action, step.reward, step.observation.clone(), step.done)?;
            observed += 1;
            if observed % self.config.train_every == 0 {
                if let Some(stats) = agent.train()? {
                    self.tracker.record_loss(stats.loss);
                }
            }

            state = step.observation;
            if step.done {
                break;
            }
        }

        let stats = self.tracker.end_episode(epsilon);
        debug!(episode, reward = stats.total_reward, steps = stats.steps, "episode done");
        Ok(stats)
    }
}

/// Step `env` with uniformly random actions for one episode, without any
/// learning. Useful as a baseline and as an environment smoke test.
pub fn run_random_episode<V, R>(env: &mut V, max_steps: usize, render: bool, rng: &mut R) -> Result<EpisodeStats>
where
    V: Environment + ?Sized,
    R: Rng + ?Sized,
{
    let num_actions = env.num_actions();
    if num_actions == 0 {
        return Err(RlError::Environment("environment has no actions".to_string()));
    }

    let mut tracker = EpisodeTracker::new(1);
    env.reset()?;
    for _ in 0..max_steps {
        let step = env.step(rng.gen_range(0..num_actions))?;
        if render {
            env.render();
        }
        tracker.record_step(step.reward);
        if step.done {
            break;
        }
    }
    Ok(tracker.end_episode(1.0))
}

fn check_compatible<E, V>(env: &V, agent: &Agent<E>) -> Result<()>
where
    E: ValueEstimator,
    V: Environment + ?Sized,
{
    let online = agent.online();
    if env.observation_dim() != online.state_dim() || env.num_actions() != online.num_actions() {
        return Err(RlError::dimension_mismatch(
            format!("environment {} -> {}", online.state_dim(), online.num_actions()),
            format!("environment {} -> {}", env.observation_dim(), env.num_actions()),
        ));
    }
    Ok(())
}
