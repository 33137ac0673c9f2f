use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Per-episode record produced by the trainer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub episode: usize,
    pub total_reward: f32,
    pub steps: usize,
    /// Exploration rate used throughout the episode
    pub epsilon: f32,
    /// Mean loss over the training steps of the episode, if any ran
    pub mean_loss: Option<f32>,
}

/// Bounded history of episode statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeTracker {
    history: VecDeque<EpisodeStats>,
    history_size: usize,
    // number given to the first recorded episode
    first_episode: usize,
    episodes_seen: usize,
    total_steps: usize,
    best_reward: Option<f32>,

    // Running values of the episode in progress
    current_reward: f32,
    current_steps: usize,
    current_loss_sum: f32,
    current_loss_count: usize,
}

impl EpisodeTracker {
    pub fn new(history_size: usize) -> Self {
        Self::starting_at(history_size, 0)
    }

    /// Tracker whose first episode is numbered `first_episode`, e.g. when
    /// resuming from a checkpoint.
    pub fn starting_at(history_size: usize, first_episode: usize) -> Self {
        EpisodeTracker {
            history: VecDeque::with_capacity(history_size),
            history_size: history_size.max(1),
            first_episode,
            episodes_seen: 0,
            total_steps: 0,
            best_reward: None,
            current_reward: 0.0,
            current_steps: 0,
            current_loss_sum: 0.0,
            current_loss_count: 0,
        }
    }

    /// Record one environment step of the current episode
    pub fn record_step(&mut self, reward: f32) {
        self.current_reward += reward;
        self.current_steps += 1;
        self.total_steps += 1;
    }

    /// Record the loss of one training step
    pub fn record_loss(&mut self, loss: f32) {
        self.current_loss_sum += loss;
        self.current_loss_count += 1;
    }

    /// Close the current episode and return its statistics
    pub fn end_episode(&mut self, epsilon: f32) -> EpisodeStats {
        let stats = EpisodeStats {
            episode: self.next_episode(),
            total_reward: self.current_reward,
            steps: self.current_steps,
            epsilon,
            mean_loss: if self.current_loss_count > 0 {
                Some(self.current_loss_sum / self.current_loss_count as f32)
            } else {
                None
            },
        };

        if self.history.len() >= self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(stats);
        self.episodes_seen += 1;
        self.best_reward = Some(self.best_reward.map_or(stats.total_reward, |best| best.max(stats.total_reward)));

        self.current_reward = 0.0;
        self.current_steps = 0;
        self.current_loss_sum = 0.0;
        self.current_loss_count = 0;
        stats
    }

    /// Mean reward over the last `window` episodes
    pub fn moving_average_reward(&self, window: usize) -> Option<f32> {
        let window = window.min(self.history.len());
        if window == 0 {
            return None;
        }
        let sum: f32 = self.history.iter().rev().take(window).map(|s| s.total_reward).sum();
        Some(sum / window as f32)
    }

    /// Mean episode length over the last `window` episodes
    pub fn moving_average_steps(&self, window: usize) -> Option<f32> {
        let window = window.min(self.history.len());
        if window == 0 {
            return None;
        }
        let sum: usize = self.history.iter().rev().take(window).map(|s| s.steps).sum();
        Some(sum as f32 / window as f32)
    }

    pub fn history(&self) -> impl Iterator<Item = &EpisodeStats> + '_ {
        self.history.iter()
    }

    /// Number the next closed episode will get
    pub fn next_episode(&self) -> usize {
        self.first_episode + self.episodes_seen
    }

    pub fn episodes_seen(&self) -> usize {
        self.episodes_seen
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn best_reward(&self) -> Option<f32> {
        self.best_reward
    }
}
