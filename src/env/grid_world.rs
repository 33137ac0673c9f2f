/***
# Grid World

* The agent moves on a square grid from a start cell towards a goal cell
* Observation: one-hot encoding of the agent's cell (`size * size` values)
* Actions: 0 up, 1 down, 2 left, 3 right
* Rewards: `step_reward` per move, `wall_reward` when bumping into the
  border, `goal_reward` on reaching the goal
* Episode ends on the goal or after `max_steps` moves
***/

use ndarray::Array1;

use super::{Environment, Step};
use crate::error::{Result, RlError};

pub const NUM_MOVES: usize = 4;

#[derive(Clone, Debug)]
pub struct GridWorld {
    size: usize,
    start: (usize, usize),
    goal: (usize, usize),
    agent: (usize, usize),
    steps: usize,
    max_steps: usize,
    pub step_reward: f32,
    pub wall_reward: f32,
    pub goal_reward: f32,
}

impl GridWorld {
    /// `size x size` grid, start in the top-left corner, goal in the
    /// bottom-right corner.
    pub fn new(size: usize, max_steps: usize) -> Result<Self> {
        if size < 2 {
            return Err(RlError::invalid_parameter("size", format!("grid must be at least 2x2, got {}", size)));
        }
        Self::with_cells(size, (0, 0), (size - 1, size - 1), max_steps)
    }

    pub fn with_cells(size: usize, start: (usize, usize), goal: (usize, usize), max_steps: usize) -> Result<Self> {
        let inside = |(row, col): (usize, usize)| row < size && col < size;
        if !inside(start) || !inside(goal) {
            return Err(RlError::invalid_parameter(
                "cells",
                format!("start {:?} and goal {:?} must lie inside a {}x{} grid", start, goal, size, size),
            ));
        }
        if start == goal {
            return Err(RlError::invalid_parameter("cells", "start and goal must differ"));
        }
        if max_steps == 0 {
            return Err(RlError::invalid_parameter("max_steps", "must be at least 1"));
        }
        Ok(GridWorld {
            size,
            start,
            goal,
            agent: start,
            steps: 0,
            max_steps,
            step_reward: -1.0,
            wall_reward: -5.0,
            goal_reward: 10.0,
        })
    }

    pub fn position(&self) -> (usize, usize) {
        self.agent
    }

    pub fn goal(&self) -> (usize, usize) {
        self.goal
    }

    fn observation(&self) -> Array1<f32> {
        let mut obs = Array1::zeros(self.size * self.size);
        obs[self.agent.0 * self.size + self.agent.1] = 1.0;
        obs
    }
}

impl Environment for GridWorld {
    fn reset(&mut self) -> Result<Array1<f32>> {
        self.agent = self.start;
        self.steps = 0;
        Ok(self.observation())
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let (row, col) = self.agent;
        let moved = match action {
            0 => (row.saturating_sub(1), col),
            1 => ((row + 1).min(self.size - 1), col),
            2 => (row, col.saturating_sub(1)),
            3 => (row, (col + 1).min(self.size - 1)),
            _ => return Err(RlError::InvalidAction { action, num_actions: NUM_MOVES }),
        };
        self.steps += 1;

        let reward = if moved == self.goal {
            self.goal_reward
        } else if moved == self.agent {
            self.wall_reward
        } else {
            self.step_reward
        };
        self.agent = moved;

        let reached = self.agent == self.goal;
        let done = reached || self.steps >= self.max_steps;
        Ok(Step::new(self.observation(), reward, done)
            .with_info("steps", self.steps as f32)
            .with_info("reached_goal", if reached { 1.0 } else { 0.0 }))
    }

    fn num_actions(&self) -> usize {
        NUM_MOVES
    }

    fn observation_dim(&self) -> usize {
        self.size * self.size
    }

    fn render(&self) {
        let mut out = String::with_capacity((self.size + 1) * self.size);
        for row in 0..self.size {
            for col in 0..self.size {
                out.push(if (row, col) == self.agent {
                    'A'
                } else if (row, col) == self.goal {
                    'G'
                } else {
                    '.'
                });
            }
            out.push('\n');
        }
        println!("{}", out);
    }
}
