use ndarray::Array1;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RlError};

/// One recorded environment step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

impl Transition {
    pub fn new(state: Array1<f32>, action: usize, reward: f32, next_state: Array1<f32>, done: bool) -> Self {
        Transition { state, action, reward, next_state, done }
    }
}

/// Fixed-capacity experience replay over a preallocated arena.
///
/// Once full, each `push` overwrites the oldest slot, so the memory never
/// grows past `capacity` and eviction order equals insertion order.
#[derive(Clone, Debug)]
pub struct ReplayMemory {
    slots: Vec<Transition>,
    capacity: usize,
    // index of the oldest entry once the arena is full
    head: usize,
}

impl ReplayMemory {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RlError::invalid_parameter("memory_size", "must be at least 1"));
        }
        Ok(ReplayMemory {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        })
    }

    pub fn push(&mut self, transition: Transition) {
        if self.slots.len() < self.capacity {
            self.slots.push(transition);
        } else {
            self.slots[self.head] = transition;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Draw `min(batch_size, len)` distinct transitions uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition> {
        let amount = batch_size.min(self.slots.len());
        index::sample(rng, self.slots.len(), amount)
            .into_iter()
            .map(|i| &self.slots[i])
            .collect()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}
