//! Interface between the training loop and the value function
//!
//! The orchestrator only needs three things from a Q-function: action values
//! for a state, a gradient step on some transitions, and a way to persist the
//! parameters. `QTrainer` is the burn-backed implementation.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::memory::Transition;
use super::observation::Observation;
use crate::game::{ACTION_COUNT, Action};

/// Training progress recorded next to a checkpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointInfo {
    /// Episodes completed when the checkpoint was written
    pub episodes: u32,
    /// Best score reached so far
    pub best_score: u32,
}

/// Q-value function approximator
pub trait ValueApproximator {
    /// Predicted value of each action, in `Action::ALL` order
    fn predict(&self, state: &Observation) -> Result<[f32; ACTION_COUNT]>;

    /// One optimization step on the given transitions; returns the loss
    fn train_step(&mut self, batch: &[&Transition]) -> Result<f32>;

    /// Persist the parameters
    fn save(&self, path: &Path, info: &CheckpointInfo) -> Result<()>;
}

/// Pick the action with the highest value, the first one on ties
pub fn greedy_action(values: &[f32; ACTION_COUNT]) -> Action {
    let mut best = 0;
    for (idx, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = idx;
        }
    }
    Action::ALL[best]
}
