//! Q-learning updates for the snake Q-network
//!
//! For every transition in a batch the regression target equals the current
//! prediction, except at the taken action where it becomes
//! `reward` for terminal transitions and `reward + gamma * max_a Q(next, a)`
//! otherwise. The loss is the mean squared error between prediction and
//! target, followed by a single Adam step.

use std::path::Path;

use anyhow::{Result, anyhow};
use burn::{
    module::AutodiffModule,
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{ElementConversion, Tensor, TensorData, backend::AutodiffBackend},
};
use tracing::debug;

use super::approximator::{CheckpointInfo, ValueApproximator};
use super::config::DqnConfig;
use super::memory::Transition;
use super::network::{LinearQNet, LinearQNetConfig, observation_batch, q_values};
use super::observation::Observation;
use super::persistence::{load_network, save_model};
use crate::game::ACTION_COUNT;

/// Q-network with its optimizer
///
/// # Type Parameters
///
/// * `B` - Autodiff backend for gradient computation
pub struct QTrainer<B: AutodiffBackend> {
    /// Q-network being trained
    network: LinearQNet<B>,

    /// Adam optimizer for network parameters
    optim: OptimizerAdaptor<Adam, LinearQNet<B>, B>,

    /// Hyperparameters
    config: DqnConfig,

    /// Number of optimizer steps taken
    updates: usize,

    /// Device for tensor operations
    device: B::Device,
}

impl<B: AutodiffBackend> QTrainer<B> {
    /// Create a trainer around a freshly initialized network
    pub fn new(config: DqnConfig, device: B::Device) -> Result<Self> {
        config.validate().map_err(|err| anyhow!("invalid DQN configuration: {err}"))?;
        let network = LinearQNetConfig::new(config.hidden_size).init::<B>(&device);
        Ok(Self::with_network(network, config, device))
    }

    /// Create a trainer around an existing network
    pub fn with_network(network: LinearQNet<B>, config: DqnConfig, device: B::Device) -> Self {
        Self {
            network,
            optim: AdamConfig::new().init(),
            config,
            updates: 0,
            device,
        }
    }

    /// Resume from a saved checkpoint
    ///
    /// Weights and hyperparameters come from the checkpoint; the optimizer
    /// starts from a fresh state.
    pub fn from_checkpoint(path: &Path, device: B::Device) -> Result<(Self, CheckpointInfo)> {
        let (network, metadata) = load_network::<B>(path, &device)?;
        let info = metadata.checkpoint_info();
        Ok((Self::with_network(network, metadata.dqn_config, device), info))
    }

    /// Get a reference to the neural network
    pub fn network(&self) -> &LinearQNet<B> {
        &self.network
    }

    /// Get a reference to the hyperparameters
    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    /// Number of optimizer steps taken so far
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Regression targets for a batch, row-major `[batch, ACTION_COUNT]`
    fn targets(&self, batch: &[&Transition], predicted: &[f32]) -> Result<Vec<f32>> {
        let next_states =
            observation_batch::<B::InnerBackend>(batch.iter().map(|t| &t.next_state), &self.device);
        let next_best = self
            .network
            .valid()
            .forward(next_states)
            .max_dim(1)
            .into_data()
            .to_vec::<f32>()
            .map_err(|err| anyhow!("failed to read next-state values: {err:?}"))?;

        let mut targets = predicted.to_vec();
        for (row, transition) in batch.iter().enumerate() {
            let value = if transition.done {
                transition.reward
            } else {
                transition.reward + self.config.gamma * next_best[row]
            };
            targets[row * ACTION_COUNT + transition.action.index()] = value;
        }

        Ok(targets)
    }
}

impl<B: AutodiffBackend> ValueApproximator for QTrainer<B> {
    fn predict(&self, state: &Observation) -> Result<[f32; ACTION_COUNT]> {
        q_values(&self.network.valid(), state, &self.device)
    }

    fn train_step(&mut self, batch: &[&Transition]) -> Result<f32> {
        if batch.is_empty() {
            return Ok(0.0);
        }

        let states = observation_batch::<B>(batch.iter().map(|t| &t.state), &self.device);
        let predicted = self.network.forward(states);

        let predicted_values = predicted
            .to_data()
            .to_vec::<f32>()
            .map_err(|err| anyhow!("failed to read predictions: {err:?}"))?;
        let targets = self.targets(batch, &predicted_values)?;
        let targets: Tensor<B, 2> = Tensor::from_data(
            TensorData::new(targets, [batch.len(), ACTION_COUNT]),
            &self.device,
        );

        let diff = predicted - targets;
        let loss = (diff.clone() * diff).mean();
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optim
            .step(self.config.learning_rate, self.network.clone(), grads);
        self.updates += 1;

        debug!(batch = batch.len(), loss = loss_value, "q-network update");
        Ok(loss_value)
    }

    fn save(&self, path: &Path, info: &CheckpointInfo) -> Result<()> {
        save_model(&self.network, &self.config, info, path)
    }
}
