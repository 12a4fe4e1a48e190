//! Feed-forward Q-network for the snake agent
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 28]
//!   ↓ Linear(28 → 512) + ReLU
//!   ↓ Linear(512 → 3)
//! Output: [batch, 3] action values (straight, turn right, turn left)
//! ```
//!
//! # Example
//!
//! ```rust
//! use deep_snake::rl::LinearQNetConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let network = LinearQNetConfig::new(512).init::<Backend>(&device);
//!
//! let q_values = network.forward(Tensor::zeros([4, 28], &device));
//! assert_eq!(q_values.dims(), [4, 3]);
//! ```

use anyhow::{Result, anyhow};
use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, TensorData, activation::relu, backend::Backend},
};

use super::observation::{OBSERVATION_SIZE, Observation};
use crate::game::ACTION_COUNT;

/// Configuration for the Q-network
#[derive(Debug, Clone)]
pub struct LinearQNetConfig {
    /// Length of the observation vector (default: 28)
    pub input_size: usize,

    /// Width of the hidden layer (default: 512)
    pub hidden_size: usize,

    /// Number of action values produced (default: 3)
    pub output_size: usize,
}

impl LinearQNetConfig {
    /// Configuration for the snake observation and action space
    ///
    /// # Arguments
    ///
    /// * `hidden_size` - Width of the hidden layer
    pub fn new(hidden_size: usize) -> Self {
        Self {
            input_size: OBSERVATION_SIZE,
            hidden_size,
            output_size: ACTION_COUNT,
        }
    }

    /// Initialize the network with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> LinearQNet<B> {
        LinearQNet {
            linear1: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            linear2: LinearConfig::new(self.hidden_size, self.output_size).init(device),
        }
    }
}

impl Default for LinearQNetConfig {
    fn default() -> Self {
        Self::new(512)
    }
}

/// Two-layer perceptron mapping observations to action values
#[derive(Module, Debug)]
pub struct LinearQNet<B: Backend> {
    linear1: Linear<B>,
    linear2: Linear<B>,
}

impl<B: Backend> LinearQNet<B> {
    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `observations` - Tensor with shape `[batch, input_size]`
    ///
    /// # Returns
    ///
    /// Tensor with shape `[batch, output_size]`
    pub fn forward(&self, observations: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.linear1.forward(observations));
        self.linear2.forward(x)
    }
}

/// Stack observations into a `[batch, 28]` tensor
pub fn observation_batch<'a, B: Backend>(
    observations: impl IntoIterator<Item = &'a Observation>,
    device: &B::Device,
) -> Tensor<B, 2> {
    let mut values = Vec::new();
    for observation in observations {
        values.extend_from_slice(observation);
    }
    let batch = values.len() / OBSERVATION_SIZE;
    Tensor::from_data(TensorData::new(values, [batch, OBSERVATION_SIZE]), device)
}

/// Action values for a single observation
pub fn q_values<B: Backend>(
    network: &LinearQNet<B>,
    observation: &Observation,
    device: &B::Device,
) -> Result<[f32; ACTION_COUNT]> {
    let input = observation_batch::<B>([observation], device);
    let output = network
        .forward(input)
        .into_data()
        .to_vec::<f32>()
        .map_err(|err| anyhow!("failed to read network output: {err:?}"))?;

    let mut values = [0.0; ACTION_COUNT];
    if output.len() != ACTION_COUNT {
        return Err(anyhow!(
            "network produced {} values, expected {}",
            output.len(),
            ACTION_COUNT
        ));
    }
    values.copy_from_slice(&output);
    Ok(values)
}
