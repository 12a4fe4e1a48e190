//! Backend type aliases and device management
//!
//! - **TrainingBackend**: Autodiff-enabled NdArray backend for training (CPU)
//! - **InferenceBackend**: Plain NdArray backend for watching a trained agent
//!
//! The Q-network is a 28 → 512 → 3 perceptron, so the CPU backend is enough.
//!
//! # Example
//!
//! ```rust
//! use deep_snake::rl::{DqnConfig, QTrainer, TrainingBackend, default_device};
//!
//! let trainer = QTrainer::<TrainingBackend>::new(DqnConfig::default(), default_device());
//! assert!(trainer.is_ok());
//! ```

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Backend type for training (with autodiff)
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend type for inference (without autodiff)
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
