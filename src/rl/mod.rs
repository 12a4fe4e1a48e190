//! Deep Q-learning for the snake game
//!
//! Provides:
//! - 28-value ray observations and an RL environment wrapper
//! - Bounded replay memory
//! - Epsilon-greedy exploration with a floored linear decay
//! - A burn Q-network with its trainer and persistence

pub mod approximator;
pub mod backend;
pub mod config;
pub mod environment;
pub mod memory;
pub mod network;
pub mod observation;
pub mod persistence;
pub mod policy;
pub mod trainer;

pub use approximator::{CheckpointInfo, ValueApproximator, greedy_action};
pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use config::DqnConfig;
pub use environment::SnakeEnvironment;
pub use memory::{ReplayMemory, Transition};
pub use network::{LinearQNet, LinearQNetConfig, observation_batch, q_values};
pub use observation::{OBSERVATION_SIZE, Observation, RAY_COUNT, create_observation};
pub use persistence::{ModelMetadata, load_metadata, load_network, save_model};
pub use policy::{Decision, EpsilonGreedy, ExplorationSchedule};
pub use trainer::QTrainer;
