//! Deep Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

use super::policy::ExplorationSchedule;

/// Configuration for the deep Q-learning agent
///
/// # Example
///
/// ```rust
/// use deep_snake::rl::DqnConfig;
///
/// let config = DqnConfig {
///     batch_size: 256,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqnConfig {
    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-4
    pub learning_rate: f64,

    /// Discount factor applied to the best next-state value
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Width of the hidden layer of the Q-network
    ///
    /// Default: 512
    pub hidden_size: usize,

    /// Maximum number of transitions kept in replay memory
    ///
    /// Default: 100_000
    pub memory_capacity: usize,

    /// Transitions drawn for the update at the end of each episode
    ///
    /// Default: 2000
    pub batch_size: usize,

    /// Exploration schedule for the epsilon-greedy policy
    pub exploration: ExplorationSchedule,
}

impl DqnConfig {
    /// Create a new configuration with default hyperparameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if self.hidden_size == 0 {
            return Err("hidden_size must be at least 1".to_string());
        }

        if self.memory_capacity == 0 {
            return Err("memory_capacity must be at least 1".to_string());
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        self.exploration.validate()
    }
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-4,
            gamma: 0.9,
            hidden_size: 512,
            memory_capacity: 100_000,
            batch_size: 2000,
            exploration: ExplorationSchedule::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DqnConfig::default();
        assert_eq!(config.learning_rate, 1e-4);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.hidden_size, 512);
        assert_eq!(config.memory_capacity, 100_000);
        assert_eq!(config.batch_size, 2000);
        assert_eq!(config, DqnConfig::new());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(DqnConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_negative_learning_rate() {
        let mut config = DqnConfig::default();
        config.learning_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = DqnConfig::default();
        config.gamma = 1.5;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_sizes() {
        let mut config = DqnConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = DqnConfig::default();
        config.memory_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = DqnConfig::default();
        config.hidden_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_checks_exploration() {
        let mut config = DqnConfig::default();
        config.exploration.range = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip_keeps_values() {
        let config = DqnConfig {
            gamma: 0.95,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: DqnConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
