use super::observation::{Observation, create_observation};
use crate::game::{Action, GameConfig, GameEngine, GameError, GameState, StepResult};

/// Snake environment for reinforcement learning
///
/// Wraps the game engine and provides the RL interface:
/// - 28-value ray observations
/// - Discrete relative action space (straight, turn right, turn left)
/// - Standard reset / step calls
pub struct SnakeEnvironment {
    engine: GameEngine,
    state: GameState,
}

impl SnakeEnvironment {
    /// Create a new environment, already reset
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::from_engine(GameEngine::new(config)?)
    }

    /// Create an environment with reproducible goal placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::from_engine(GameEngine::with_seed(config, seed)?)
    }

    fn from_engine(mut engine: GameEngine) -> Result<Self, GameError> {
        let state = engine.reset()?;
        Ok(Self { engine, state })
    }

    /// Start a new episode and return its first observation
    pub fn reset(&mut self) -> Result<Observation, GameError> {
        self.state = self.engine.reset()?;
        Ok(self.observation())
    }

    /// Advance one tick
    pub fn step(&mut self, action: Action) -> Result<StepResult, GameError> {
        self.engine.step(&mut self.state, action)
    }

    /// Step with a one-hot action vector
    ///
    /// Anything other than exactly one 1 among three entries is rejected
    /// before the state is touched.
    pub fn step_one_hot(&mut self, encoded: &[f32]) -> Result<StepResult, GameError> {
        let action = Action::from_one_hot(encoded)?;
        self.step(action)
    }

    /// Observation of the current state
    pub fn observation(&self) -> Observation {
        create_observation(&self.state)
    }

    /// Get reference to current game state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access to the state, for setting up scenarios
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Number of resets so far
    pub fn generation(&self) -> u64 {
        self.engine.generation()
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }
}
