//! Error types for the game layer

use thiserror::Error;

/// Errors raised by the game engine
///
/// Collisions and stagnation are ordinary terminal transitions and never show
/// up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    /// Action encoding is not one of the three legal actions
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// No free cell is left to place the goal on
    #[error("Goal placement exhausted: no free cell among {cells} grid cells")]
    GoalPlacementExhausted { cells: usize },

    /// Configuration rejected by validation
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),
}

impl GameError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
