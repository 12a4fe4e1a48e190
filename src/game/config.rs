use serde::{Deserialize, Serialize};

use super::action::Direction;
use super::error::GameError;
use super::state::Position;

/// Configuration for the game
///
/// Grid geometry is expressed in pixels: every coordinate is a multiple of
/// `cell_size`, and `width`/`height` must be multiples of it too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the play field in pixels
    pub width: i32,
    /// Height of the play field in pixels
    pub height: i32,
    /// Edge length of a single cell in pixels
    pub cell_size: i32,
    /// Number of segments the snake starts with
    pub initial_snake_length: usize,
    /// Heading after a reset
    pub initial_direction: Direction,
    /// Cell every initial segment is stacked on
    pub spawn: Position,

    // Rewards
    /// Reward for reaching the goal (replaces any shaping for that tick)
    pub food_reward: f32,
    /// Reward for a collision or a stagnation timeout
    pub death_penalty: f32,
    /// Shaping reward for moving closer to the goal
    pub approach_reward: f32,
    /// Shaping reward for not moving closer to the goal
    pub retreat_penalty: f32,
    /// Added once per orthogonal neighbour of the head that is part of the body
    pub adjacency_penalty: f32,
    /// Leading segments ignored by the adjacency check (head and neck)
    pub adjacency_skip: usize,

    /// Episode times out once ticks exceed `stagnation_factor * snake length`
    pub stagnation_factor: u32,
    /// Random draws tried before falling back to scanning free cells
    pub max_placement_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            cell_size: 25,
            initial_snake_length: 3,
            initial_direction: Direction::Down,
            spawn: Position::new(0, 0),
            food_reward: 20.0,
            death_penalty: -20.0,
            approach_reward: 0.2,
            retreat_penalty: -0.3,
            adjacency_penalty: -0.15,
            adjacency_skip: 2,
            stagnation_factor: 100,
            max_placement_attempts: 10_000,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom play field
    pub fn new(width: i32, height: i32, cell_size: i32) -> Self {
        Self {
            width,
            height,
            cell_size,
            ..Default::default()
        }
    }

    /// Create a small grid for testing (10x10 cells)
    pub fn small() -> Self {
        Self::new(250, 250, 25)
    }

    /// Number of columns in the grid
    pub fn columns(&self) -> i32 {
        self.width / self.cell_size
    }

    /// Number of rows in the grid
    pub fn rows(&self) -> i32 {
        self.height / self.cell_size
    }

    /// Number of grid cells, computed without overflow
    pub fn cell_count(&self) -> u64 {
        let columns = u64::try_from(self.columns()).unwrap_or(0);
        let rows = u64::try_from(self.rows()).unwrap_or(0);
        columns * rows
    }

    /// Total number of cells, which is also the highest reachable score
    ///
    /// Saturates at `u32::MAX`; `validate` rejects grids that large.
    pub fn max_score(&self) -> u32 {
        u32::try_from(self.cell_count()).unwrap_or(u32::MAX)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GameError> {
        if self.cell_size <= 0 {
            return Err(GameError::config(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }

        if self.width <= 0 || self.height <= 0 {
            return Err(GameError::config(format!(
                "play field must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }

        if self.width % self.cell_size != 0 || self.height % self.cell_size != 0 {
            return Err(GameError::config(format!(
                "play field {}x{} is not a multiple of cell_size {}",
                self.width, self.height, self.cell_size
            )));
        }

        if self.initial_snake_length == 0 {
            return Err(GameError::config("initial_snake_length must be at least 1"));
        }

        let spawn = self.spawn;
        if spawn.x < 0
            || spawn.x >= self.width
            || spawn.y < 0
            || spawn.y >= self.height
            || spawn.x % self.cell_size != 0
            || spawn.y % self.cell_size != 0
        {
            return Err(GameError::config(format!(
                "spawn ({}, {}) is not a cell of the grid",
                spawn.x, spawn.y
            )));
        }

        if u32::try_from(self.cell_count()).is_err() {
            return Err(GameError::config(format!(
                "grid of {} cells is too large",
                self.cell_count()
            )));
        }

        if self.max_score() < 2 {
            return Err(GameError::config("grid needs room for the snake and a goal"));
        }

        if self.stagnation_factor == 0 {
            return Err(GameError::config("stagnation_factor must be at least 1"));
        }

        Ok(())
    }
}
