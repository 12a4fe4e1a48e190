use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    action::Action,
    config::GameConfig,
    error::GameError,
    state::{GameState, Position, Snake, Termination},
};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake reached the goal this step
    pub ate_food: bool,
    /// Why the episode ended, if it did
    pub termination: Option<Termination>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step (for RL training)
    pub reward: f32,
    /// Whether the game has terminated
    pub terminated: bool,
    /// Score after this step
    pub score: u32,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    fn terminal(reward: f32, score: u32, termination: Option<Termination>) -> Self {
        Self {
            reward,
            terminated: true,
            score,
            info: StepInfo {
                ate_food: false,
                termination,
            },
        }
    }
}

/// The game engine that handles all game logic
///
/// Goal placement is the only source of randomness; everything else is a pure
/// function of the state and the action.
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
    generation: u64,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose goal placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            generation: 0,
        })
    }

    /// The configuration this engine runs with
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of resets performed so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reset the game to initial state
    pub fn reset(&mut self) -> Result<GameState, GameError> {
        self.generation += 1;

        let snake = Snake::coiled(
            self.config.spawn,
            self.config.initial_direction,
            self.config.initial_snake_length,
        );
        let food = self.place_goal(&snake)?;

        let mut state = GameState::new(
            snake,
            food,
            self.config.width,
            self.config.height,
            self.config.cell_size,
        );
        state.generation = self.generation;
        Ok(state)
    }

    /// Execute one step of the game
    pub fn step(&mut self, state: &mut GameState, action: Action) -> Result<StepResult, GameError> {
        if !state.is_alive {
            return Ok(StepResult::terminal(0.0, state.score, None));
        }

        state.frame_iteration += 1;

        let old_head = state.snake.head();
        let old_dist = old_head.manhattan(state.food);

        state.snake.turn(action);
        let new_head = old_head.moved_in_direction(state.snake.direction, state.cell_size);

        // Checked against the body before the head is inserted, which is the
        // body excluding the new head afterwards.
        let collision = self.check_collision(state, new_head);
        state.snake.push_head(new_head);

        if let Some(termination) = collision {
            state.is_alive = false;
            return Ok(StepResult::terminal(
                self.config.death_penalty,
                state.score,
                Some(termination),
            ));
        }

        let limit = u64::from(self.config.stagnation_factor) * state.snake.len() as u64;
        if u64::from(state.frame_iteration) > limit {
            state.is_alive = false;
            return Ok(StepResult::terminal(
                self.config.death_penalty,
                state.score,
                Some(Termination::Stagnation),
            ));
        }

        let new_dist = new_head.manhattan(state.food);
        let mut reward = if new_dist < old_dist {
            self.config.approach_reward
        } else {
            self.config.retreat_penalty
        };

        let crowded = new_head
            .neighbours(state.cell_size)
            .into_iter()
            .filter(|&cell| state.snake.occupies_beyond(cell, self.config.adjacency_skip))
            .count();
        reward += self.config.adjacency_penalty * crowded as f32;

        let ate_food = new_head == state.food;
        if ate_food {
            state.score += 1;
            reward = self.config.food_reward;
            match self.place_goal(&state.snake) {
                Ok(food) => state.food = food,
                Err(err) => {
                    // Board is full: the episode cannot continue.
                    state.is_alive = false;
                    return Err(err);
                }
            }
        } else {
            state.snake.pop_tail();
        }

        Ok(StepResult {
            reward,
            terminated: false,
            score: state.score,
            info: StepInfo {
                ate_food,
                termination: None,
            },
        })
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<Termination> {
        if !state.is_in_bounds(pos) {
            return Some(Termination::Wall);
        }

        if state.snake.contains(pos) {
            return Some(Termination::SelfCollision);
        }

        None
    }

    /// Pick a goal cell uniformly among the cells the snake does not cover
    fn place_goal(&mut self, snake: &Snake) -> Result<Position, GameError> {
        let columns = self.config.columns();
        let rows = self.config.rows();
        let cell = self.config.cell_size;
        let cells = usize::try_from(self.config.cell_count()).unwrap_or(usize::MAX);

        if snake.covered_cells() >= cells {
            return Err(GameError::GoalPlacementExhausted { cells });
        }

        for _ in 0..self.config.max_placement_attempts {
            let x = self.rng.gen_range(0..columns) * cell;
            let y = self.rng.gen_range(0..rows) * cell;
            let pos = Position::new(x, y);

            if !snake.contains(pos) {
                return Ok(pos);
            }
        }

        // Dense grid: draw from the enumerated free cells instead.
        let free: Vec<Position> = (0..rows)
            .flat_map(|row| (0..columns).map(move |col| Position::new(col * cell, row * cell)))
            .filter(|&pos| !snake.contains(pos))
            .collect();

        if free.is_empty() {
            return Err(GameError::GoalPlacementExhausted { cells });
        }
        Ok(free[self.rng.gen_range(0..free.len())])
    }
}
