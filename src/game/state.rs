use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::action::{Action, Direction};

/// A cell on the game grid, in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move one cell in a direction
    pub fn moved_in_direction(&self, direction: Direction, cell_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx * cell_size, dy * cell_size)
    }

    /// Manhattan distance in pixels
    pub fn manhattan(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The four orthogonal neighbours one cell away
    pub fn neighbours(&self, cell_size: i32) -> [Position; 4] {
        [
            self.moved_by(cell_size, 0),
            self.moved_by(-cell_size, 0),
            self.moved_by(0, cell_size),
            self.moved_by(0, -cell_size),
        ]
    }
}

/// The snake in the game
///
/// Segments are kept head-first in a deque, mirrored by an occupancy count per
/// cell so membership checks do not scan the body. Counts rather than a set,
/// because a freshly reset snake has all of its segments stacked on one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
    occupancy: HashMap<Position, u32>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Build a snake from explicit segments, head first
    ///
    /// Returns `None` when `segments` is empty.
    pub fn from_segments(
        segments: impl IntoIterator<Item = Position>,
        direction: Direction,
    ) -> Option<Self> {
        let snake = Self::build(segments, direction);
        (!snake.body.is_empty()).then_some(snake)
    }

    fn build(segments: impl IntoIterator<Item = Position>, direction: Direction) -> Self {
        let mut snake = Self {
            body: VecDeque::new(),
            occupancy: HashMap::new(),
            direction,
        };
        for pos in segments {
            snake.push_tail(pos);
        }
        snake
    }

    /// Create a straight snake with the head at `head`, body trailing behind it
    pub fn new(head: Position, direction: Direction, length: usize, cell_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        let segments = (0..length.max(1) as i32)
            .map(|i| head.moved_by(-dx * cell_size * i, -dy * cell_size * i));
        Self::build(segments, direction)
    }

    /// Create a snake with every segment stacked on `head`
    ///
    /// This is the reset layout; it unrolls over the first `length - 1` moves.
    pub fn coiled(head: Position, direction: Direction, length: usize) -> Self {
        Self::build(std::iter::repeat_n(head, length.max(1)), direction)
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Iterate over segments, head first
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }

    /// Get the segment at `index`, head is 0
    pub fn segment(&self, index: usize) -> Option<Position> {
        self.body.get(index).copied()
    }

    /// Whether any segment occupies `pos`
    pub fn contains(&self, pos: Position) -> bool {
        self.occupancy.contains_key(&pos)
    }

    /// Whether `pos` is occupied by a segment at index `skip` or later
    pub fn occupies_beyond(&self, pos: Position, skip: usize) -> bool {
        let total = self.occupancy.get(&pos).copied().unwrap_or(0);
        let leading = self.body.iter().take(skip).filter(|&&p| p == pos).count() as u32;
        total > leading
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.occupies_beyond(pos, 1)
    }

    /// Number of distinct cells covered by the snake
    pub fn covered_cells(&self) -> usize {
        self.occupancy.len()
    }

    /// Apply a relative turn to the heading
    pub fn turn(&mut self, action: Action) {
        self.direction = self.direction.apply(action);
    }

    /// Insert a new head segment
    pub fn push_head(&mut self, pos: Position) {
        self.body.push_front(pos);
        *self.occupancy.entry(pos).or_insert(0) += 1;
    }

    fn push_tail(&mut self, pos: Position) {
        self.body.push_back(pos);
        *self.occupancy.entry(pos).or_insert(0) += 1;
    }

    /// Remove the tail segment, never removing the last remaining segment
    pub fn pop_tail(&mut self) -> Option<Position> {
        if self.body.len() <= 1 {
            return None;
        }
        let tail = self.body.pop_back()?;
        if let Some(count) = self.occupancy.get_mut(&tail) {
            *count -= 1;
            if *count == 0 {
                self.occupancy.remove(&tail);
            }
        }
        Some(tail)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Why an episode terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake went too long without reaching the goal
    Stagnation,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
    pub score: u32,
    /// Ticks since the last reset
    pub frame_iteration: u32,
    /// Reset counter of the engine that produced this state
    pub generation: u64,
    pub is_alive: bool,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, food: Position, width: i32, height: i32, cell_size: i32) -> Self {
        Self {
            snake,
            food,
            width,
            height,
            cell_size,
            score: 0,
            frame_iteration: 0,
            generation: 0,
            is_alive: true,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.contains(pos)
    }

    /// Number of columns in the grid
    pub fn columns(&self) -> i32 {
        self.width / self.cell_size
    }

    /// Number of rows in the grid
    pub fn rows(&self) -> i32 {
        self.height / self.cell_size
    }
}
