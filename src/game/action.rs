use serde::{Deserialize, Serialize};

use super::error::GameError;

/// Number of actions available to the agent
pub const ACTION_COUNT: usize = 3;

/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Clockwise ordering used for relative turns
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    fn clockwise_index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Direction after a quarter turn clockwise
    pub fn turned_right(self) -> Self {
        Self::CLOCKWISE[(self.clockwise_index() + 1) % 4]
    }

    /// Direction after a quarter turn counter-clockwise
    pub fn turned_left(self) -> Self {
        Self::CLOCKWISE[(self.clockwise_index() + 3) % 4]
    }

    /// Direction after applying a relative action
    pub fn apply(self, action: Action) -> Self {
        match action {
            Action::Straight => self,
            Action::TurnRight => self.turned_right(),
            Action::TurnLeft => self.turned_left(),
        }
    }

    /// Returns the unit delta (dx, dy) for moving in this direction.
    /// Screen coordinates: y grows downwards.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Relative action taken by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Keep the current direction
    Straight,
    /// Turn clockwise
    TurnRight,
    /// Turn counter-clockwise
    TurnLeft,
}

impl Action {
    /// All actions in network output order
    pub const ALL: [Action; ACTION_COUNT] = [Action::Straight, Action::TurnRight, Action::TurnLeft];

    /// Position of this action in the network output
    pub fn index(self) -> usize {
        match self {
            Action::Straight => 0,
            Action::TurnRight => 1,
            Action::TurnLeft => 2,
        }
    }

    /// Convert a discrete action index into an action
    pub fn from_index(idx: usize) -> Result<Self, GameError> {
        Self::ALL
            .get(idx)
            .copied()
            .ok_or_else(|| GameError::InvalidAction(format!("index {idx}")))
    }

    /// One-hot encoding over `[straight, turn-right, turn-left]`
    pub fn one_hot(self) -> [f32; ACTION_COUNT] {
        let mut encoded = [0.0; ACTION_COUNT];
        encoded[self.index()] = 1.0;
        encoded
    }

    /// Decode a one-hot vector, rejecting anything that is not exactly one of
    /// the three legal encodings.
    pub fn from_one_hot(encoded: &[f32]) -> Result<Self, GameError> {
        let invalid = || GameError::InvalidAction(format!("{encoded:?}"));

        if encoded.len() != ACTION_COUNT {
            return Err(invalid());
        }

        let mut hot = None;
        for (idx, &value) in encoded.iter().enumerate() {
            if value == 1.0 {
                if hot.is_some() {
                    return Err(invalid());
                }
                hot = Some(idx);
            } else if value != 0.0 {
                return Err(invalid());
            }
        }

        hot.map(|idx| Self::ALL[idx]).ok_or_else(invalid)
    }
}
