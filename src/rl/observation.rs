//! Ray-cast feature encoding of the game state
//!
//! Eight rays leave the head (N, NE, E, SE, S, SW, W, NW). Each contributes
//! three inverse distances measured in cells: to the wall, to the first body
//! segment, and to the goal (0 when the ray never meets one). Four one-hot
//! heading flags (left, right, up, down) close the vector.

use crate::game::{Direction, GameState, Position};

/// Number of rays cast from the head
pub const RAY_COUNT: usize = 8;

/// Length of the feature vector fed to the network
pub const OBSERVATION_SIZE: usize = RAY_COUNT * 3 + 4;

/// Feature vector for one game state
pub type Observation = [f32; OBSERVATION_SIZE];

/// Ray directions as unit cell steps, in feature order
const RAYS: [(i32, i32); RAY_COUNT] = [
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
];

/// Create the 28-value observation for a game state
///
/// The encoding only reads the state, so equal states produce bit-identical
/// vectors.
pub fn create_observation(state: &GameState) -> Observation {
    let mut observation = [0.0; OBSERVATION_SIZE];

    for (ray, &(dx, dy)) in RAYS.iter().enumerate() {
        let [wall, body, food] = cast_ray(state, dx * state.cell_size, dy * state.cell_size);
        observation[ray * 3] = wall;
        observation[ray * 3 + 1] = body;
        observation[ray * 3 + 2] = food;
    }

    let heading = state.snake.direction;
    let flags = [
        heading == Direction::Left,
        heading == Direction::Right,
        heading == Direction::Up,
        heading == Direction::Down,
    ];
    for (slot, flag) in observation[RAY_COUNT * 3..].iter_mut().zip(flags) {
        *slot = if flag { 1.0 } else { 0.0 };
    }

    observation
}

/// Walk from the head until the ray leaves the grid
///
/// Returns `[wall, body, food]` inverse step counts.
fn cast_ray(state: &GameState, dx: i32, dy: i32) -> [f32; 3] {
    let mut pos: Position = state.snake.head();
    let mut steps = 0u32;
    let mut body = None;
    let mut food = None;

    loop {
        pos = pos.moved_by(dx, dy);
        steps += 1;

        if !state.is_in_bounds(pos) {
            break;
        }

        if body.is_none() && state.snake.collides_with_body(pos) {
            body = Some(steps);
        }

        if food.is_none() && pos == state.food {
            food = Some(steps);
        }
    }

    let inverse = |found: Option<u32>| found.map_or(0.0, |n| 1.0 / n as f32);
    [1.0 / steps as f32, inverse(body), inverse(food)]
}
