use std::collections::HashSet;

use deep_snake::game::{Action, Direction, GameConfig, Position, Snake};
use deep_snake::rl::{
    ExplorationSchedule, OBSERVATION_SIZE, ReplayMemory, SnakeEnvironment, Transition,
    create_observation,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CELL: i32 = 25;

/// Replace the stacked start with a straight three-cell snake in the middle
fn unrolled_start(env: &mut SnakeEnvironment) {
    let state = env.state_mut();
    state.snake = Snake::new(Position::new(125, 125), Direction::Right, 3, CELL);
    state.food = Position::new(225, 0);
}

fn random_action(rng: &mut StdRng) -> Action {
    Action::ALL[rng.gen_range(0..Action::ALL.len())]
}

fn assert_body_integrity(snake: &Snake) {
    let segments: Vec<Position> = snake.segments().copied().collect();
    let distinct: HashSet<Position> = segments.iter().copied().collect();
    assert_eq!(distinct.len(), segments.len(), "duplicate cells in {segments:?}");

    for pair in segments.windows(2) {
        assert_eq!(pair[0].manhattan(pair[1]), CELL, "gap in {segments:?}");
    }
}

#[test]
fn body_stays_contiguous_under_random_play() {
    for seed in 0..4 {
        let mut env = SnakeEnvironment::with_seed(GameConfig::small(), seed).unwrap();
        let mut rng = StdRng::seed_from_u64(seed + 100);
        unrolled_start(&mut env);

        for _ in 0..3_000 {
            let result = env.step(random_action(&mut rng)).unwrap();
            if result.terminated {
                env.reset().unwrap();
                unrolled_start(&mut env);
                continue;
            }
            assert_body_integrity(&env.state().snake);
        }
    }
}

#[test]
fn rewards_stay_in_bounds_and_growth_law_holds() {
    let config = GameConfig::small();
    let shaping_low = config.retreat_penalty + 4.0 * config.adjacency_penalty;
    let shaping_high = config.approach_reward;

    let mut env = SnakeEnvironment::with_seed(config.clone(), 3).unwrap();
    let mut rng = StdRng::seed_from_u64(9);

    for _ in 0..5_000 {
        let length_before = env.state().snake.len();
        let score_before = env.state().score;

        let result = env.step(random_action(&mut rng)).unwrap();

        if result.terminated {
            assert_eq!(result.reward, config.death_penalty);
            assert_eq!(result.score, score_before);
            env.reset().unwrap();
            continue;
        }

        if result.info.ate_food {
            assert_eq!(result.reward, config.food_reward);
            assert_eq!(env.state().snake.len(), length_before + 1);
            assert_eq!(env.state().score, score_before + 1);
        } else {
            assert!(
                result.reward >= shaping_low - 1e-6 && result.reward <= shaping_high + 1e-6,
                "shaping reward out of range: {}",
                result.reward
            );
            assert_eq!(env.state().snake.len(), length_before);
            assert_eq!(env.state().score, score_before);
        }
    }
}

#[test]
fn stacked_start_does_not_collide_with_itself() {
    let config = GameConfig::default();
    assert_eq!((config.width, config.height, config.cell_size), (400, 400, 25));

    let mut env = SnakeEnvironment::with_seed(config, 21).unwrap();
    let start: Vec<Position> = env.state().snake.segments().copied().collect();
    assert_eq!(start, vec![Position::new(0, 0); 3]);
    assert_eq!(env.state().snake.direction, Direction::Down);

    env.state_mut().food = Position::new(375, 375);

    let first = env.step(Action::Straight).unwrap();
    assert!(!first.terminated);
    assert_eq!(env.state().snake.head(), Position::new(0, 25));

    let second = env.step(Action::Straight).unwrap();
    assert!(!second.terminated);
    assert_eq!(env.state().snake.head(), Position::new(0, 50));
    assert_eq!(env.state().snake.len(), 3);
    assert!(env.state().is_alive);
}

#[test]
fn goal_one_step_ahead_is_collected() {
    let config = GameConfig::default();
    let mut env = SnakeEnvironment::with_seed(config.clone(), 5).unwrap();
    unrolled_start(&mut env);

    let head = env.state().snake.head();
    let ahead = head.moved_in_direction(env.state().snake.direction, CELL);
    env.state_mut().food = ahead;
    let length_before = env.state().snake.len();

    let result = env.step(Action::Straight).unwrap();

    assert!(!result.terminated);
    assert_eq!(result.reward, 20.0);
    assert_eq!(result.score, 1);
    assert_eq!(env.state().snake.len(), length_before + 1);
    assert_eq!(env.state().snake.head(), ahead);
    assert!(!env.state().snake.contains(env.state().food));
}

#[test]
fn running_into_the_body_is_terminal() {
    let mut env = SnakeEnvironment::with_seed(GameConfig::small(), 8).unwrap();
    {
        let state = env.state_mut();
        // Hook shape: turning right twice brings the head back onto the body
        state.snake = Snake::from_segments(
            [
                Position::new(100, 100),
                Position::new(75, 100),
                Position::new(50, 100),
                Position::new(50, 125),
                Position::new(75, 125),
                Position::new(100, 125),
            ],
            Direction::Right,
        ).unwrap();
        state.food = Position::new(225, 225);
    }

    // Right turn from heading right faces down, onto (100, 125)
    let result = env.step(Action::TurnRight).unwrap();

    assert!(result.terminated);
    assert_eq!(result.reward, -20.0);
    assert!(!env.state().is_alive);
}

#[test]
fn encoding_identical_snapshots_is_bit_identical() {
    let mut first = SnakeEnvironment::with_seed(GameConfig::small(), 4).unwrap();
    let mut second = SnakeEnvironment::with_seed(GameConfig::small(), 4).unwrap();

    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..5 {
        let action = random_action(&mut rng);
        let a = first.step(action).unwrap();
        let b = second.step(action).unwrap();
        assert_eq!(a, b);
    }

    let left = create_observation(first.state());
    let right = create_observation(second.state());
    assert!(left.iter().zip(right.iter()).all(|(a, b)| a.to_bits() == b.to_bits()));
}

#[test]
fn exploration_settles_on_its_floor() {
    let schedule = ExplorationSchedule::default();

    assert_eq!(schedule.threshold(0), 150);
    assert_eq!(schedule.threshold(100), 50);
    for episodes in [145, 146, 200, 10_000, u32::MAX] {
        assert_eq!(schedule.threshold(episodes), 5);
    }
}

#[test]
fn replay_memory_keeps_the_newest_transitions() {
    let capacity = 100;
    let mut memory = ReplayMemory::new(capacity);
    let obs = [0.0; OBSERVATION_SIZE];

    for i in 0..(capacity + 37) {
        memory.push(Transition::new(obs, Action::Straight, i as f32, obs, false));
        assert!(memory.len() <= capacity);
    }

    let rewards: Vec<f32> = memory.iter().map(|t| t.reward).collect();
    let expected: Vec<f32> = (37..capacity + 37).map(|i| i as f32).collect();
    assert_eq!(rewards, expected);

    let mut rng = StdRng::seed_from_u64(2);
    let batch = memory.sample(1_000, &mut rng);
    assert_eq!(batch.len(), capacity);
}
