//! Epsilon-greedy action selection with a linear, floored decay

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::approximator::{ValueApproximator, greedy_action};
use super::observation::Observation;
use crate::game::{ACTION_COUNT, Action};

/// Exploration schedule keyed on the number of finished episodes
///
/// A uniform draw from `[0, range)` below the threshold means "explore".
/// The threshold starts at `start` and drops by one per episode until it
/// reaches `floor`, where it stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    pub start: u32,
    pub floor: u32,
    pub range: u32,
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self {
            start: 150,
            floor: 5,
            range: 200,
        }
    }
}

impl ExplorationSchedule {
    /// Threshold after `episodes` finished episodes
    pub fn threshold(&self, episodes: u32) -> u32 {
        self.start.saturating_sub(episodes).max(self.floor)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.range == 0 {
            return Err("exploration range must be at least 1".to_string());
        }

        if self.floor > self.start {
            return Err(format!(
                "exploration floor ({}) cannot exceed start ({})",
                self.floor, self.start
            ));
        }

        Ok(())
    }
}

/// A chosen action and how it was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    /// True when the action was drawn at random
    pub explored: bool,
}

/// Epsilon-greedy policy over an approximator's action values
pub struct EpsilonGreedy {
    schedule: ExplorationSchedule,
    rng: StdRng,
}

impl EpsilonGreedy {
    pub fn new(schedule: ExplorationSchedule) -> Self {
        Self {
            schedule,
            rng: StdRng::from_entropy(),
        }
    }

    /// Policy with a reproducible random stream
    pub fn with_seed(schedule: ExplorationSchedule, seed: u64) -> Self {
        Self {
            schedule,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn schedule(&self) -> &ExplorationSchedule {
        &self.schedule
    }

    /// Current exploration threshold
    pub fn explore_threshold(&self, episodes: u32) -> u32 {
        self.schedule.threshold(episodes)
    }

    /// Choose an action for `state`
    ///
    /// The approximator is only queried on the greedy branch.
    pub fn choose<A: ValueApproximator + ?Sized>(
        &mut self,
        state: &Observation,
        episodes: u32,
        approximator: &A,
    ) -> Result<Decision> {
        let roll = self.rng.gen_range(0..self.schedule.range);

        if roll < self.explore_threshold(episodes) {
            let action = Action::ALL[self.rng.gen_range(0..ACTION_COUNT)];
            return Ok(Decision {
                action,
                explored: true,
            });
        }

        let values = approximator.predict(state)?;
        Ok(Decision {
            action: greedy_action(&values),
            explored: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{CheckpointInfo, OBSERVATION_SIZE, Transition};
    use std::cell::Cell;
    use std::path::Path;

    struct FixedValues {
        values: [f32; ACTION_COUNT],
        queries: Cell<usize>,
    }

    impl ValueApproximator for FixedValues {
        fn predict(&self, _state: &Observation) -> Result<[f32; ACTION_COUNT]> {
            self.queries.set(self.queries.get() + 1);
            Ok(self.values)
        }

        fn train_step(&mut self, _batch: &[&Transition]) -> Result<f32> {
            Ok(0.0)
        }

        fn save(&self, _path: &Path, _info: &CheckpointInfo) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_threshold_decays_linearly() {
        let schedule = ExplorationSchedule::default();
        assert_eq!(schedule.threshold(0), 150);
        assert_eq!(schedule.threshold(1), 149);
        assert_eq!(schedule.threshold(100), 50);
        assert_eq!(schedule.threshold(144), 6);
    }

    #[test]
    fn test_threshold_floor() {
        let schedule = ExplorationSchedule::default();
        for episodes in [145, 146, 150, 151, 1_000, u32::MAX] {
            assert_eq!(schedule.threshold(episodes), 5);
        }
    }

    #[test]
    fn test_schedule_validation() {
        assert!(ExplorationSchedule::default().validate().is_ok());

        let bad_floor = ExplorationSchedule {
            floor: 200,
            ..Default::default()
        };
        assert!(bad_floor.validate().is_err());

        let greedy = ExplorationSchedule {
            start: 0,
            floor: 0,
            range: 200,
        };
        assert!(greedy.validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_never_explores() {
        let schedule = ExplorationSchedule {
            start: 0,
            floor: 0,
            range: 200,
        };
        let mut policy = EpsilonGreedy::with_seed(schedule, 5);
        let approx = FixedValues {
            values: [0.0, 1.0, 0.0],
            queries: Cell::new(0),
        };
        let state = [0.0; OBSERVATION_SIZE];

        for _ in 0..200 {
            let decision = policy.choose(&state, 0, &approx).unwrap();
            assert_eq!(decision.action, Action::TurnRight);
            assert!(!decision.explored);
        }
    }

    #[test]
    fn test_always_explores_when_threshold_covers_range() {
        let schedule = ExplorationSchedule {
            start: 200,
            floor: 200,
            range: 200,
        };
        let mut policy = EpsilonGreedy::with_seed(schedule, 9);
        let approx = FixedValues {
            values: [0.0, 1.0, 0.0],
            queries: Cell::new(0),
        };
        let state = [0.0; OBSERVATION_SIZE];

        for _ in 0..100 {
            let decision = policy.choose(&state, 0, &approx).unwrap();
            assert!(decision.explored);
        }
        assert_eq!(approx.queries.get(), 0);
    }

    #[test]
    fn test_mostly_greedy_after_decay() {
        let mut policy = EpsilonGreedy::with_seed(ExplorationSchedule::default(), 3);
        let approx = FixedValues {
            values: [0.0, 0.0, 2.0],
            queries: Cell::new(0),
        };
        let state = [0.0; OBSERVATION_SIZE];

        let mut greedy = 0;
        for _ in 0..1000 {
            let decision = policy.choose(&state, 500, &approx).unwrap();
            if !decision.explored {
                assert_eq!(decision.action, Action::TurnLeft);
                greedy += 1;
            }
        }

        // 5 in 200 explore: expect about 975 greedy picks
        assert!(greedy > 930, "greedy picks: {greedy}");
        assert_eq!(approx.queries.get(), greedy);
    }
}
