//! Replay memory for off-policy Q-learning
//!
//! A bounded FIFO of transitions. Once full, every push evicts the oldest
//! entry. Batches are drawn uniformly without replacement.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::index;

use super::observation::Observation;
use crate::game::Action;

/// One recorded interaction with the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Observation,
    pub action: Action,
    pub reward: f32,
    pub next_state: Observation,
    pub done: bool,
}

impl Transition {
    pub fn new(
        state: Observation,
        action: Action,
        reward: f32,
        next_state: Observation,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}

/// Bounded ring buffer of transitions
///
/// # Example
///
/// ```rust
/// use deep_snake::game::Action;
/// use deep_snake::rl::{ReplayMemory, Transition, OBSERVATION_SIZE};
///
/// let mut memory = ReplayMemory::new(2);
/// let obs = [0.0; OBSERVATION_SIZE];
/// for reward in [1.0, 2.0, 3.0] {
///     memory.push(Transition::new(obs, Action::Straight, reward, obs, false));
/// }
///
/// assert_eq!(memory.len(), 2);
/// assert_eq!(memory.iter().next().unwrap().reward, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Create an empty memory holding at most `capacity` transitions
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity.min(1 << 16)),
            capacity,
        }
    }

    /// Append a transition, evicting the oldest one when full
    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw up to `batch_size` distinct transitions
    ///
    /// Returns every stored transition when there are no more than
    /// `batch_size` of them; otherwise a uniform sample without replacement.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition> {
        if self.buffer.len() <= batch_size {
            return self.buffer.iter().collect();
        }

        index::sample(rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    /// Number of stored transitions
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the memory is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Maximum number of stored transitions
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::OBSERVATION_SIZE;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn transition(tag: usize) -> Transition {
        let mut state = [0.0; OBSERVATION_SIZE];
        state[0] = tag as f32;
        Transition::new(state, Action::Straight, tag as f32, state, false)
    }

    fn tag(t: &Transition) -> usize {
        t.state[0] as usize
    }

    #[test]
    fn test_push_and_len() {
        let mut memory = ReplayMemory::new(10);
        assert!(memory.is_empty());

        memory.push(transition(0));
        memory.push(transition(1));

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.capacity(), 10);
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let capacity = 5;
        let extra = 3;
        let mut memory = ReplayMemory::new(capacity);

        for i in 0..capacity + extra {
            memory.push(transition(i));
        }

        assert_eq!(memory.len(), capacity);
        let tags: Vec<usize> = memory.iter().map(tag).collect();
        assert_eq!(tags, vec![3, 4, 5, 6, 7]);
        for i in 0..extra {
            assert!(!tags.contains(&i));
        }
    }

    #[test]
    fn test_sample_underflow_returns_everything() {
        let mut memory = ReplayMemory::new(100);
        for i in 0..7 {
            memory.push(transition(i));
        }

        let mut rng = StdRng::seed_from_u64(1);
        let batch = memory.sample(2000, &mut rng);

        assert_eq!(batch.len(), 7);
        let tags: HashSet<usize> = batch.iter().map(|t| tag(t)).collect();
        assert_eq!(tags.len(), 7);
    }

    #[test]
    fn test_sample_is_distinct_and_sized() {
        let mut memory = ReplayMemory::new(1000);
        for i in 0..500 {
            memory.push(transition(i));
        }

        let mut rng = StdRng::seed_from_u64(42);
        let batch = memory.sample(64, &mut rng);

        assert_eq!(batch.len(), 64);
        let tags: HashSet<usize> = batch.iter().map(|t| tag(t)).collect();
        assert_eq!(tags.len(), 64);
        // Sampling does not consume transitions
        assert_eq!(memory.len(), 500);
    }

    #[test]
    fn test_sample_empty_memory() {
        let memory = ReplayMemory::new(10);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(memory.sample(5, &mut rng).is_empty());
    }
}
