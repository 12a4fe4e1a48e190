//! Training statistics tracking for deep Q-learning
//!
//! Rolling windows over episode rewards, lengths and scores, plus the losses
//! of the batched update run after every episode.

use std::collections::VecDeque;

/// Rolling averages and all-time totals of a training run
///
/// # Example
///
/// ```rust
/// use deep_snake::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// // Record an episode and the update that followed it
/// stats.record_episode(15.5, 150, 5);
/// stats.record_update(0.8);
///
/// assert_eq!(stats.best_score(), 5);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    rewards: Window,
    lengths: Window,
    scores: Window,
    /// Losses of the end-of-episode updates
    losses: Window,
    /// Sum of all scores, for the all-time mean
    score_sum: u64,
    best_score: u32,
    total_episodes: usize,
    /// Environment steps over all episodes
    total_steps: usize,
}

/// Fixed-size window of the most recent values
#[derive(Debug, Clone)]
struct Window {
    values: VecDeque<f32>,
    size: usize,
}

impl Window {
    fn new(size: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(size),
            size,
        }
    }

    fn push(&mut self, value: f32) {
        if self.values.len() == self.size {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }
}

impl TrainingStats {
    /// Create a tracker averaging over the last `window_size` values
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            rewards: Window::new(window_size),
            lengths: Window::new(window_size),
            scores: Window::new(window_size),
            losses: Window::new(window_size),
            score_sum: 0,
            best_score: 0,
            total_episodes: 0,
            total_steps: 0,
        }
    }

    /// Record a finished episode: total reward, steps taken and final score
    pub fn record_episode(&mut self, reward: f32, length: usize, score: u32) {
        self.rewards.push(reward);
        self.lengths.push(length as f32);
        self.scores.push(score as f32);
        self.score_sum += u64::from(score);
        self.best_score = self.best_score.max(score);
        self.total_episodes += 1;
        self.total_steps += length;
    }

    /// Record the loss of a batched update
    pub fn record_update(&mut self, loss: f32) {
        self.losses.push(loss);
    }

    pub fn mean_episode_reward(&self) -> f32 {
        self.rewards.mean()
    }

    pub fn mean_episode_length(&self) -> f32 {
        self.lengths.mean()
    }

    /// Mean score over the rolling window
    pub fn mean_episode_score(&self) -> f32 {
        self.scores.mean()
    }

    /// Mean score over every recorded episode
    pub fn overall_mean_score(&self) -> f32 {
        if self.total_episodes == 0 {
            0.0
        } else {
            self.score_sum as f32 / self.total_episodes as f32
        }
    }

    pub fn mean_loss(&self) -> f32 {
        self.losses.mean()
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.scores.size
    }

    /// One-line summary for the periodic progress log
    ///
    /// `Episodes: 1 | Steps: 150 | Reward: 15.50 | Score: 5.00 | Mean: 5.00 | Best: 5 | Len: 150.0 | Loss: 0.8000`
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} | Mean: {:.2} | Best: {} | Len: {:.1} | Loss: {:.4}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.overall_mean_score(),
            self.best_score,
            self.mean_episode_length(),
            self.mean_loss(),
        )
    }
}
