//! Training mode for the deep Q-learning agent
//!
//! Every tick observes the state, picks an action epsilon-greedily, steps the
//! environment, trains on that single transition and stores it in replay
//! memory. When an episode ends the approximator gets one batched update on a
//! sample of the memory, a new best score is checkpointed, and the
//! environment is reset.
//!
//! # Example
//!
//! ```rust,no_run
//! use deep_snake::modes::{StopSignal, TrainConfig, TrainMode};
//! use deep_snake::rl::{QTrainer, TrainingBackend, default_device};
//! use std::path::PathBuf;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut config = TrainConfig::new(PathBuf::from("models/snake_dqn"));
//! config.max_episodes = Some(500);
//!
//! let trainer = QTrainer::<TrainingBackend>::new(config.dqn_config.clone(), default_device())?;
//! let mut train_mode = TrainMode::new(config, trainer)?;
//! let report = train_mode.run(None, &StopSignal::new())?;
//! println!("best score: {}", report.best_score);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::game::{Action, GameConfig, GameError};
use crate::metrics::TrainingStats;
use crate::render::{FrameSink, Hud};
use crate::rl::{
    CheckpointInfo, DqnConfig, EpsilonGreedy, Observation, ReplayMemory, SnakeEnvironment,
    Transition, ValueApproximator,
};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Stop after this many episodes in total; run until stopped when absent
    pub max_episodes: Option<u32>,

    /// Checkpoint path, written whenever the best score improves
    pub save_path: PathBuf,

    /// Seed for goal placement, exploration and replay sampling
    pub seed: Option<u64>,

    /// Log a statistics summary every N episodes
    pub log_frequency: u32,

    /// Game configuration (geometry, rewards)
    pub game_config: GameConfig,

    /// Q-learning hyperparameters
    pub dqn_config: DqnConfig,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    ///
    /// # Example
    ///
    /// ```rust
    /// use deep_snake::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(PathBuf::from("models/snake_dqn"));
    /// assert!(config.max_episodes.is_none());
    /// ```
    pub fn new(save_path: PathBuf) -> Self {
        Self {
            max_episodes: None,
            save_path,
            seed: None,
            log_frequency: 100,
            game_config: GameConfig::default(),
            dqn_config: DqnConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.game_config.validate()?;
        self.dqn_config
            .validate()
            .map_err(|err| anyhow!("invalid DQN configuration: {err}"))?;
        if self.log_frequency == 0 {
            return Err(anyhow!("log_frequency must be at least 1"));
        }
        Ok(())
    }
}

/// Cooperative stop flag shared with the Ctrl-C watcher and the terminal view
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Figures for a finished episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub episode: u32,
    pub score: u32,
    pub best_score: u32,
    pub reward: f32,
    pub steps: usize,
    pub loss: f32,
    pub new_record: bool,
}

/// What a single tick produced
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The episode continues
    Running,
    /// The episode ended and the environment was reset
    EpisodeFinished(EpisodeSummary),
    /// The snake covers every cell, so no goal can be placed
    BoardFilled(EpisodeSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    StopRequested,
    EpisodeLimit,
    MaxScore,
    BoardFilled,
}

/// Summary returned when training stops
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub episodes: u32,
    pub best_score: u32,
    pub mean_score: f32,
    pub stop_reason: StopReason,
}

/// Training mode for the Q-learning agent
///
/// Generic over the value approximator so the loop can run against the burn
/// trainer or a scripted stand-in.
pub struct TrainMode<A: ValueApproximator> {
    config: TrainConfig,
    env: SnakeEnvironment,
    policy: EpsilonGreedy,
    memory: ReplayMemory,
    approximator: A,
    /// Randomness for replay sampling
    rng: StdRng,
    stats: TrainingStats,
    /// Episodes completed, including those of a resumed checkpoint
    episodes: u32,
    best_score: u32,
    observation: Observation,
    episode_reward: f32,
    episode_steps: usize,
}

impl<A: ValueApproximator> TrainMode<A> {
    /// Create a new training mode starting from episode zero
    pub fn new(config: TrainConfig, approximator: A) -> Result<Self> {
        Self::resume(config, approximator, CheckpointInfo::default())
    }

    /// Continue counting episodes and best score from a checkpoint
    pub fn resume(config: TrainConfig, approximator: A, progress: CheckpointInfo) -> Result<Self> {
        config.validate()?;

        let schedule = config.dqn_config.exploration;
        let (env, policy, rng) = match config.seed {
            Some(seed) => (
                SnakeEnvironment::with_seed(config.game_config.clone(), seed)?,
                EpsilonGreedy::with_seed(schedule, seed.wrapping_add(1)),
                StdRng::seed_from_u64(seed.wrapping_add(2)),
            ),
            None => (
                SnakeEnvironment::new(config.game_config.clone())?,
                EpsilonGreedy::new(schedule),
                StdRng::from_entropy(),
            ),
        };

        let observation = env.observation();
        let memory = ReplayMemory::new(config.dqn_config.memory_capacity);

        Ok(Self {
            config,
            env,
            policy,
            memory,
            approximator,
            rng,
            stats: TrainingStats::new(100),
            episodes: progress.episodes,
            best_score: progress.best_score,
            observation,
            episode_reward: 0.0,
            episode_steps: 0,
        })
    }

    /// Run until stopped, the episode limit is reached, or the game is won
    ///
    /// Frames go to `sink` after every tick. A sink that fails is dropped
    /// with a warning and training continues headless.
    pub fn run(
        &mut self,
        mut sink: Option<&mut dyn FrameSink>,
        stop: &StopSignal,
    ) -> Result<TrainingReport> {
        let max_score = self.config.game_config.max_score();
        info!(
            width = self.config.game_config.width,
            height = self.config.game_config.height,
            cell_size = self.config.game_config.cell_size,
            learning_rate = self.config.dqn_config.learning_rate,
            gamma = self.config.dqn_config.gamma,
            batch_size = self.config.dqn_config.batch_size,
            memory_capacity = self.config.dqn_config.memory_capacity,
            max_episodes = ?self.config.max_episodes,
            save_path = ?self.config.save_path,
            "training started"
        );

        let stop_reason = loop {
            if stop.is_requested() {
                break StopReason::StopRequested;
            }
            if self
                .config
                .max_episodes
                .is_some_and(|limit| self.episodes >= limit)
            {
                break StopReason::EpisodeLimit;
            }

            let outcome = self.tick()?;

            if let Some(view) = sink.as_deref_mut() {
                if let Err(err) = view.draw(self.env.state(), &self.hud()) {
                    warn!(error = %err, "rendering failed, continuing headless");
                    view.close();
                    sink = None;
                }
            }

            match outcome {
                TickOutcome::Running => {}
                TickOutcome::EpisodeFinished(summary) => {
                    if summary.score >= max_score {
                        break StopReason::MaxScore;
                    }
                }
                TickOutcome::BoardFilled(_) => break StopReason::BoardFilled,
            }
        };

        let report = TrainingReport {
            episodes: self.episodes,
            best_score: self.best_score,
            mean_score: self.stats.overall_mean_score(),
            stop_reason,
        };
        info!(
            episodes = report.episodes,
            best_score = report.best_score,
            reason = ?report.stop_reason,
            summary = %self.stats.format_summary(),
            "training stopped"
        );
        Ok(report)
    }

    /// Advance the game by one step and learn from it
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let state = self.observation;
        let decision = self
            .policy
            .choose(&state, self.episodes, &self.approximator)?;

        let result = match self.env.step(decision.action) {
            Ok(result) => result,
            Err(GameError::GoalPlacementExhausted { cells }) => {
                // The winning move: the snake now covers every cell.
                info!(cells, "snake covers the whole board");
                let reward = self.config.game_config.food_reward;
                self.learn(state, decision.action, reward, true)?;
                let score = self.env.state().score;
                let summary = self.close_episode(score)?;
                return Ok(TickOutcome::BoardFilled(summary));
            }
            Err(err) => return Err(err.into()),
        };

        self.learn(state, decision.action, result.reward, result.terminated)?;

        if !result.terminated {
            return Ok(TickOutcome::Running);
        }

        let summary = self.close_episode(result.score)?;
        self.observation = self.env.reset()?;
        Ok(TickOutcome::EpisodeFinished(summary))
    }

    /// Train on the transition just taken and append it to replay memory
    fn learn(
        &mut self,
        state: Observation,
        action: Action,
        reward: f32,
        done: bool,
    ) -> Result<()> {
        let next_state = self.env.observation();
        let transition = Transition::new(state, action, reward, next_state, done);
        self.approximator.train_step(&[&transition])?;
        self.memory.push(transition);

        self.episode_reward += reward;
        self.episode_steps += 1;
        self.observation = next_state;
        Ok(())
    }

    /// Count the episode, replay a batch, and checkpoint a new record
    fn close_episode(&mut self, score: u32) -> Result<EpisodeSummary> {
        self.episodes += 1;

        let batch = self
            .memory
            .sample(self.config.dqn_config.batch_size, &mut self.rng);
        let loss = self.approximator.train_step(&batch)?;

        self.stats
            .record_episode(self.episode_reward, self.episode_steps, score);
        self.stats.record_update(loss);

        let new_record = score > self.best_score;
        if new_record {
            self.best_score = score;
            let info = CheckpointInfo {
                episodes: self.episodes,
                best_score: self.best_score,
            };
            self.approximator
                .save(&self.config.save_path, &info)
                .with_context(|| {
                    format!("Failed to save checkpoint to {:?}", self.config.save_path)
                })?;
            info!(path = ?self.config.save_path, best_score = self.best_score, "checkpoint saved");
        }

        let summary = EpisodeSummary {
            episode: self.episodes,
            score,
            best_score: self.best_score,
            reward: self.episode_reward,
            steps: self.episode_steps,
            loss,
            new_record,
        };
        info!(
            episode = summary.episode,
            score = summary.score,
            best_score = summary.best_score,
            steps = summary.steps,
            reward = summary.reward,
            loss = summary.loss,
            "episode finished"
        );
        if self.episodes % self.config.log_frequency == 0 {
            info!(summary = %self.stats.format_summary(), "training progress");
        }

        self.episode_reward = 0.0;
        self.episode_steps = 0;
        Ok(summary)
    }

    /// Header figures for the current frame
    pub fn hud(&self) -> Hud {
        Hud {
            title: "Training",
            episode: self.episodes,
            best_score: self.best_score,
            mean_score: self.stats.overall_mean_score(),
            explore_threshold: Some(self.policy.explore_threshold(self.episodes)),
            status: None,
        }
    }

    pub fn episodes(&self) -> u32 {
        self.episodes
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn environment(&self) -> &SnakeEnvironment {
        &self.env
    }

    /// Mutable access to the environment, for setting up scenarios
    pub fn environment_mut(&mut self) -> &mut SnakeEnvironment {
        &mut self.env
    }

    pub fn approximator(&self) -> &A {
        &self.approximator
    }
}
