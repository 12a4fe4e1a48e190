//! Watch mode for trained agents
//!
//! Loads a saved Q-network and shows it playing greedily in the terminal.
//! Users can control playback speed, pause, and reset episodes.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Reset episode
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit
//!
//! # Example
//!
//! ```rust,ignore
//! use deep_snake::modes::VisualizeMode;
//! use deep_snake::game::GameConfig;
//! use deep_snake::rl::{default_device, InferenceBackend};
//! use std::path::Path;
//!
//! let mut watch = VisualizeMode::<InferenceBackend>::new(
//!     Path::new("models/snake_dqn"),
//!     GameConfig::default(),
//!     default_device(),
//! )?;
//! watch.run().await?;
//! ```

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use std::{path::Path, time::Duration};
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::info;

use crate::game::{GameConfig, GameError};
use crate::input::{InputHandler, KeyAction, VisualizationSpeed};
use crate::render::{Hud, Renderer, TerminalSession};
use crate::rl::{LinearQNet, ModelMetadata, SnakeEnvironment, greedy_action, load_network, q_values};

/// Watch mode for trained agents
pub struct VisualizeMode<B: Backend> {
    /// Trained Q-network
    network: LinearQNet<B>,

    device: B::Device,

    env: SnakeEnvironment,

    renderer: Renderer,

    input_handler: InputHandler,

    metadata: ModelMetadata,

    should_quit: bool,

    paused: bool,

    speed: VisualizationSpeed,

    /// Number of episodes completed
    episode_count: u32,

    best_score: u32,

    score_sum: u64,
}

impl<B: Backend> VisualizeMode<B> {
    /// Load a trained model and set up the environment
    ///
    /// # Arguments
    ///
    /// * `model_path` - Checkpoint path, without extension
    /// * `config` - Game configuration
    /// * `device` - Device for computation
    pub fn new(model_path: &Path, config: GameConfig, device: B::Device) -> Result<Self> {
        let (network, metadata) = load_network::<B>(model_path, &device)
            .with_context(|| format!("Failed to load model from {:?}", model_path))?;

        info!(
            path = ?model_path,
            episodes_trained = metadata.episodes_trained,
            best_score = metadata.best_score,
            version = %metadata.version,
            "loaded model"
        );

        let env = SnakeEnvironment::new(config)?;

        Ok(Self {
            network,
            device,
            env,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            metadata,
            should_quit: false,
            paused: false,
            speed: VisualizationSpeed::Normal,
            episode_count: 0,
            best_score: 0,
            score_sum: 0,
        })
    }

    /// Run until the user quits
    ///
    /// The terminal is restored on every exit path, errors included.
    pub async fn run(&mut self) -> Result<()> {
        let mut session = TerminalSession::enter().context("Failed to set up terminal")?;
        let result = self.event_loop(&mut session).await;
        session.restore().context("Failed to restore terminal")?;
        result
    }

    async fn event_loop(&mut self, session: &mut TerminalSession) -> Result<()> {
        let mut events = EventStream::new();
        let mut tick_timer = interval(self.speed.tick_interval());
        // ~30 FPS
        let mut frame_timer = interval(Duration::from_millis(33));
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !self.should_quit {
            tokio::select! {
                Some(Ok(event)) = events.next() => {
                    self.handle_event(event, &mut tick_timer)?;
                }
                _ = tick_timer.tick(), if !self.paused => {
                    if self.env.state().is_alive {
                        self.step_agent()?;
                    } else {
                        self.start_episode()?;
                    }
                }
                _ = frame_timer.tick() => {
                    session
                        .draw(&self.renderer, self.env.state(), &self.hud())
                        .context("Failed to draw frame")?;
                }
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }
        }

        Ok(())
    }

    /// Take the greedy action for the current state
    fn step_agent(&mut self) -> Result<()> {
        let values = q_values(&self.network, &self.env.observation(), &self.device)?;

        match self.env.step(greedy_action(&values)) {
            Ok(result) => {
                if result.terminated {
                    self.record_episode(result.score);
                }
                Ok(())
            }
            Err(GameError::GoalPlacementExhausted { .. }) => {
                self.record_episode(self.env.state().score);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn record_episode(&mut self, score: u32) {
        self.episode_count += 1;
        self.best_score = self.best_score.max(score);
        self.score_sum += u64::from(score);
    }

    fn start_episode(&mut self) -> Result<()> {
        self.env.reset()?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Quit => self.should_quit = true,
                KeyAction::TogglePause => self.paused = !self.paused,
                KeyAction::Reset => self.start_episode()?,
                KeyAction::Speed(speed) => self.change_speed(speed, tick_timer),
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn change_speed(&mut self, new_speed: VisualizationSpeed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        *tick_timer = interval(self.speed.tick_interval());
    }

    fn hud(&self) -> Hud {
        let mean_score = if self.episode_count == 0 {
            0.0
        } else {
            self.score_sum as f32 / self.episode_count as f32
        };
        let mut status = self.speed.label().to_string();
        if self.paused {
            status.push_str(" | PAUSED");
        }

        Hud {
            title: "Watch",
            episode: self.episode_count,
            best_score: self.best_score,
            mean_score,
            explore_threshold: None,
            status: Some(status),
        }
    }

    /// Metadata of the loaded model
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
