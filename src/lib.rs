//! Deep Snake - a snake game learned with deep Q-learning
//!
//! This library provides:
//! - Core game logic and reward shaping (game module)
//! - Observations, replay memory, exploration and the Q-network (rl module)
//! - TUI rendering and key handling (render, input modules)
//! - Training statistics (metrics module)
//! - Training and watch modes (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
