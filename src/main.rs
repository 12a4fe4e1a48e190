use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use deep_snake::game::GameConfig;
use deep_snake::modes::{StopSignal, TrainConfig, TrainMode, TrainingReport, VisualizeMode};
use deep_snake::render::{FrameSink, TerminalView};
use deep_snake::rl::{CheckpointInfo, InferenceBackend, QTrainer, TrainingBackend, default_device};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deep_snake")]
#[command(version, about = "Snake agent trained with deep Q-learning")]
struct Cli {
    /// Run mode
    #[arg(long, value_enum, default_value = "train")]
    mode: Mode,

    /// Board width in pixels
    #[arg(long, default_value = "400")]
    width: i32,

    /// Board height in pixels
    #[arg(long, default_value = "400")]
    height: i32,

    /// Cell size in pixels
    #[arg(long, default_value = "25")]
    cell_size: i32,

    /// Stop training after this many episodes
    #[arg(long)]
    episodes: Option<u32>,

    /// Checkpoint path (without extension)
    #[arg(long, default_value = "models/snake_dqn")]
    model_path: PathBuf,

    /// Continue training from the checkpoint at --model-path
    #[arg(long)]
    resume: bool,

    /// Show the board while training
    #[arg(long)]
    render: bool,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file; defaults to deep_snake.log while a terminal view is shown
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Train a new agent or resume one
    Train,
    /// Watch a trained agent play
    Watch,
}

fn init_tracing(log_file: Option<&Path>, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = match log_file {
        Some(path) => Some(path.to_path_buf()),
        None if tui => Some(PathBuf::from("deep_snake.log")),
        None => None,
    };

    match log_file {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
    }

    Ok(())
}

async fn train(cli: Cli, game_config: GameConfig) -> Result<TrainingReport> {
    let mut config = TrainConfig::new(cli.model_path.clone());
    config.max_episodes = cli.episodes;
    config.seed = cli.seed;
    config.game_config = game_config;

    let device = default_device();
    let (trainer, progress) = if cli.resume {
        let (trainer, progress) =
            QTrainer::<TrainingBackend>::from_checkpoint(&cli.model_path, device)
                .with_context(|| format!("Failed to resume from {:?}", cli.model_path))?;
        config.dqn_config = trainer.config().clone();
        info!(
            episodes = progress.episodes,
            best_score = progress.best_score,
            "resuming training"
        );
        (trainer, progress)
    } else {
        let trainer = QTrainer::<TrainingBackend>::new(config.dqn_config.clone(), device)?;
        (trainer, CheckpointInfo::default())
    };

    let stop = StopSignal::new();
    let watcher = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.request();
        }
    });

    let render = cli.render;
    tokio::task::spawn_blocking(move || {
        let mut mode = TrainMode::resume(config, trainer, progress)?;

        let mut view = if render {
            match TerminalView::new(stop.clone()) {
                Ok(view) => Some(view),
                Err(err) => {
                    warn!(error = %err, "terminal view unavailable, training headless");
                    None
                }
            }
        } else {
            None
        };

        mode.run(view.as_mut().map(|v| v as &mut dyn FrameSink), &stop)
    })
    .await
    .context("Training task failed")?
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let tui = cli.render || matches!(cli.mode, Mode::Watch);
    init_tracing(cli.log_file.as_deref(), tui)?;

    let game_config = GameConfig::new(cli.width, cli.height, cli.cell_size);
    game_config.validate()?;

    match cli.mode {
        Mode::Train => {
            let report = train(cli, game_config).await?;
            println!(
                "Training stopped ({:?}) after {} episodes. Record: {}, mean score: {:.2}",
                report.stop_reason, report.episodes, report.best_score, report.mean_score
            );
        }
        Mode::Watch => {
            let mut watch_mode = VisualizeMode::<InferenceBackend>::new(
                &cli.model_path,
                game_config,
                default_device(),
            )?;
            watch_mode.run().await?;
        }
    }

    Ok(())
}
