use std::path::Path;

use deep_snake::game::GameConfig;
use deep_snake::modes::{StopReason, StopSignal, TrainConfig, TrainMode};
use deep_snake::rl::{
    CheckpointInfo, DqnConfig, QTrainer, TrainingBackend, ValueApproximator, default_device,
    load_metadata,
};
use tempfile::TempDir;

fn small_config(save_path: &Path, episodes: u32) -> TrainConfig {
    let mut config = TrainConfig::new(save_path.to_path_buf());
    config.max_episodes = Some(episodes);
    config.seed = Some(11);
    config.game_config = GameConfig::small();
    config.dqn_config = DqnConfig {
        hidden_size: 32,
        batch_size: 64,
        memory_capacity: 1_000,
        ..Default::default()
    };
    config
}

fn trainer(config: &TrainConfig) -> QTrainer<TrainingBackend> {
    QTrainer::new(config.dqn_config.clone(), default_device()).unwrap()
}

#[test]
fn trains_for_the_requested_number_of_episodes() {
    let dir = TempDir::new().unwrap();
    let save_path = dir.path().join("snake_dqn");
    let config = small_config(&save_path, 3);
    let approximator = trainer(&config);

    let mut mode = TrainMode::new(config, approximator).unwrap();
    let report = mode.run(None, &StopSignal::new()).unwrap();

    assert_eq!(report.stop_reason, StopReason::EpisodeLimit);
    assert_eq!(report.episodes, 3);
    assert_eq!(mode.stats().total_episodes(), 3);

    // One update per tick plus one replay update per episode
    let ticks = mode.stats().total_steps();
    assert_eq!(mode.memory().len(), ticks.min(1_000));
    assert_eq!(mode.approximator().updates(), ticks + 3);
    assert!(mode.stats().mean_loss().is_finite());

    if report.best_score > 0 {
        let metadata = load_metadata(&save_path).unwrap();
        assert_eq!(metadata.best_score, report.best_score);
        assert_eq!(metadata.dqn_config.hidden_size, 32);
    } else {
        assert!(load_metadata(&save_path).is_err());
    }
}

#[test]
fn resumed_training_continues_from_the_checkpoint() {
    let dir = TempDir::new().unwrap();
    let save_path = dir.path().join("snake_dqn");
    let config = small_config(&save_path, 45);

    let progress = CheckpointInfo {
        episodes: 40,
        best_score: 4,
    };
    trainer(&config).save(&save_path, &progress).unwrap();

    let (resumed, restored) =
        QTrainer::<TrainingBackend>::from_checkpoint(&save_path, default_device()).unwrap();
    assert_eq!(restored, progress);
    assert_eq!(resumed.config().hidden_size, 32);

    let mut mode = TrainMode::resume(config, resumed, restored).unwrap();
    assert_eq!(mode.hud().explore_threshold, Some(110));

    let report = mode.run(None, &StopSignal::new()).unwrap();

    assert_eq!(report.stop_reason, StopReason::EpisodeLimit);
    assert_eq!(report.episodes, 45);
    assert_eq!(mode.stats().total_episodes(), 5);
    assert!(report.best_score >= 4);
}

#[test]
fn stop_signal_ends_training_before_the_first_tick() {
    let dir = TempDir::new().unwrap();
    let config = small_config(&dir.path().join("snake_dqn"), 10);
    let approximator = trainer(&config);

    let stop = StopSignal::new();
    stop.request();

    let mut mode = TrainMode::new(config, approximator).unwrap();
    let report = mode.run(None, &stop).unwrap();

    assert_eq!(report.stop_reason, StopReason::StopRequested);
    assert_eq!(report.episodes, 0);
    assert_eq!(mode.approximator().updates(), 0);
}
