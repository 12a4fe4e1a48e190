pub mod train;
pub mod visualize;

pub use train::{
    EpisodeSummary, StopReason, StopSignal, TickOutcome, TrainConfig, TrainMode, TrainingReport,
};
pub use visualize::VisualizeMode;
