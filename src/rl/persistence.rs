//! Model persistence for saving and loading trained Q-networks
//!
//! A checkpoint is two files:
//! - `<path>.mpk` - Network weights (Burn named MessagePack record)
//! - `<path>.meta.json` - Metadata as JSON

use super::approximator::CheckpointInfo;
use super::config::DqnConfig;
use super::network::{LinearQNet, LinearQNetConfig};
use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Metadata saved with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Hyperparameters used during training
    pub dqn_config: DqnConfig,

    /// Number of episodes completed
    pub episodes_trained: u32,

    /// Best score reached when the checkpoint was written
    pub best_score: u32,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    pub fn new(dqn_config: DqnConfig, info: &CheckpointInfo) -> Self {
        Self {
            dqn_config,
            episodes_trained: info.episodes,
            best_score: info.best_score,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn checkpoint_info(&self) -> CheckpointInfo {
        CheckpointInfo {
            episodes: self.episodes_trained,
            best_score: self.best_score,
        }
    }
}

/// Path of the metadata file belonging to a checkpoint
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Save a Q-network and its metadata
///
/// Creates parent directories if they don't exist.
///
/// # Arguments
///
/// * `network` - Network whose weights are written
/// * `config` - Hyperparameters stored in the metadata
/// * `info` - Training progress stored in the metadata
/// * `path` - Checkpoint path, without extension
pub fn save_model<B: Backend>(
    network: &LinearQNet<B>,
    config: &DqnConfig,
    info: &CheckpointInfo,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(network.clone().into_record(), path.to_path_buf())
        .context("Failed to save network weights")?;

    let metadata = ModelMetadata::new(config.clone(), info);
    let meta_path = metadata_path(path);
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Read the metadata of a checkpoint
pub fn load_metadata(path: &Path) -> Result<ModelMetadata> {
    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    serde_json::from_str(&meta_json).context("Failed to deserialize metadata")
}

/// Load a saved Q-network onto `device`
///
/// The hidden layer width is taken from the metadata, so any backend can
/// load weights written by any other.
pub fn load_network<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(LinearQNet<B>, ModelMetadata)> {
    let metadata = load_metadata(path)?;

    let network = LinearQNetConfig::new(metadata.dqn_config.hidden_size).init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;

    Ok((network.load_record(record), metadata))
}
