//! On-disk weight checkpoints.
//!
//! Files are named `{algorithm_tag}_{model_name}_{episode}.bin` so that
//! checkpoints of the single- and double-network learners never collide.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, RlError};

pub const CHECKPOINT_EXTENSION: &str = "bin";

pub fn file_name(algorithm_tag: &str, model_name: &str, episode: usize) -> String {
    format!("{}_{}_{}.{}", algorithm_tag, model_name, episode, CHECKPOINT_EXTENSION)
}

pub fn path_for(dir: &Path, algorithm_tag: &str, model_name: &str, episode: usize) -> PathBuf {
    dir.join(file_name(algorithm_tag, model_name, episode))
}

/// Serialize `weights` with bincode, creating parent directories as needed.
pub fn write_weights<W: Serialize>(path: &Path, weights: &W) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let bytes = bincode::serialize(weights)?;
    fs::write(path, bytes)?;
    debug!(path = %path.display(), "wrote checkpoint");
    Ok(())
}

/// Read weights written by [`write_weights`].
///
/// A missing file is [`RlError::CheckpointNotFound`]; undecodable contents
/// are [`RlError::CheckpointIncompatible`].
pub fn read_weights<W: DeserializeOwned>(path: &Path) -> Result<W> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(RlError::CheckpointNotFound { path: path.to_path_buf() });
        }
        Err(err) => return Err(err.into()),
    };
    let weights = bincode::deserialize(&bytes).map_err(|err| RlError::CheckpointIncompatible {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    debug!(path = %path.display(), "read checkpoint");
    Ok(weights)
}
