// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Named, versioned model checkpoints.
//!
//! A checkpoint is a JSON document holding the weights, vocabulary,
//! hyperparameters and loss history. Stores assign versions: each `put`
//! for a name gets the previous version + 1 and replaces it atomically,
//! so readers see either the old checkpoint or the new one.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::network::{Hyperparameters, Network};
use super::tokens::Vocabulary;
use crate::error::{ComposerError, Result};
use crate::storage::write_atomic;

/// Checkpoint layout version
pub const CHECKPOINT_FORMAT: u32 = 1;

const EXTENSION: &str = "json";

/// Serialized model state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub format: u32,
    pub model_name: String,
    /// Assigned by the store on `put`
    pub version: u64,
    /// Seconds since the Unix epoch
    pub created_at: u64,
    pub vocabulary: Vocabulary,
    pub hyperparameters: Hyperparameters,
    pub network: Network,
    pub loss_history: Vec<f32>,
    pub examples: usize,
}

impl Checkpoint {
    pub(crate) fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<()> {
        if self.format != CHECKPOINT_FORMAT {
            return Err(invalid_data(format!(
                "unsupported checkpoint format {} for {}",
                self.format, self.model_name
            )));
        }
        if let Err(reason) = self.vocabulary.quantization.validate() {
            return Err(invalid_data(format!("checkpoint {} has bad quantization: {}", self.model_name, reason)));
        }
        if !self.network.is_consistent() || self.network.vocab_size() != self.vocabulary.size() {
            return Err(invalid_data(format!("checkpoint {} has mismatched weights", self.model_name)));
        }
        Ok(())
    }
}

/// Result of a successful `put`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointInfo {
    pub model_name: String,
    pub version: u64,
    /// Where the checkpoint lives (file path or `memory`)
    pub location: String,
}

/// Reject names that are empty, too long or not `[A-Za-z0-9_-]`
pub fn validate_model_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(ComposerError::validation(format!(
            "invalid model name '{}': use 1-64 letters, digits, '_' or '-'",
            name
        )))
    }
}

fn invalid_data(msg: String) -> ComposerError {
    ComposerError::Storage(io::Error::new(io::ErrorKind::InvalidData, msg))
}

/// Durable storage for checkpoints
pub trait CheckpointStore: Send + Sync {
    /// Store a checkpoint under its model name, assigning the next version
    fn put(&self, checkpoint: Checkpoint) -> Result<CheckpointInfo>;

    /// Latest checkpoint for a name
    fn get(&self, model_name: &str) -> Result<Checkpoint>;

    fn exists(&self, model_name: &str) -> bool;

    /// Stored model names, sorted
    fn list(&self) -> Result<Vec<String>>;
}

/// One JSON file per model in a directory
#[derive(Debug)]
pub struct FileCheckpointStore {
    dir: PathBuf,
    /// Serializes version assignment and writes within this process
    write_lock: Mutex<()>,
}

/// Reads only the version field of an existing checkpoint
#[derive(Deserialize)]
struct VersionHeader {
    version: u64,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, model_name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", model_name, EXTENSION))
    }

    fn current_version(&self, path: &Path) -> u64 {
        fs::read(path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<VersionHeader>(&bytes).ok())
            .map(|header| header.version)
            .unwrap_or(0)
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn put(&self, mut checkpoint: Checkpoint) -> Result<CheckpointInfo> {
        validate_model_name(&checkpoint.model_name)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let path = self.path_for(&checkpoint.model_name);
        checkpoint.version = self.current_version(&path) + 1;
        let bytes = serde_json::to_vec(&checkpoint).map_err(|e| invalid_data(e.to_string()))?;
        write_atomic(&path, &bytes)?;

        info!(
            model = %checkpoint.model_name,
            version = checkpoint.version,
            path = %path.display(),
            "checkpoint committed"
        );
        Ok(CheckpointInfo {
            model_name: checkpoint.model_name,
            version: checkpoint.version,
            location: path.display().to_string(),
        })
    }

    fn get(&self, model_name: &str) -> Result<Checkpoint> {
        validate_model_name(model_name)?;
        let path = self.path_for(model_name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ComposerError::ModelNotFound(model_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let checkpoint: Checkpoint = serde_json::from_slice(&bytes)
            .map_err(|e| invalid_data(format!("{}: {}", path.display(), e)))?;
        checkpoint.check()?;
        Ok(checkpoint)
    }

    fn exists(&self, model_name: &str) -> bool {
        validate_model_name(model_name).is_ok() && self.path_for(model_name).is_file()
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_model_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Process-local store, used by tests and ephemeral servers
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    checkpoints: RwLock<HashMap<String, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn put(&self, mut checkpoint: Checkpoint) -> Result<CheckpointInfo> {
        validate_model_name(&checkpoint.model_name)?;
        let mut map = self.checkpoints.write().unwrap_or_else(|e| e.into_inner());
        checkpoint.version = map.get(&checkpoint.model_name).map(|c| c.version).unwrap_or(0) + 1;
        let info = CheckpointInfo {
            model_name: checkpoint.model_name.clone(),
            version: checkpoint.version,
            location: "memory".to_string(),
        };
        map.insert(checkpoint.model_name.clone(), checkpoint);
        Ok(info)
    }

    fn get(&self, model_name: &str) -> Result<Checkpoint> {
        self.checkpoints
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(model_name)
            .cloned()
            .ok_or_else(|| ComposerError::ModelNotFound(model_name.to_string()))
    }

    fn exists(&self, model_name: &str) -> bool {
        self.checkpoints
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(model_name)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .checkpoints
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}
