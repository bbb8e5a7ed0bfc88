// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Application configuration.
//!
//! `AppConfig` is read from YAML or TOML depending on the file extension.
//! Every field has a default, so an empty file (or no file) is valid.

pub mod watcher;

pub use watcher::{CatalogEvent, CatalogWatcher};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{EngineConfig, DEFAULT_PPQN};
use crate::neural::Hyperparameters;
use crate::orchestrator::BlendConfig;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Model used for blending
    #[serde(default)]
    pub neural: BlendConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from a `.yaml`/`.yml` or `.toml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config = match ext.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
            Some("toml") => Self::from_toml(&contents)?,
            _ => bail!("Unsupported config format {:?}: use .yaml, .yml or .toml", path),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Check value ranges serde cannot express
    pub fn validate(&self) -> Result<()> {
        let ppqn = self.generation.ppqn;
        if !(4..0x8000).contains(&ppqn) {
            bail!("generation.ppqn must be between 4 and 32767, got {}", ppqn);
        }
        if self.generation.max_bars == 0 {
            bail!("generation.max_bars must be positive");
        }
        if !(0.0..=1.0).contains(&self.neural.blend_factor) {
            bail!("neural.blend_factor must be within [0, 1], got {}", self.neural.blend_factor);
        }
        if self.neural.temperature <= 0.0 {
            bail!("neural.temperature must be positive");
        }
        let hp = &self.training.hyperparameters;
        if hp.context == 0 || hp.embedding == 0 || hp.hidden == 0 || hp.batch_size == 0 {
            bail!("training.hyperparameters sizes must be positive");
        }
        if hp.learning_rate <= 0.0 {
            bail!("training.hyperparameters.learning_rate must be positive");
        }
        Ok(())
    }

    /// Engine settings derived from the generation section
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            ppqn: self.generation.ppqn,
            max_bars: self.generation.max_bars,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Generated MIDI files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Model checkpoints
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    /// Custom genre catalog (YAML); built-in catalog when absent
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Reload the catalog when the file changes
    #[serde(default)]
    pub watch_catalog: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            models_dir: default_models_dir(),
            catalog: None,
            watch_catalog: false,
        }
    }
}

/// Composition settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Ticks per quarter note
    #[serde(default = "default_ppqn")]
    pub ppqn: u32,
    #[serde(default = "default_max_bars")]
    pub max_bars: u32,
    /// Bars used when a request omits them
    #[serde(default = "default_bars")]
    pub default_bars: i64,
}

fn default_ppqn() -> u32 {
    DEFAULT_PPQN
}
fn default_max_bars() -> u32 {
    512
}
fn default_bars() -> i64 {
    32
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            ppqn: default_ppqn(),
            max_bars: default_max_bars(),
            default_bars: default_bars(),
        }
    }
}

/// Training defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingConfig {
    /// Corpus directory used when a request omits one
    #[serde(default = "default_training_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_epochs")]
    pub epochs: i64,
    #[serde(default)]
    pub hyperparameters: Hyperparameters,
}

fn default_training_dir() -> PathBuf {
    PathBuf::from("training_data")
}
fn default_epochs() -> i64 {
    50
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            directory: default_training_dir(),
            epochs: default_epochs(),
            hyperparameters: Hyperparameters::default(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter level: error, warn, info, debug or trace
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level() }
    }
}
