// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error taxonomy for composition, training and storage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the composer core
#[derive(Debug, Error)]
pub enum ComposerError {
    /// Requested genre id is not in the catalog
    #[error("genre not found: {0}")]
    GenreNotFound(String),

    /// Request parameters failed validation (bars, seed, epochs, names)
    #[error("validation error: {0}")]
    Validation(String),

    /// No checkpoint stored under this model name
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Training run failed as a whole
    #[error("{0}")]
    Training(String),

    /// A single corpus file could not be used
    #[error("corpus file {path:?}: {reason}")]
    Corpus { path: PathBuf, reason: String },

    /// MIDI decoding failed
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Serialization to the output format failed
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Filesystem or checkpoint store failure
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),

    /// Genre catalog could not be parsed or validated
    #[error("catalog error: {0}")]
    Catalog(String),
}

impl ComposerError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        ComposerError::Validation(msg.into())
    }

    /// True for errors caused by the caller's request rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ComposerError::GenreNotFound(_)
                | ComposerError::Validation(_)
                | ComposerError::ModelNotFound(_)
        )
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ComposerError>;
