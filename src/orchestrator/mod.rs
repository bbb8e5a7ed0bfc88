// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Generation use case: genre lookup, procedural composition, optional
//! neural blending, MIDI file output.

pub mod blend;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::engine::{Composition, CompositionEngine};
use crate::error::Result;
use crate::genres::CatalogHandle;
use crate::midi::{MidiEncoder, SmfEncoder};
use crate::neural::{CheckpointStore, NeuralModel};
use crate::storage::write_atomic;

pub use blend::{blend_composition, BlendConfig, DEFAULT_MODEL_NAME};

/// Warning attached when a model was requested but could not be loaded
pub const NEURAL_UNAVAILABLE: &str = "neural requested but unavailable";

/// Outcome of one generation request
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// File name inside the output directory
    pub filename: String,
    pub path: PathBuf,
    pub tempo: u16,
    pub seed: u64,
    pub neural_applied: bool,
    pub warnings: Vec<String>,
    pub composition: Composition,
}

/// Ties the catalog, engine, model store and encoder together
pub struct GenerationOrchestrator {
    catalog: CatalogHandle,
    engine: CompositionEngine,
    store: Arc<dyn CheckpointStore>,
    encoder: Box<dyn MidiEncoder>,
    output_dir: PathBuf,
    blend: BlendConfig,
}

impl GenerationOrchestrator {
    pub fn new(
        catalog: CatalogHandle,
        engine: CompositionEngine,
        store: Arc<dyn CheckpointStore>,
        output_dir: impl Into<PathBuf>,
        blend: BlendConfig,
    ) -> Self {
        Self {
            catalog,
            engine,
            store,
            encoder: Box::new(SmfEncoder::new()),
            output_dir: output_dir.into(),
            blend,
        }
    }

    /// Replace the MIDI encoder
    pub fn with_encoder(mut self, encoder: Box<dyn MidiEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn CheckpointStore> {
        &self.store
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Name of the checkpoint used for blending
    pub fn model_name(&self) -> &str {
        &self.blend.model_name
    }

    /// Build a composition without writing it.
    ///
    /// Returns the composition, whether the model was applied and any
    /// warnings.
    pub fn compose(
        &self,
        genre_id: &str,
        bars: i64,
        seed: Option<u64>,
        use_neural: bool,
    ) -> Result<(Composition, bool, Vec<String>)> {
        let registry = self.catalog.snapshot();
        let profile = registry.get(genre_id)?;
        let composition = self.engine.generate(profile, bars, seed)?;

        if !use_neural {
            return Ok((composition, false, Vec::new()));
        }

        match NeuralModel::load(self.store.as_ref(), &self.blend.model_name) {
            Ok(model) => {
                let blended = blend_composition(&composition, &model, profile.velocity_range, &self.blend);
                Ok((blended, true, Vec::new()))
            }
            Err(e) => {
                warn!(model = %self.blend.model_name, error = %e, "{}", NEURAL_UNAVAILABLE);
                Ok((composition, false, vec![NEURAL_UNAVAILABLE.to_string()]))
            }
        }
    }

    /// Generate and write `{genre}_{bars}bars_{seed}[_neural].mid`
    pub fn generate(
        &self,
        genre_id: &str,
        bars: i64,
        seed: Option<u64>,
        use_neural: bool,
    ) -> Result<GenerationResult> {
        let (composition, neural_applied, warnings) = self.compose(genre_id, bars, seed, use_neural)?;
        let bytes = self.encoder.encode(&composition)?;

        let filename = format!(
            "{}_{}bars_{}{}.mid",
            composition.genre,
            composition.bars,
            composition.seed,
            if neural_applied { "_neural" } else { "" }
        );
        let path = self.output_dir.join(&filename);
        write_atomic(&path, &bytes)?;

        info!(
            genre = %composition.genre,
            bars = composition.bars,
            seed = composition.seed,
            neural = neural_applied,
            file = %filename,
            "generation complete"
        );
        Ok(GenerationResult {
            filename,
            path,
            tempo: composition.tempo,
            seed: composition.seed,
            neural_applied,
            warnings,
            composition,
        })
    }
}
