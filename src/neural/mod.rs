// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Trainable next-token model over quantized note tokens.
//!
//! `NeuralModel` pairs a `Vocabulary` with a small feed-forward network.
//! Training is deterministic for a given corpus and seed; sampling is a
//! lazy iterator seeded per call.

pub mod checkpoint;
pub mod network;
pub mod tokens;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::engine::stream;
use crate::error::{ComposerError, Result};

pub use checkpoint::{
    validate_model_name, Checkpoint, CheckpointInfo, CheckpointStore, FileCheckpointStore,
    MemoryCheckpointStore, CHECKPOINT_FORMAT,
};
pub use network::{context_window, sample_index, Example, Hyperparameters, Network};
pub use tokens::{QuantizationConfig, Token, TokenClass, Vocabulary};

/// Shared flag for cooperative cancellation, checked at epoch boundaries
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// True when both handles control the same flag
    pub fn same_flag(&self, other: &CancelFlag) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Summary of a training call
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingResult {
    /// Mean cross-entropy per completed epoch
    pub epoch_losses: Vec<f32>,
    pub final_loss: f32,
    pub examples: usize,
    /// True when the cancel flag stopped training early
    pub cancelled: bool,
}

/// Vocabulary plus network weights
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralModel {
    vocabulary: Vocabulary,
    hyperparameters: Hyperparameters,
    network: Network,
    loss_history: Vec<f32>,
    examples: usize,
    version: u64,
}

impl NeuralModel {
    pub fn new(vocabulary: Vocabulary, hyperparameters: Hyperparameters) -> Self {
        Self {
            network: Network::new(vocabulary.size(), &hyperparameters),
            vocabulary,
            hyperparameters,
            loss_history: Vec::new(),
            examples: 0,
            version: 0,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    pub fn loss_history(&self) -> &[f32] {
        &self.loss_history
    }

    /// Checkpoint version this model was loaded from (0 if never saved)
    pub fn version(&self) -> u64 {
        self.version
    }

    fn build_examples(&self, sequences: &[Vec<Token>]) -> Vec<Example> {
        let context = self.hyperparameters.context;
        let mut examples = Vec::new();
        for sequence in sequences {
            let indices: Vec<usize> = sequence.iter().map(|&t| self.vocabulary.index(t)).collect();
            // The leading Bos is context only, never a target
            for i in 1..indices.len() {
                examples.push(Example {
                    context: context_window(&indices[..i], context),
                    target: indices[i],
                });
            }
        }
        examples
    }

    /// Train on token sequences for `epochs` passes
    pub fn train(&mut self, sequences: &[Vec<Token>], epochs: u32) -> Result<TrainingResult> {
        self.train_until(sequences, epochs, &CancelFlag::new())
    }

    /// Train, stopping at the next epoch boundary once `cancel` is set
    pub fn train_until(
        &mut self,
        sequences: &[Vec<Token>],
        epochs: u32,
        cancel: &CancelFlag,
    ) -> Result<TrainingResult> {
        if epochs == 0 {
            return Err(ComposerError::validation("epochs must be positive"));
        }
        let mut examples = self.build_examples(sequences);
        if examples.is_empty() {
            return Err(ComposerError::Training("no training data found".to_string()));
        }

        let hp = self.hyperparameters;
        let mut rng = stream(hp.seed, 1);
        let mut epoch_losses = Vec::with_capacity(epochs as usize);
        let mut cancelled = false;

        for epoch in 0..epochs {
            if cancel.is_cancelled() {
                cancelled = true;
                info!(epoch, "training cancelled");
                break;
            }
            examples.shuffle(&mut rng);
            let mut total = 0.0;
            for batch in examples.chunks(hp.batch_size.max(1)) {
                total += self.network.train_batch(batch, hp.learning_rate);
            }
            let loss = total / examples.len() as f32;
            info!(epoch = epoch + 1, epochs, loss, "epoch complete");
            epoch_losses.push(loss);
        }

        self.loss_history.extend_from_slice(&epoch_losses);
        self.examples = examples.len();
        Ok(TrainingResult {
            final_loss: epoch_losses.last().copied().unwrap_or(f32::NAN),
            epoch_losses,
            examples: examples.len(),
            cancelled,
        })
    }

    /// Next-token distribution over the whole vocabulary
    pub fn predict(&self, context: &[Token]) -> Vec<f32> {
        let indices: Vec<usize> = context.iter().map(|&t| self.vocabulary.index(t)).collect();
        self.network
            .probabilities(&context_window(&indices, self.network.context_size()))
    }

    /// Distribution restricted to one token class and renormalized
    pub fn predict_class(&self, context: &[Token], class: TokenClass) -> Vec<(Token, f32)> {
        let probs = self.predict(context);
        let range = self.vocabulary.class_range(class);
        let total: f32 = probs[range.clone()].iter().sum();
        range
            .filter_map(|i| {
                let p = if total > 0.0 { probs[i] / total } else { 0.0 };
                self.vocabulary.token(i).map(|t| (t, p))
            })
            .collect()
    }

    /// Lazily sample up to `length` tokens following `conditioning`.
    ///
    /// The iterator stops after emitting `Eos` or `length` tokens.
    pub fn sample(&self, conditioning: &[Token], length: usize, seed: u64) -> Sampler<'_> {
        let mut history: Vec<usize> = conditioning.iter().map(|&t| self.vocabulary.index(t)).collect();
        if history.is_empty() {
            history.push(self.vocabulary.index(Token::Bos));
        }
        Sampler {
            model: self,
            history,
            remaining: length,
            rng: stream(seed, 0),
            temperature: 1.0,
            finished: false,
        }
    }

    fn to_checkpoint(&self, model_name: &str) -> Checkpoint {
        Checkpoint {
            format: CHECKPOINT_FORMAT,
            model_name: model_name.to_string(),
            version: self.version,
            created_at: Checkpoint::now(),
            vocabulary: self.vocabulary,
            hyperparameters: self.hyperparameters,
            network: self.network.clone(),
            loss_history: self.loss_history.clone(),
            examples: self.examples,
        }
    }

    /// Persist weights and vocabulary under `model_name`
    pub fn save(&self, store: &dyn CheckpointStore, model_name: &str) -> Result<CheckpointInfo> {
        store.put(self.to_checkpoint(model_name))
    }

    /// Load the latest checkpoint for `model_name`
    pub fn load(store: &dyn CheckpointStore, model_name: &str) -> Result<Self> {
        let checkpoint = store.get(model_name)?;
        debug!(model = model_name, version = checkpoint.version, "checkpoint loaded");
        Ok(Self::from(checkpoint))
    }
}

impl From<Checkpoint> for NeuralModel {
    fn from(checkpoint: Checkpoint) -> Self {
        Self {
            vocabulary: checkpoint.vocabulary,
            hyperparameters: checkpoint.hyperparameters,
            network: checkpoint.network,
            loss_history: checkpoint.loss_history,
            examples: checkpoint.examples,
            version: checkpoint.version,
        }
    }
}

/// Lazy token sampler returned by `NeuralModel::sample`
pub struct Sampler<'a> {
    model: &'a NeuralModel,
    history: Vec<usize>,
    remaining: usize,
    rng: ChaCha8Rng,
    temperature: f32,
    finished: bool,
}

impl Sampler<'_> {
    /// Sharpen (< 1) or flatten (> 1) the distribution
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.max(0.05);
        self
    }
}

impl Iterator for Sampler<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished || self.remaining == 0 {
            return None;
        }
        let network = &self.model.network;
        let mut probs = network.probabilities(&context_window(&self.history, network.context_size()));
        if (self.temperature - 1.0).abs() > f32::EPSILON {
            let exponent = 1.0 / self.temperature;
            for p in probs.iter_mut() {
                *p = p.powf(exponent);
            }
        }

        let index = sample_index(&probs, &mut self.rng);
        self.remaining -= 1;
        self.history.push(index);
        let token = self.model.vocabulary.token(index)?;
        if token == Token::Eos {
            self.finished = true;
        }
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (0, Some(self.remaining))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NoteEvent;

    fn small_model() -> NeuralModel {
        NeuralModel::new(
            Vocabulary::default(),
            Hyperparameters {
                hidden: 16,
                embedding: 8,
                ..Hyperparameters::default()
            },
        )
    }

    fn corpus() -> Vec<Vec<Token>> {
        let vocab = Vocabulary::default();
        let notes: Vec<NoteEvent> = (0..16)
            .map(|i| NoteEvent::new([60, 64, 67, 72][i % 4], 96, i as u64 * 240, 240))
            .collect();
        vec![vocab.encode_notes(&notes)]
    }

    #[test]
    fn test_train_reduces_loss() {
        let mut model = small_model();
        let result = model.train(&corpus(), 20).unwrap();
        assert_eq!(result.epoch_losses.len(), 20);
        assert!(!result.cancelled);
        assert!(result.final_loss < result.epoch_losses[0]);
        assert_eq!(model.loss_history().len(), 20);
    }

    #[test]
    fn test_training_is_deterministic() {
        let mut a = small_model();
        let mut b = small_model();
        a.train(&corpus(), 3).unwrap();
        b.train(&corpus(), 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_train_rejects_empty_input() {
        let mut model = small_model();
        assert!(matches!(model.train(&corpus(), 0), Err(ComposerError::Validation(_))));
        let err = model.train(&[], 2).unwrap_err();
        assert_eq!(err.to_string(), "no training data found");
    }

    #[test]
    fn test_cancelled_training_stops_at_epoch_boundary() {
        let mut model = small_model();
        let before = model.clone();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let result = model.train_until(&corpus(), 5, &cancel).unwrap();
        assert!(result.cancelled);
        assert!(result.epoch_losses.is_empty());
        assert_eq!(model.network, before.network);
    }

    #[test]
    fn test_sample_is_finite_and_seeded() {
        let mut model = small_model();
        model.train(&corpus(), 5).unwrap();
        let a: Vec<Token> = model.sample(&[Token::Bos], 32, 9).collect();
        let b: Vec<Token> = model.sample(&[Token::Bos], 32, 9).collect();
        assert!(a.len() <= 32);
        assert_eq!(a, b);
        assert_eq!(model.sample(&[], 0, 1).count(), 0);
        // Callers may stop early
        assert!(model.sample(&[Token::Bos], 100, 2).take(3).count() <= 3);
    }

    #[test]
    fn test_predict_class_normalized() {
        let model = small_model();
        let dist = model.predict_class(&[Token::Bos], TokenClass::Velocity);
        assert_eq!(dist.len(), 8);
        let sum: f32 = dist.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(dist.iter().all(|(t, _)| t.class() == TokenClass::Velocity));
    }

    #[test]
    fn test_save_and_load() {
        let store = MemoryCheckpointStore::new();
        let mut model = small_model();
        model.train(&corpus(), 2).unwrap();
        let info = model.save(&store, "default").unwrap();
        assert_eq!(info.version, 1);

        let loaded = NeuralModel::load(&store, "default").unwrap();
        assert_eq!(loaded.version(), 1);
        assert_eq!(loaded.network, model.network);
        assert_eq!(loaded.predict(&[Token::Bos]), model.predict(&[Token::Bos]));
        assert!(matches!(
            NeuralModel::load(&store, "missing"),
            Err(ComposerError::ModelNotFound(_))
        ));
    }
}
