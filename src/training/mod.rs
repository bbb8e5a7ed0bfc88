// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Corpus ingestion and model training.
//!
//! A run scans a directory for MIDI files, tokenizes every melodic track,
//! trains a fresh `NeuralModel` and saves it under a model name. Runs for
//! the same name are serialized; files that cannot be used are reported as
//! warnings instead of failing the run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::error::{ComposerError, Result};
use crate::midi::{MidiDecoder, SmfDecoder};
use crate::neural::{
    validate_model_name, CancelFlag, CheckpointStore, Hyperparameters, NeuralModel, Token,
    TrainingResult, Vocabulary,
};

/// Upper bound on epochs accepted per run
pub const MAX_EPOCHS: i64 = 10_000;

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model_name: String,
    /// Version of the checkpoint written by this run
    pub version: u64,
    /// One entry per skipped corpus file
    pub warnings: Vec<String>,
    /// Files that contributed at least one sequence
    pub files_used: usize,
    pub result: TrainingResult,
}

/// Recursively collect `.mid` / `.midi` files, sorted by path
pub fn scan_corpus(directory: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_midi_files(directory, &mut files);
    files.sort();
    files
}

fn collect_midi_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_midi_files(&path, out);
        } else if is_midi_file(&path) {
            out.push(path);
        }
    }
}

fn is_midi_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("mid") || e.eq_ignore_ascii_case("midi"))
        .unwrap_or(false)
}

/// Drives corpus extraction, training and checkpointing
pub struct TrainingPipeline {
    store: Arc<dyn CheckpointStore>,
    decoder: Box<dyn MidiDecoder>,
    vocabulary: Vocabulary,
    hyperparameters: Hyperparameters,
    /// Per-name run locks
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Cancel flags of runs started through `run_named`, one per run
    active: Mutex<HashMap<String, Vec<CancelFlag>>>,
}

impl TrainingPipeline {
    pub fn new(store: Arc<dyn CheckpointStore>, hyperparameters: Hyperparameters) -> Self {
        let vocabulary = Vocabulary::default();
        Self {
            store,
            decoder: Box::new(SmfDecoder::new(vocabulary.quantization.ppqn)),
            vocabulary,
            hyperparameters,
            locks: Mutex::new(HashMap::new()),
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the MIDI decoder
    pub fn with_decoder(mut self, decoder: Box<dyn MidiDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn store(&self) -> &Arc<dyn CheckpointStore> {
        &self.store
    }

    fn lock_for(&self, model_name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(model_name.to_string()).or_default().clone()
    }

    /// Token sequences from every usable file, plus one warning per skipped file
    fn extract(&self, files: &[PathBuf]) -> (Vec<Vec<Token>>, usize, Vec<String>) {
        let mut sequences = Vec::new();
        let mut warnings = Vec::new();
        let mut files_used = 0;

        for path in files {
            let skipped = match self.decoder.decode(path) {
                Ok(decoded) => {
                    let before = sequences.len();
                    for track in decoded.tracks.iter().filter(|t| !t.is_percussion()) {
                        if !track.notes.is_empty() {
                            sequences.push(self.vocabulary.encode_notes(&track.notes));
                        }
                    }
                    if sequences.len() > before {
                        files_used += 1;
                        None
                    } else {
                        Some("no melodic notes".to_string())
                    }
                }
                Err(e) => Some(e.to_string()),
            };

            if let Some(reason) = skipped {
                let err = ComposerError::Corpus {
                    path: path.clone(),
                    reason,
                };
                warn!("skipping {}", err);
                warnings.push(err.to_string());
            }
        }
        (sequences, files_used, warnings)
    }

    /// Train `model_name` on the MIDI files under `directory`.
    ///
    /// A cancelled run fails with a training error and leaves the stored
    /// checkpoint untouched.
    pub fn run(
        &self,
        directory: &Path,
        epochs: i64,
        model_name: &str,
        cancel: &CancelFlag,
    ) -> Result<TrainingOutcome> {
        validate_model_name(model_name)?;
        if epochs <= 0 || epochs > MAX_EPOCHS {
            return Err(ComposerError::validation(format!(
                "epochs must be between 1 and {}, got {}",
                MAX_EPOCHS, epochs
            )));
        }

        let lock = self.lock_for(model_name);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let files = scan_corpus(directory);
        info!(directory = %directory.display(), files = files.len(), model = model_name, "training started");
        let (sequences, files_used, warnings) = self.extract(&files);
        if sequences.is_empty() {
            return Err(ComposerError::Training("no training data found".to_string()));
        }

        let mut model = NeuralModel::new(self.vocabulary, self.hyperparameters);
        let result = model.train_until(&sequences, epochs as u32, cancel)?;
        if result.cancelled {
            return Err(ComposerError::Training("training cancelled".to_string()));
        }

        let info = model.save(self.store.as_ref(), model_name)?;
        info!(
            model = model_name,
            version = info.version,
            loss = result.final_loss,
            files = files_used,
            skipped = warnings.len(),
            "training finished"
        );
        Ok(TrainingOutcome {
            model_name: info.model_name,
            version: info.version,
            warnings,
            files_used,
            result,
        })
    }

    /// `run` with a cancel flag registered under the model name
    pub fn run_named(&self, directory: &Path, epochs: i64, model_name: &str) -> Result<TrainingOutcome> {
        let flag = CancelFlag::new();
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(model_name.to_string())
            .or_default()
            .push(flag.clone());

        let outcome = self.run(directory, epochs, model_name, &flag);

        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(flags) = active.get_mut(model_name) {
            flags.retain(|f| !f.same_flag(&flag));
            if flags.is_empty() {
                active.remove(model_name);
            }
        }
        outcome
    }

    /// Cancel every run of `model_name`, training or queued behind the
    /// name lock; false if none is registered
    pub fn cancel(&self, model_name: &str) -> bool {
        match self.active.lock().unwrap_or_else(|e| e.into_inner()).get(model_name) {
            Some(flags) if !flags.is_empty() => {
                flags.iter().for_each(CancelFlag::cancel);
                info!(model = model_name, runs = flags.len(), "training cancel requested");
                true
            }
            _ => false,
        }
    }

    /// Number of `run_named` calls in flight for `model_name`
    pub fn active_runs(&self, model_name: &str) -> usize {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(model_name)
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CompositionEngine;
    use crate::genres::GenreRegistry;
    use crate::midi::{MidiEncoder, SmfEncoder};
    use crate::neural::MemoryCheckpointStore;
    use tempfile::tempdir;

    fn small() -> Hyperparameters {
        Hyperparameters {
            hidden: 8,
            embedding: 4,
            ..Hyperparameters::default()
        }
    }

    fn write_song(dir: &Path, name: &str, genre: &str, seed: u64) {
        let registry = GenreRegistry::builtin();
        let composition = CompositionEngine::default()
            .generate(registry.get(genre).unwrap(), 2, Some(seed))
            .unwrap();
        fs::write(dir.join(name), SmfEncoder.encode(&composition).unwrap()).unwrap();
    }

    fn pipeline() -> TrainingPipeline {
        TrainingPipeline::new(Arc::new(MemoryCheckpointStore::new()), small())
    }

    #[test]
    fn test_scan_is_recursive_and_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.mid"), b"").unwrap();
        fs::write(dir.path().join("sub").join("a.MIDI"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        let files = scan_corpus(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files[0] < files[1]);
    }

    #[test]
    fn test_missing_directory_is_no_data() {
        let err = pipeline()
            .run(Path::new("/no/such/corpus"), 1, "default", &CancelFlag::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "no training data found");
    }

    #[test]
    fn test_validation_before_scan() {
        let p = pipeline();
        let cancel = CancelFlag::new();
        assert!(matches!(
            p.run(Path::new("."), 0, "default", &cancel),
            Err(ComposerError::Validation(_))
        ));
        assert!(matches!(
            p.run(Path::new("."), 1, "bad/name", &cancel),
            Err(ComposerError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_files_become_warnings() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "good.mid", "pop", 1);
        fs::write(dir.path().join("broken.mid"), b"garbage").unwrap();

        let p = pipeline();
        let outcome = p.run(dir.path(), 2, "default", &CancelFlag::new()).unwrap();
        assert_eq!(outcome.version, 1);
        assert_eq!(outcome.files_used, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("broken.mid"));
        assert!(p.store().exists("default"));
    }

    #[test]
    fn test_only_bad_files_is_no_data() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.mid"), b"garbage").unwrap();
        let err = pipeline().run(dir.path(), 1, "default", &CancelFlag::new()).unwrap_err();
        assert!(matches!(err, ComposerError::Training(_)));
    }

    #[test]
    fn test_retraining_bumps_version_with_same_weights() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "song.mid", "bebop", 3);
        let p = pipeline();
        let first = p.run(dir.path(), 2, "jazz", &CancelFlag::new()).unwrap();
        let weights_a = p.store().get("jazz").unwrap().network;
        let second = p.run(dir.path(), 2, "jazz", &CancelFlag::new()).unwrap();
        let weights_b = p.store().get("jazz").unwrap().network;
        assert_eq!((first.version, second.version), (1, 2));
        assert_eq!(weights_a, weights_b);
    }

    #[test]
    fn test_cancelled_run_leaves_checkpoint() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "song.mid", "pop", 5);
        let p = pipeline();
        p.run(dir.path(), 1, "default", &CancelFlag::new()).unwrap();

        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = p.run(dir.path(), 3, "default", &cancel).unwrap_err();
        assert_eq!(err.to_string(), "training cancelled");
        assert_eq!(p.store().get("default").unwrap().version, 1);
    }

    #[test]
    fn test_cancel_without_active_run() {
        assert!(!pipeline().cancel("default"));
    }

    fn wait_for_runs(p: &TrainingPipeline, name: &str, runs: usize) {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(30);
        while p.active_runs(name) < runs {
            assert!(std::time::Instant::now() < deadline, "runs never started");
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
    }

    #[test]
    fn test_same_name_runs_are_serialized() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "song.mid", "pop", 8);
        let p = Arc::new(pipeline());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let p = Arc::clone(&p);
                let corpus = dir.path().to_path_buf();
                std::thread::spawn(move || p.run_named(&corpus, 3, "shared").unwrap().version)
            })
            .collect();
        let mut versions: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        versions.sort();

        assert_eq!(versions, vec![1, 2]);
        assert_eq!(p.store().get("shared").unwrap().version, 2);
        assert_eq!(p.active_runs("shared"), 0);
    }

    #[test]
    fn test_cancel_stops_training_run_and_queued_run() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "song.mid", "pop", 5);
        let p = Arc::new(pipeline());
        p.run_named(dir.path(), 1, "default").unwrap();
        let saved = p.store().get("default").unwrap();

        let spawn_run = |p: &Arc<TrainingPipeline>| {
            let p = Arc::clone(p);
            let corpus = dir.path().to_path_buf();
            std::thread::spawn(move || p.run_named(&corpus, MAX_EPOCHS, "default"))
        };
        let first = spawn_run(&p);
        wait_for_runs(&p, "default", 1);
        let second = spawn_run(&p);
        wait_for_runs(&p, "default", 2);

        assert!(p.cancel("default"));
        let first = first.join().unwrap().unwrap_err();
        let second = second.join().unwrap().unwrap_err();
        assert_eq!(first.to_string(), "training cancelled");
        assert_eq!(second.to_string(), "training cancelled");

        assert_eq!(p.store().get("default").unwrap(), saved);
        assert_eq!(p.active_runs("default"), 0);
        assert!(!p.cancel("default"));
    }
}
