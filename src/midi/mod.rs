// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI File encoding and decoding.
//!
//! The encoder turns a `Composition` into SMF bytes; the decoder reads
//! corpus files back into per-track note lists for tokenization. Both sit
//! behind traits so the orchestrator and training pipeline can be tested
//! with other implementations.

pub mod export;
pub mod import;

use std::path::Path;

use crate::engine::{Composition, NoteEvent, DRUM_CHANNEL};
use crate::error::Result;

pub use export::SmfEncoder;
pub use import::SmfDecoder;

/// Serializes compositions
pub trait MidiEncoder: Send + Sync {
    fn encode(&self, composition: &Composition) -> Result<Vec<u8>>;
}

/// Reads MIDI files into note lists
pub trait MidiDecoder: Send + Sync {
    fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedMidi>;

    fn decode(&self, path: &Path) -> Result<DecodedMidi> {
        let bytes = std::fs::read(path)?;
        self.decode_bytes(&bytes)
    }
}

/// Notes of one (track, channel) pair from a decoded file
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTrack {
    pub name: Option<String>,
    pub channel: u8,
    /// Notes sorted by start tick, in the decoder's resolution
    pub notes: Vec<NoteEvent>,
}

impl DecodedTrack {
    pub fn is_percussion(&self) -> bool {
        self.channel == DRUM_CHANNEL
    }
}

/// A decoded file, rescaled to a common resolution
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMidi {
    pub ppqn: u32,
    /// First tempo found, 120 BPM if none
    pub tempo_bpm: f64,
    pub tracks: Vec<DecodedTrack>,
}

impl DecodedMidi {
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }
}
