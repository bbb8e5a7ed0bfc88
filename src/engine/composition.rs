// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Composition data model: note events, tracks and the finished piece.

use serde::Serialize;

use crate::music::{Note, Scale, ScaleType, TimeSignature};

/// Default resolution in ticks per quarter note
pub const DEFAULT_PPQN: u32 = 480;

/// General MIDI percussion channel (channel 10, zero-based)
pub const DRUM_CHANNEL: u8 = 9;

/// A single note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NoteEvent {
    /// MIDI note number (0-127)
    pub pitch: u8,
    /// Velocity (1-127)
    pub velocity: u8,
    /// Start time in ticks from the beginning of the composition
    pub start_tick: u64,
    /// Duration in ticks (always positive)
    pub duration_ticks: u64,
    /// MIDI channel (0-15)
    pub channel: u8,
}

impl NoteEvent {
    /// Create a note on channel 0
    pub fn new(pitch: u8, velocity: u8, start_tick: u64, duration_ticks: u64) -> Self {
        Self {
            pitch,
            velocity,
            start_tick,
            duration_ticks,
            channel: 0,
        }
    }

    /// Set the channel for this note
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// End tick (exclusive)
    pub fn end_tick(&self) -> u64 {
        self.start_tick + self.duration_ticks
    }
}

/// What a track plays, derived from its instrument role name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Melody,
    Harmony,
    Bass,
    Drums,
    Percussion,
    /// Roles with no generation rule (e.g. vocals)
    Silent,
}

impl TrackKind {
    /// Classify an instrument role
    pub fn for_role(role: &str) -> Self {
        let role = role.trim().to_lowercase();
        match role.as_str() {
            "drums" | "kit" | "drum_kit" => TrackKind::Drums,
            "percussion" | "perc" => TrackKind::Percussion,
            "bass" | "808" | "sub_bass" | "upright_bass" => TrackKind::Bass,
            "keys" | "pad" | "piano" | "guitar" | "strings" | "organ" | "rhodes" | "synth" => {
                TrackKind::Harmony
            }
            "lead" | "melody" | "brass" | "sax" | "flute" | "trumpet" | "violin" | "horn"
            | "clarinet" => TrackKind::Melody,
            _ => TrackKind::Silent,
        }
    }

    /// Percussive tracks play on the drum channel and never transpose
    pub fn is_percussive(self) -> bool {
        matches!(self, TrackKind::Drums | TrackKind::Percussion)
    }
}

/// General MIDI program for a role (zero-based), if the role implies one
pub fn program_for_role(role: &str) -> Option<u8> {
    let program = match role.trim().to_lowercase().as_str() {
        "piano" | "melody" => 0,
        "keys" | "rhodes" => 4,
        "organ" => 16,
        "guitar" => 25,
        "bass" | "upright_bass" => 33,
        "808" | "sub_bass" => 38,
        "strings" | "violin" => 48,
        "vocals" => 52,
        "trumpet" => 56,
        "brass" | "horn" => 61,
        "sax" => 65,
        "clarinet" => 71,
        "flute" => 73,
        "lead" | "synth" => 80,
        "pad" => 89,
        _ => return None,
    };
    Some(program)
}

/// One instrument's notes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// Instrument role from the genre profile
    pub role: String,
    pub kind: TrackKind,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Program change at start (None for drums)
    pub program: Option<u8>,
    /// Notes sorted by start tick
    pub notes: Vec<NoteEvent>,
}

impl Track {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// A generated multi-track piece
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    /// Genre id the piece was generated from
    pub genre: String,
    /// Seed actually used
    pub seed: u64,
    pub bars: u32,
    /// Tempo in BPM
    pub tempo: u16,
    pub time_signature: TimeSignature,
    /// Ticks per quarter note
    pub ppqn: u32,
    pub key: Note,
    pub scale_type: ScaleType,
    pub tracks: Vec<Track>,
}

impl Composition {
    pub fn ticks_per_bar(&self) -> u64 {
        self.time_signature.ticks_per_bar(self.ppqn)
    }

    /// Exact length: `bars * ticks_per_bar`
    pub fn length_ticks(&self) -> u64 {
        self.ticks_per_bar() * self.bars as u64
    }

    pub fn scale(&self) -> Scale {
        Scale::new(self.key, self.scale_type)
    }

    /// Total number of notes over all tracks
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    /// Microseconds per quarter note for the tempo meta event
    pub fn micros_per_quarter(&self) -> u32 {
        (60_000_000.0 / self.tempo.max(1) as f64).round() as u32
    }
}
