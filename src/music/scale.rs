// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scales and keys used by the composition engine.
//!
//! Scale degrees are addressed by a signed, zero-based index that runs
//! across octaves: index 0 is the root at the reference octave, index
//! `len()` is the root one octave up, and negative indices walk downward.
//! Melody walks, chord stacking and bass lines all move in this space.

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Note {
    /// All notes in chromatic order
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Pitch class (0-11)
    pub fn pitch_class(self) -> u8 {
        Note::ALL.iter().position(|&n| n == self).unwrap_or(0) as u8
    }

    /// Note from pitch class (wraps modulo 12)
    pub fn from_pitch_class(pc: u8) -> Self {
        Note::ALL[(pc % 12) as usize]
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
        write!(f, "{}", NAMES[self.pitch_class() as usize])
    }
}

/// Scale types a genre may draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    NaturalMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    HarmonicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    WholeTone,
}

impl ScaleType {
    /// Semitone offsets from the root
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleType::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleType::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleType::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleType::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleType::WholeTone => &[0, 2, 4, 6, 8, 10],
        }
    }

    /// Wire name (matches the serde representation)
    pub fn as_str(self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::NaturalMinor => "natural_minor",
            ScaleType::Dorian => "dorian",
            ScaleType::Phrygian => "phrygian",
            ScaleType::Lydian => "lydian",
            ScaleType::Mixolydian => "mixolydian",
            ScaleType::HarmonicMinor => "harmonic_minor",
            ScaleType::MajorPentatonic => "major_pentatonic",
            ScaleType::MinorPentatonic => "minor_pentatonic",
            ScaleType::Blues => "blues",
            ScaleType::WholeTone => "whole_tone",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scale rooted on a pitch class
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    root: Note,
    scale_type: ScaleType,
}

impl Scale {
    /// Create a new scale from root and type
    pub fn new(root: Note, scale_type: ScaleType) -> Self {
        Self { root, scale_type }
    }

    pub fn root(&self) -> Note {
        self.root
    }

    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Number of degrees per octave
    pub fn len(&self) -> usize {
        self.scale_type.intervals().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a MIDI note's pitch class belongs to this scale
    pub fn contains_midi(&self, midi_note: MidiNote) -> bool {
        let offset = (midi_note as i16 - self.root.pitch_class() as i16).rem_euclid(12) as u8;
        self.scale_type.intervals().contains(&offset)
    }

    /// MIDI pitch of a signed degree index relative to `reference`.
    ///
    /// `reference` is the MIDI note of degree 0 (normally the root in some
    /// octave). Results outside 0-127 are folded back by octaves.
    pub fn pitch_at(&self, reference: MidiNote, degree: i32) -> MidiNote {
        let intervals = self.scale_type.intervals();
        let len = intervals.len() as i32;
        let octave = degree.div_euclid(len);
        let step = degree.rem_euclid(len) as usize;
        let pitch = reference as i32 + octave * 12 + intervals[step] as i32;
        fold_into_midi(pitch)
    }

    /// Reference pitch (degree 0) of this scale in a MIDI octave (C4 = octave 4)
    pub fn root_pitch(&self, octave: i8) -> MidiNote {
        fold_into_midi((octave as i32 + 1) * 12 + self.root.pitch_class() as i32)
    }

    /// Degree index (relative to `reference`) nearest to a MIDI pitch
    pub fn nearest_degree(&self, reference: MidiNote, midi_note: MidiNote) -> i32 {
        let intervals = self.scale_type.intervals();
        let len = intervals.len() as i32;
        let diff = midi_note as i32 - reference as i32;
        let octave = diff.div_euclid(12);
        let within = diff.rem_euclid(12);

        let mut best = 0i32;
        let mut best_dist = i32::MAX;
        // Include the next octave's root so pitches just below it snap up
        for (i, &iv) in intervals.iter().enumerate() {
            let dist = (within - iv as i32).abs();
            if dist < best_dist {
                best_dist = dist;
                best = i as i32;
            }
        }
        if 12 - within < best_dist {
            best = len;
        }
        octave * len + best
    }

    /// Quantize a MIDI note to the nearest note in the scale
    pub fn quantize(&self, midi_note: MidiNote) -> MidiNote {
        if self.contains_midi(midi_note) {
            return midi_note;
        }
        let reference = self.root.pitch_class();
        let degree = self.nearest_degree(reference, midi_note);
        self.pitch_at(reference, degree)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.scale_type)
    }
}

/// Fold an arbitrary pitch into 0-127 by whole octaves
fn fold_into_midi(mut pitch: i32) -> MidiNote {
    while pitch < 0 {
        pitch += 12;
    }
    while pitch > 127 {
        pitch -= 12;
    }
    pitch as MidiNote
}
