// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-track generators driven by a genre profile.
//!
//! Each generator turns a shared `GeneratorContext` (the plan the engine
//! draws once per composition: tempo, meter, key, chord progression) into
//! the note events of one track. Generators receive their own seeded
//! random stream, so adding or removing a track never changes the notes
//! of another.

pub mod bass;
pub mod chord;
pub mod drums;
pub mod melody;
pub mod rhythm;

use rand_chacha::ChaCha8Rng;

use crate::engine::composition::{NoteEvent, TrackKind};
use crate::genres::GenreProfile;
use crate::music::{Scale, TimeSignature};

pub use chord::PlannedChord;

/// Everything a generator may read about the composition being built
#[derive(Debug, Clone)]
pub struct GeneratorContext<'a> {
    pub profile: &'a GenreProfile,
    pub scale: Scale,
    pub time_signature: TimeSignature,
    /// Ticks per quarter note
    pub ppqn: u32,
    pub bars: u32,
    /// Chords in time order, covering the whole composition
    pub progression: &'a [PlannedChord],
}

impl GeneratorContext<'_> {
    /// Ticks per 16th-note step
    pub fn ticks_per_step(&self) -> u64 {
        crate::music::meter::ticks_per_step(self.ppqn)
    }

    pub fn steps_per_bar(&self) -> u32 {
        self.time_signature.steps_per_bar()
    }

    pub fn ticks_per_bar(&self) -> u64 {
        self.time_signature.ticks_per_bar(self.ppqn)
    }

    pub fn total_steps(&self) -> u64 {
        self.steps_per_bar() as u64 * self.bars as u64
    }

    /// Composition length in ticks
    pub fn length_ticks(&self) -> u64 {
        self.ticks_per_bar() * self.bars as u64
    }

    /// Chord sounding at a tick (last chord if past the end)
    pub fn chord_at(&self, tick: u64) -> Option<&PlannedChord> {
        self.progression
            .iter()
            .find(|c| tick >= c.start_tick && tick < c.end_tick)
            .or_else(|| self.progression.last())
    }

    /// Map a 0..=1 level into the profile's velocity range
    pub fn velocity_for(&self, level: f64) -> u8 {
        let (lo, hi) = self.profile.velocity_range;
        let level = level.clamp(0.0, 1.0);
        let v = lo as f64 + (hi as f64 - lo as f64) * level;
        (v.round() as u8).clamp(lo, hi)
    }
}

/// Trait for track generators
pub trait Generator {
    /// Produce the notes of one track. Channels are assigned by the engine.
    fn generate(&mut self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent>;

    /// Generator name for logs
    fn name(&self) -> &str;
}

/// Build the generator for a track kind; `None` for roles without a rule
pub fn for_kind(kind: TrackKind) -> Option<Box<dyn Generator>> {
    match kind {
        TrackKind::Melody => Some(Box::new(melody::MelodyGenerator::new())),
        TrackKind::Harmony => Some(Box::new(chord::ChordGenerator::new())),
        TrackKind::Bass => Some(Box::new(bass::BassGenerator::new())),
        TrackKind::Drums => Some(Box::new(drums::DrumGenerator::kit())),
        TrackKind::Percussion => Some(Box::new(drums::DrumGenerator::percussion())),
        TrackKind::Silent => None,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::genres::GenreRegistry;
    use crate::music::{Note, ScaleType};

    /// A fixed 4-bar context in C major with a I-IV-V-I progression
    pub fn with_context<R>(genre: &str, f: impl FnOnce(&GeneratorContext) -> R) -> R {
        let registry = GenreRegistry::builtin();
        let profile = registry.get(genre).unwrap().clone();
        let ts = TimeSignature::COMMON;
        let bar = ts.ticks_per_bar(480);
        let progression: Vec<PlannedChord> = [0, 3, 4, 0]
            .iter()
            .enumerate()
            .map(|(i, &degree)| PlannedChord {
                degree,
                start_tick: i as u64 * bar,
                end_tick: (i as u64 + 1) * bar,
                seventh: false,
                ninth: false,
            })
            .collect();
        let ctx = GeneratorContext {
            profile: &profile,
            scale: Scale::new(Note::C, ScaleType::Major),
            time_signature: ts,
            ppqn: 480,
            bars: 4,
            progression: &progression,
        };
        f(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::with_context;
    use super::*;

    #[test]
    fn test_velocity_for_stays_in_profile_range() {
        with_context("house", |ctx| {
            let (lo, hi) = ctx.profile.velocity_range;
            assert_eq!(ctx.velocity_for(0.0), lo);
            assert_eq!(ctx.velocity_for(1.0), hi);
            assert_eq!(ctx.velocity_for(7.5), hi);
            assert_eq!(ctx.velocity_for(-1.0), lo);
        });
    }

    #[test]
    fn test_chord_at() {
        with_context("pop", |ctx| {
            assert_eq!(ctx.chord_at(0).unwrap().degree, 0);
            assert_eq!(ctx.chord_at(1920).unwrap().degree, 3);
            assert_eq!(ctx.chord_at(10 * 1920).unwrap().degree, 0);
        });
    }

    #[test]
    fn test_for_kind() {
        assert!(for_kind(TrackKind::Silent).is_none());
        assert_eq!(for_kind(TrackKind::Bass).unwrap().name(), "bass");
        assert_eq!(for_kind(TrackKind::Percussion).unwrap().name(), "percussion");
    }
}
