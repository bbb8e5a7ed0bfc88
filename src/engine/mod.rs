// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Procedural composition engine.
//!
//! `CompositionEngine::generate` is a pure function of (profile, bars, seed).
//! The seed feeds a ChaCha8 generator; the plan (tempo, meter, key, chord
//! progression) is drawn from one stream and every track from its own
//! stream keyed by track index, so results are reproducible bit-for-bit
//! across platforms and tracks never perturb one another.

pub mod composition;

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{ComposerError, Result};
use crate::generators::{self, chord, GeneratorContext};
use crate::genres::GenreProfile;
use crate::music::{Note, Scale, ScaleType, TimeSignature};

pub use composition::{
    program_for_role, Composition, NoteEvent, Track, TrackKind, DEFAULT_PPQN, DRUM_CHANNEL,
};

/// Stream used for the composition plan; track streams use their index
const PLAN_STREAM: u64 = u64::MAX;

/// Drawn seeds stay below 2^53 so they survive a round trip through JSON numbers
pub const MAX_DRAWN_SEED: u64 = (1 << 53) - 1;

/// Seeded random stream for a given stream id
pub fn stream(seed: u64, id: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(id);
    rng
}

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Ticks per quarter note
    pub ppqn: u32,
    /// Largest accepted bar count
    pub max_bars: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ppqn: DEFAULT_PPQN,
            max_bars: 512,
        }
    }
}

/// Deterministic procedural composer
#[derive(Debug, Clone, Default)]
pub struct CompositionEngine {
    config: EngineConfig,
}

impl CompositionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate a requested bar count
    pub fn validate_bars(&self, bars: i64) -> Result<u32> {
        if bars <= 0 {
            return Err(ComposerError::validation(format!("bars must be positive, got {}", bars)));
        }
        if bars > self.config.max_bars as i64 {
            return Err(ComposerError::validation(format!(
                "bars must be at most {}, got {}",
                self.config.max_bars, bars
            )));
        }
        Ok(bars as u32)
    }

    /// Generate a composition. A missing seed is drawn from OS entropy and
    /// reported in the result.
    pub fn generate(&self, profile: &GenreProfile, bars: i64, seed: Option<u64>) -> Result<Composition> {
        let bars = self.validate_bars(bars)?;
        let seed = seed.unwrap_or_else(|| OsRng.next_u64() & MAX_DRAWN_SEED);
        let ppqn = self.config.ppqn;

        let mut plan_rng = stream(seed, PLAN_STREAM);
        let (tmin, tmax) = profile.tempo_range;
        let tempo = plan_rng.gen_range(tmin..=tmax);
        let time_signature = *profile
            .time_signatures
            .choose(&mut plan_rng)
            .unwrap_or(&TimeSignature::COMMON);
        let key = Note::from_pitch_class(plan_rng.gen_range(0..12));
        let scale_type = *profile.scales.choose(&mut plan_rng).unwrap_or(&ScaleType::Major);
        let progression =
            chord::plan_progression(profile.chord_complexity, &time_signature, ppqn, bars, &mut plan_rng);

        let ctx = GeneratorContext {
            profile,
            scale: Scale::new(key, scale_type),
            time_signature,
            ppqn,
            bars,
            progression: &progression,
        };
        let length = ctx.length_ticks();

        let mut next_channel = 0u8;
        let mut tracks = Vec::with_capacity(profile.instruments.len());
        for (index, role) in profile.instruments.iter().enumerate() {
            let kind = TrackKind::for_role(role);
            let channel = if kind.is_percussive() {
                DRUM_CHANNEL
            } else {
                if next_channel == DRUM_CHANNEL {
                    next_channel += 1;
                }
                let ch = next_channel.min(15);
                next_channel = next_channel.saturating_add(1);
                ch
            };

            let notes = match generators::for_kind(kind) {
                Some(mut gen) => {
                    let mut rng = stream(seed, index as u64);
                    let raw = gen.generate(&ctx, &mut rng);
                    finalize_notes(raw, channel, length, profile.velocity_range)
                }
                None => Vec::new(),
            };

            tracks.push(Track {
                role: role.clone(),
                kind,
                channel,
                program: if kind.is_percussive() { None } else { program_for_role(role) },
                notes,
            });
        }

        let composition = Composition {
            genre: profile.id.clone(),
            seed,
            bars,
            tempo,
            time_signature,
            ppqn,
            key,
            scale_type,
            tracks,
        };
        debug!(
            genre = %composition.genre,
            seed,
            bars,
            tempo,
            notes = composition.note_count(),
            "composition generated"
        );
        Ok(composition)
    }
}

/// Clip notes to the composition length, clamp velocities, set the channel
/// and sort by start tick.
pub fn finalize_notes(
    notes: Vec<NoteEvent>,
    channel: u8,
    length_ticks: u64,
    velocity_range: (u8, u8),
) -> Vec<NoteEvent> {
    let (vmin, vmax) = velocity_range;
    let mut out: Vec<NoteEvent> = notes
        .into_iter()
        .filter(|n| n.start_tick < length_ticks)
        .map(|mut n| {
            n.duration_ticks = n.duration_ticks.clamp(1, length_ticks - n.start_tick);
            n.velocity = n.velocity.clamp(vmin, vmax);
            n.pitch = n.pitch.min(127);
            n.channel = channel;
            n
        })
        .collect();
    out.sort_by_key(|n| (n.start_tick, n.pitch));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genres::GenreRegistry;

    fn profile(id: &str) -> GenreProfile {
        GenreRegistry::builtin().get(id).unwrap().clone()
    }

    #[test]
    fn test_same_seed_same_composition() {
        let engine = CompositionEngine::default();
        let p = profile("reggaeton");
        let a = engine.generate(&p, 8, Some(42)).unwrap();
        let b = engine.generate(&p, 8, Some(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed, 42);
    }

    #[test]
    fn test_different_seeds_differ() {
        let engine = CompositionEngine::default();
        let p = profile("house");
        let a = engine.generate(&p, 4, Some(1)).unwrap();
        let b = engine.generate(&p, 4, Some(2)).unwrap();
        assert_ne!(a.tracks, b.tracks);
    }

    #[test]
    fn test_missing_seed_is_reported() {
        let engine = CompositionEngine::default();
        let p = profile("pop");
        let a = engine.generate(&p, 2, None).unwrap();
        let b = engine.generate(&p, 2, Some(a.seed)).unwrap();
        assert_eq!(a, b);
        assert!(a.seed <= MAX_DRAWN_SEED);
    }

    #[test]
    fn test_bars_validation() {
        let engine = CompositionEngine::default();
        let p = profile("pop");
        assert!(matches!(engine.generate(&p, 0, Some(1)), Err(ComposerError::Validation(_))));
        assert!(matches!(engine.generate(&p, -3, Some(1)), Err(ComposerError::Validation(_))));
        assert!(matches!(engine.generate(&p, 100_000, Some(1)), Err(ComposerError::Validation(_))));
    }

    #[test]
    fn test_ranges_hold_for_all_genres() {
        let engine = CompositionEngine::default();
        for p in GenreRegistry::builtin().profiles() {
            let c = engine.generate(p, 4, Some(7)).unwrap();
            let (tmin, tmax) = p.tempo_range;
            assert!(c.tempo >= tmin && c.tempo <= tmax, "{} tempo", p.id);
            let (vmin, vmax) = p.velocity_range;
            let length = c.length_ticks();
            for track in &c.tracks {
                for n in &track.notes {
                    assert!(n.velocity >= vmin && n.velocity <= vmax, "{} velocity", p.id);
                    assert!(n.duration_ticks > 0);
                    assert!(n.end_tick() <= length, "{} note past end", p.id);
                    assert!(n.pitch <= 127);
                }
            }
        }
    }

    #[test]
    fn test_tracks_follow_instruments() {
        let engine = CompositionEngine::default();
        let p = profile("trap");
        let c = engine.generate(&p, 4, Some(3)).unwrap();
        let roles: Vec<&str> = c.tracks.iter().map(|t| t.role.as_str()).collect();
        assert_eq!(roles, vec!["drums", "808", "lead", "pad", "vocals"]);
        let vocals = &c.tracks[4];
        assert_eq!(vocals.kind, TrackKind::Silent);
        assert!(vocals.notes.is_empty());
        assert_eq!(c.tracks[0].channel, DRUM_CHANNEL);
        assert!(c.tracks.iter().filter(|t| !t.kind.is_percussive()).all(|t| t.channel != DRUM_CHANNEL));
    }

    #[test]
    fn test_track_streams_are_independent() {
        let engine = CompositionEngine::default();
        let full = profile("house");
        let mut trimmed = full.clone();
        trimmed.instruments.truncate(2);
        let a = engine.generate(&full, 4, Some(10)).unwrap();
        let b = engine.generate(&trimmed, 4, Some(10)).unwrap();
        assert_eq!(a.tracks[..2], b.tracks[..2]);
    }

    #[test]
    fn test_finalize_clips_and_clamps() {
        let notes = vec![
            NoteEvent::new(60, 127, 100, 5000),
            NoteEvent::new(62, 1, 0, 10),
            NoteEvent::new(64, 90, 2000, 10),
        ];
        let out = finalize_notes(notes, 2, 1920, (40, 100));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].velocity, 40);
        assert_eq!(out[1].end_tick(), 1920);
        assert_eq!(out[1].velocity, 100);
        assert!(out.iter().all(|n| n.channel == 2));
    }

    #[test]
    fn test_waltz_uses_three_four() {
        let engine = CompositionEngine::default();
        let c = engine.generate(&profile("waltz"), 4, Some(5)).unwrap();
        assert_eq!(c.time_signature, TimeSignature::new(3, 4).unwrap());
        assert_eq!(c.length_ticks(), 4 * 1440);
    }
}
