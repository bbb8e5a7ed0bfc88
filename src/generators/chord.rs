// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord progressions and the harmony track.
//!
//! The progression is planned once per composition and shared by the
//! harmony and bass generators. The chord-complexity parameter selects the
//! progression tier and the chance of stacking sevenths and ninths.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::rhythm::{step_tick, strength_of};
use super::{Generator, GeneratorContext};
use crate::engine::composition::NoteEvent;
use crate::music::TimeSignature;

/// Progressions as zero-based scale degrees, by complexity tier
const SIMPLE_PROGRESSIONS: [[i32; 4]; 3] = [[0, 3, 4, 0], [0, 4, 3, 4], [0, 3, 0, 4]];
const POP_PROGRESSIONS: [[i32; 4]; 3] = [[0, 5, 3, 4], [0, 4, 5, 3], [5, 3, 0, 4]];
const JAZZ_PROGRESSIONS: [[i32; 4]; 3] = [[1, 4, 0, 5], [0, 5, 1, 4], [2, 5, 1, 4]];

/// One chord of the planned progression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedChord {
    /// Zero-based scale degree of the chord root
    pub degree: i32,
    pub start_tick: u64,
    pub end_tick: u64,
    pub seventh: bool,
    pub ninth: bool,
}

impl PlannedChord {
    /// Scale degrees of the chord tones, stacked in thirds from the root
    pub fn tones(&self) -> Vec<i32> {
        let mut tones = vec![self.degree, self.degree + 2, self.degree + 4];
        if self.seventh {
            tones.push(self.degree + 6);
        }
        if self.ninth {
            tones.push(self.degree + 8);
        }
        tones
    }
}

/// Pick the degree pattern for a chord complexity
pub fn progression_for(complexity: f64, rng: &mut ChaCha8Rng) -> [i32; 4] {
    let tier: &[[i32; 4]] = if complexity < 0.3 {
        &SIMPLE_PROGRESSIONS
    } else if complexity < 0.6 {
        &POP_PROGRESSIONS
    } else {
        &JAZZ_PROGRESSIONS
    };
    tier.choose(rng).copied().unwrap_or([0, 3, 4, 0])
}

/// Plan the chords for a whole composition.
///
/// One chord per bar; complex harmony in long bars changes chord every
/// half bar. Sevenths are added with probability `complexity` and ninths
/// (on top of a seventh) with probability `complexity` again.
pub fn plan_progression(
    complexity: f64,
    ts: &TimeSignature,
    ppqn: u32,
    bars: u32,
    rng: &mut ChaCha8Rng,
) -> Vec<PlannedChord> {
    let complexity = complexity.clamp(0.0, 1.0);
    let pattern = progression_for(complexity, rng);
    let bar_ticks = ts.ticks_per_bar(ppqn);
    let per_bar: u64 = if complexity >= 0.6 && ts.steps_per_bar() >= 16 { 2 } else { 1 };
    let span = bar_ticks / per_bar;

    (0..bars as u64 * per_bar)
        .map(|i| {
            let seventh = rng.gen_bool(complexity);
            let ninth = seventh && rng.gen_bool(complexity);
            let end_tick = if i + 1 == bars as u64 * per_bar {
                bar_ticks * bars as u64
            } else {
                (i + 1) * span
            };
            PlannedChord {
                degree: pattern[(i % 4) as usize],
                start_tick: i * span,
                end_tick,
                seventh,
                ninth,
            }
        })
        .collect()
}

/// Configuration for the harmony generator
#[derive(Debug, Clone)]
struct ChordConfig {
    /// Base octave of the voicing
    base_octave: i8,
    /// Share of the gap to the next hit that a chord sustains
    gate: f64,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            base_octave: 3,
            gate: 0.9,
        }
    }
}

/// Harmony track generator: comps the planned chords on a beat grid
pub struct ChordGenerator {
    config: ChordConfig,
}

impl ChordGenerator {
    pub fn new() -> Self {
        Self {
            config: ChordConfig::default(),
        }
    }

    /// Hit positions (absolute steps) inside one chord span
    fn comp_steps(&self, ctx: &GeneratorContext, chord: &PlannedChord, rng: &mut ChaCha8Rng) -> Vec<u64> {
        let tps = ctx.ticks_per_step();
        let first = chord.start_tick / tps;
        let last = chord.end_tick.div_ceil(tps);
        let beat = ctx.time_signature.steps_per_beat().max(1) as u64;
        let density = ctx.profile.note_density;
        let syncopation = ctx.profile.syncopation;

        let mut steps = vec![first];
        let mut step = first + beat;
        while step < last {
            if rng.gen_bool((0.2 + 0.7 * density).clamp(0.0, 1.0)) {
                // Push the hit onto the preceding off-beat
                let pushed = beat >= 2 && rng.gen_bool(syncopation * 0.6);
                steps.push(if pushed { step - beat / 2 } else { step });
            }
            step += beat;
        }
        steps.dedup();
        steps
    }
}

impl Default for ChordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for ChordGenerator {
    fn generate(&mut self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        let reference = ctx.scale.root_pitch(self.config.base_octave);
        let mut events = Vec::new();

        for chord in ctx.progression {
            let steps = self.comp_steps(ctx, chord, rng);
            let pitches: Vec<u8> = chord
                .tones()
                .into_iter()
                .map(|degree| ctx.scale.pitch_at(reference, degree))
                .collect();

            for (i, &step) in steps.iter().enumerate() {
                let start = step_tick(ctx, step).max(chord.start_tick);
                let next = steps
                    .get(i + 1)
                    .map(|&s| step_tick(ctx, s))
                    .unwrap_or(chord.end_tick);
                let span = next.saturating_sub(start);
                let duration = ((span as f64 * self.config.gate) as u64).max(1);
                let level = 0.3 + 0.5 * strength_of(ctx, step) + rng.gen_range(-0.08..0.08);
                let velocity = ctx.velocity_for(level);

                for &pitch in &pitches {
                    events.push(NoteEvent::new(pitch, velocity, start, duration));
                }
            }
        }
        events
    }

    fn name(&self) -> &str {
        "chord"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::with_context;
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_progression_tiers() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(SIMPLE_PROGRESSIONS.contains(&progression_for(0.1, &mut rng)));
        assert!(POP_PROGRESSIONS.contains(&progression_for(0.45, &mut rng)));
        assert!(JAZZ_PROGRESSIONS.contains(&progression_for(0.9, &mut rng)));
    }

    #[test]
    fn test_plan_covers_composition() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let ts = TimeSignature::COMMON;
        let plan = plan_progression(0.2, &ts, 480, 8, &mut rng);
        assert_eq!(plan.len(), 8);
        assert_eq!(plan[0].start_tick, 0);
        assert_eq!(plan.last().unwrap().end_tick, 8 * 1920);
        for pair in plan.windows(2) {
            assert_eq!(pair[0].end_tick, pair[1].start_tick);
        }
    }

    #[test]
    fn test_complex_harmony_changes_twice_per_bar() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let plan = plan_progression(0.9, &TimeSignature::COMMON, 480, 4, &mut rng);
        assert_eq!(plan.len(), 8);
    }

    #[test]
    fn test_zero_complexity_has_plain_triads() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let plan = plan_progression(0.0, &TimeSignature::COMMON, 480, 16, &mut rng);
        assert!(plan.iter().all(|c| !c.seventh && !c.ninth));
        assert!(plan.iter().all(|c| c.tones().len() == 3));
    }

    #[test]
    fn test_ninth_implies_seventh() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let plan = plan_progression(0.8, &TimeSignature::COMMON, 480, 32, &mut rng);
        assert!(plan.iter().all(|c| !c.ninth || c.seventh));
        assert!(plan.iter().any(|c| c.seventh));
    }

    #[test]
    fn test_chord_generator_stays_in_chord_spans() {
        with_context("pop", |ctx| {
            let mut gen = ChordGenerator::new();
            let notes = gen.generate(ctx, &mut ChaCha8Rng::seed_from_u64(4));
            assert!(!notes.is_empty());
            for n in &notes {
                let chord = ctx.chord_at(n.start_tick).unwrap();
                assert!(n.start_tick + n.duration_ticks <= chord.end_tick);
                assert!(ctx.scale.contains_midi(n.pitch));
            }
        });
    }
}
