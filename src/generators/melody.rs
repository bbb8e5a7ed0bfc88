// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Melodic generator: a weighted scale walk over the onset grid.
//!
//! Intervals are sampled from Markov-style weights over -7..=+7 scale
//! degrees. Low chord complexity keeps the walk stepwise; higher values
//! widen the leaps and let chromatic approach tones slip in.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::rhythm::{gaps, onset_grid};
use super::{Generator, GeneratorContext};
use crate::engine::composition::NoteEvent;

/// Configuration for the melody generator
#[derive(Debug, Clone)]
struct MelodyConfig {
    /// Octave of degree 0
    base_octave: i8,
    /// Lowest reachable degree relative to the root
    min_degree: i32,
    /// Highest reachable degree, in octaves above the root
    octave_range: i32,
    /// Share of the gap to the next onset a note sustains
    gate: f64,
    /// Longest note in 16th steps
    max_steps: u64,
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            base_octave: 4,
            min_degree: -3,
            octave_range: 2,
            gate: 0.9,
            max_steps: 8,
        }
    }
}

/// Interval transition weights
#[derive(Debug, Clone)]
struct IntervalProbabilities {
    /// Weights for each interval (-7 to +7 scale degrees)
    weights: [f64; 15],
}

impl IntervalProbabilities {
    /// Weights decaying with interval size; `complexity` flattens the decay
    fn for_complexity(complexity: f64) -> Self {
        let spread = 0.8 + 2.5 * complexity.clamp(0.0, 1.0);
        let mut weights = [0.0; 15];
        for (i, w) in weights.iter_mut().enumerate() {
            let interval = i as f64 - 7.0;
            *w = (-interval.abs() / spread).exp();
        }
        // Repeated notes are less common than steps
        weights[7] *= 0.45;
        Self { weights }
    }

    /// Sample an interval based on weights
    fn sample(&self, rng: &mut ChaCha8Rng) -> i32 {
        let total: f64 = self.weights.iter().sum();
        let mut roll = rng.gen::<f64>() * total;

        for (i, &weight) in self.weights.iter().enumerate() {
            roll -= weight;
            if roll <= 0.0 {
                return i as i32 - 7;
            }
        }
        0
    }
}

/// Melody generator
pub struct MelodyGenerator {
    config: MelodyConfig,
}

impl MelodyGenerator {
    pub fn new() -> Self {
        Self {
            config: MelodyConfig::default(),
        }
    }

    /// Reflect a degree back into the allowed range
    fn fold_degree(&self, degree: i32, scale_len: i32) -> i32 {
        let lo = self.config.min_degree;
        let hi = scale_len * self.config.octave_range;
        if degree < lo {
            lo + (lo - degree).min(hi - lo)
        } else if degree > hi {
            hi - (degree - hi).min(hi - lo)
        } else {
            degree
        }
    }
}

impl Default for MelodyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for MelodyGenerator {
    fn generate(&mut self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        let complexity = ctx.profile.chord_complexity.clamp(0.0, 1.0);
        let probs = IntervalProbabilities::for_complexity(complexity);
        let chromatic_p = 0.25 * complexity;
        let reference = ctx.scale.root_pitch(self.config.base_octave);
        let scale_len = ctx.scale.len() as i32;
        let tps = ctx.ticks_per_step();
        let end = ctx.length_ticks();

        let onsets = onset_grid(ctx, rng, 1.0, false);
        let gaps = gaps(&onsets, end);

        // Start on a chord tone of the first chord
        let mut degree = ctx
            .chord_at(0)
            .map(|c| c.degree.rem_euclid(scale_len))
            .unwrap_or(0);
        let mut previous_pitch = ctx.scale.pitch_at(reference, degree);
        let mut events = Vec::with_capacity(onsets.len());

        for (onset, gap) in onsets.iter().zip(gaps) {
            degree = self.fold_degree(degree + probs.sample(rng), scale_len);
            let target = ctx.scale.pitch_at(reference, degree);

            let pitch = if target != previous_pitch && rng.gen_bool(chromatic_p) {
                // Chromatic approach from the side we are coming from
                if target > previous_pitch {
                    target.saturating_sub(1)
                } else {
                    target.saturating_add(1).min(127)
                }
            } else {
                target
            };

            let duration = ((gap as f64 * self.config.gate) as u64)
                .min(self.config.max_steps * tps)
                .max(1);
            let level = 0.35 + 0.5 * onset.strength + rng.gen_range(-0.1..0.1);
            events.push(NoteEvent::new(pitch, ctx.velocity_for(level), onset.tick, duration));
            previous_pitch = pitch;
        }
        events
    }

    fn name(&self) -> &str {
        "melody"
    }
}
