// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bass line generator following the planned chord roots.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::rhythm::{onset_grid, step_tick, strength_of};
use super::{Generator, GeneratorContext, PlannedChord};
use crate::engine::composition::NoteEvent;
use crate::genres::BassStyle;
use crate::music::MidiNote;

/// Lowest and highest pitch the bass may play
const BASS_RANGE: (MidiNote, MidiNote) = (28, 60);

/// Bass generator; the style comes from the genre profile
pub struct BassGenerator {
    base_octave: i8,
    gate: f64,
}

impl BassGenerator {
    pub fn new() -> Self {
        Self {
            base_octave: 2,
            gate: 0.85,
        }
    }

    fn clamp_range(pitch: i32) -> MidiNote {
        let mut p = pitch;
        while p < BASS_RANGE.0 as i32 {
            p += 12;
        }
        while p > BASS_RANGE.1 as i32 {
            p -= 12;
        }
        p as MidiNote
    }

    fn root(&self, ctx: &GeneratorContext, chord: &PlannedChord) -> MidiNote {
        let reference = ctx.scale.root_pitch(self.base_octave);
        Self::clamp_range(ctx.scale.pitch_at(reference, chord.degree) as i32)
    }

    fn fifth(&self, ctx: &GeneratorContext, chord: &PlannedChord) -> MidiNote {
        let reference = ctx.scale.root_pitch(self.base_octave);
        Self::clamp_range(ctx.scale.pitch_at(reference, chord.degree + 4) as i32)
    }

    /// Beat-start steps inside a chord span
    fn beat_steps(ctx: &GeneratorContext, chord: &PlannedChord) -> Vec<u64> {
        let tps = ctx.ticks_per_step();
        let beat = ctx.time_signature.steps_per_beat().max(1) as u64;
        let first = chord.start_tick / tps;
        let last = chord.end_tick.div_ceil(tps);
        (first..last).step_by(beat as usize).collect()
    }

    /// Emit notes at steps, each sustaining toward the next or the chord end
    fn emit(
        &self,
        ctx: &GeneratorContext,
        chord: &PlannedChord,
        hits: &[(u64, MidiNote)],
        rng: &mut ChaCha8Rng,
        events: &mut Vec<NoteEvent>,
    ) {
        for (i, &(step, pitch)) in hits.iter().enumerate() {
            let start = step_tick(ctx, step);
            let next = hits
                .get(i + 1)
                .map(|&(s, _)| step_tick(ctx, s))
                .unwrap_or(chord.end_tick);
            let duration = ((next.saturating_sub(start) as f64 * self.gate) as u64).max(1);
            let level = 0.45 + 0.45 * strength_of(ctx, step) + rng.gen_range(-0.05..0.05);
            events.push(NoteEvent::new(pitch, ctx.velocity_for(level), start, duration));
        }
    }

    fn root_line(&self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        for chord in ctx.progression {
            let root = self.root(ctx, chord);
            let mut hits = Vec::new();
            for (i, step) in Self::beat_steps(ctx, chord).into_iter().enumerate() {
                if i == 0 || rng.gen_bool((ctx.profile.note_density * 0.6).clamp(0.0, 1.0)) {
                    hits.push((step, root));
                }
            }
            self.emit(ctx, chord, &hits, rng, &mut events);
        }
        events
    }

    fn root_fifth(&self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        // Half-note motion at low density, quarter notes otherwise
        let every = if ctx.profile.note_density < 0.5 { 2 } else { 1 };
        for chord in ctx.progression {
            let (root, fifth) = (self.root(ctx, chord), self.fifth(ctx, chord));
            let hits: Vec<(u64, MidiNote)> = Self::beat_steps(ctx, chord)
                .into_iter()
                .step_by(every)
                .enumerate()
                .map(|(i, step)| (step, if i % 2 == 0 { root } else { fifth }))
                .collect();
            self.emit(ctx, chord, &hits, rng, &mut events);
        }
        events
    }

    fn walking(&self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        let reference = ctx.scale.root_pitch(self.base_octave);
        for (ci, chord) in ctx.progression.iter().enumerate() {
            let next_root = ctx
                .progression
                .get(ci + 1)
                .map(|c| self.root(ctx, c))
                .unwrap_or_else(|| self.root(ctx, chord));
            let beats = Self::beat_steps(ctx, chord);
            let mut degree = ctx.scale.nearest_degree(reference, self.root(ctx, chord));
            let mut hits = Vec::with_capacity(beats.len());
            for (i, &step) in beats.iter().enumerate() {
                let pitch = if i == 0 {
                    self.root(ctx, chord)
                } else if i + 1 == beats.len() {
                    // Chromatic approach into the next root
                    let side: i32 = if rng.gen_bool(0.5) { 1 } else { -1 };
                    Self::clamp_range(next_root as i32 + side)
                } else {
                    let target = ctx.scale.nearest_degree(reference, next_root);
                    let mut dir = (target - degree).signum();
                    if dir == 0 {
                        dir = if rng.gen_bool(0.5) { 1 } else { -1 };
                    }
                    degree += dir;
                    Self::clamp_range(ctx.scale.pitch_at(reference, degree) as i32)
                };
                hits.push((step, pitch));
            }
            self.emit(ctx, chord, &hits, rng, &mut events);
        }
        events
    }

    fn eight_oh_eight(&self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        let onsets = onset_grid(ctx, rng, 0.5, true);
        let mut events = Vec::new();
        for chord in ctx.progression {
            let root = self.root(ctx, chord);
            let hits: Vec<(u64, MidiNote)> = onsets
                .iter()
                .filter(|o| o.tick >= chord.start_tick && o.tick < chord.end_tick)
                .map(|o| {
                    let slide_up = o.strength < 0.5 && rng.gen_bool(0.2);
                    (o.step, if slide_up { Self::clamp_range(root as i32 + 12) } else { root })
                })
                .collect();
            let hits = if hits.is_empty() {
                vec![(chord.start_tick / ctx.ticks_per_step(), root)]
            } else {
                hits
            };
            self.emit(ctx, chord, &hits, rng, &mut events);
        }
        events
    }

    fn tumbao(&self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        let spb = ctx.steps_per_bar() as u64;
        let tps = ctx.ticks_per_step();
        for (ci, chord) in ctx.progression.iter().enumerate() {
            let next = ctx.progression.get(ci + 1).unwrap_or(chord);
            let first = chord.start_tick / tps;
            let last = chord.end_tick.div_ceil(tps);
            // "And" of two and beat four, the second anticipating the next chord
            let hits: Vec<(u64, MidiNote)> = (first..last)
                .filter_map(|step| {
                    let pos = step % spb;
                    if pos * 8 == spb * 3 {
                        Some((step, self.fifth(ctx, chord)))
                    } else if pos * 4 == spb * 3 {
                        Some((step, self.root(ctx, next)))
                    } else {
                        None
                    }
                })
                .collect();
            let hits = if hits.is_empty() {
                vec![(first, self.root(ctx, chord))]
            } else {
                hits
            };
            self.emit(ctx, chord, &hits, rng, &mut events);
        }
        events
    }
}

impl Default for BassGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for BassGenerator {
    fn generate(&mut self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        match ctx.profile.bass_style {
            BassStyle::Root => self.root_line(ctx, rng),
            BassStyle::RootFifth => self.root_fifth(ctx, rng),
            BassStyle::Walking => self.walking(ctx, rng),
            BassStyle::EightOhEight => self.eight_oh_eight(ctx, rng),
            BassStyle::Tumbao => self.tumbao(ctx, rng),
        }
    }

    fn name(&self) -> &str {
        "bass"
    }
}
