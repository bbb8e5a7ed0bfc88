// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Drum generator with genre templates and Euclidean rhythms.
//!
//! Templates are written on a 16-step bar and wrap for other meters;
//! Euclidean voices are computed for the actual bar length. The accent
//! curve maps metric strength onto the profile's velocity range so strong
//! beats land near the top and weak 16ths near the bottom.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::rhythm::{step_tick, strength_of};
use super::{Generator, GeneratorContext};
use crate::engine::composition::NoteEvent;
use crate::genres::DrumPattern;

/// Standard General MIDI drum notes
pub mod gm_drums {
    pub const KICK: u8 = 36;
    pub const RIM: u8 = 37;
    pub const SNARE: u8 = 38;
    pub const CLAP: u8 = 39;
    pub const CLOSED_HAT: u8 = 42;
    pub const LOW_TOM: u8 = 45;
    pub const OPEN_HAT: u8 = 46;
    pub const MID_TOM: u8 = 47;
    pub const CRASH: u8 = 49;
    pub const HIGH_TOM: u8 = 50;
    pub const RIDE: u8 = 51;
    pub const COWBELL: u8 = 56;
    pub const HIGH_CONGA: u8 = 62;
    pub const LOW_CONGA: u8 = 64;
    pub const CLAVES: u8 = 75;
    pub const SHAKER: u8 = 82;
}

/// Which part of the kit a generator plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrumLayer {
    /// Kick, snare, cymbals
    Kit,
    /// Hand percussion layered on the kit
    Percussion,
}

/// One drum instrument and its step pattern
#[derive(Debug, Clone)]
struct DrumVoice {
    /// MIDI note number
    note: u8,
    /// Hit pattern, wrapped over the bar
    pattern: Vec<bool>,
    /// Probability of each hit playing (0.0 - 1.0)
    probability: f64,
    /// Accent weight (scales the accent curve)
    weight: f64,
    /// Ghost note positions
    ghost_pattern: Vec<bool>,
}

impl DrumVoice {
    fn new(note: u8, steps: &[usize]) -> Self {
        Self {
            note,
            pattern: steps_to_pattern(steps, 16),
            probability: 1.0,
            weight: 1.0,
            ghost_pattern: Vec::new(),
        }
    }

    fn every(note: u8, interval: usize, offset: usize) -> Self {
        let steps: Vec<usize> = (offset..16).step_by(interval.max(1)).collect();
        Self::new(note, &steps)
    }

    fn with_pattern(mut self, pattern: Vec<bool>) -> Self {
        self.pattern = pattern;
        self
    }

    fn with_ghosts(mut self, steps: &[usize]) -> Self {
        self.ghost_pattern = steps_to_pattern(steps, 16);
        self
    }

    fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability.clamp(0.0, 1.0);
        self
    }

    fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    fn hits_at(&self, step_in_bar: usize) -> bool {
        !self.pattern.is_empty() && self.pattern[step_in_bar % self.pattern.len()]
    }

    fn ghost_at(&self, step_in_bar: usize) -> bool {
        !self.ghost_pattern.is_empty() && self.ghost_pattern[step_in_bar % self.ghost_pattern.len()]
    }
}

fn steps_to_pattern(steps: &[usize], len: usize) -> Vec<bool> {
    let mut pattern = vec![false; len];
    for &s in steps {
        if s < len {
            pattern[s] = true;
        }
    }
    pattern
}

/// Generate a Euclidean rhythm pattern (Bjorklund's algorithm)
pub fn euclidean(hits: usize, steps: usize) -> Vec<bool> {
    if steps == 0 {
        return vec![];
    }
    if hits >= steps {
        return vec![true; steps];
    }
    if hits == 0 {
        return vec![false; steps];
    }

    let mut pattern = vec![vec![true]; hits];
    let mut remainder = vec![vec![false]; steps - hits];

    while remainder.len() > 1 {
        let min_len = pattern.len().min(remainder.len());
        for i in 0..min_len {
            let tail = remainder[i].clone();
            pattern[i].extend(tail);
        }
        let new_remainder: Vec<Vec<bool>> = if pattern.len() > min_len {
            pattern.drain(min_len..).collect()
        } else {
            remainder.drain(min_len..).collect()
        };
        remainder = new_remainder;
    }

    let mut result: Vec<bool> = pattern.into_iter().flatten().collect();
    for r in remainder {
        result.extend(r);
    }
    result
}

/// Rotate a pattern right by `by` steps
fn rotate(mut pattern: Vec<bool>, by: usize) -> Vec<bool> {
    if !pattern.is_empty() {
        let by = by % pattern.len();
        pattern.rotate_right(by);
    }
    pattern
}

/// Kit voices for a template
fn kit_voices(pattern: DrumPattern, steps_per_bar: usize, density: f64) -> Vec<DrumVoice> {
    use gm_drums::*;

    // Sparse profiles thin the hats to quarter notes
    let hats = if density < 0.35 {
        DrumVoice::every(CLOSED_HAT, 4, 0)
    } else {
        DrumVoice::every(CLOSED_HAT, 2, 0)
    }
    .with_weight(0.7);

    match pattern {
        DrumPattern::FourOnTheFloor => vec![
            DrumVoice::every(KICK, 4, 0),
            DrumVoice::new(CLAP, &[4, 12]),
            DrumVoice::every(OPEN_HAT, 4, 2).with_weight(0.8),
            hats,
        ],
        DrumPattern::Backbeat => vec![
            DrumVoice::new(KICK, &[0, 8, 10]).with_probability(0.95),
            DrumVoice::new(SNARE, &[4, 12]),
            hats,
        ],
        DrumPattern::Breakbeat => vec![
            DrumVoice::new(KICK, &[0, 6, 10]),
            DrumVoice::new(SNARE, &[4, 12]).with_ghosts(&[7, 11]),
            DrumVoice::every(CLOSED_HAT, 1, 0).with_weight(0.6),
        ],
        DrumPattern::Trap => vec![
            DrumVoice::new(KICK, &[0, 7, 11]).with_probability(0.9),
            DrumVoice::new(CLAP, &[8]),
            DrumVoice::every(CLOSED_HAT, 1, 0).with_weight(0.6),
            DrumVoice::new(OPEN_HAT, &[14]).with_probability(0.4),
        ],
        DrumPattern::BoomBap => vec![
            DrumVoice::new(KICK, &[0, 7, 10]),
            DrumVoice::new(SNARE, &[4, 12]).with_ghosts(&[15]),
            hats,
        ],
        DrumPattern::Dembow => vec![
            DrumVoice::every(KICK, 4, 0),
            DrumVoice::new(SNARE, &[3, 6, 11, 14]),
            hats,
        ],
        DrumPattern::Clave => vec![
            DrumVoice::new(KICK, &[0, 8]).with_weight(0.8),
            DrumVoice::new(CLAVES, &[0, 3, 6, 10, 12]),
            DrumVoice::every(COWBELL, 4, 0).with_weight(0.7),
        ],
        DrumPattern::OneDrop => vec![
            DrumVoice::new(KICK, &[8]),
            DrumVoice::new(RIM, &[8]),
            hats,
        ],
        DrumPattern::JazzRide => vec![
            DrumVoice::new(RIDE, &[0, 4, 6, 8, 12, 14]),
            DrumVoice::every(KICK, 4, 0).with_weight(0.35),
            DrumVoice::new(CLOSED_HAT, &[4, 12]).with_weight(0.6),
            DrumVoice::new(SNARE, &[]).with_ghosts(&[6, 11, 14]),
        ],
        DrumPattern::Euclidean => {
            let n = steps_per_bar.max(1);
            let hat_hits = ((n as f64) * (0.3 + 0.5 * density)).round() as usize;
            vec![
                DrumVoice::new(KICK, &[]).with_pattern(euclidean(3.max(n / 5), n)),
                DrumVoice::new(SNARE, &[]).with_pattern(rotate(euclidean(2.max(n / 8), n), n / 4)),
                DrumVoice::new(CLOSED_HAT, &[]).with_pattern(euclidean(hat_hits, n)).with_weight(0.7),
            ]
        }
        DrumPattern::None => Vec::new(),
    }
}

/// Hand-percussion voices for a template
fn percussion_voices(pattern: DrumPattern, steps_per_bar: usize, density: f64) -> Vec<DrumVoice> {
    use gm_drums::*;

    let shaker = DrumVoice::every(SHAKER, if density < 0.5 { 2 } else { 1 }, 0)
        .with_weight(0.5)
        .with_probability(0.9);
    match pattern {
        DrumPattern::None => Vec::new(),
        DrumPattern::Clave => vec![
            DrumVoice::new(CLAVES, &[0, 3, 6, 10, 12]),
            DrumVoice::new(HIGH_CONGA, &[2, 3, 10, 11]).with_weight(0.8),
            DrumVoice::new(LOW_CONGA, &[6, 7, 14, 15]).with_weight(0.9),
            shaker,
        ],
        DrumPattern::Euclidean => {
            let n = steps_per_bar.max(1);
            vec![
                DrumVoice::new(HIGH_CONGA, &[]).with_pattern(euclidean(5.min(n), n)).with_weight(0.8),
                DrumVoice::new(LOW_CONGA, &[]).with_pattern(rotate(euclidean(3.min(n), n), 2)),
                shaker,
            ]
        }
        _ => vec![
            DrumVoice::new(HIGH_CONGA, &[2, 10]).with_weight(0.8),
            DrumVoice::new(LOW_CONGA, &[6, 14]),
            shaker,
        ],
    }
}

/// Drum pattern generator
pub struct DrumGenerator {
    layer: DrumLayer,
    /// Fill every N bars (0 disables fills)
    fill_every_bars: u32,
    /// Probability of a fill when one is due
    fill_probability: f64,
}

impl DrumGenerator {
    /// Generator for the main kit
    pub fn kit() -> Self {
        Self {
            layer: DrumLayer::Kit,
            fill_every_bars: 4,
            fill_probability: 0.5,
        }
    }

    /// Generator for a hand-percussion layer
    pub fn percussion() -> Self {
        Self {
            layer: DrumLayer::Percussion,
            fill_every_bars: 0,
            fill_probability: 0.0,
        }
    }

    /// Accent curve: 0..=1 level from metric strength and voice weight
    fn accent_level(strength: f64, weight: f64, rng: &mut ChaCha8Rng) -> f64 {
        strength.powf(1.5) * weight + rng.gen_range(-0.04..0.04)
    }

    /// Tom run over the last beat of a bar
    fn fill(&self, ctx: &GeneratorContext, bar: u64, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        use gm_drums::*;
        let spb = ctx.steps_per_bar() as u64;
        let tps = ctx.ticks_per_step();
        let toms = [HIGH_TOM, MID_TOM, LOW_TOM, KICK];
        let start = spb.saturating_sub(4);
        (start..spb)
            .enumerate()
            .map(|(i, s)| {
                let step = bar * spb + s;
                let level = 0.6 + 0.1 * i as f64 + rng.gen_range(-0.05..0.05);
                NoteEvent::new(toms[i % toms.len()], ctx.velocity_for(level), step_tick(ctx, step), (tps / 2).max(1))
            })
            .collect()
    }
}

impl Generator for DrumGenerator {
    fn generate(&mut self, ctx: &GeneratorContext, rng: &mut ChaCha8Rng) -> Vec<NoteEvent> {
        let pattern = ctx.profile.drum_pattern;
        let spb = ctx.steps_per_bar() as usize;
        let density = ctx.profile.note_density;
        let voices = match self.layer {
            DrumLayer::Kit => kit_voices(pattern, spb, density),
            DrumLayer::Percussion => percussion_voices(pattern, spb, density),
        };
        if voices.is_empty() {
            return Vec::new();
        }

        let tps = ctx.ticks_per_step();
        let hit_len = (tps / 2).max(1);
        let roll_p = if pattern == DrumPattern::Trap {
            (ctx.profile.syncopation * 0.3).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut events = Vec::new();

        for bar in 0..ctx.bars as u64 {
            let fill_due = self.fill_every_bars > 0
                && (bar + 1) % self.fill_every_bars as u64 == 0
                && rng.gen_bool(self.fill_probability);
            let fill_from = if fill_due { spb.saturating_sub(4) } else { spb };

            for s in 0..fill_from {
                let step = bar * spb as u64 + s as u64;
                let tick = step_tick(ctx, step);
                let strength = strength_of(ctx, step);

                for voice in &voices {
                    if voice.hits_at(s) && rng.gen_bool(voice.probability) {
                        let level = Self::accent_level(strength, voice.weight, rng);
                        events.push(NoteEvent::new(voice.note, ctx.velocity_for(level), tick, hit_len));

                        // Trap hi-hat rolls: an extra 32nd inside the step
                        if voice.note == gm_drums::CLOSED_HAT && roll_p > 0.0 && rng.gen_bool(roll_p) {
                            let level = Self::accent_level(0.25, voice.weight, rng);
                            let roll_len = (hit_len / 2).max(1);
                            events.push(NoteEvent::new(voice.note, ctx.velocity_for(level), tick + hit_len, roll_len));
                        }
                    } else if voice.ghost_at(s) {
                        let level = rng.gen_range(0.0..0.1);
                        events.push(NoteEvent::new(voice.note, ctx.velocity_for(level), tick, (hit_len / 2).max(1)));
                    }
                }
            }

            if fill_due {
                events.extend(self.fill(ctx, bar, rng));
            }
        }

        // Crash on the very first downbeat of the kit
        if self.layer == DrumLayer::Kit && pattern != DrumPattern::JazzRide {
            let level = Self::accent_level(1.0, 0.9, rng);
            events.push(NoteEvent::new(gm_drums::CRASH, ctx.velocity_for(level), 0, tps * 4));
        }
        events.sort_by_key(|e| (e.start_tick, e.pitch));
        events
    }

    fn name(&self) -> &str {
        match self.layer {
            DrumLayer::Kit => "drums",
            DrumLayer::Percussion => "percussion",
        }
    }
}
