// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Onset grid shared by the pitched generators.
//!
//! A bar is divided into 16th-note steps. Each step's chance of carrying
//! an onset is the profile's note density weighted by metric strength.
//! Syncopation then displaces a fraction of onsets by whole steps, and
//! swing delays the off-beat 8ths.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::GeneratorContext;
use crate::music::TimeSignature;

/// One onset on the step grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onset {
    /// Absolute step index from the start of the composition
    pub step: u64,
    /// Start tick including swing delay
    pub tick: u64,
    /// Metric strength of the step (0.25 - 1.0)
    pub strength: f64,
}

/// Metric strength of a step within a bar.
///
/// Downbeat 1.0, other beats 0.75, 8th off-beats 0.5, remaining 16ths 0.25.
/// Compound meters group the 8ths in threes.
pub fn metric_strength(step_in_bar: u32, ts: &TimeSignature) -> f64 {
    if step_in_bar == 0 {
        return 1.0;
    }
    let beat_steps = if ts.is_compound() { 6 } else { ts.steps_per_beat() };
    if step_in_bar % beat_steps == 0 {
        0.75
    } else if step_in_bar % 2 == 0 {
        0.5
    } else {
        0.25
    }
}

/// Swing offset in ticks for a step: off-beat 8ths are delayed by
/// `swing * step / 1.5`.
pub fn swing_offset(step_in_bar: u32, swing: f64, ticks_per_step: u64) -> u64 {
    if swing <= 0.0 || step_in_bar % 4 != 2 {
        return 0;
    }
    (swing.clamp(0.0, 1.0) * ticks_per_step as f64 / 1.5).round() as u64
}

/// Absolute tick of a step with swing applied
pub fn step_tick(ctx: &GeneratorContext, step: u64) -> u64 {
    let tps = ctx.ticks_per_step();
    let in_bar = (step % ctx.steps_per_bar() as u64) as u32;
    step * tps + swing_offset(in_bar, ctx.profile.swing, tps)
}

/// Strength of an absolute step
pub fn strength_of(ctx: &GeneratorContext, step: u64) -> f64 {
    metric_strength((step % ctx.steps_per_bar() as u64) as u32, &ctx.time_signature)
}

/// Build the onset grid for a whole composition.
///
/// `density_scale` lets a generator thin or thicken the grid relative to the
/// profile's note density. The first step of every bar with `force_downbeats`
/// always sounds.
pub fn onset_grid(
    ctx: &GeneratorContext,
    rng: &mut ChaCha8Rng,
    density_scale: f64,
    force_downbeats: bool,
) -> Vec<Onset> {
    let density = (ctx.profile.note_density * density_scale).clamp(0.0, 1.0);
    let syncopation = ctx.profile.syncopation.clamp(0.0, 1.0);
    let total = ctx.total_steps();
    let spb = ctx.steps_per_bar() as u64;

    let mut steps: Vec<u64> = Vec::new();
    for step in 0..total {
        let strength = strength_of(ctx, step);
        let p = (density * (0.35 + 0.65 * strength) * 1.2).clamp(0.0, 1.0);
        let forced = force_downbeats && step % spb == 0;
        // Draw even when forced so the stream stays aligned across densities
        let roll = rng.gen::<f64>();
        if forced || roll < p {
            steps.push(step);
        }
    }

    // Displace a syncopation fraction of onsets by whole steps
    for step in steps.iter_mut() {
        if syncopation > 0.0 && rng.gen_bool(syncopation * 0.5) {
            let moved = match rng.gen_range(0..3) {
                0 => step.checked_sub(1),
                1 => Some(*step + 1),
                _ => Some(*step + 2),
            };
            if let Some(moved) = moved.filter(|&s| s < total) {
                *step = moved;
            }
        }
    }
    steps.sort_unstable();
    steps.dedup();

    steps
        .into_iter()
        .map(|step| Onset {
            step,
            tick: step_tick(ctx, step),
            strength: strength_of(ctx, step),
        })
        .collect()
}

/// Gap in ticks from each onset to the next (or to `end` for the last one)
pub fn gaps(onsets: &[Onset], end: u64) -> Vec<u64> {
    onsets
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let next = onsets.get(i + 1).map(|n| n.tick).unwrap_or(end);
            next.saturating_sub(o.tick)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::with_context;
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_metric_strength_common_time() {
        let ts = TimeSignature::COMMON;
        assert_eq!(metric_strength(0, &ts), 1.0);
        assert_eq!(metric_strength(4, &ts), 0.75);
        assert_eq!(metric_strength(2, &ts), 0.5);
        assert_eq!(metric_strength(3, &ts), 0.25);
    }

    #[test]
    fn test_metric_strength_compound() {
        let ts = TimeSignature::new(6, 8).unwrap();
        assert_eq!(metric_strength(6, &ts), 0.75);
        assert_eq!(metric_strength(4, &ts), 0.5);
    }

    #[test]
    fn test_swing_offset() {
        assert_eq!(swing_offset(2, 0.0, 120), 0);
        assert_eq!(swing_offset(2, 0.75, 120), 60);
        assert_eq!(swing_offset(4, 0.75, 120), 0);
        assert_eq!(swing_offset(1, 1.0, 120), 0);
    }

    #[test]
    fn test_onset_grid_is_sorted_and_in_range() {
        with_context("funk", |ctx| {
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            let onsets = onset_grid(ctx, &mut rng, 1.0, true);
            assert!(!onsets.is_empty());
            for pair in onsets.windows(2) {
                assert!(pair[0].step < pair[1].step);
            }
            assert!(onsets.iter().all(|o| o.tick < ctx.length_ticks()));
        });
    }

    #[test]
    fn test_onset_grid_deterministic() {
        with_context("salsa", |ctx| {
            let a = onset_grid(ctx, &mut ChaCha8Rng::seed_from_u64(9), 1.0, false);
            let b = onset_grid(ctx, &mut ChaCha8Rng::seed_from_u64(9), 1.0, false);
            assert_eq!(a, b);
        });
    }

    #[test]
    fn test_gaps() {
        let onsets = [
            Onset { step: 0, tick: 0, strength: 1.0 },
            Onset { step: 4, tick: 480, strength: 0.75 },
        ];
        assert_eq!(gaps(&onsets, 1920), vec![480, 1440]);
    }
}
