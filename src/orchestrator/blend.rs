// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Mixing procedural note choices with model predictions.
//!
//! At every note, each attribute (pitch, duration, velocity) is drawn from
//! `(1 - f) * one_hot(procedural) + f * model`, where the model
//! distribution is restricted to that attribute's token class. When the
//! procedural token wins the original value is kept exactly. Start ticks
//! and track layout never change.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{stream, Composition, NoteEvent, Track};
use crate::neural::{sample_index, NeuralModel, Token, TokenClass};
use crate::music::Scale;

/// Track streams for blending start here so they never share a stream with
/// the procedural tracks
const BLEND_STREAM_BASE: u64 = 1000;

/// Checkpoint name used when none is configured
pub const DEFAULT_MODEL_NAME: &str = "composer_model";

/// Blending settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Checkpoint used when neural generation is requested
    pub model_name: String,
    /// Weight of the model distribution, 0 keeps the procedural result
    pub blend_factor: f32,
    pub temperature: f32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            blend_factor: 0.3,
            temperature: 1.0,
        }
    }
}

struct Blender<'a> {
    model: &'a NeuralModel,
    factor: f32,
    temperature: f32,
    context: usize,
}

impl Blender<'_> {
    fn choose(&self, history: &[Token], class: TokenClass, procedural: Token, rng: &mut ChaCha8Rng) -> Token {
        let window = &history[history.len().saturating_sub(self.context)..];
        let mut dist = self.model.predict_class(window, class);

        if (self.temperature - 1.0).abs() > f32::EPSILON {
            let exponent = 1.0 / self.temperature.max(0.05);
            let mut total = 0.0;
            for (_, p) in dist.iter_mut() {
                *p = p.powf(exponent);
                total += *p;
            }
            if total > 0.0 {
                for (_, p) in dist.iter_mut() {
                    *p /= total;
                }
            }
        }

        let weights: Vec<f32> = dist
            .iter()
            .map(|&(t, p)| self.factor * p + if t == procedural { 1.0 - self.factor } else { 0.0 })
            .collect();
        dist.get(sample_index(&weights, rng)).map(|&(t, _)| t).unwrap_or(procedural)
    }
}

/// Pitch with the pitch class of `model_pitch`, in the octave nearest `original`
fn place_near(model_pitch: u8, original: u8) -> u8 {
    let pc = (model_pitch % 12) as i32;
    let original = original as i32;
    let mut best = pc;
    let mut k = pc;
    while k <= 127 {
        if (k - original).abs() < (best - original).abs() {
            best = k;
        }
        k += 12;
    }
    best as u8
}

fn blend_track(
    track: &Track,
    index: usize,
    composition: &Composition,
    blender: &Blender<'_>,
    scale: &Scale,
    velocity_range: (u8, u8),
) -> Vec<NoteEvent> {
    let vocab = blender.model.vocabulary();
    let q = &vocab.quantization;
    let length = composition.length_ticks();
    let step_ticks = (composition.ppqn as u64 / 4).max(1);
    let (vmin, vmax) = velocity_range;
    let percussive = track.kind.is_percussive();
    let mut rng = stream(composition.seed, BLEND_STREAM_BASE + index as u64);

    let mut history = vec![Token::Bos];
    let mut previous_start = None;
    let mut out: Vec<NoteEvent> = Vec::with_capacity(track.notes.len());

    for (i, note) in track.notes.iter().enumerate() {
        let procedural = vocab.note_tokens(previous_start, note);
        let (rests, attributes) = procedural.split_at(procedural.len() - 3);
        history.extend_from_slice(rests);
        let mut blended = *note;

        // Pitch
        if percussive {
            history.push(attributes[0]);
        } else {
            let token = blender.choose(&history, TokenClass::Pitch, attributes[0], &mut rng);
            if let Token::Pitch(p) = token {
                if token != attributes[0] {
                    let candidate = scale.quantize(place_near(p, note.pitch));
                    let collides = out
                        .iter()
                        .rev()
                        .take_while(|n| n.start_tick == note.start_tick)
                        .any(|n| n.pitch == candidate);
                    if !collides {
                        blended.pitch = candidate;
                    }
                }
            }
            history.push(Token::Pitch(q.fold_pitch(blended.pitch)));
        }

        // Duration, bounded by the next onset and the end of the piece
        let token = blender.choose(&history, TokenClass::Duration, attributes[1], &mut rng);
        if let Token::Duration(b) = token {
            if token != attributes[1] {
                let next_onset = track.notes[i + 1..]
                    .iter()
                    .map(|n| n.start_tick)
                    .find(|&t| t > note.start_tick)
                    .unwrap_or(length)
                    .min(length);
                let steps = crate::neural::tokens::STEP_BUCKETS[(b as usize).min(7)] as u64;
                let limit = next_onset.saturating_sub(note.start_tick).max(1);
                blended.duration_ticks = (steps * step_ticks).clamp(1, limit);
            }
        }
        history.push(token);

        // Velocity
        let token = blender.choose(&history, TokenClass::Velocity, attributes[2], &mut rng);
        if let Token::Velocity(b) = token {
            if token != attributes[2] {
                blended.velocity = q.bucket_velocity(b).clamp(vmin, vmax);
            }
        }
        history.push(token);

        previous_start = Some(note.start_tick);
        out.push(blended);
    }

    out.sort_by_key(|n| (n.start_tick, n.pitch));
    out
}

/// Blend every track of `composition` with `model`
pub fn blend_composition(
    composition: &Composition,
    model: &NeuralModel,
    velocity_range: (u8, u8),
    config: &BlendConfig,
) -> Composition {
    let blender = Blender {
        model,
        factor: config.blend_factor.clamp(0.0, 1.0),
        temperature: config.temperature,
        context: model.hyperparameters().context,
    };
    let scale = composition.scale();

    let mut blended = composition.clone();
    for (index, track) in blended.tracks.iter_mut().enumerate() {
        if track.notes.is_empty() {
            continue;
        }
        track.notes = blend_track(
            &composition.tracks[index],
            index,
            composition,
            &blender,
            &scale,
            velocity_range,
        );
    }
    blended
}
