// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Quantized note tokens.
//!
//! Each note becomes `[Rest] Pitch Duration Velocity`, where the optional
//! rest encodes the onset distance from the previous note. Times are
//! counted in 16th-note steps and snapped to the buckets
//! {1, 2, 3, 4, 6, 8, 12, 16}; velocities fall into eight buckets of width
//! 16. Pitches outside the piano range are folded in by octaves.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::engine::NoteEvent;

/// Step counts for duration and rest buckets
pub const STEP_BUCKETS: [u32; 8] = [1, 2, 3, 4, 6, 8, 12, 16];

/// One vocabulary symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    Bos,
    Eos,
    /// MIDI pitch
    Pitch(u8),
    /// Duration bucket index
    Duration(u8),
    /// Velocity bucket index
    Velocity(u8),
    /// Onset-gap bucket index
    Rest(u8),
}

/// Token classes, used to restrict predictions to one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Control,
    Pitch,
    Duration,
    Velocity,
    Rest,
}

impl Token {
    pub fn class(self) -> TokenClass {
        match self {
            Token::Bos | Token::Eos => TokenClass::Control,
            Token::Pitch(_) => TokenClass::Pitch,
            Token::Duration(_) => TokenClass::Duration,
            Token::Velocity(_) => TokenClass::Velocity,
            Token::Rest(_) => TokenClass::Rest,
        }
    }
}

/// Quantization settings stored with every checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantizationConfig {
    /// Ticks per quarter note of the token timeline
    pub ppqn: u32,
    pub min_pitch: u8,
    pub max_pitch: u8,
    pub velocity_bucket_width: u8,
}

impl Default for QuantizationConfig {
    fn default() -> Self {
        Self {
            ppqn: crate::engine::DEFAULT_PPQN,
            min_pitch: 21,
            max_pitch: 108,
            velocity_bucket_width: 16,
        }
    }
}

impl QuantizationConfig {
    /// Reject settings that cannot form a vocabulary: the pitch range must
    /// be ordered, within MIDI and span at least one octave
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.min_pitch > self.max_pitch || self.max_pitch > 127 {
            return Err(format!(
                "pitch range {}..={} is not a valid MIDI range",
                self.min_pitch, self.max_pitch
            ));
        }
        if self.max_pitch - self.min_pitch < 11 {
            return Err(format!(
                "pitch range {}..={} is narrower than an octave",
                self.min_pitch, self.max_pitch
            ));
        }
        if self.ppqn < 4 {
            return Err(format!("ppqn {} is below one tick per step", self.ppqn));
        }
        if self.velocity_bucket_width == 0 {
            return Err("velocity bucket width must be positive".to_string());
        }
        Ok(())
    }

    /// Ticks per 16th-note step
    pub fn step_ticks(&self) -> u64 {
        (self.ppqn as u64 / 4).max(1)
    }

    /// Fold a pitch into the token range by octaves
    pub fn fold_pitch(&self, pitch: u8) -> u8 {
        let mut p = pitch as i32;
        while p < self.min_pitch as i32 {
            p += 12;
        }
        while p > self.max_pitch as i32 {
            p -= 12;
        }
        p as u8
    }

    /// Bucket nearest to a step count (ties go to the shorter bucket)
    pub fn step_bucket(steps: u64) -> u8 {
        let mut best = 0usize;
        for (i, &b) in STEP_BUCKETS.iter().enumerate() {
            if (b as i64 - steps as i64).abs() < (STEP_BUCKETS[best] as i64 - steps as i64).abs() {
                best = i;
            }
        }
        best as u8
    }

    /// Ticks represented by a duration or rest bucket
    pub fn bucket_ticks(&self, bucket: u8) -> u64 {
        let idx = (bucket as usize).min(STEP_BUCKETS.len() - 1);
        STEP_BUCKETS[idx] as u64 * self.step_ticks()
    }

    pub fn velocity_bucket(&self, velocity: u8) -> u8 {
        (velocity / self.velocity_bucket_width.max(1)).min(7)
    }

    /// Representative velocity of a bucket (its center)
    pub fn bucket_velocity(&self, bucket: u8) -> u8 {
        let w = self.velocity_bucket_width.max(1) as u16;
        ((bucket.min(7) as u16) * w + w / 2).min(127) as u8
    }

    /// Round ticks to whole steps
    pub fn ticks_to_steps(&self, ticks: u64) -> u64 {
        let step = self.step_ticks();
        (ticks + step / 2) / step
    }
}

/// Mapping between tokens and dense indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub quantization: QuantizationConfig,
}

impl Vocabulary {
    pub fn new(quantization: QuantizationConfig) -> Self {
        Self { quantization }
    }

    fn pitch_count(&self) -> usize {
        self.quantization.max_pitch.saturating_sub(self.quantization.min_pitch) as usize + 1
    }

    /// Index range of a token class
    pub fn class_range(&self, class: TokenClass) -> Range<usize> {
        let buckets = STEP_BUCKETS.len();
        let pitch_start = 2;
        let duration_start = pitch_start + self.pitch_count();
        let velocity_start = duration_start + buckets;
        let rest_start = velocity_start + 8;
        match class {
            TokenClass::Control => 0..2,
            TokenClass::Pitch => pitch_start..duration_start,
            TokenClass::Duration => duration_start..velocity_start,
            TokenClass::Velocity => velocity_start..rest_start,
            TokenClass::Rest => rest_start..rest_start + buckets,
        }
    }

    /// Number of distinct tokens
    pub fn size(&self) -> usize {
        self.class_range(TokenClass::Rest).end
    }

    pub fn index(&self, token: Token) -> usize {
        match token {
            Token::Bos => 0,
            Token::Eos => 1,
            Token::Pitch(p) => {
                let p = self.quantization.fold_pitch(p);
                self.class_range(TokenClass::Pitch).start + (p - self.quantization.min_pitch) as usize
            }
            Token::Duration(b) => self.class_range(TokenClass::Duration).start + (b as usize).min(7),
            Token::Velocity(b) => self.class_range(TokenClass::Velocity).start + (b as usize).min(7),
            Token::Rest(b) => self.class_range(TokenClass::Rest).start + (b as usize).min(7),
        }
    }

    pub fn token(&self, index: usize) -> Option<Token> {
        let offset = |class| index - self.class_range(class).start;
        if self.class_range(TokenClass::Control).contains(&index) {
            Some(if index == 0 { Token::Bos } else { Token::Eos })
        } else if self.class_range(TokenClass::Pitch).contains(&index) {
            Some(Token::Pitch(self.quantization.min_pitch + offset(TokenClass::Pitch) as u8))
        } else if self.class_range(TokenClass::Duration).contains(&index) {
            Some(Token::Duration(offset(TokenClass::Duration) as u8))
        } else if self.class_range(TokenClass::Velocity).contains(&index) {
            Some(Token::Velocity(offset(TokenClass::Velocity) as u8))
        } else if self.class_range(TokenClass::Rest).contains(&index) {
            Some(Token::Rest(offset(TokenClass::Rest) as u8))
        } else {
            None
        }
    }

    /// Tokens for one note given the previous onset (None for the first note).
    ///
    /// Gaps longer than the largest bucket are split into several rests.
    pub fn note_tokens(&self, previous_start: Option<u64>, note: &NoteEvent) -> Vec<Token> {
        let q = &self.quantization;
        let mut tokens = Vec::with_capacity(4);

        let gap_ticks = previous_start.map(|p| note.start_tick.saturating_sub(p)).unwrap_or(0);
        let mut gap = q.ticks_to_steps(gap_ticks);
        let longest = *STEP_BUCKETS.last().unwrap_or(&16) as u64;
        while gap > longest {
            tokens.push(Token::Rest(STEP_BUCKETS.len() as u8 - 1));
            gap -= longest;
        }
        if gap > 0 {
            tokens.push(Token::Rest(QuantizationConfig::step_bucket(gap)));
        }

        let steps = q.ticks_to_steps(note.duration_ticks).max(1);
        tokens.push(Token::Pitch(q.fold_pitch(note.pitch)));
        tokens.push(Token::Duration(QuantizationConfig::step_bucket(steps)));
        tokens.push(Token::Velocity(q.velocity_bucket(note.velocity)));
        tokens
    }

    /// Token sequence for a track, framed by `Bos` and `Eos`
    pub fn encode_notes(&self, notes: &[NoteEvent]) -> Vec<Token> {
        let mut sorted: Vec<&NoteEvent> = notes.iter().collect();
        sorted.sort_by_key(|n| (n.start_tick, n.pitch));

        let mut tokens = vec![Token::Bos];
        let mut previous = None;
        for note in sorted {
            tokens.extend(self.note_tokens(previous, note));
            previous = Some(note.start_tick);
        }
        tokens.push(Token::Eos);
        tokens
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(QuantizationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantization_validation() {
        assert!(QuantizationConfig::default().validate().is_ok());
        let narrow = QuantizationConfig {
            min_pitch: 60,
            max_pitch: 65,
            ..QuantizationConfig::default()
        };
        assert!(narrow.validate().is_err());
        let inverted = QuantizationConfig {
            min_pitch: 100,
            max_pitch: 20,
            ..QuantizationConfig::default()
        };
        assert!(inverted.validate().is_err());
        // Size stays defined for an inverted range
        assert_eq!(Vocabulary::new(inverted).class_range(TokenClass::Pitch).len(), 1);
        let octave = QuantizationConfig {
            min_pitch: 60,
            max_pitch: 71,
            ..QuantizationConfig::default()
        };
        assert!(octave.validate().is_ok());
    }

    #[test]
    fn test_vocabulary_size_and_ranges() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.size(), 2 + 88 + 8 + 8 + 8);
        assert_eq!(vocab.class_range(TokenClass::Pitch), 2..90);
        assert_eq!(vocab.class_range(TokenClass::Rest).end, vocab.size());
    }

    #[test]
    fn test_index_token_inverse() {
        let vocab = Vocabulary::default();
        for i in 0..vocab.size() {
            let token = vocab.token(i).unwrap();
            assert_eq!(vocab.index(token), i);
        }
        assert!(vocab.token(vocab.size()).is_none());
    }

    #[test]
    fn test_pitch_folding() {
        let q = QuantizationConfig::default();
        assert_eq!(q.fold_pitch(60), 60);
        assert_eq!(q.fold_pitch(12), 24);
        assert_eq!(q.fold_pitch(120), 108);
        assert_eq!(q.fold_pitch(127), 103);
    }

    #[test]
    fn test_step_buckets() {
        assert_eq!(QuantizationConfig::step_bucket(1), 0);
        assert_eq!(QuantizationConfig::step_bucket(5), 3);
        assert_eq!(QuantizationConfig::step_bucket(7), 4);
        assert_eq!(QuantizationConfig::step_bucket(40), 7);
        let q = QuantizationConfig::default();
        assert_eq!(q.bucket_ticks(3), 4 * 120);
    }

    #[test]
    fn test_velocity_buckets() {
        let q = QuantizationConfig::default();
        assert_eq!(q.velocity_bucket(0), 0);
        assert_eq!(q.velocity_bucket(100), 6);
        assert_eq!(q.velocity_bucket(127), 7);
        assert_eq!(q.bucket_velocity(6), 104);
        assert_eq!(q.bucket_velocity(7), 120);
    }

    #[test]
    fn test_encode_notes() {
        let vocab = Vocabulary::default();
        let notes = [
            NoteEvent::new(64, 90, 480, 240),
            NoteEvent::new(60, 100, 0, 480),
            NoteEvent::new(67, 90, 480, 240),
        ];
        let tokens = vocab.encode_notes(&notes);
        assert_eq!(
            tokens,
            vec![
                Token::Bos,
                Token::Pitch(60),
                Token::Duration(3),
                Token::Velocity(6),
                Token::Rest(3),
                Token::Pitch(64),
                Token::Duration(1),
                Token::Velocity(5),
                Token::Pitch(67),
                Token::Duration(1),
                Token::Velocity(5),
                Token::Eos,
            ]
        );
    }

    #[test]
    fn test_long_gap_splits_into_rests() {
        let vocab = Vocabulary::default();
        // 20 steps: one full 16-step rest and a 4-step rest
        let tokens = vocab.note_tokens(Some(0), &NoteEvent::new(60, 64, 20 * 120, 120));
        assert_eq!(&tokens[..2], &[Token::Rest(7), Token::Rest(3)]);
    }
}
