// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file import for training corpora.

use std::collections::{BTreeMap, HashMap, VecDeque};

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use super::{DecodedMidi, DecodedTrack, MidiDecoder};
use crate::engine::{NoteEvent, DEFAULT_PPQN};
use crate::error::{ComposerError, Result};

/// `midly`-backed decoder; ticks are rescaled to `target_ppqn`
#[derive(Debug, Clone, Copy)]
pub struct SmfDecoder {
    target_ppqn: u32,
}

impl SmfDecoder {
    pub fn new(target_ppqn: u32) -> Self {
        Self {
            target_ppqn: target_ppqn.max(1),
        }
    }

    fn rescale(&self, tick: u64, source_ppqn: u32) -> u64 {
        (tick as u128 * self.target_ppqn as u128 / source_ppqn as u128) as u64
    }
}

impl Default for SmfDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_PPQN)
    }
}

/// Pending note-ons keyed by (channel, key), closed first-in first-out
type OpenNotes = HashMap<(u8, u8), VecDeque<(u64, u8)>>;

impl MidiDecoder for SmfDecoder {
    fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedMidi> {
        let smf = Smf::parse(bytes).map_err(|e| ComposerError::Decoding(e.to_string()))?;
        let source_ppqn = match smf.header.timing {
            Timing::Metrical(t) if t.as_int() > 0 => t.as_int() as u32,
            Timing::Metrical(_) => {
                return Err(ComposerError::Decoding("zero ticks per beat".into()));
            }
            Timing::Timecode(..) => {
                return Err(ComposerError::Decoding("timecode timing is not supported".into()));
            }
        };

        let mut tempo_bpm: Option<f64> = None;
        let mut tracks = Vec::new();

        for track in &smf.tracks {
            let mut tick = 0u64;
            let mut name: Option<String> = None;
            let mut open: OpenNotes = HashMap::new();
            // BTreeMap keeps channel order stable
            let mut by_channel: BTreeMap<u8, Vec<NoteEvent>> = BTreeMap::new();

            for event in track {
                tick += event.delta.as_int() as u64;
                match event.kind {
                    TrackEventKind::Meta(MetaMessage::TrackName(raw)) if name.is_none() => {
                        name = Some(String::from_utf8_lossy(raw).into_owned());
                    }
                    TrackEventKind::Meta(MetaMessage::Tempo(t)) if tempo_bpm.is_none() => {
                        let micros = t.as_int().max(1) as f64;
                        tempo_bpm = Some(60_000_000.0 / micros);
                    }
                    TrackEventKind::Midi { channel, message } => {
                        let channel = channel.as_int();
                        match message {
                            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                                open.entry((channel, key.as_int()))
                                    .or_default()
                                    .push_back((tick, vel.as_int()));
                            }
                            // A note-on with velocity 0 is a note-off
                            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                                let key = key.as_int();
                                if let Some((start, vel)) =
                                    open.get_mut(&(channel, key)).and_then(|q| q.pop_front())
                                {
                                    by_channel.entry(channel).or_default().push(self.note(
                                        key, vel, start, tick, channel, source_ppqn,
                                    ));
                                }
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            // Close notes still sounding at the end of the track
            for ((channel, key), queue) in open {
                for (start, vel) in queue {
                    by_channel
                        .entry(channel)
                        .or_default()
                        .push(self.note(key, vel, start, tick.max(start + 1), channel, source_ppqn));
                }
            }

            for (channel, mut notes) in by_channel {
                notes.sort_by_key(|n| (n.start_tick, n.pitch));
                tracks.push(DecodedTrack {
                    name: name.clone(),
                    channel,
                    notes,
                });
            }
        }

        Ok(DecodedMidi {
            ppqn: self.target_ppqn,
            tempo_bpm: tempo_bpm.unwrap_or(120.0),
            tracks,
        })
    }
}

impl SmfDecoder {
    fn note(&self, key: u8, vel: u8, start: u64, end: u64, channel: u8, source_ppqn: u32) -> NoteEvent {
        let start_tick = self.rescale(start, source_ppqn);
        let end_tick = self.rescale(end, source_ppqn);
        NoteEvent::new(key, vel, start_tick, end_tick.saturating_sub(start_tick).max(1)).with_channel(channel)
    }
}
