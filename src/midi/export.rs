// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file export.
//!
//! Writes a Format 1 file: a conductor track with tempo and meter, then one
//! track per composition track with its name, program and notes.

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};

use super::MidiEncoder;
use crate::engine::{Composition, Track as CompositionTrack};
use crate::error::{ComposerError, Result};

/// Largest delta a MIDI variable-length quantity can hold
const MAX_DELTA: u64 = (1 << 28) - 1;

/// `midly`-backed encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct SmfEncoder;

impl SmfEncoder {
    pub fn new() -> Self {
        Self
    }
}

/// Absolute-time event before delta conversion
struct TimedEvent<'a> {
    tick: u64,
    /// Note-offs sort before note-ons at the same tick
    order: u8,
    kind: TrackEventKind<'a>,
}

fn conductor_track(composition: &Composition) -> Track<'_> {
    let ts = composition.time_signature;
    let denominator_pow = ts.denominator.trailing_zeros() as u8;
    vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(composition.genre.as_bytes())),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(composition.micros_per_quarter()))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(ts.numerator, denominator_pow, 24, 8)),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]
}

fn note_track<'a>(track: &'a CompositionTrack, length_ticks: u64) -> Result<Track<'a>> {
    let channel = u4::new(track.channel.min(15));
    let mut events: Vec<TimedEvent<'a>> = Vec::with_capacity(track.notes.len() * 2 + 2);

    events.push(TimedEvent {
        tick: 0,
        order: 0,
        kind: TrackEventKind::Meta(MetaMessage::TrackName(track.role.as_bytes())),
    });
    if let Some(program) = track.program {
        events.push(TimedEvent {
            tick: 0,
            order: 0,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(program.min(127)),
                },
            },
        });
    }

    for note in &track.notes {
        let key = u7::new(note.pitch.min(127));
        events.push(TimedEvent {
            tick: note.start_tick,
            order: 2,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(note.velocity.clamp(1, 127)),
                },
            },
        });
        events.push(TimedEvent {
            tick: note.end_tick(),
            order: 1,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff { key, vel: u7::new(0) },
            },
        });
    }

    // Stable sort keeps note order within a tick
    events.sort_by_key(|e| (e.tick, e.order));

    let mut out: Track<'a> = Vec::with_capacity(events.len() + 1);
    let mut last_tick = 0u64;
    for event in events {
        out.push(TrackEvent {
            delta: delta(event.tick, last_tick)?,
            kind: event.kind,
        });
        last_tick = event.tick;
    }
    out.push(TrackEvent {
        delta: delta(length_ticks.max(last_tick), last_tick)?,
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    Ok(out)
}

fn delta(tick: u64, last_tick: u64) -> Result<u28> {
    let d = tick - last_tick;
    if d > MAX_DELTA {
        return Err(ComposerError::Encoding(format!("delta time {} exceeds MIDI range", d)));
    }
    Ok(u28::new(d as u32))
}

impl MidiEncoder for SmfEncoder {
    fn encode(&self, composition: &Composition) -> Result<Vec<u8>> {
        let ppqn = u16::try_from(composition.ppqn)
            .ok()
            .filter(|&p| p > 0 && p < 0x8000)
            .ok_or_else(|| ComposerError::Encoding(format!("unsupported ppqn {}", composition.ppqn)))?;

        let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(ppqn))));
        smf.tracks.push(conductor_track(composition));
        let length = composition.length_ticks();
        for track in &composition.tracks {
            smf.tracks.push(note_track(track, length)?);
        }

        let mut bytes = Vec::new();
        smf.write(&mut bytes)
            .map_err(|e| ComposerError::Encoding(format!("failed to write MIDI: {}", e)))?;
        Ok(bytes)
    }
}
