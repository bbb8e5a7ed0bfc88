// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Built-in genre catalog.

use super::{BassStyle, DrumPattern, GenreProfile};
use crate::music::ScaleType::*;

/// Profiles of the built-in catalog, in catalog order
pub fn builtin_profiles() -> Vec<GenreProfile> {
    vec![
        // Electronic
        GenreProfile::new("house", "House", "Electronic")
            .describe("Four-on-the-floor club music with warm chords and off-beat hats")
            .tempo(118, 128)
            .feel(0.1, 0.6, 0.3, 0.5)
            .velocity(80, 120)
            .drums(DrumPattern::FourOnTheFloor)
            .bass(BassStyle::RootFifth)
            .scales(&[NaturalMinor, Dorian, Major])
            .instruments(&["drums", "bass", "piano", "pad", "lead"]),
        GenreProfile::new("techno", "Techno", "Electronic")
            .describe("Driving, hypnotic machine rhythms with minimal harmony")
            .tempo(125, 140)
            .feel(0.0, 0.7, 0.2, 0.1)
            .velocity(90, 125)
            .drums(DrumPattern::FourOnTheFloor)
            .bass(BassStyle::Root)
            .scales(&[NaturalMinor, Phrygian])
            .instruments(&["drums", "bass", "lead", "pad"]),
        GenreProfile::new("trance", "Trance", "Electronic")
            .describe("Euphoric arpeggiated leads over long builds and lush pads")
            .tempo(132, 142)
            .feel(0.0, 0.75, 0.2, 0.3)
            .velocity(85, 120)
            .drums(DrumPattern::FourOnTheFloor)
            .bass(BassStyle::Root)
            .scales(&[NaturalMinor, HarmonicMinor])
            .instruments(&["drums", "bass", "pad", "lead"]),
        GenreProfile::new("drum_and_bass", "Drum & Bass", "Electronic")
            .describe("Fast breakbeats with heavy sub bass and rolling energy")
            .tempo(160, 178)
            .feel(0.0, 0.8, 0.6, 0.4)
            .velocity(80, 127)
            .drums(DrumPattern::Breakbeat)
            .bass(BassStyle::EightOhEight)
            .scales(&[NaturalMinor, Dorian])
            .instruments(&["drums", "bass", "pad", "lead"]),
        GenreProfile::new("dubstep", "Dubstep", "Electronic")
            .describe("Half-time wobble bass with sparse, heavy drums")
            .tempo(138, 142)
            .feel(0.0, 0.5, 0.5, 0.2)
            .velocity(85, 127)
            .drums(DrumPattern::Trap)
            .bass(BassStyle::EightOhEight)
            .scales(&[Phrygian, NaturalMinor])
            .instruments(&["drums", "bass", "lead"]),
        GenreProfile::new("synthwave", "Synthwave", "Electronic")
            .describe("Retro eighties synth pop with gated drums and neon pads")
            .tempo(80, 118)
            .feel(0.0, 0.55, 0.2, 0.35)
            .velocity(75, 115)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::Root)
            .scales(&[NaturalMinor, Dorian])
            .instruments(&["drums", "bass", "pad", "lead", "strings"]),
        // Hip Hop
        GenreProfile::new("boom_bap", "Boom Bap", "Hip Hop")
            .describe("Dusty sampled drums with a hard snare and jazzy loops")
            .tempo(85, 95)
            .feel(0.55, 0.5, 0.45, 0.6)
            .velocity(70, 120)
            .drums(DrumPattern::BoomBap)
            .bass(BassStyle::Root)
            .scales(&[Dorian, MinorPentatonic])
            .instruments(&["drums", "bass", "keys", "vocals"]),
        GenreProfile::new("trap", "Trap", "Hip Hop")
            .describe("Booming 808s, rolling hi-hats and dark melodies")
            .tempo(130, 150)
            .feel(0.0, 0.65, 0.5, 0.25)
            .velocity(75, 127)
            .drums(DrumPattern::Trap)
            .bass(BassStyle::EightOhEight)
            .scales(&[NaturalMinor, HarmonicMinor, Phrygian])
            .instruments(&["drums", "808", "lead", "pad", "vocals"]),
        GenreProfile::new("lofi_hip_hop", "Lo-fi Hip Hop", "Hip Hop")
            .describe("Mellow, swung beats with soft seventh chords")
            .tempo(70, 90)
            .feel(0.6, 0.4, 0.35, 0.7)
            .velocity(55, 100)
            .drums(DrumPattern::BoomBap)
            .bass(BassStyle::Root)
            .scales(&[Dorian, Major, MajorPentatonic])
            .instruments(&["drums", "bass", "piano", "guitar"]),
        GenreProfile::new("drill", "Drill", "Hip Hop")
            .describe("Sliding 808s with skittering triplet hats and menacing minor melodies")
            .tempo(138, 146)
            .feel(0.0, 0.6, 0.65, 0.2)
            .velocity(80, 127)
            .drums(DrumPattern::Trap)
            .bass(BassStyle::EightOhEight)
            .scales(&[HarmonicMinor, NaturalMinor])
            .instruments(&["drums", "808", "strings", "lead"]),
        // Jazz
        GenreProfile::new("smooth_jazz", "Smooth Jazz", "Jazz")
            .describe("Laid-back jazz with soft saxophone leads and lush extended chords")
            .tempo(80, 110)
            .feel(0.3, 0.45, 0.35, 0.8)
            .velocity(55, 100)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::RootFifth)
            .scales(&[Major, Dorian, Mixolydian])
            .instruments(&["drums", "bass", "keys", "sax"]),
        GenreProfile::new("bebop", "Bebop", "Jazz")
            .describe("Fast, virtuosic small-group improvisation over rapid changes")
            .tempo(180, 280)
            .feel(0.65, 0.85, 0.6, 1.0)
            .velocity(60, 115)
            .drums(DrumPattern::JazzRide)
            .bass(BassStyle::Walking)
            .scales(&[Major, Dorian, Mixolydian, Blues])
            .instruments(&["drums", "bass", "piano", "sax", "trumpet"]),
        GenreProfile::new("swing", "Swing", "Jazz")
            .describe("Big band dance music with a strong triplet feel")
            .tempo(120, 180)
            .feel(0.7, 0.6, 0.4, 0.7)
            .velocity(65, 120)
            .drums(DrumPattern::JazzRide)
            .bass(BassStyle::Walking)
            .scales(&[Major, Mixolydian])
            .instruments(&["drums", "bass", "piano", "brass", "sax"]),
        GenreProfile::new("jazz_waltz", "Jazz Waltz", "Jazz")
            .describe("Lilting three-four jazz with brushed ride and walking bass")
            .tempo(120, 170)
            .feel(0.5, 0.5, 0.3, 0.85)
            .velocity(55, 105)
            .drums(DrumPattern::JazzRide)
            .bass(BassStyle::Walking)
            .scales(&[Dorian, Major])
            .meters(&[(3, 4)])
            .instruments(&["drums", "bass", "piano", "flute"]),
        // Latin
        GenreProfile::new("salsa", "Salsa", "Latin")
            .describe("Energetic Afro-Cuban dance music built on the clave")
            .tempo(160, 220)
            .feel(0.0, 0.75, 0.7, 0.5)
            .velocity(75, 125)
            .drums(DrumPattern::Clave)
            .bass(BassStyle::Tumbao)
            .scales(&[Major, HarmonicMinor])
            .instruments(&["percussion", "bass", "piano", "brass"]),
        GenreProfile::new("reggaeton", "Reggaeton", "Latin")
            .describe("Urban Latin groove driven by the dembow rhythm")
            .tempo(88, 100)
            .feel(0.0, 0.6, 0.55, 0.25)
            .velocity(80, 125)
            .drums(DrumPattern::Dembow)
            .bass(BassStyle::EightOhEight)
            .scales(&[NaturalMinor, HarmonicMinor])
            .instruments(&["drums", "bass", "pad", "lead", "vocals"]),
        GenreProfile::new("bossa_nova", "Bossa Nova", "Latin")
            .describe("Gentle Brazilian samba rhythms with jazz harmony and nylon guitar")
            .tempo(120, 145)
            .feel(0.1, 0.5, 0.6, 0.85)
            .velocity(50, 95)
            .drums(DrumPattern::Clave)
            .bass(BassStyle::RootFifth)
            .scales(&[Major, Dorian, Lydian])
            .instruments(&["percussion", "bass", "guitar", "flute"]),
        GenreProfile::new("cumbia", "Cumbia", "Latin")
            .describe("Colombian folk dance rhythm with a shuffling guacharaca")
            .tempo(85, 110)
            .feel(0.15, 0.6, 0.5, 0.25)
            .velocity(70, 115)
            .drums(DrumPattern::Clave)
            .bass(BassStyle::RootFifth)
            .scales(&[Major, NaturalMinor])
            .instruments(&["percussion", "bass", "organ", "lead"]),
        GenreProfile::new("tango", "Tango", "Latin")
            .describe("Dramatic Argentine dance with marcato accompaniment and bandoneon lines")
            .tempo(60, 70)
            .feel(0.0, 0.55, 0.45, 0.55)
            .velocity(60, 120)
            .drums(DrumPattern::None)
            .bass(BassStyle::Root)
            .scales(&[HarmonicMinor, NaturalMinor])
            .instruments(&["bass", "piano", "strings", "melody"]),
        // Caribbean
        GenreProfile::new("reggae", "Reggae", "Caribbean")
            .describe("Jamaican one-drop groove with off-beat skank chords")
            .tempo(65, 85)
            .feel(0.2, 0.45, 0.5, 0.3)
            .velocity(65, 110)
            .drums(DrumPattern::OneDrop)
            .bass(BassStyle::RootFifth)
            .scales(&[Major, NaturalMinor, Dorian])
            .instruments(&["drums", "bass", "guitar", "organ"]),
        GenreProfile::new("dancehall", "Dancehall", "Caribbean")
            .describe("Digital riddims with punchy kicks and chanted hooks")
            .tempo(90, 110)
            .feel(0.0, 0.6, 0.6, 0.2)
            .velocity(80, 125)
            .drums(DrumPattern::Dembow)
            .bass(BassStyle::EightOhEight)
            .scales(&[NaturalMinor, MinorPentatonic])
            .instruments(&["drums", "bass", "lead", "vocals"]),
        GenreProfile::new("ska", "Ska", "Caribbean")
            .describe("Upbeat off-beat guitar chops with horn lines")
            .tempo(140, 180)
            .feel(0.1, 0.65, 0.5, 0.3)
            .velocity(75, 120)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::Walking)
            .scales(&[Major, Mixolydian])
            .instruments(&["drums", "bass", "guitar", "brass"]),
        GenreProfile::new("calypso", "Calypso", "Caribbean")
            .describe("Trinidadian carnival songs with steel pan melodies")
            .tempo(100, 125)
            .feel(0.1, 0.6, 0.55, 0.3)
            .velocity(70, 115)
            .drums(DrumPattern::Clave)
            .bass(BassStyle::RootFifth)
            .scales(&[Major, MajorPentatonic])
            .instruments(&["percussion", "bass", "guitar", "lead"]),
        // Rock
        GenreProfile::new("rock", "Rock", "Rock")
            .describe("Guitar-driven backbeat with power chords")
            .tempo(110, 140)
            .feel(0.0, 0.6, 0.2, 0.2)
            .velocity(85, 125)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::Root)
            .scales(&[MinorPentatonic, Major, Mixolydian])
            .instruments(&["drums", "bass", "guitar", "lead"]),
        GenreProfile::new("punk", "Punk", "Rock")
            .describe("Loud, fast and short with downstroke eighth notes")
            .tempo(160, 200)
            .feel(0.0, 0.8, 0.1, 0.1)
            .velocity(100, 127)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::Root)
            .scales(&[Major, MinorPentatonic])
            .instruments(&["drums", "bass", "guitar"]),
        GenreProfile::new("metal", "Metal", "Rock")
            .describe("Heavy distorted riffs with double kick drums")
            .tempo(100, 200)
            .feel(0.0, 0.85, 0.3, 0.3)
            .velocity(95, 127)
            .drums(DrumPattern::Breakbeat)
            .bass(BassStyle::Root)
            .scales(&[Phrygian, HarmonicMinor, NaturalMinor])
            .instruments(&["drums", "bass", "guitar", "lead"]),
        GenreProfile::new("indie_rock", "Indie Rock", "Rock")
            .describe("Jangly guitars, melodic bass and understated grooves")
            .tempo(100, 135)
            .feel(0.0, 0.55, 0.3, 0.4)
            .velocity(70, 115)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::RootFifth)
            .scales(&[Major, Mixolydian, Dorian])
            .instruments(&["drums", "bass", "guitar", "keys"]),
        // Blues
        GenreProfile::new("blues", "Blues", "Blues")
            .describe("Twelve-bar shuffle with bent guitar phrases")
            .tempo(70, 120)
            .feel(0.65, 0.5, 0.35, 0.6)
            .velocity(65, 115)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::Walking)
            .scales(&[Blues, MinorPentatonic, Mixolydian])
            .instruments(&["drums", "bass", "piano", "guitar"]),
        GenreProfile::new("gospel", "Gospel", "Blues")
            .describe("Soaring church harmony with organ and call-and-response")
            .tempo(70, 130)
            .feel(0.4, 0.55, 0.4, 0.8)
            .velocity(60, 125)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::Walking)
            .scales(&[Major, MajorPentatonic])
            .instruments(&["drums", "bass", "organ", "piano", "vocals"]),
        // Pop
        GenreProfile::new("pop", "Pop", "Pop")
            .describe("Catchy, polished songs with simple progressions")
            .tempo(95, 125)
            .feel(0.0, 0.55, 0.3, 0.3)
            .velocity(75, 115)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::Root)
            .scales(&[Major, NaturalMinor])
            .instruments(&["drums", "bass", "keys", "lead", "vocals"]),
        GenreProfile::new("disco", "Disco", "Pop")
            .describe("Octave bass, string stabs and a steady four-on-the-floor kick")
            .tempo(110, 125)
            .feel(0.05, 0.7, 0.35, 0.5)
            .velocity(80, 120)
            .drums(DrumPattern::FourOnTheFloor)
            .bass(BassStyle::RootFifth)
            .scales(&[Dorian, Major])
            .instruments(&["drums", "bass", "strings", "guitar"]),
        // Soul & Funk
        GenreProfile::new("funk", "Funk", "Soul & Funk")
            .describe("Syncopated sixteenth-note grooves on the one")
            .tempo(95, 115)
            .feel(0.2, 0.75, 0.75, 0.6)
            .velocity(70, 125)
            .drums(DrumPattern::Breakbeat)
            .bass(BassStyle::RootFifth)
            .scales(&[Dorian, Mixolydian, MinorPentatonic])
            .instruments(&["drums", "bass", "guitar", "brass"]),
        GenreProfile::new("rnb", "R&B", "Soul & Funk")
            .describe("Smooth grooves with rich extended chords and vocal runs")
            .tempo(65, 95)
            .feel(0.35, 0.5, 0.5, 0.8)
            .velocity(60, 110)
            .drums(DrumPattern::BoomBap)
            .bass(BassStyle::RootFifth)
            .scales(&[Dorian, Major, MinorPentatonic])
            .instruments(&["drums", "bass", "keys", "pad", "vocals"]),
        GenreProfile::new("soul", "Soul", "Soul & Funk")
            .describe("Warm, gospel-rooted grooves with horns and organ")
            .tempo(75, 110)
            .feel(0.3, 0.55, 0.4, 0.65)
            .velocity(65, 115)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::Walking)
            .scales(&[Major, Dorian])
            .instruments(&["drums", "bass", "organ", "brass"]),
        // Ambient
        GenreProfile::new("ambient", "Ambient", "Ambient")
            .describe("Slow evolving textures without a fixed pulse")
            .tempo(60, 80)
            .feel(0.0, 0.15, 0.05, 0.6)
            .velocity(35, 85)
            .drums(DrumPattern::None)
            .bass(BassStyle::Root)
            .scales(&[Lydian, Major, MajorPentatonic])
            .instruments(&["pad", "strings", "piano"]),
        GenreProfile::new("chillout", "Chillout", "Ambient")
            .describe("Relaxed downtempo grooves with soft pads")
            .tempo(80, 100)
            .feel(0.2, 0.35, 0.25, 0.6)
            .velocity(50, 95)
            .drums(DrumPattern::Euclidean)
            .bass(BassStyle::Root)
            .scales(&[Dorian, Major])
            .instruments(&["drums", "bass", "pad", "keys"]),
        GenreProfile::new("new_age", "New Age", "Ambient")
            .describe("Meditative, consonant melodies over sustained harmony")
            .tempo(60, 90)
            .feel(0.0, 0.25, 0.1, 0.4)
            .velocity(40, 90)
            .drums(DrumPattern::None)
            .bass(BassStyle::Root)
            .scales(&[MajorPentatonic, Lydian, WholeTone])
            .instruments(&["pad", "piano", "flute"]),
        // Folk & Country
        GenreProfile::new("country", "Country", "Folk & Country")
            .describe("Twangy guitars, train-beat drums and root-fifth bass")
            .tempo(90, 130)
            .feel(0.15, 0.55, 0.2, 0.2)
            .velocity(70, 115)
            .drums(DrumPattern::Backbeat)
            .bass(BassStyle::RootFifth)
            .scales(&[Major, MajorPentatonic, Mixolydian])
            .instruments(&["drums", "bass", "guitar", "strings"]),
        GenreProfile::new("celtic", "Celtic", "Folk & Country")
            .describe("Jigs and airs in compound time with fiddle and flute")
            .tempo(100, 130)
            .feel(0.0, 0.7, 0.2, 0.2)
            .velocity(65, 110)
            .drums(DrumPattern::Euclidean)
            .bass(BassStyle::Root)
            .scales(&[Dorian, Mixolydian, Major])
            .meters(&[(6, 8), (4, 4)])
            .instruments(&["percussion", "guitar", "flute", "strings"]),
        // World
        GenreProfile::new("afrobeat", "Afrobeat", "World")
            .describe("Polyrhythmic West African grooves with horn riffs")
            .tempo(100, 125)
            .feel(0.1, 0.75, 0.7, 0.5)
            .velocity(70, 120)
            .drums(DrumPattern::Euclidean)
            .bass(BassStyle::RootFifth)
            .scales(&[Dorian, MinorPentatonic])
            .instruments(&["drums", "percussion", "bass", "guitar", "brass"]),
        // Classical
        GenreProfile::new("waltz", "Waltz", "Classical")
            .describe("Elegant ballroom dance in three with oom-pah-pah accompaniment")
            .tempo(84, 96)
            .feel(0.0, 0.45, 0.1, 0.45)
            .velocity(55, 105)
            .drums(DrumPattern::None)
            .bass(BassStyle::Root)
            .scales(&[Major, HarmonicMinor])
            .meters(&[(3, 4)])
            .instruments(&["bass", "strings", "piano", "melody"]),
        GenreProfile::new("baroque", "Baroque", "Classical")
            .describe("Contrapuntal lines over a steady continuo in the style of the 1700s")
            .tempo(70, 120)
            .feel(0.0, 0.7, 0.1, 0.6)
            .velocity(60, 105)
            .drums(DrumPattern::None)
            .bass(BassStyle::Walking)
            .scales(&[Major, HarmonicMinor])
            .meters(&[(4, 4), (3, 4)])
            .instruments(&["bass", "keys", "strings", "melody"]),
    ]
}
