// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Genre catalog: profiles, categories and search.
//!
//! A `GenreRegistry` is built once (from the built-in catalog or a YAML
//! file) and never mutated afterwards. Hot reload swaps whole registries
//! through a `CatalogHandle`, so readers always hold a complete snapshot.

pub mod catalog;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{ComposerError, Result};
use crate::music::{ScaleType, TimeSignature};

/// Drum template selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrumPattern {
    /// Kick on every beat, off-beat open hats
    FourOnTheFloor,
    /// Rock backbeat: snare on 2 and 4
    Backbeat,
    /// Syncopated kicks with ghosted snares
    Breakbeat,
    /// Half-time snare, rolling hi-hats
    Trap,
    /// Lazy kick, hard snare on 2 and 4
    BoomBap,
    /// Reggaeton "boom-ch-boom-chick"
    Dembow,
    /// 3-2 son clave with percussion
    Clave,
    /// Kick and snare together on beat 3
    OneDrop,
    /// Ride cymbal swing pattern with feathered kick
    JazzRide,
    /// Bjorklund-distributed hits
    Euclidean,
    /// No drums
    None,
}

impl DrumPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            DrumPattern::FourOnTheFloor => "four_on_the_floor",
            DrumPattern::Backbeat => "backbeat",
            DrumPattern::Breakbeat => "breakbeat",
            DrumPattern::Trap => "trap",
            DrumPattern::BoomBap => "boom_bap",
            DrumPattern::Dembow => "dembow",
            DrumPattern::Clave => "clave",
            DrumPattern::OneDrop => "one_drop",
            DrumPattern::JazzRide => "jazz_ride",
            DrumPattern::Euclidean => "euclidean",
            DrumPattern::None => "none",
        }
    }
}

/// Bass line style selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BassStyle {
    /// Quarter-note walk with chromatic approach tones
    Walking,
    /// Alternating root and fifth
    RootFifth,
    /// Long sub notes with octave slides
    #[serde(rename = "808")]
    EightOhEight,
    /// Anticipated Afro-Cuban bass
    Tumbao,
    /// Plain chord roots
    #[default]
    Root,
}

impl BassStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            BassStyle::Walking => "walking",
            BassStyle::RootFifth => "root_fifth",
            BassStyle::EightOhEight => "808",
            BassStyle::Tumbao => "tumbao",
            BassStyle::Root => "root",
        }
    }
}

fn default_scales() -> Vec<ScaleType> {
    vec![ScaleType::Major, ScaleType::NaturalMinor]
}

fn default_time_signatures() -> Vec<TimeSignature> {
    vec![TimeSignature::COMMON]
}

/// Musical parameters for one genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    /// Inclusive BPM range
    pub tempo_range: (u16, u16),
    #[serde(default)]
    pub swing: f64,
    pub note_density: f64,
    #[serde(default)]
    pub syncopation: f64,
    pub chord_complexity: f64,
    /// Inclusive velocity range
    pub velocity_range: (u8, u8),
    pub drum_pattern: DrumPattern,
    #[serde(default)]
    pub bass_style: BassStyle,
    #[serde(default = "default_scales")]
    pub scales: Vec<ScaleType>,
    #[serde(default = "default_time_signatures")]
    pub time_signatures: Vec<TimeSignature>,
    /// Instrument roles in track order
    pub instruments: Vec<String>,
}

impl GenreProfile {
    /// Start a profile with neutral parameters
    pub fn new(id: &str, name: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            tempo_range: (100, 120),
            swing: 0.0,
            note_density: 0.5,
            syncopation: 0.2,
            chord_complexity: 0.3,
            velocity_range: (70, 110),
            drum_pattern: DrumPattern::Backbeat,
            bass_style: BassStyle::Root,
            scales: default_scales(),
            time_signatures: default_time_signatures(),
            instruments: Vec::new(),
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn tempo(mut self, min: u16, max: u16) -> Self {
        self.tempo_range = (min, max);
        self
    }

    /// Set swing, note density, syncopation and chord complexity
    pub fn feel(mut self, swing: f64, density: f64, syncopation: f64, complexity: f64) -> Self {
        self.swing = swing;
        self.note_density = density;
        self.syncopation = syncopation;
        self.chord_complexity = complexity;
        self
    }

    pub fn velocity(mut self, min: u8, max: u8) -> Self {
        self.velocity_range = (min, max);
        self
    }

    pub fn drums(mut self, pattern: DrumPattern) -> Self {
        self.drum_pattern = pattern;
        self
    }

    pub fn bass(mut self, style: BassStyle) -> Self {
        self.bass_style = style;
        self
    }

    pub fn scales(mut self, scales: &[ScaleType]) -> Self {
        self.scales = scales.to_vec();
        self
    }

    /// Allowed meters as (numerator, denominator) pairs
    pub fn meters(mut self, meters: &[(u8, u8)]) -> Self {
        self.time_signatures = meters
            .iter()
            .map(|&(numerator, denominator)| TimeSignature { numerator, denominator })
            .collect();
        self
    }

    pub fn instruments(mut self, roles: &[&str]) -> Self {
        self.instruments = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Check ranges and normalize the instrument list.
    ///
    /// Instrument names are deduplicated keeping the first occurrence.
    pub fn validated(mut self) -> Result<Self> {
        let fail = |msg: String| Err(ComposerError::Catalog(format!("genre {:?}: {}", self.id, msg)));

        if self.id.trim().is_empty() {
            return fail("empty id".into());
        }
        let (tmin, tmax) = self.tempo_range;
        if tmin == 0 || tmin > tmax {
            return fail(format!("invalid tempo_range ({}, {})", tmin, tmax));
        }
        for (label, value) in [
            ("swing", self.swing),
            ("note_density", self.note_density),
            ("syncopation", self.syncopation),
            ("chord_complexity", self.chord_complexity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return fail(format!("{} out of [0, 1]: {}", label, value));
            }
        }
        let (vmin, vmax) = self.velocity_range;
        if vmin == 0 || vmin > vmax || vmax > 127 {
            return fail(format!("invalid velocity_range ({}, {})", vmin, vmax));
        }
        if self.scales.is_empty() {
            return fail("no scales".into());
        }
        if self.time_signatures.is_empty() {
            return fail("no time signatures".into());
        }
        for ts in &self.time_signatures {
            if let Err(e) = TimeSignature::new(ts.numerator, ts.denominator) {
                return fail(e);
            }
        }

        let mut seen = HashSet::new();
        self.instruments.retain(|name| seen.insert(name.clone()));
        Ok(self)
    }

    /// Whether a lowercase query occurs in any searchable field
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
            || self.instruments.iter().any(|i| i.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    genres: Vec<GenreProfile>,
}

/// Immutable catalog of genre profiles in catalog order
#[derive(Debug, Clone)]
pub struct GenreRegistry {
    profiles: Vec<GenreProfile>,
    index: HashMap<String, usize>,
}

impl GenreRegistry {
    /// Build a registry, validating every profile and rejecting duplicate ids
    pub fn new(profiles: Vec<GenreProfile>) -> Result<Self> {
        let mut validated = Vec::with_capacity(profiles.len());
        let mut index = HashMap::new();
        for profile in profiles {
            let profile = profile.validated()?;
            if index.contains_key(&profile.id) {
                return Err(ComposerError::Catalog(format!("duplicate genre id: {}", profile.id)));
            }
            index.insert(profile.id.clone(), validated.len());
            validated.push(profile);
        }
        Ok(Self { profiles: validated, index })
    }

    /// The built-in catalog
    pub fn builtin() -> Self {
        let profiles = catalog::builtin_profiles();
        let index = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self { profiles, index }
    }

    /// Parse a catalog from YAML (`genres:` list)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)
            .map_err(|e| ComposerError::Catalog(format!("failed to parse catalog: {}", e)))?;
        Self::new(file.genres)
    }

    /// Load a catalog file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Look up a profile by id
    pub fn get(&self, id: &str) -> Result<&GenreProfile> {
        self.index
            .get(id)
            .map(|&i| &self.profiles[i])
            .ok_or_else(|| ComposerError::GenreNotFound(id.to_string()))
    }

    /// All genre ids in catalog order
    pub fn list_all(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.id.as_str()).collect()
    }

    /// Categories in order of first appearance, each with its ids in catalog order
    pub fn categories(&self) -> Vec<(&str, Vec<&str>)> {
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for profile in &self.profiles {
            match groups.iter_mut().find(|(name, _)| *name == profile.category) {
                Some((_, ids)) => ids.push(profile.id.as_str()),
                None => groups.push((profile.category.as_str(), vec![profile.id.as_str()])),
            }
        }
        groups
    }

    /// Case-insensitive substring search over name, description, category
    /// and instruments. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = query.trim().to_lowercase();
        self.profiles
            .iter()
            .filter(|p| needle.is_empty() || p.matches(&needle))
            .map(|p| p.id.as_str())
            .collect()
    }

    pub fn profiles(&self) -> &[GenreProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Shared, swappable registry snapshot
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Arc<GenreRegistry>>>,
}

impl CatalogHandle {
    pub fn new(registry: GenreRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Current registry; stays valid even if a reload swaps it out
    pub fn snapshot(&self) -> Arc<GenreRegistry> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the registry for all future readers
    pub fn replace(&self, registry: GenreRegistry) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(registry);
    }
}
