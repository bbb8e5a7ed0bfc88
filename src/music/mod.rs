// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities for the composer.
//!
//! Scales, pitch classes and meters shared by the genre catalog, the
//! composition engine and the neural blending pass.

pub mod meter;
pub mod scale;

pub use meter::TimeSignature;
pub use scale::{MidiNote, Note, Scale, ScaleType};
