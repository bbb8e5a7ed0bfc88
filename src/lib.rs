// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Genre-driven MIDI composition.
//!
//! A catalog of genre profiles drives a seeded procedural engine; an
//! optional small neural model, trained on a MIDI corpus, can be blended
//! into the result. Everything is reachable from the `composer` binary and
//! its HTTP API.

pub mod config;
pub mod engine;
pub mod error;
pub mod generators;
pub mod genres;
pub mod midi;
pub mod music;
pub mod neural;
pub mod orchestrator;
pub mod server;
pub mod storage;
pub mod training;

pub use error::{ComposerError, Result};
