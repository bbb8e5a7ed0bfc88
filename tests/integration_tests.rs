// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for the composer
//!
//! These tests drive the public API end to end: catalog, engine, codec,
//! training, blending and the HTTP surface.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use genre_composer::config::AppConfig;
use genre_composer::engine::{CompositionEngine, DEFAULT_PPQN};
use genre_composer::error::ComposerError;
use genre_composer::generators::drums::gm_drums;
use genre_composer::genres::{CatalogHandle, GenreRegistry};
use genre_composer::midi::{MidiDecoder, MidiEncoder, SmfDecoder, SmfEncoder};
use genre_composer::server::{self, AppState};

fn write_corpus(dir: &Path, genres: &[&str]) {
    let registry = GenreRegistry::builtin();
    let engine = CompositionEngine::default();
    fs::create_dir_all(dir).unwrap();
    for (i, genre) in genres.iter().enumerate() {
        let composition = engine.generate(registry.get(genre).unwrap(), 4, Some(i as u64)).unwrap();
        let bytes = SmfEncoder::new().encode(&composition).unwrap();
        fs::write(dir.join(format!("{}.mid", genre)), bytes).unwrap();
    }
}

fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.paths.output_dir = dir.join("output");
    config.paths.models_dir = dir.join("models");
    config.training.directory = dir.join("training_data");
    config.training.hyperparameters.hidden = 16;
    config.training.hyperparameters.embedding = 8;
    config
}

async fn start(config: &AppConfig) -> SocketAddr {
    let state = Arc::new(AppState::from_config(config, CatalogHandle::new(GenreRegistry::builtin())));
    let http = Arc::new(server::bind("127.0.0.1:0").unwrap());
    let addr = server::local_addr(&http).unwrap();
    tokio::spawn(server::serve(http, state));
    addr
}

async fn call(addr: SocketAddr, method: &str, target: &str, body: Option<&str>) -> (u16, Value) {
    let body = body.unwrap_or("");
    let raw = format!(
        "{} {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        method,
        target,
        body.len(),
        body
    );
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    let split = out.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    let status = String::from_utf8_lossy(&out[..split])
        .split_whitespace()
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();
    let value = serde_json::from_slice(&out[split + 4..]).unwrap_or(Value::Null);
    (status, value)
}

/// Reggaeton with a fixed seed is reproducible, in tempo range and carries
/// the dembow snare figure
#[test]
fn test_reggaeton_generation() {
    let registry = GenreRegistry::builtin();
    let profile = registry.get("reggaeton").unwrap();
    let engine = CompositionEngine::default();

    let a = engine.generate(profile, 8, Some(42)).unwrap();
    let b = engine.generate(profile, 8, Some(42)).unwrap();
    assert_eq!(a, b);
    assert!((profile.tempo_range.0..=profile.tempo_range.1).contains(&a.tempo));

    let drums = a.tracks.iter().find(|t| t.kind.is_percussive()).unwrap();
    let step = (DEFAULT_PPQN / 4) as u64;
    let bar = a.ticks_per_bar();
    for note in drums.notes.iter().filter(|n| n.pitch == gm_drums::SNARE && n.start_tick < bar) {
        assert_eq!(note.start_tick % step, 0);
        assert!([3, 6, 11, 14].contains(&(note.start_tick / step)));
    }
    assert!(drums.notes.iter().any(|n| n.pitch == gm_drums::KICK && n.start_tick == 0));
}

/// Every note stays within the composition and the genre's velocity range
#[test]
fn test_range_invariants_across_catalog() {
    let registry = GenreRegistry::builtin();
    let engine = CompositionEngine::default();
    for profile in registry.profiles() {
        let composition = engine.generate(profile, 4, Some(7)).unwrap();
        let (lo, hi) = profile.velocity_range;
        assert!((profile.tempo_range.0..=profile.tempo_range.1).contains(&composition.tempo));
        for track in &composition.tracks {
            for note in &track.notes {
                assert!(note.velocity >= lo && note.velocity <= hi, "{} velocity", profile.id);
                assert!(note.duration_ticks > 0);
                assert!(note.end_tick() <= composition.length_ticks(), "{} length", profile.id);
            }
        }
    }
}

/// Encoded output decodes back to the same note count and tempo
#[test]
fn test_encoded_file_decodes() {
    let registry = GenreRegistry::builtin();
    let composition = CompositionEngine::default()
        .generate(registry.get("funk").unwrap(), 4, Some(11))
        .unwrap();
    let bytes = SmfEncoder::new().encode(&composition).unwrap();
    let decoded = SmfDecoder::new(composition.ppqn).decode_bytes(&bytes).unwrap();
    assert_eq!(decoded.note_count(), composition.note_count());
    assert_eq!(decoded.tempo_bpm.round() as u16, composition.tempo);
}

#[tokio::test]
async fn test_training_on_empty_directory_fails() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("empty_dir")).unwrap();
    let addr = start(&config_in(dir.path())).await;

    let body = format!(
        r#"{{"directory":{:?},"epochs":5,"model_name":"m"}}"#,
        dir.path().join("empty_dir").to_string_lossy()
    );
    let (status, value) = call(addr, "POST", "/api/train-neural", Some(&body)).await;
    assert_eq!(status, 422);
    assert_eq!(value["success"], false);
    assert_eq!(value["error"], "no training data found");
}

#[tokio::test]
async fn test_train_then_generate_with_model() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    write_corpus(&config.training.directory, &["pop", "bebop"]);
    let addr = start(&config).await;

    let (_, status_before) = call(addr, "GET", "/api/model-status", None).await;
    assert_eq!(status_before["exists"], false);

    let (status, trained) = call(addr, "POST", "/api/train-neural", Some(r#"{"epochs":2}"#)).await;
    assert_eq!(status, 200, "{}", trained);
    assert_eq!(trained["success"], true);
    assert_eq!(trained["model"], "composer_model");
    assert_eq!(trained["version"], 1);

    let (status, model) = call(addr, "GET", "/api/model-status", None).await;
    assert_eq!(status, 200);
    assert_eq!(model["exists"], true);
    assert_eq!(model["model"], "composer_model");

    let (_, models) = call(addr, "GET", "/api/models", None).await;
    assert_eq!(models["models"], serde_json::json!(["composer_model"]));

    let (status, loaded) = call(addr, "POST", "/api/load-model", Some(r#"{"model":"composer_model"}"#)).await;
    assert_eq!(status, 200);
    assert_eq!(loaded["version"], 1);

    let (status, generated) = call(
        addr,
        "POST",
        "/api/generate",
        Some(r#"{"genre":"house","bars":4,"seed":8,"neural":true}"#),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(generated["neural"], true);
    assert_eq!(generated["filename"], "house_4bars_8_neural.mid");
    assert!(config.paths.output_dir.join("house_4bars_8_neural.mid").is_file());
}

#[tokio::test]
async fn test_neural_request_without_model_falls_back() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let addr = start(&config).await;

    let (status, value) = call(addr, "GET", "/api/generate?genre=techno&bars=4&seed=2&neural=true", None).await;
    assert_eq!(status, 200);
    assert_eq!(value["neural"], false);
    assert_eq!(value["filename"], "techno_4bars_2.mid");
    assert_eq!(value["warnings"], serde_json::json!(["neural requested but unavailable"]));

    let (status, _) = call(addr, "POST", "/api/load-model", Some(r#"{"model":"missing"}"#)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_unknown_genre_writes_nothing() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let addr = start(&config).await;

    let (status, value) = call(addr, "GET", "/api/generate?genre=does_not_exist&bars=8", None).await;
    assert_eq!(status, 404);
    assert_eq!(value["success"], false);
    let written = fs::read_dir(&config.paths.output_dir).map(|d| d.count()).unwrap_or(0);
    assert_eq!(written, 0);
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let dir = tempdir().unwrap();
    let addr = start(&config_in(dir.path())).await;

    let (status, found) = call(addr, "GET", "/api/search?q=jazz", None).await;
    assert_eq!(status, 200);
    assert!(found.as_array().unwrap().contains(&Value::from("smooth_jazz")));

    let (_, categories) = call(addr, "GET", "/api/categories", None).await;
    assert!(categories["Latin"].as_array().unwrap().contains(&Value::from("reggaeton")));

    let (status, info) = call(addr, "GET", "/api/genre-info?id=reggaeton", None).await;
    assert_eq!(status, 200);
    assert_eq!(info["category"], "Latin");
}

#[test]
fn test_unknown_genre_error_type() {
    let dir = tempdir().unwrap();
    let state = AppState::from_config(&config_in(dir.path()), CatalogHandle::new(GenreRegistry::builtin()));
    let err = state.orchestrator.generate("does_not_exist", 8, None, false).unwrap_err();
    assert!(matches!(err, ComposerError::GenreNotFound(_)));
}
