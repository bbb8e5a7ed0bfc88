// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! API endpoint handlers.
//!
//! Catalog lookups run inline. Generation, training and model loading run
//! on tokio's blocking pool so they never stall the accept loop.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::http::{Request, Response};
use super::AppState;
use crate::error::ComposerError;
use crate::genres::GenreProfile;
use crate::neural::NeuralModel;

/// HTTP status for a core error
pub fn status_for(err: &ComposerError) -> u16 {
    match err {
        ComposerError::GenreNotFound(_) | ComposerError::ModelNotFound(_) => 404,
        ComposerError::Validation(_) => 400,
        ComposerError::Training(_) | ComposerError::Corpus { .. } => 422,
        _ => 500,
    }
}

fn failure(err: &ComposerError) -> Response {
    Response::error(status_for(err), &err.to_string())
}

/// Parse a JSON body; an empty body reads as `{}`
fn parse_body<T: for<'de> Deserialize<'de> + Default>(req: &Request) -> Result<T, Response> {
    if req.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&req.body).map_err(|e| Response::error(400, &format!("invalid JSON body: {}", e)))
}

fn truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// Route a request to its handler
pub async fn handle(state: Arc<AppState>, req: Request) -> Response {
    match (req.method.as_str(), req.path.as_str()) {
        ("OPTIONS", _) => Response::preflight(),
        ("GET", "/api/genres") => genres(&state),
        ("GET", "/api/categories") => categories(&state),
        ("GET", "/api/genre-info") => genre_info(&state, &req),
        ("GET", "/api/search") => search(&state, &req),
        ("GET", "/api/generate") => match GenerateParams::from_query(&req, state.default_bars) {
            Ok(params) => generate(state, params).await,
            Err(response) => response,
        },
        ("POST", "/api/generate") => match GenerateParams::from_body(&req, state.default_bars) {
            Ok(params) => generate(state, params).await,
            Err(response) => response,
        },
        ("GET", "/api/model-status") => model_status(&state, &req),
        ("GET", "/api/models") => models(&state),
        ("POST", "/api/train-neural") => train(state, &req).await,
        ("POST", "/api/cancel-training") => cancel_training(&state, &req),
        ("POST", "/api/load-model") => load_model(state, &req).await,
        ("GET", path) if path.starts_with("/output/") => output_file(&state, path).await,
        _ => Response::error(404, "not found"),
    }
}

fn genres(state: &AppState) -> Response {
    let registry = state.orchestrator.catalog().snapshot();
    Response::json(200, &registry.list_all())
}

fn categories(state: &AppState) -> Response {
    let registry = state.orchestrator.catalog().snapshot();
    let mut object = Map::new();
    for (category, ids) in registry.categories() {
        object.insert(category.to_string(), json!(ids));
    }
    Response::json(200, &Value::Object(object))
}

/// Public description of a genre
pub fn genre_json(p: &GenreProfile) -> Value {
    json!({
        "id": p.id,
        "name": p.name,
        "category": p.category,
        "description": p.description,
        "tempo_range": p.tempo_range,
        "swing": p.swing,
        "note_density": p.note_density,
        "syncopation": p.syncopation,
        "chord_complexity": p.chord_complexity,
        "velocity_range": p.velocity_range,
        "drum_pattern": p.drum_pattern.as_str(),
        "bass_style": p.bass_style.as_str(),
        "scales": p.scales.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        "time_signatures": p.time_signatures.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
        "instruments": p.instruments,
    })
}

fn genre_info(state: &AppState, req: &Request) -> Response {
    let Some(id) = req.query_param("id").map(str::trim).filter(|id| !id.is_empty()) else {
        return Response::error(400, "missing genre id");
    };
    let registry = state.orchestrator.catalog().snapshot();
    match registry.get(id) {
        Ok(profile) => Response::json(200, &genre_json(profile)),
        Err(e) => failure(&e),
    }
}

fn search(state: &AppState, req: &Request) -> Response {
    let registry = state.orchestrator.catalog().snapshot();
    Response::json(200, &registry.search(req.query_param("q").unwrap_or("")))
}

#[derive(Debug, Clone, PartialEq)]
struct GenerateParams {
    genre: String,
    bars: i64,
    seed: Option<u64>,
    neural: bool,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateBody {
    genre: Option<String>,
    bars: Option<i64>,
    seed: Option<u64>,
    #[serde(default)]
    neural: bool,
}

impl GenerateParams {
    fn from_query(req: &Request, default_bars: i64) -> Result<Self, Response> {
        let genre = req
            .query_param("genre")
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .ok_or_else(|| Response::error(400, "missing genre parameter"))?;
        let bars = match req.query_param("bars").map(str::trim).filter(|b| !b.is_empty()) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| Response::error(400, &format!("bars must be an integer, got {:?}", raw)))?,
            None => default_bars,
        };
        let seed = match req.query_param("seed").map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|_| Response::error(400, &format!("seed must be a non-negative integer, got {:?}", raw)))?,
            ),
            None => None,
        };
        Ok(Self {
            genre: genre.to_string(),
            bars,
            seed,
            neural: req.query_param("neural").map(truthy).unwrap_or(false),
        })
    }

    fn from_body(req: &Request, default_bars: i64) -> Result<Self, Response> {
        let body: GenerateBody = parse_body(req)?;
        let genre = body
            .genre
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .ok_or_else(|| Response::error(400, "missing genre"))?;
        Ok(Self {
            genre,
            bars: body.bars.unwrap_or(default_bars),
            seed: body.seed,
            neural: body.neural,
        })
    }
}

async fn generate(state: Arc<AppState>, params: GenerateParams) -> Response {
    let task = tokio::task::spawn_blocking(move || {
        state
            .orchestrator
            .generate(&params.genre, params.bars, params.seed, params.neural)
    });
    match task.await {
        Ok(Ok(result)) => Response::json(
            200,
            &json!({
                "success": true,
                "filename": result.filename,
                "tempo": result.tempo,
                "seed": result.seed,
                "neural": result.neural_applied,
                "warnings": result.warnings,
            }),
        ),
        Ok(Err(e)) => failure(&e),
        Err(e) => Response::error(500, &format!("generation task failed: {}", e)),
    }
}

fn model_status(state: &AppState, req: &Request) -> Response {
    let model = req
        .query_param("model")
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(state.orchestrator.model_name());
    let exists = state.orchestrator.store().exists(model);
    Response::json(200, &json!({ "exists": exists, "model": model }))
}

fn models(state: &AppState) -> Response {
    match state.orchestrator.store().list() {
        Ok(names) => Response::json(200, &json!({ "models": names })),
        Err(e) => failure(&e),
    }
}

#[derive(Debug, Default, Deserialize)]
struct TrainBody {
    directory: Option<String>,
    epochs: Option<i64>,
    model_name: Option<String>,
}

async fn train(state: Arc<AppState>, req: &Request) -> Response {
    let body: TrainBody = match parse_body(req) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let directory = body
        .directory
        .map(PathBuf::from)
        .unwrap_or_else(|| state.training_directory.clone());
    let epochs = body.epochs.unwrap_or(state.default_epochs);
    let model_name = body
        .model_name
        .unwrap_or_else(|| state.orchestrator.model_name().to_string());

    let task = tokio::task::spawn_blocking(move || state.pipeline.run_named(&directory, epochs, &model_name));
    match task.await {
        Ok(Ok(outcome)) => Response::json(
            200,
            &json!({
                "success": true,
                "model": outcome.model_name,
                "version": outcome.version,
                "warnings": outcome.warnings,
                "files": outcome.files_used,
                "epochs": outcome.result.epoch_losses.len(),
                "final_loss": outcome.result.final_loss,
            }),
        ),
        Ok(Err(e)) => failure(&e),
        Err(e) => Response::error(500, &format!("training task failed: {}", e)),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ModelBody {
    model_name: Option<String>,
    model: Option<String>,
}

impl ModelBody {
    fn name_or(self, default: &str) -> String {
        self.model_name.or(self.model).unwrap_or_else(|| default.to_string())
    }
}

fn cancel_training(state: &AppState, req: &Request) -> Response {
    let body: ModelBody = match parse_body(req) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let name = body.name_or(state.orchestrator.model_name());
    let cancelled = state.pipeline.cancel(&name);
    Response::json(200, &json!({ "success": cancelled, "model": name }))
}

async fn load_model(state: Arc<AppState>, req: &Request) -> Response {
    let body: ModelBody = match parse_body(req) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let name = body.name_or(state.orchestrator.model_name());
    let task = tokio::task::spawn_blocking(move || {
        NeuralModel::load(state.orchestrator.store().as_ref(), &name).map(|m| (name, m.version()))
    });
    match task.await {
        Ok(Ok((name, version))) => Response::json(200, &json!({ "success": true, "model": name, "version": version })),
        Ok(Err(e)) => failure(&e),
        Err(e) => Response::error(500, &format!("load task failed: {}", e)),
    }
}

async fn output_file(state: &AppState, path: &str) -> Response {
    let name = &path["/output/".len()..];
    let safe = name.ends_with(".mid")
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..");
    if !safe {
        return Response::error(404, "file not found");
    }
    match tokio::fs::read(state.orchestrator.output_dir().join(name)).await {
        Ok(bytes) => Response::bytes("audio/midi", bytes),
        Err(_) => Response::error(404, "file not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn get(target: &str) -> Request {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Request {
            method: "GET".into(),
            path: path.into(),
            query: super::super::http::parse_query(query),
            body: Vec::new(),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&ComposerError::GenreNotFound("x".into())), 404);
        assert_eq!(status_for(&ComposerError::validation("bad")), 400);
        assert_eq!(status_for(&ComposerError::Training("no training data found".into())), 422);
        assert_eq!(status_for(&ComposerError::Encoding("x".into())), 500);
    }

    #[test]
    fn test_generate_params_from_query() {
        let params = GenerateParams::from_query(&get("/api/generate?genre=reggaeton&bars=8&seed=42&neural=TRUE"), 32).unwrap();
        assert_eq!(
            params,
            GenerateParams {
                genre: "reggaeton".into(),
                bars: 8,
                seed: Some(42),
                neural: true
            }
        );
        let defaults = GenerateParams::from_query(&get("/api/generate?genre=pop"), 32).unwrap();
        assert_eq!((defaults.bars, defaults.seed, defaults.neural), (32, None, false));
    }

    #[test]
    fn test_generate_params_errors() {
        assert_eq!(GenerateParams::from_query(&get("/api/generate"), 32).unwrap_err().status, 400);
        assert_eq!(GenerateParams::from_query(&get("/api/generate?genre=pop&bars=ten"), 32).unwrap_err().status, 400);
        assert_eq!(GenerateParams::from_query(&get("/api/generate?genre=pop&seed=-1"), 32).unwrap_err().status, 400);
    }

    #[test]
    fn test_generate_params_from_body() {
        let req = Request {
            method: "POST".into(),
            path: "/api/generate".into(),
            query: HashMap::new(),
            body: br#"{"genre":"house","bars":4,"neural":true}"#.to_vec(),
        };
        let params = GenerateParams::from_body(&req, 32).unwrap();
        assert_eq!((params.genre.as_str(), params.bars, params.neural), ("house", 4, true));

        let bad = Request { body: b"{nope".to_vec(), ..req };
        assert_eq!(GenerateParams::from_body(&bad, 32).unwrap_err().status, 400);
    }

    #[test]
    fn test_genre_json_fields() {
        let registry = crate::genres::GenreRegistry::builtin();
        let value = genre_json(registry.get("reggaeton").unwrap());
        assert_eq!(value["drum_pattern"], "dembow");
        assert_eq!(value["tempo_range"], json!([88, 100]));
        assert!(value["instruments"].as_array().unwrap().contains(&json!("drums")));
    }
}
