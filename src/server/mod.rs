// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! JSON API over HTTP/1.1.
//!
//! `tiny_http` accepts and parses requests on a dedicated thread. Each
//! request is handed to a tokio task; body reads and response writes are
//! blocking and run on `spawn_blocking`.

pub mod http;
pub mod routes;

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use tiny_http::Server;
use tokio::sync::oneshot;
use tokio::task;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::engine::CompositionEngine;
use crate::genres::CatalogHandle;
use crate::neural::{CheckpointStore, FileCheckpointStore};
use crate::orchestrator::GenerationOrchestrator;
use crate::training::TrainingPipeline;

use http::Request;

/// State shared by every request handler
pub struct AppState {
    pub orchestrator: GenerationOrchestrator,
    pub pipeline: TrainingPipeline,
    /// Bars used when a generate request omits them
    pub default_bars: i64,
    /// Corpus used when a training request omits the directory
    pub training_directory: PathBuf,
    pub default_epochs: i64,
}

impl AppState {
    /// Wire up file-backed checkpoints and the configured catalog
    pub fn from_config(config: &AppConfig, catalog: CatalogHandle) -> Self {
        let store: Arc<dyn CheckpointStore> = Arc::new(FileCheckpointStore::new(&config.paths.models_dir));
        let orchestrator = GenerationOrchestrator::new(
            catalog,
            CompositionEngine::new(config.engine_config()),
            Arc::clone(&store),
            &config.paths.output_dir,
            config.neural.clone(),
        );
        let pipeline = TrainingPipeline::new(store, config.training.hyperparameters);
        Self {
            orchestrator,
            pipeline,
            default_bars: config.generation.default_bars,
            training_directory: config.training.directory.clone(),
            default_epochs: config.training.epochs,
        }
    }
}

/// Bind the HTTP server for `addr`
pub fn bind(addr: &str) -> io::Result<Server> {
    Server::http(addr).map_err(|e| io::Error::new(io::ErrorKind::AddrNotAvailable, e))
}

/// Socket address the server is listening on
pub fn local_addr(server: &Server) -> io::Result<SocketAddr> {
    server
        .server_addr()
        .to_ip()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Unsupported, "server is not bound to an IP address"))
}

/// Serve requests until the server is unblocked or its listener fails
pub async fn serve(server: Arc<Server>, state: Arc<AppState>) -> io::Result<()> {
    info!(addr = %local_addr(&server)?, "composer API listening");
    let runtime = tokio::runtime::Handle::current();
    let (done_tx, done_rx) = oneshot::channel();
    let acceptor = Arc::clone(&server);

    thread::Builder::new()
        .name("http-accept".to_string())
        .spawn(move || {
            for request in acceptor.incoming_requests() {
                runtime.spawn(handle_request(request, Arc::clone(&state)));
            }
            let _ = done_tx.send(());
        })?;

    let _ = done_rx.await;
    info!("composer API stopped");
    Ok(())
}

async fn handle_request(mut raw: tiny_http::Request, state: Arc<AppState>) {
    let read = task::spawn_blocking(move || {
        let parsed = Request::read_from(&mut raw);
        (raw, parsed)
    })
    .await;
    let (raw, parsed) = match read {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "request reader failed");
            return;
        }
    };

    let response = match parsed {
        Ok(request) => {
            let method = request.method.clone();
            let path = request.path.clone();
            let response = routes::handle(state, request).await;
            info!(%method, %path, status = response.status, "request");
            response
        }
        Err(response) => {
            debug!(status = response.status, "request rejected");
            response
        }
    };

    match task::spawn_blocking(move || raw.respond(response.into_http())).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(error = %e, "failed to send response"),
        Err(e) => warn!(error = %e, "response writer failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use crate::genres::GenreRegistry;

    async fn start(config: AppConfig) -> (SocketAddr, Arc<Server>) {
        let state = Arc::new(AppState::from_config(&config, CatalogHandle::new(GenreRegistry::builtin())));
        let server = Arc::new(bind("127.0.0.1:0").unwrap());
        let addr = local_addr(&server).unwrap();
        tokio::spawn(serve(Arc::clone(&server), state));
        (addr, server)
    }

    fn raw_request(method: &str, target: &str, body: &str) -> String {
        format!(
            "{} {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{}",
            method,
            target,
            body.len(),
            body
        )
    }

    /// Returns status, head and body
    async fn request(addr: SocketAddr, raw: &str) -> (u16, String, Vec<u8>) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        let split = out.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        let head = String::from_utf8_lossy(&out[..split]).to_string();
        let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
        (status, head, out[split + 4..].to_vec())
    }

    async fn get(addr: SocketAddr, target: &str) -> (u16, Vec<u8>) {
        let (status, _, body) = request(addr, &raw_request("GET", target, "")).await;
        (status, body)
    }

    fn test_config(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.paths.output_dir = dir.join("output");
        config.paths.models_dir = dir.join("models");
        config
    }

    #[tokio::test]
    async fn test_genres_endpoint() {
        let dir = tempdir().unwrap();
        let (addr, _server) = start(test_config(dir.path())).await;
        let (status, head, body) = request(addr, &raw_request("GET", "/api/genres", "")).await;
        assert_eq!(status, 200);
        let head = head.to_ascii_lowercase();
        assert!(head.contains("access-control-allow-origin: *"));
        assert!(head.contains("content-type: application/json"));
        let ids: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert!(ids.contains(&"reggaeton".to_string()));
    }

    #[tokio::test]
    async fn test_generate_then_download() {
        let dir = tempdir().unwrap();
        let (addr, _server) = start(test_config(dir.path())).await;
        let (status, body) = get(addr, "/api/generate?genre=funk&bars=4&seed=3").await;
        assert_eq!(status, 200);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["filename"], "funk_4bars_3.mid");

        let (status, bytes) = get(addr, "/output/funk_4bars_3.mid").await;
        assert_eq!(status, 200);
        assert_eq!(&bytes[..4], b"MThd");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let dir = tempdir().unwrap();
        let (addr, _server) = start(test_config(dir.path())).await;
        assert_eq!(get(addr, "/api/genre-info").await.0, 400);
        assert_eq!(get(addr, "/api/genre-info?id=nope").await.0, 404);
        assert_eq!(get(addr, "/api/generate?genre=pop&bars=0").await.0, 400);
        assert_eq!(get(addr, "/output/../secret.mid").await.0, 404);
        let (status, _, _) = request(addr, &raw_request("DELETE", "/api/genres", "")).await;
        assert_eq!(status, 404);
        let (status, _, _) = request(addr, &raw_request("POST", "/api/generate", "{not json")).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let dir = tempdir().unwrap();
        let (addr, _server) = start(test_config(dir.path())).await;

        let head = format!(
            "POST /api/generate HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{{}}",
            http::MAX_BODY_BYTES + 1
        );
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(head.as_bytes()).await.unwrap();

        // Only the response head is awaited; the declared body is never sent
        let mut out = Vec::new();
        let mut chunk = [0u8; 512];
        while !out.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut chunk))
                .await
                .unwrap()
                .unwrap();
            assert!(n > 0, "connection closed before a response");
            out.extend_from_slice(&chunk[..n]);
        }
        let status: u16 = String::from_utf8_lossy(&out)
            .split_whitespace()
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(status, 413);
        let written = std::fs::read_dir(dir.path().join("output")).map(|d| d.count()).unwrap_or(0);
        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn test_training_without_corpus() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.training.directory = dir.path().join("empty");
        std::fs::create_dir_all(&config.training.directory).unwrap();
        let (addr, _server) = start(config).await;

        let (status, _, response) = request(addr, &raw_request("POST", "/api/train-neural", r#"{"epochs":1}"#)).await;
        assert_eq!(status, 422);
        let value: Value = serde_json::from_slice(&response).unwrap();
        assert_eq!(value["success"], false);

        let (status, response) = get(addr, "/api/model-status").await;
        assert_eq!(status, 200);
        let value: Value = serde_json::from_slice(&response).unwrap();
        assert_eq!(value["exists"], false);
        assert_eq!(value["model"], "composer_model");
    }

    #[tokio::test]
    async fn test_unblock_stops_serve() {
        let dir = tempdir().unwrap();
        let state = Arc::new(AppState::from_config(
            &test_config(dir.path()),
            CatalogHandle::new(GenreRegistry::builtin()),
        ));
        let server = Arc::new(bind("127.0.0.1:0").unwrap());
        let serving = tokio::spawn(serve(Arc::clone(&server), state));
        tokio::time::sleep(Duration::from_millis(50)).await;

        server.unblock();
        let finished = tokio::time::timeout(Duration::from_secs(5), serving).await.unwrap();
        assert!(finished.unwrap().is_ok());
    }
}
