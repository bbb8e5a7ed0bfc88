// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Hot reload for custom genre catalogs.
//!
//! The watcher observes the catalog's directory (editors often replace the
//! file instead of writing in place), debounces bursts of events and then
//! reloads the catalog. A catalog that fails to load leaves the current
//! snapshot in place.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TrySendError};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::genres::{CatalogHandle, GenreRegistry};

/// Outcome of a reload attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    /// New catalog swapped in with this many genres
    Reloaded(usize),
    /// Catalog failed to load; the previous snapshot is still active
    Error(String),
}

/// Reload the catalog at `path` into `handle`
pub fn reload(path: &Path, handle: &CatalogHandle) -> CatalogEvent {
    match GenreRegistry::load(path) {
        Ok(registry) => {
            let count = registry.len();
            handle.replace(registry);
            info!(path = %path.display(), genres = count, "catalog reloaded");
            CatalogEvent::Reloaded(count)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "catalog reload failed, keeping previous catalog");
            CatalogEvent::Error(format!("Failed to load {:?}: {}", path, e))
        }
    }
}

/// Reload events kept for a consumer that has not drained them
pub const EVENT_BACKLOG: usize = 16;

/// Queue an event for consumers. A full backlog drops the event (the
/// reload itself has already been applied and logged). Returns false once
/// the receiver is gone.
fn publish(tx: &SyncSender<CatalogEvent>, event: CatalogEvent) -> bool {
    match tx.try_send(event) {
        Ok(()) | Err(TrySendError::Full(_)) => true,
        Err(TrySendError::Disconnected(_)) => false,
    }
}

/// The watch is non-recursive on the parent directory, so a file name
/// match identifies the catalog
fn same_file(a: &Path, b: &Path) -> bool {
    a.file_name().is_some() && a.file_name() == b.file_name()
}

/// Catalog file watcher with debouncing
pub struct CatalogWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<CatalogEvent>,
    catalog_path: PathBuf,
}

impl CatalogWatcher {
    /// Watch `catalog_path` and swap reloaded catalogs into `handle`.
    ///
    /// `debounce_ms` defaults to 500.
    pub fn new<P: AsRef<Path>>(catalog_path: P, handle: CatalogHandle, debounce_ms: Option<u64>) -> Result<Self> {
        let catalog_path = catalog_path.as_ref().to_path_buf();
        let debounce = Duration::from_millis(debounce_ms.unwrap_or(500));
        let watch_dir = match catalog_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (event_tx, event_rx) = mpsc::sync_channel::<CatalogEvent>(EVENT_BACKLOG);
        let (notify_tx, notify_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", watch_dir, e))?;

        let target = catalog_path.clone();
        std::thread::spawn(move || {
            let mut last_event: Option<Instant> = None;

            loop {
                match notify_rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(event) => {
                        let relevant = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
                            && event.paths.iter().any(|p| same_file(p, &target));
                        if relevant {
                            last_event = Some(Instant::now());
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if last_event.is_some_and(|t| t.elapsed() >= debounce) {
                            last_event = None;
                            if !publish(&event_tx, reload(&target, &handle)) {
                                break;
                            }
                        }
                    }
                    // Watcher dropped
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            catalog_path,
        })
    }

    /// Next reload event, if any (non-blocking)
    pub fn try_recv(&self) -> Option<CatalogEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Drain pending reload events
    pub fn recv_all(&self) -> Vec<CatalogEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait up to `timeout` for the next reload event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<CatalogEvent> {
        self.event_receiver.recv_timeout(timeout).ok()
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }
}
