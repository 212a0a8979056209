//! Background worker thread owning both collections.
//!
//! All store mutations funnel through this thread: callers hold a cloneable
//! [`ServiceHandle`] and send [`Request`]s; refreshed projections and
//! per-item ingestion failures come back as [`Event`]s. Classification and
//! artifact I/O run here, never on the caller's thread.

use crate::core::error::CollectionError;
use crate::core::prefs::Prefs;
use crate::core::{Collection, CollectionKind, IngestFailure};
use crate::types::{AppConfig, Config, Item, ItemId, RetentionSetting};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

pub enum Request {
    IngestPaths {
        collection: CollectionKind,
        paths: Vec<PathBuf>,
    },
    IngestText {
        collection: CollectionKind,
        text: String,
        source_app: Option<String>,
    },
    IngestImage {
        collection: CollectionKind,
        bytes: Vec<u8>,
    },
    Delete {
        collection: CollectionKind,
        id: ItemId,
    },
    Clear {
        collection: CollectionKind,
    },
    TogglePin {
        collection: CollectionKind,
        id: ItemId,
    },
    AddLabel {
        collection: CollectionKind,
        id: ItemId,
        label: String,
    },
    RemoveLabel {
        collection: CollectionKind,
        id: ItemId,
        label: String,
    },
    /// Apply the retention policy to both collections. Unless `force` is
    /// set, the configured sweep interval throttles repeat requests.
    Sweep {
        force: bool,
    },
    /// Re-align the tray with its on-disk directory.
    ReconcileTray,
    SetRetention {
        collection: CollectionKind,
        setting: RetentionSetting,
    },
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Emitted once per collection at startup and after every mutation.
    ItemsChanged {
        collection: CollectionKind,
        items: Vec<Item>,
    },
    IngestFailed {
        collection: CollectionKind,
        failures: Vec<IngestFailure>,
    },
    SweepCompleted {
        collection: CollectionKind,
        expired: usize,
    },
    RetentionChanged {
        collection: CollectionKind,
        setting: RetentionSetting,
    },
}

/// Cloneable front door to the worker. Ingest dispatches bump the loading
/// counter synchronously; the worker drops it when the batch settles, so
/// `is_loading` is accurate for any number of in-flight ingestions.
#[derive(Clone)]
pub struct ServiceHandle {
    tx: Sender<Request>,
    loading: Arc<AtomicUsize>,
}

impl ServiceHandle {
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    fn send(&self, request: Request) {
        let _ = self.tx.send(request);
    }

    fn send_loading(&self, request: Request) {
        self.loading.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(request).is_err() {
            self.loading.fetch_sub(1, Ordering::SeqCst);
        }
    }

    pub fn ingest_paths(&self, collection: CollectionKind, paths: Vec<PathBuf>) {
        self.send_loading(Request::IngestPaths { collection, paths });
    }

    pub fn ingest_text(
        &self,
        collection: CollectionKind,
        text: String,
        source_app: Option<String>,
    ) {
        self.send_loading(Request::IngestText {
            collection,
            text,
            source_app,
        });
    }

    pub fn ingest_image(&self, collection: CollectionKind, bytes: Vec<u8>) {
        self.send_loading(Request::IngestImage { collection, bytes });
    }

    pub fn delete(&self, collection: CollectionKind, id: ItemId) {
        self.send(Request::Delete { collection, id });
    }

    pub fn clear(&self, collection: CollectionKind) {
        self.send(Request::Clear { collection });
    }

    pub fn toggle_pin(&self, collection: CollectionKind, id: ItemId) {
        self.send(Request::TogglePin { collection, id });
    }

    pub fn add_label(&self, collection: CollectionKind, id: ItemId, label: String) {
        self.send(Request::AddLabel {
            collection,
            id,
            label,
        });
    }

    pub fn remove_label(&self, collection: CollectionKind, id: ItemId, label: String) {
        self.send(Request::RemoveLabel {
            collection,
            id,
            label,
        });
    }

    pub fn sweep(&self, force: bool) {
        self.send(Request::Sweep { force });
    }

    pub fn reconcile_tray(&self) {
        self.send(Request::ReconcileTray);
    }

    pub fn set_retention(&self, collection: CollectionKind, setting: RetentionSetting) {
        self.send(Request::SetRetention {
            collection,
            setting,
        });
    }

    pub fn shutdown(&self) {
        self.send(Request::Shutdown);
    }
}

/// Opens both collections and starts the worker thread.
///
/// Returns the handle plus the event stream. The initial `ItemsChanged`
/// events for both collections are emitted before any request is handled.
pub fn start(
    config: Config,
    app_config: AppConfig,
) -> Result<(ServiceHandle, Receiver<Event>), CollectionError> {
    let prefs = Arc::new(Prefs::open(&config.prefs_path())?);
    let tray = Collection::open(CollectionKind::Tray, &config, Arc::clone(&prefs))?;
    let clipboard = Collection::open(CollectionKind::Clipboard, &config, Arc::clone(&prefs))?;

    let (request_tx, request_rx) = mpsc::channel::<Request>();
    let (event_tx, event_rx) = mpsc::channel::<Event>();
    let loading = Arc::new(AtomicUsize::new(0));

    let worker = Worker {
        config,
        app_config,
        prefs,
        tray,
        clipboard,
        events: event_tx,
        loading: Arc::clone(&loading),
    };

    thread::spawn(move || worker.run(request_rx));

    Ok((
        ServiceHandle {
            tx: request_tx,
            loading,
        },
        event_rx,
    ))
}

struct Worker {
    config: Config,
    app_config: AppConfig,
    prefs: Arc<Prefs>,
    tray: Collection,
    clipboard: Collection,
    events: Sender<Event>,
    loading: Arc<AtomicUsize>,
}

impl Worker {
    fn run(mut self, requests: Receiver<Request>) {
        info!("collection worker started");
        self.emit_items(CollectionKind::Tray);
        self.emit_items(CollectionKind::Clipboard);

        for request in requests {
            match request {
                Request::IngestPaths { collection, paths } => {
                    self.handle_ingest(collection, |c, now| c.ingest_files(&paths, now));
                }
                Request::IngestText {
                    collection,
                    text,
                    source_app,
                } => {
                    self.handle_ingest(collection, |c, now| {
                        c.ingest_text(&text, source_app, now).map(|item| (vec![item], vec![]))
                    });
                }
                Request::IngestImage { collection, bytes } => {
                    self.handle_ingest(collection, |c, now| {
                        c.ingest_image_bytes(&bytes, now).map(|item| (vec![item], vec![]))
                    });
                }
                Request::Delete { collection, id } => {
                    self.handle_mutation(collection, |c| c.delete(&id));
                }
                Request::Clear { collection } => {
                    self.handle_mutation(collection, |c| c.clear());
                }
                Request::TogglePin { collection, id } => {
                    self.handle_mutation(collection, |c| c.toggle_pin(&id));
                }
                Request::AddLabel {
                    collection,
                    id,
                    label,
                } => {
                    self.handle_mutation(collection, |c| c.add_label(&id, &label));
                }
                Request::RemoveLabel {
                    collection,
                    id,
                    label,
                } => {
                    self.handle_mutation(collection, |c| c.remove_label(&id, &label));
                }
                Request::Sweep { force } => self.handle_sweep(force),
                Request::ReconcileTray => self.handle_reconcile(),
                Request::SetRetention {
                    collection,
                    setting,
                } => self.handle_set_retention(collection, setting),
                Request::Shutdown => break,
            }
        }

        info!("collection worker stopped");
    }

    fn collection_mut(&mut self, kind: CollectionKind) -> &mut Collection {
        match kind {
            CollectionKind::Tray => &mut self.tray,
            CollectionKind::Clipboard => &mut self.clipboard,
        }
    }

    fn collection(&self, kind: CollectionKind) -> &Collection {
        match kind {
            CollectionKind::Tray => &self.tray,
            CollectionKind::Clipboard => &self.clipboard,
        }
    }

    fn emit_items(&self, kind: CollectionKind) {
        let _ = self.events.send(Event::ItemsChanged {
            collection: kind,
            items: self.collection(kind).items(),
        });
    }

    fn emit_failures(&self, kind: CollectionKind, failures: Vec<IngestFailure>) {
        if failures.is_empty() {
            return;
        }
        for failure in &failures {
            warn!(
                collection = ?kind,
                file_name = %failure.file_name,
                reason = %failure.reason,
                "ingestion failed"
            );
        }
        let _ = self.events.send(Event::IngestFailed {
            collection: kind,
            failures,
        });
    }

    /// Runs one ingest batch and settles the loading counter afterwards,
    /// success or failure.
    fn handle_ingest<F>(&mut self, kind: CollectionKind, ingest: F)
    where
        F: FnOnce(
            &mut Collection,
            SystemTime,
        ) -> Result<(Vec<Item>, Vec<IngestFailure>), CollectionError>,
    {
        let now = SystemTime::now();
        let result = ingest(self.collection_mut(kind), now);
        self.loading.fetch_sub(1, Ordering::SeqCst);

        match result {
            Ok((added, failures)) => {
                if !added.is_empty() {
                    self.emit_items(kind);
                }
                self.emit_failures(kind, failures);
            }
            Err(e) => {
                warn!(collection = ?kind, error = %e, "ingest batch failed");
                self.emit_failures(
                    kind,
                    vec![IngestFailure {
                        file_name: "(batch)".to_string(),
                        reason: e.to_string(),
                    }],
                );
            }
        }
    }

    fn handle_mutation<F>(&mut self, kind: CollectionKind, mutate: F)
    where
        F: FnOnce(&mut Collection) -> Result<(), CollectionError>,
    {
        match mutate(self.collection_mut(kind)) {
            Ok(()) => self.emit_items(kind),
            Err(e) => warn!(collection = ?kind, error = %e, "mutation failed"),
        }
    }

    fn handle_sweep(&mut self, force: bool) {
        let now = SystemTime::now();
        let interval =
            Duration::from_secs(u64::from(self.app_config.sweep.interval_minutes) * 60);
        if !force && !self.prefs.should_sweep(now, interval) {
            return;
        }

        for (kind, setting) in [
            (CollectionKind::Tray, self.app_config.tray),
            (CollectionKind::Clipboard, self.app_config.clipboard),
        ] {
            match self.collection_mut(kind).sweep(&setting, now) {
                Ok(outcome) => {
                    if !outcome.expired.is_empty() || outcome.orphan_dirs_removed > 0 {
                        info!(
                            collection = ?kind,
                            expired = outcome.expired.len(),
                            orphans = outcome.orphan_dirs_removed,
                            "sweep removed items"
                        );
                    }
                    let _ = self.events.send(Event::SweepCompleted {
                        collection: kind,
                        expired: outcome.expired.len(),
                    });
                    if !outcome.expired.is_empty() {
                        self.emit_items(kind);
                    }
                }
                Err(e) => warn!(collection = ?kind, error = %e, "sweep failed"),
            }
        }

        if let Err(e) = self.prefs.record_sweep(now) {
            warn!(error = %e, "failed to record sweep time");
        }
    }

    fn handle_reconcile(&mut self) {
        let now = SystemTime::now();
        match self.tray.reconcile_disk(now) {
            Ok(outcome) => {
                if outcome.added > 0 || outcome.removed > 0 {
                    self.emit_items(CollectionKind::Tray);
                }
                self.emit_failures(CollectionKind::Tray, outcome.failures);
            }
            Err(e) => warn!(error = %e, "tray reconciliation failed"),
        }
    }

    fn handle_set_retention(&mut self, kind: CollectionKind, setting: RetentionSetting) {
        match kind {
            CollectionKind::Tray => self.app_config.tray = setting,
            CollectionKind::Clipboard => self.app_config.clipboard = setting,
        }

        let path = AppConfig::path(&self.config.base_path);
        if let Err(e) = self.app_config.save(&path) {
            warn!(error = %e, "failed to save config");
        }

        let _ = self.events.send(Event::RetentionChanged {
            collection: kind,
            setting,
        });
    }
}
