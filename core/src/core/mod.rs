//! Collection engine combining the in-memory store, on-disk artifacts, and
//! persisted metadata.

use crate::classify::{self, Classified};
use crate::classify::error::ClassifyError;
use crate::core::file_storage::ArtifactStore;
use crate::core::file_storage::error::ArtifactError;
use crate::core::prefs::Prefs;
use crate::core::prefs::error::PrefsError;
use crate::core::store::ItemStore;
use crate::retention;
use crate::types::{Config, Item, ItemId, ItemKind, RetentionSetting};
use error::CollectionError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, warn};

pub mod file_storage;
pub mod prefs;
pub mod store;

pub mod error {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CollectionError {
        #[error("Artifact error: {0}")]
        Artifact(#[from] ArtifactError),

        #[error("Prefs error: {0}")]
        Prefs(#[from] PrefsError),

        #[error("Classify error: {0}")]
        Classify(#[from] ClassifyError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
    }
}

/// Which of the two collections this is. The profile decides artifact
/// layout, thumbnail size, and how text content is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Drop tray: flat artifact layout, filename-deduplicated, kinds
    /// restricted to file/text/image.
    Tray,
    /// Clipboard history: per-item artifact directories, full kind set.
    Clipboard,
}

impl CollectionKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            CollectionKind::Tray => "CopiedItems",
            CollectionKind::Clipboard => "ClipboardItems",
        }
    }

    pub fn prefs_key(&self) -> &'static str {
        match self {
            CollectionKind::Tray => "tray/items",
            CollectionKind::Clipboard => "clipboard/items",
        }
    }

    pub fn thumbnail_cap(&self) -> u32 {
        match self {
            CollectionKind::Tray => 128,
            CollectionKind::Clipboard => 64,
        }
    }

    pub fn nested_layout(&self) -> bool {
        matches!(self, CollectionKind::Clipboard)
    }

    pub fn rich_text_kinds(&self) -> bool {
        matches!(self, CollectionKind::Clipboard)
    }
}

/// One ingestion input that could not become an item. Reported to the user;
/// never aborts the rest of its batch.
#[derive(Debug, Clone)]
pub struct IngestFailure {
    pub file_name: String,
    pub reason: String,
}

/// Result of a retention sweep.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub expired: Vec<ItemId>,
    pub orphan_dirs_removed: usize,
}

/// Result of reconciling the tray directory against the store.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub added: usize,
    pub removed: usize,
    pub failures: Vec<IngestFailure>,
}

/// One persisted item collection. The single writer for its in-memory
/// store; every mutation persists the raw-order snapshot.
pub struct Collection {
    kind: CollectionKind,
    store: ItemStore,
    artifacts: ArtifactStore,
    prefs: Arc<Prefs>,
}

impl Collection {
    /// Opens a collection, loading the persisted item list. Records whose
    /// backing artifact no longer exists are dropped immediately so stale
    /// metadata never resurrects ghost items.
    pub fn open(
        kind: CollectionKind,
        config: &Config,
        prefs: Arc<Prefs>,
    ) -> Result<Self, CollectionError> {
        let root = config.collection_root(kind);
        std::fs::create_dir_all(&root)?;

        let items = prefs.load_items(kind.prefs_key())?;
        let mut collection = Self {
            kind,
            store: ItemStore::from_items(items),
            artifacts: ArtifactStore::new(root),
            prefs,
        };

        let missing: Vec<ItemId> = collection
            .store
            .snapshot()
            .iter()
            .filter(|item| !collection.artifact_exists(item))
            .map(|item| item.id.clone())
            .collect();

        if !missing.is_empty() {
            warn!(
                collection = ?kind,
                dropped = missing.len(),
                "dropping persisted items whose artifacts are gone"
            );
            for id in &missing {
                collection.store.remove(id);
            }
            collection.persist()?;
        }

        Ok(collection)
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn artifact_root(&self) -> &Path {
        self.artifacts.root()
    }

    /// Deterministic artifact path for an item.
    pub fn artifact_path(&self, item: &Item) -> PathBuf {
        if self.kind.nested_layout() {
            self.artifacts.nested_path(&item.id, &item.file_name)
        } else {
            self.artifacts.flat_path(&item.file_name)
        }
    }

    fn artifact_exists(&self, item: &Item) -> bool {
        self.artifacts.exists(&self.artifact_path(item))
    }

    fn persist(&self) -> Result<(), CollectionError> {
        self.prefs
            .save_items(self.kind.prefs_key(), &self.store.snapshot())?;
        Ok(())
    }
}

/// Read operations.
impl Collection {
    /// Display projection: pinned first, then descending `copied_at`.
    pub fn items(&self) -> Vec<Item> {
        self.store.sorted()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn get(&self, id: &ItemId) -> Option<Item> {
        self.store.get(id).cloned()
    }

    /// Search + kind facet over the sorted projection.
    pub fn search(&self, query: &str, kinds: &HashSet<ItemKind>) -> Vec<Item> {
        self.store.filtered(query, kinds)
    }
}

/// Ingestion. Called from the worker thread, never from UI-affine code:
/// classification reads files and decodes images.
impl Collection {
    /// Ingests a batch of local files. Inputs that fail are collected and
    /// reported; successes are inserted as one front batch preserving the
    /// input order. Returns the inserted items and the per-input failures.
    pub fn ingest_files(
        &mut self,
        sources: &[PathBuf],
        now: SystemTime,
    ) -> Result<(Vec<Item>, Vec<IngestFailure>), CollectionError> {
        let mut batch = Vec::new();
        let mut failures = Vec::new();
        let mut batch_names: HashSet<String> = HashSet::new();

        for source in sources {
            let file_name = match source.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => {
                    failures.push(IngestFailure {
                        file_name: source.display().to_string(),
                        reason: "source has no file name".to_string(),
                    });
                    continue;
                }
            };

            // The tray deduplicates by filename before insert: redundant
            // filesystem events deliver the same file more than once.
            if !self.kind.nested_layout()
                && (batch_names.contains(&file_name)
                    || self.store.find_by_file_name(&file_name).is_some())
            {
                debug!(file_name, "skipping duplicate tray file");
                continue;
            }

            match self.build_file_item(source, &file_name, now) {
                Ok(item) => {
                    batch_names.insert(file_name);
                    batch.push(item);
                }
                Err(e) => failures.push(IngestFailure {
                    file_name,
                    reason: e.to_string(),
                }),
            }
        }

        if !batch.is_empty() {
            self.store.insert_batch_front(batch.clone());
            self.persist()?;
        }

        Ok((batch, failures))
    }

    fn build_file_item(
        &self,
        source: &Path,
        file_name: &str,
        now: SystemTime,
    ) -> Result<Item, CollectionError> {
        let id = ItemId::generate();
        let classified = classify::classify_file(source, self.kind.thumbnail_cap())?;
        let size = std::fs::metadata(source)
            .map_err(ClassifyError::ContentUnreadable)?
            .len();

        if self.kind.nested_layout() {
            self.artifacts.store_nested(source, &id, file_name)?;
        } else {
            self.artifacts.store_flat(source, file_name)?;
        }

        Ok(self.assemble(id, file_name.to_string(), size, now, classified, None))
    }

    /// Ingests a text snippet (typed drop or pasteboard string).
    pub fn ingest_text(
        &mut self,
        text: &str,
        source_app: Option<String>,
        now: SystemTime,
    ) -> Result<Item, CollectionError> {
        let classified = classify::classify_text_content(text, self.kind.rich_text_kinds());
        let id = ItemId::generate();
        let file_name = snippet_file_name(&classified.preview_text);

        // Flat layout: a same-named snippet would alias the existing artifact.
        if !self.kind.nested_layout()
            && let Some(existing) = self.store.find_by_file_name(&file_name)
        {
            return Ok(existing.clone());
        }

        self.artifacts.write_bytes(
            text.as_bytes(),
            &id,
            &file_name,
            self.kind.nested_layout(),
        )?;

        let item = self.assemble(
            id,
            file_name,
            text.len() as u64,
            now,
            classified,
            source_app,
        );
        self.store.insert_front(item.clone());
        self.persist()?;
        Ok(item)
    }

    /// Ingests raw image bytes (pasteboard image read).
    pub fn ingest_image_bytes(
        &mut self,
        bytes: &[u8],
        now: SystemTime,
    ) -> Result<Item, CollectionError> {
        let classified = classify::classify_image_bytes(bytes, self.kind.thumbnail_cap())?;
        let id = ItemId::generate();
        let file_name = if self.kind.nested_layout() {
            "Image.png".to_string()
        } else {
            // Flat layout needs unique names.
            format!("Image-{}.png", &id.as_ref()[..8])
        };

        self.artifacts
            .write_bytes(bytes, &id, &file_name, self.kind.nested_layout())?;

        let item = self.assemble(id, file_name, bytes.len() as u64, now, classified, None);
        self.store.insert_front(item.clone());
        self.persist()?;
        Ok(item)
    }

    fn assemble(
        &self,
        id: ItemId,
        file_name: String,
        size: u64,
        now: SystemTime,
        classified: Classified,
        source_app: Option<String>,
    ) -> Item {
        let mut item = Item {
            id,
            file_name,
            size,
            copied_at: now,
            kind: classified.kind,
            preview_text: classified.preview_text,
            preview_image: classified.preview_image,
            is_pinned: false,
            labels: Default::default(),
            source_app,
            device: None,
        };
        item.seed_labels();
        item
    }
}

/// Deletion.
impl Collection {
    /// Removes an item and its backing artifact. A no-op for absent ids.
    pub fn delete(&mut self, id: &ItemId) -> Result<(), CollectionError> {
        let Some(item) = self.store.remove(id) else {
            return Ok(());
        };

        self.artifacts.remove(&self.artifact_path(&item))?;
        self.persist()
    }

    /// Removes every item through the per-item path, so each backing
    /// artifact is released individually.
    pub fn clear(&mut self) -> Result<(), CollectionError> {
        for item in self.store.drain() {
            if let Err(e) = self.artifacts.remove(&self.artifact_path(&item)) {
                warn!(error = %e, file_name = %item.file_name, "failed to remove artifact");
            }
        }
        self.persist()
    }
}

/// Pin and label edits. These never touch `copied_at`.
impl Collection {
    pub fn toggle_pin(&mut self, id: &ItemId) -> Result<(), CollectionError> {
        if self.store.toggle_pin(id).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    pub fn add_label(&mut self, id: &ItemId, label: &str) -> Result<(), CollectionError> {
        if self.store.add_label(id, label).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    pub fn remove_label(&mut self, id: &ItemId, label: &str) -> Result<(), CollectionError> {
        if self.store.remove_label(id, label).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Retention sweep and filesystem reconciliation.
impl Collection {
    /// Applies the retention policy to a snapshot of the store. Expired
    /// items are removed with their artifacts; items whose artifact is
    /// already gone are removed without touching storage. Nested layouts
    /// also drop artifact directories that belong to no live item.
    pub fn sweep(
        &mut self,
        setting: &RetentionSetting,
        now: SystemTime,
    ) -> Result<SweepOutcome, CollectionError> {
        let snapshot = self.store.snapshot();
        let expired = retention::sweep_candidates(&snapshot, setting, now, |item| {
            self.artifacts.exists(&self.artifact_path(item))
        });

        for id in &expired {
            let Some(item) = self.store.remove(id) else {
                continue;
            };
            let path = self.artifact_path(&item);
            if self.artifacts.exists(&path)
                && let Err(e) = self.artifacts.remove(&path)
            {
                warn!(error = %e, file_name = %item.file_name, "failed to remove expired artifact");
            }
        }

        let mut orphan_dirs_removed = 0;
        if self.kind.nested_layout() {
            let live: HashSet<String> = self
                .store
                .snapshot()
                .iter()
                .map(|item| item.id.to_string())
                .collect();

            for dir_id in self.artifacts.list_nested_ids()? {
                if !live.contains(&dir_id) {
                    self.artifacts.remove_nested_dir(&dir_id)?;
                    orphan_dirs_removed += 1;
                }
            }
        }

        if !expired.is_empty() {
            self.persist()?;
        }

        Ok(SweepOutcome {
            expired,
            orphan_dirs_removed,
        })
    }

    /// Aligns the store with the tray directory after out-of-band changes:
    /// files on disk the store doesn't know are ingested; records whose
    /// artifact vanished are dropped without re-attempting deletion. Only
    /// meaningful for the flat-layout tray.
    pub fn reconcile_disk(&mut self, now: SystemTime) -> Result<ReconcileOutcome, CollectionError> {
        if self.kind.nested_layout() {
            return Ok(ReconcileOutcome::default());
        }

        let vanished: Vec<ItemId> = self
            .store
            .snapshot()
            .iter()
            .filter(|item| !self.artifact_exists(item))
            .map(|item| item.id.clone())
            .collect();

        for id in &vanished {
            self.store.remove(id);
        }

        let unknown: Vec<PathBuf> = self
            .artifacts
            .list_flat_files()?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .is_none_or(|name| self.store.find_by_file_name(&name).is_none())
            })
            .collect();

        let (added, failures) = self.ingest_files(&unknown, now)?;

        if !vanished.is_empty() && added.is_empty() {
            // ingest_files persists when it inserts; cover the removal-only case.
            self.persist()?;
        }

        Ok(ReconcileOutcome {
            added: added.len(),
            removed: vanished.len(),
            failures,
        })
    }
}

/// File name for a stored text snippet, derived from its preview.
fn snippet_file_name(preview: &str) -> String {
    let stem: String = preview
        .chars()
        .take(24)
        .map(|c| if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = stem.trim();

    if stem.is_empty() {
        "Snippet.txt".to_string()
    } else {
        format!("{stem}.txt")
    }
}
