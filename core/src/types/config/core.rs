use crate::core::CollectionKind;
use std::path::PathBuf;

/// Core configuration: where the engine keeps its data.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_path: PathBuf,
}

impl Config {
    pub fn prefs_path(&self) -> PathBuf {
        self.base_path.join("ledge.redb")
    }

    /// Artifact root for the drop tray (`CopiedItems`).
    pub fn tray_root(&self) -> PathBuf {
        self.collection_root(CollectionKind::Tray)
    }

    /// Artifact root for clipboard history (`ClipboardItems`).
    pub fn clipboard_root(&self) -> PathBuf {
        self.collection_root(CollectionKind::Clipboard)
    }

    pub fn collection_root(&self, kind: CollectionKind) -> PathBuf {
        self.base_path.join(kind.dir_name())
    }
}
