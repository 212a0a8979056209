use nutype::nutype;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::SystemTime;
use uuid::Uuid;

/// Opaque item identity. Generated once at ingestion, used as the
/// storage-path key and as store identity.
#[nutype(
    new_unchecked,
    sanitize(trim),
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Hash,
        Borrow,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate() -> Self {
        // SAFETY: a v4 UUID formats to a non-empty hyphenated string.
        unsafe { Self::new_unchecked(Uuid::new_v4().to_string()) }
    }
}

/// Content classification, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    File,
    Text,
    Image,
    Link,
    Color,
}

impl ItemKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ItemKind::File => "File",
            ItemKind::Text => "Text",
            ItemKind::Image => "Image",
            ItemKind::Link => "Link",
            ItemKind::Color => "Color",
        }
    }
}

/// One captured item: a dropped file or a clipboard capture, plus the
/// metadata driving ordering, expiry, and display.
///
/// Only `is_pinned` and `labels` change after creation. `copied_at` in
/// particular never changes, so pinning or relabeling cannot reset an
/// item's age.
#[cfg_attr(test, derive(PartialEq))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub file_name: String,
    pub size: u64,
    pub copied_at: SystemTime,
    pub kind: ItemKind,
    /// Trimmed snippet of at most 50 characters; empty for binary kinds.
    pub preview_text: String,
    /// Small PNG for quick thumbnailing, derived once.
    pub preview_image: Option<Vec<u8>>,
    pub is_pinned: bool,
    pub labels: BTreeSet<String>,
    pub source_app: Option<String>,
    pub device: Option<String>,
}

impl Item {
    /// Seeds `labels` from the kind plus provenance metadata.
    pub fn seed_labels(&mut self) {
        self.labels.insert(self.kind.display_name().to_string());
        if let Some(app) = &self.source_app {
            self.labels.insert(app.clone());
        }
        if let Some(device) = &self.device {
            self.labels.insert(device.clone());
        }
    }

    /// Search contract: an item matches `text` iff `text` is empty or is a
    /// case-insensitive substring of the file name, the preview text, or
    /// any label.
    pub fn matches(&self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        let needle = text.to_lowercase();

        self.file_name.to_lowercase().contains(&needle)
            || self.preview_text.to_lowercase().contains(&needle)
            || self
                .labels
                .iter()
                .any(|label| label.to_lowercase().contains(&needle))
    }
}
