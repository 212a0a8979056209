//! In-memory ordered collection of items.
//!
//! An explicit ordered map: insertion order lives in `order`, identity in
//! `items`. Raw order is most-recent-first; the display projection
//! (`sorted`) additionally lifts pinned items to the front.

use crate::types::{Item, ItemId, ItemKind};
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct ItemStore {
    order: Vec<ItemId>,
    items: HashMap<ItemId, Item>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a persisted snapshot, preserving its order.
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut store = Self::new();
        for item in items.into_iter().rev() {
            store.insert_front(item);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn find_by_file_name(&self, file_name: &str) -> Option<&Item> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id))
            .find(|item| item.file_name == file_name)
    }
}

/// Mutations. All callers funnel through the owning collection's single
/// writer; the store itself has no interior locking.
impl ItemStore {
    /// Inserts at the front of the raw order. If an item with the same id
    /// already exists it is updated in place and keeps its position.
    pub fn insert_front(&mut self, item: Item) {
        if self.items.contains_key(&item.id) {
            self.items.insert(item.id.clone(), item);
            return;
        }
        self.order.insert(0, item.id.clone());
        self.items.insert(item.id.clone(), item);
    }

    /// Inserts a batch at the front, preserving the batch's own order
    /// relative to itself and ahead of all pre-existing items.
    pub fn insert_batch_front(&mut self, batch: Vec<Item>) {
        for item in batch.into_iter().rev() {
            self.insert_front(item);
        }
    }

    /// Removes by id. Absent ids are a no-op.
    pub fn remove(&mut self, id: &ItemId) -> Option<Item> {
        let item = self.items.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(item)
    }

    /// Removes every item, returning them so the caller can release each
    /// backing artifact individually.
    pub fn drain(&mut self) -> Vec<Item> {
        let ids: Vec<ItemId> = self.order.clone();
        ids.iter().filter_map(|id| self.remove(id)).collect()
    }

    pub fn toggle_pin(&mut self, id: &ItemId) -> Option<&Item> {
        let item = self.items.get_mut(id)?;
        item.is_pinned = !item.is_pinned;
        Some(item)
    }

    pub fn add_label(&mut self, id: &ItemId, label: &str) -> Option<&Item> {
        let item = self.items.get_mut(id)?;
        item.labels.insert(label.to_string());
        Some(item)
    }

    pub fn remove_label(&mut self, id: &ItemId, label: &str) -> Option<&Item> {
        let item = self.items.get_mut(id)?;
        item.labels.remove(label);
        Some(item)
    }
}

/// Projections. Pure reads; recomputed on demand.
impl ItemStore {
    /// Raw-order snapshot, used for persistence.
    pub fn snapshot(&self) -> Vec<Item> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id))
            .cloned()
            .collect()
    }

    /// Display order: pinned items first, then descending `copied_at`
    /// within each group.
    pub fn sorted(&self) -> Vec<Item> {
        let mut items = self.snapshot();
        items.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| b.copied_at.cmp(&a.copied_at))
        });
        items
    }

    /// Sorted projection narrowed by free-text search and a kind facet.
    /// An empty kind set selects all kinds.
    pub fn filtered(&self, query: &str, kinds: &HashSet<ItemKind>) -> Vec<Item> {
        self.sorted()
            .into_iter()
            .filter(|item| kinds.is_empty() || kinds.contains(&item.kind))
            .filter(|item| item.matches(query))
            .collect()
    }
}

#[cfg(test)]
mod tests;
