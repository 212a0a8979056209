//! Persisted metadata store.
//!
//! A single redb table of byte values under well-known string keys. Each
//! collection's ordered item list is one entry (version byte + postcard
//! payload); sweep bookkeeping is a JSON string. Loaded once at open,
//! written on every mutation.

use crate::types::Item;
use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime};

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum PrefsError {
        #[error("Database error: {0}")]
        Redb(#[from] redb::DatabaseError),

        #[error("Table error: {0}")]
        Table(#[from] redb::TableError),

        #[error("Storage error: {0}")]
        Storage(#[from] redb::StorageError),

        #[error("Transaction error: {0}")]
        Transaction(#[from] redb::TransactionError),

        #[error("Commit error: {0}")]
        Commit(#[from] redb::CommitError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Codec error: {0}")]
        Codec(#[from] postcard::Error),

        #[error("Unsupported snapshot version: {0}")]
        UnsupportedVersion(u8),

        #[error("Empty snapshot payload")]
        EmptyPayload,
    }
}

use error::PrefsError;

/// Prefs table: well-known key → serialized payload.
const PREFS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("prefs");

/// Prefs key for sweep bookkeeping.
const KEY_MAINTENANCE: &str = "maintenance";

const ITEMS_VERSION: u8 = 1;

/// Sweep bookkeeping, stored as JSON.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MaintenanceMetadata {
    pub last_sweep_at: Option<SystemTime>,
}

pub struct Prefs {
    db: redb::Database,
}

impl Prefs {
    /// Creates or opens the prefs database, initializing the table.
    pub fn open(path: &Path) -> Result<Self, PrefsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = redb::Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PREFS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, PrefsError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PREFS_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn put_raw(&self, key: &str, value: &[u8]) -> Result<(), PrefsError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PREFS_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// Item collection snapshots.
impl Prefs {
    /// Loads the ordered item list stored under `key`. An absent key is an
    /// empty collection.
    pub fn load_items(&self, key: &str) -> Result<Vec<Item>, PrefsError> {
        let Some(bytes) = self.get_raw(key)? else {
            return Ok(Vec::new());
        };
        decode_items(&bytes)
    }

    /// Persists the ordered item list under `key`.
    pub fn save_items(&self, key: &str, items: &[Item]) -> Result<(), PrefsError> {
        let bytes = encode_items(items)?;
        self.put_raw(key, &bytes)
    }
}

/// Sweep bookkeeping.
impl Prefs {
    fn load_maintenance(&self) -> Option<MaintenanceMetadata> {
        let bytes = self.get_raw(KEY_MAINTENANCE).ok()??;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn record_sweep(&self, now: SystemTime) -> Result<(), PrefsError> {
        let metadata = MaintenanceMetadata {
            last_sweep_at: Some(now),
        };
        let json = serde_json::to_vec(&metadata).expect("serialization failed");
        self.put_raw(KEY_MAINTENANCE, &json)
    }

    /// Returns true if a sweep should run (never ran or interval elapsed).
    pub fn should_sweep(&self, now: SystemTime, interval: Duration) -> bool {
        match self.load_maintenance().and_then(|m| m.last_sweep_at) {
            None => true,
            Some(last) => now.duration_since(last).map(|d| d >= interval).unwrap_or(true),
        }
    }
}

fn encode_items(items: &[Item]) -> Result<Vec<u8>, PrefsError> {
    Ok(postcard::to_extend(items, vec![ITEMS_VERSION])?)
}

fn decode_items(bytes: &[u8]) -> Result<Vec<Item>, PrefsError> {
    let (version, payload) = bytes.split_first().ok_or(PrefsError::EmptyPayload)?;
    match *version {
        ITEMS_VERSION => Ok(postcard::from_bytes(payload)?),
        version => Err(PrefsError::UnsupportedVersion(version)),
    }
}
