//! SQLite-backed content store
//!
//! Holds canonical verses, contributed content items, memorization records
//! and per-user study artifacts. Every read-modify-write goes through
//! [`Store::transaction`], which opens an immediate transaction so that
//! concurrent writers on the same database file are serialized.

mod models;
mod schema;
mod verses;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::config::StudyConfig;
use crate::error::{Result, StudyError};

pub use models::{Verse, MAX_SURAH};
pub(crate) use verses::{
    get_by_ref as verse_by_ref_in, insert as insert_verse_in, require_surah, require_verse,
    validate_surah,
};

/// Shared handle to the content store.
///
/// Cheap to share behind an `Arc`; separate processes open their own
/// handle on the same file.
pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) a file-backed store
    pub fn open(path: &Path, config: &StudyConfig) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(config.busy_timeout())?;
        let mode: String =
            conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        log::debug!("Opened {:?} (journal_mode={})", path, mode);

        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::apply(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StudyError::StoreUnavailable("connection lock poisoned".to_string()))
    }

    /// Run `f` inside a single immediate transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise. Waiting on another
    /// writer is bounded by the configured busy timeout and surfaces as
    /// [`StudyError::Conflict`].
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run a read-only closure against the connection
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_file_store_twice() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("hub.sqlite");
        let config = StudyConfig::default();

        let store = Store::open(&path, &config).unwrap();
        store.insert_verse(1, 1, "بِسْمِ ٱللَّهِ").unwrap();
        drop(store);

        // Schema creation is idempotent and data persists
        let reopened = Store::open(&path, &config).unwrap();
        assert_eq!(reopened.path(), Some(path.as_path()));
        assert!(reopened.verse_by_ref(1, 1).unwrap().is_some());
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<()> = store.transaction(|tx| {
            tx.execute(
                "INSERT INTO ayahs (surah_id, ayah_number, arabic_text) VALUES (1, 1, 'x')",
                [],
            )?;
            Err(StudyError::invalid("abort"))
        });
        assert!(result.is_err());
        assert!(store.verse_by_ref(1, 1).unwrap().is_none());
    }
}
