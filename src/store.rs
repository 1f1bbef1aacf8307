//! # Key-Value Store
//!
//! Everything moodtune remembers lives under a handful of fixed keys, each
//! holding one JSON document. This module provides the string store and the
//! typed boundary on top of it.
//!
//! ## Backends
//!
//! - [`SqliteStore`]: a single `kv` table in an SQLite file. This is what the
//!   CLI uses, so state survives between runs.
//! - [`MemoryStore`]: a `HashMap`, for tests.
//!
//! ## Typed access
//!
//! [`load_json`] and [`save_json`] convert between the stored text and serde
//! types. A missing key reads as `None`. A document that does not match the
//! expected shape is an error naming the key; nothing tries to repair it.
//!
//! There is no locking. Two processes writing the same key race, and the last
//! write wins.

use anyhow::{Context, Result};
use log::debug;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

/// Last analysis result ([`crate::emotion::EmotionResult`]).
pub const EMOTION_RESULT_KEY: &str = "emotionResult";
/// Saved history ([`crate::history::HistoryEntry`] list).
pub const EMOTION_HISTORY_KEY: &str = "emotionHistory";
/// Selected playlist ([`crate::session::PlaylistSelection`]).
pub const CURRENT_PLAYLIST_KEY: &str = "currentPlaylist";
/// Simulated player ([`crate::session::PlaybackState`]).
pub const CURRENTLY_PLAYING_KEY: &str = "currentlyPlaying";

/// All keys moodtune writes.
pub const ALL_KEYS: [&str; 4] = [
    EMOTION_RESULT_KEY,
    EMOTION_HISTORY_KEY,
    CURRENT_PLAYLIST_KEY,
    CURRENTLY_PLAYING_KEY,
];

/// A string-to-string store.
pub trait KeyValueStore {
    /// # Errors
    ///
    /// Backend failures only; a missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and deserialize `key`.
///
/// # Errors
///
/// Backend failures, or a stored value that is not valid JSON for `T`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        debug!("`{key}' is empty");
        return Ok(None);
    };

    let value = serde_json::from_str(&raw)
        .with_context(|| format!("Stored value under `{key}' is malformed"))?;
    Ok(Some(value))
}

/// Serialize `value` and write it under `key`.
///
/// # Errors
///
/// Serialization or backend failures.
pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize value for `{key}'"))?;
    debug!("Writing {} bytes to `{key}'", raw.len());
    store.set(key, &raw)
}

/// SQLite-backed store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the table cannot be
    /// created.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        Self::init(conn)
    }

    /// Throwaway store, gone when dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot create the in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory store")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )
        .context("Invalid SQL command when CREATEing kv TABLE")?;

        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read `{key}' from store"))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                (key, value),
            )
            .with_context(|| format!("Failed to write `{key}' to store"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .with_context(|| format!("Failed to remove `{key}' from store"))?;
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
