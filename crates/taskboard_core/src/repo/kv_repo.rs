//! Key/value storage contracts and implementations.
//!
//! # Responsibility
//! - Offer the `get`/`set`/`remove` surface of browser-style local storage.
//! - Keep SQL details behind the `KeyValueStore` trait.
//!
//! # Invariants
//! - `set` is a whole-value overwrite for the key.
//! - `get` on a missing key is `Ok(None)`, never an error.

use crate::db::DbResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

/// Local key/value storage the board document lives in.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> DbResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> DbResult<()>;
    fn remove(&mut self, key: &str) -> DbResult<()>;
}

/// SQLite-backed key/value store over the `kv_entries` table.
///
/// Expects a connection returned by [`crate::db::open_db`] or
/// [`crate::db::open_db_in_memory`] so the schema is in place.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Gives access to the underlying connection for diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> DbResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> DbResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> DbResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
    use crate::db::open_db_in_memory;

    #[test]
    fn sqlite_set_overwrites_and_remove_clears() {
        let mut kv = SqliteKeyValueStore::new(open_db_in_memory().unwrap());
        assert_eq!(kv.get("tasks").unwrap(), None);

        kv.set("tasks", "first").unwrap();
        kv.set("tasks", "second").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("second"));

        let rows: i64 = kv
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);

        kv.remove("tasks").unwrap();
        assert_eq!(kv.get("tasks").unwrap(), None);
    }

    #[test]
    fn memory_store_keeps_keys_independent() {
        let mut kv = MemoryKeyValueStore::new();
        kv.set("a", "1").unwrap();
        kv.set("b", "2").unwrap();
        kv.remove("a").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
        assert_eq!(kv.get("b").unwrap().as_deref(), Some("2"));
    }
}
