//! SQLite-backed record store.

use std::path::Path;

use rusqlite::{params, Connection};

use super::RecordStore;
use crate::error::SegsieveError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS frames (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    data BLOB NOT NULL
);
CREATE TABLE IF NOT EXISTS classes (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS class_images (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    class_name TEXT NOT NULL,
    data       BLOB NOT NULL
);
";

fn persistence_error(operation: &'static str, err: rusqlite::Error) -> SegsieveError {
    SegsieveError::Persistence {
        operation,
        message: err.to_string(),
    }
}

/// A [`RecordStore`] backed by a SQLite database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and provisions the schema.
    pub fn open(path: &Path) -> Result<Self, SegsieveError> {
        let conn = Connection::open(path).map_err(|err| persistence_error("open", err))?;
        conn.execute_batch(SCHEMA)
            .map_err(|err| persistence_error("open", err))?;
        Ok(Self { conn })
    }

    /// Opens an in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self, SegsieveError> {
        let conn = Connection::open_in_memory().map_err(|err| persistence_error("open", err))?;
        conn.execute_batch(SCHEMA)
            .map_err(|err| persistence_error("open", err))?;
        Ok(Self { conn })
    }

    /// Number of stored original frames.
    pub fn frame_count(&self) -> Result<u64, SegsieveError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM frames", [], |row| row.get(0))
            .map_err(|err| persistence_error("frame_count", err))
    }

    /// Registered class names, in registration order.
    pub fn class_names(&self) -> Result<Vec<String>, SegsieveError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM classes ORDER BY id")
            .map_err(|err| persistence_error("class_names", err))?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(|err| persistence_error("class_names", err))?
            .collect::<Result<Vec<String>, _>>()
            .map_err(|err| persistence_error("class_names", err))?;
        Ok(names)
    }

    /// Number of stored images for one class.
    pub fn class_image_count(&self, name: &str) -> Result<u64, SegsieveError> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM class_images WHERE class_name = ?1",
                params![name],
                |row| row.get(0),
            )
            .map_err(|err| persistence_error("class_image_count", err))
    }
}

impl RecordStore for SqliteStore {
    fn store_original_image(&mut self, blob: &[u8]) -> Result<(), SegsieveError> {
        self.conn
            .execute("INSERT INTO frames (data) VALUES (?1)", params![blob])
            .map(|_| ())
            .map_err(|err| persistence_error("store_original_image", err))
    }

    fn register_class(&mut self, name: &str) -> Result<(), SegsieveError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO classes (name) VALUES (?1)",
                params![name],
            )
            .map(|_| ())
            .map_err(|err| persistence_error("register_class", err))
    }

    fn store_class_image(&mut self, name: &str, blob: &[u8]) -> Result<(), SegsieveError> {
        self.conn
            .execute(
                "INSERT INTO class_images (class_name, data) VALUES (?1, ?2)",
                params![name, blob],
            )
            .map(|_| ())
            .map_err(|err| persistence_error("store_class_image", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_are_visible() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.store_original_image(b"jpeg-bytes").unwrap();
        store.register_class("car").unwrap();
        store.store_class_image("car", b"class-bytes").unwrap();
        store.store_class_image("car", b"more-bytes").unwrap();

        assert_eq!(store.frame_count().unwrap(), 1);
        assert_eq!(store.class_names().unwrap(), vec!["car".to_string()]);
        assert_eq!(store.class_image_count("car").unwrap(), 2);
        assert_eq!(store.class_image_count("dog").unwrap(), 0);
    }

    #[test]
    fn test_register_class_is_idempotent_per_call() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.register_class("car").unwrap();
        store.register_class("car").unwrap();
        assert_eq!(store.class_names().unwrap(), vec!["car".to_string()]);
    }

    #[test]
    fn test_open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.register_class("bird").unwrap();
        }
        // Reopen and observe the durable record.
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.class_names().unwrap(), vec!["bird".to_string()]);
    }
}
