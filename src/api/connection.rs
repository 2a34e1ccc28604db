//! A database connection: the ergonomic entry point for statement execution,
//! mirroring the teacher's `Connection::open`/`open_in_memory` split between
//! a file-backed and a throwaway in-memory database.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::types::QueryResult;
use crate::core::common::error::DbError;
use crate::core::config::Config;
use crate::core::query::executor::Database;

static UNIQUE_ID: AtomicU64 = AtomicU64::new(0);

/// Wraps a [`Database`], adding the file-path conveniences that make up the
/// public surface: `open`, `open_in_memory`, `execute`, `save`, `load`.
#[derive(Debug)]
pub struct Connection {
    database: Database,
}

impl Connection {
    /// Opens a connection whose catalog snapshot lives at `path` and whose
    /// audit log lives alongside it as `<path>.audit.log`.
    ///
    /// # Errors
    /// Returns `DbError` if an existing snapshot at `path` cannot be loaded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let path = path.as_ref();
        let audit_path = path.with_extension("audit.log");
        let config = Config::in_memory().with_persistence_path(path).with_audit_log(audit_path);
        let mut database = Database::new(config);
        if path.exists() {
            database.load(path)?;
        }
        Ok(Self { database })
    }

    /// Opens a connection with no backing file: every statement is
    /// in-memory only, and `save`/`load` require an explicit path.
    ///
    /// # Errors
    /// Never fails; returns `Result` to match [`Connection::open`]'s signature.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let _ = UNIQUE_ID.fetch_add(1, Ordering::SeqCst);
        Ok(Self { database: Database::in_memory() })
    }

    /// Executes one statement, recovering any failure into
    /// [`QueryResult::Error`] rather than propagating it.
    pub fn execute(&mut self, statement: &str) -> QueryResult {
        self.database.execute(statement)
    }

    /// Convenience alias for `execute`, for read-only statements.
    pub fn query(&mut self, statement: &str) -> QueryResult {
        self.database.execute(statement)
    }

    /// # Errors
    /// Returns `DbError::Io`/`DbError::Serialization` if the snapshot cannot
    /// be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DbError> {
        self.database.save(path)
    }

    /// # Errors
    /// Returns `DbError::Io`/`DbError::Serialization` if the snapshot cannot
    /// be read or is malformed.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DbError> {
        self.database.load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::types::Value;
    use tempfile::TempDir;

    #[test]
    fn basic_crud_round_trip() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, value TEXT)");
        conn.execute("INSERT INTO test (id, value) VALUES (1, 'hello')");
        let result = conn.query("SELECT * FROM test WHERE id = 1");
        assert!(!result.is_empty());
        assert_eq!(result.row_count(), 1);
    }

    #[test]
    fn transaction_rollback_discards_the_insert() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, value TEXT)");
        conn.execute("BEGIN");
        conn.execute("INSERT INTO test (id, value) VALUES (1, 'test')");
        conn.execute("ROLLBACK");
        let result = conn.query("SELECT * FROM test");
        assert!(result.is_empty());
        assert_eq!(result.row_count(), 0);
    }

    #[test]
    fn open_persists_across_reconnection() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");

        {
            let mut conn = Connection::open(&db_path).unwrap();
            conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)");
            conn.execute("INSERT INTO t (id) VALUES (1)");
            conn.save(&db_path).unwrap();
        }

        let mut conn = Connection::open(&db_path).unwrap();
        let result = conn.query("SELECT * FROM t WHERE id = 1");
        match result {
            QueryResult::Rows { rows, .. } => assert_eq!(rows, vec![vec![Value::Int(1)]]),
            other => panic!("expected Rows, got {other:?}"),
        }
    }
}
