//! Crate-wide error type.
//!
//! One variant per failure category the engine can surface at the `execute`
//! boundary. No `thiserror` here: a hand-written `Display` keeps the mapping
//! from variant to message text explicit and lets the executor pattern-match
//! on kind without a derive macro in the way.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DbError {
    /// The statement did not match any recognized grammar rule.
    ParseError(String),
    UnknownTable(String),
    UnknownColumn(String),
    /// A value could not be coerced into a column's declared type.
    TypeError(String),
    /// `NULL` supplied for a `NOT NULL` or `PRIMARY KEY` column.
    NullViolation(String),
    PrimaryKeyViolation(String),
    UniqueViolation(String),
    /// Referential integrity failed, either on insert (missing parent) or
    /// on delete (live child still references the row).
    ForeignKeyViolation(String),
    /// Rollback with no active transaction, or an internal row-id collision.
    TransactionError(String),
    /// A grammar shape the engine recognizes but intentionally does not
    /// execute (e.g. a second `JOIN` in one statement).
    UnsupportedFeature(String),
    Io(String),
    Serialization(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::UnknownTable(msg) => write!(f, "Unknown table: {msg}"),
            Self::UnknownColumn(msg) => write!(f, "Unknown column: {msg}"),
            Self::TypeError(msg) => write!(f, "Type error: {msg}"),
            Self::NullViolation(msg) => write!(f, "Null violation: {msg}"),
            Self::PrimaryKeyViolation(msg) => write!(f, "Primary key violation: {msg}"),
            Self::UniqueViolation(msg) => write!(f, "Unique violation: {msg}"),
            Self::ForeignKeyViolation(msg) => write!(f, "Foreign key violation: {msg}"),
            Self::TransactionError(msg) => write!(f, "Transaction error: {msg}"),
            Self::UnsupportedFeature(msg) => write!(f, "Unsupported feature: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Serialization(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for DbError {}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = DbError::UnknownTable("ghosts".into());
        assert_eq!(err.to_string(), "Unknown table: ghosts");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let db_err: DbError = io_err.into();
        assert!(matches!(db_err, DbError::Io(_)));
    }
}
