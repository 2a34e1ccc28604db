#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::complexity,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    deprecated,
    unused,
    clippy::todo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::unreachable,
    clippy::missing_safety_doc,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::missing_docs
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::option_if_let_else,
    clippy::cognitive_complexity,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::struct_excessive_bools,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp,
    clippy::doc_markdown,
    clippy::wildcard_imports,
    clippy::struct_field_names,
    clippy::module_inception,
    clippy::missing_fields_in_debug,
    clippy::use_self,
    clippy::return_self_not_must_use,
    clippy::bool_to_int_with_if,
    clippy::multiple_crate_versions,
    clippy::single_match_else,
    clippy::implicit_hasher,
    clippy::default_trait_access,
    clippy::multiple_inherent_impl,
    clippy::type_complexity,
    clippy::result_large_err,
    clippy::items_after_statements,
    clippy::match_wildcard_for_single_variants,
    clippy::needless_pass_by_value,
    clippy::redundant_closure_for_method_calls,
    clippy::unnecessary_wraps,
    clippy::match_same_arms,
    clippy::if_not_else,
    clippy::or_fun_call,
    clippy::ref_option_ref,
    clippy::option_option
)]

//! # tabula — an embedded relational database
//!
//! `tabula` is a small, in-process relational engine: typed tables with
//! primary/unique/secondary indexes, foreign-key enforcement, undo-log
//! transactions, a hash equi-join, grouped aggregation, and a hand-written
//! SQL-subset parser, all reachable through one entry point:
//! [`Connection::execute`].
//!
//! ## Quick start
//!
//! ```no_run
//! use tabula::api::Connection;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut conn = Connection::open("my_database.db")?;
//!
//! conn.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)");
//! conn.execute("INSERT INTO users (id, name, age) VALUES (1, 'Alice', 30)");
//!
//! let result = conn.query("SELECT * FROM users WHERE age > 25");
//! assert_eq!(result.row_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **API layer** (`api`): `Connection`, the public entry point.
//! - **Query layer** (`core::query`): the SQL-subset parser, statement
//!   executor, hash join, and grouped aggregation.
//! - **Storage layer** (`core::storage`): tables, indexes, and predicates.
//! - **Catalog** (`core::catalog`): table registry and foreign-key declarations.
//! - **Transaction layer** (`core::transaction`): the undo-log journal.
//! - **Persistence** (`core::persistence`): full-catalog snapshot save/load.

pub mod api;
pub mod core;

pub use api::{Connection, QueryResult};
pub use crate::core::common::types::Value;
pub use crate::core::common::DbError;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn connection_basic_operations() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let mut conn = Connection::open(&db_path).expect("failed to open connection");

        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, value TEXT)");
        conn.execute("INSERT INTO test (id, value) VALUES (1, 'hello')");

        let result = conn.query("SELECT * FROM test WHERE id = 1");
        assert!(!result.is_empty());
        assert_eq!(result.row_count(), 1);
    }

    #[test]
    fn transaction_rollback() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_tx.db");

        let mut conn = Connection::open(&db_path).expect("failed to open connection");

        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, value TEXT)");
        conn.execute("BEGIN");
        conn.execute("INSERT INTO test (id, value) VALUES (1, 'test')");
        conn.execute("ROLLBACK");

        let result = conn.query("SELECT * FROM test");
        assert!(result.is_empty());
        assert_eq!(result.row_count(), 0);
    }
}
