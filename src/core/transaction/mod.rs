//! The transaction journal: a LIFO undo stack of compensating operations.
//!
//! `BEGIN` starts recording, `COMMIT` discards the recording, and `ROLLBACK`
//! replays the stack in reverse. Compensating operations are applied
//! directly against the catalog's tables and must never themselves push
//! onto the stack — the executor only records while `active` via the
//! public `record` method, and replay bypasses it entirely.

use crate::core::catalog::Catalog;
use crate::core::common::error::DbError;
use crate::core::common::types::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum UndoEntry {
    /// Compensates an insert: delete the row that was inserted.
    Delete { table: String, row_id: u64 },
    /// Compensates a delete: re-insert the row at its original id.
    Insert { table: String, row_id: u64, values: Vec<Value> },
    /// Compensates an update: write the prior values back.
    Update { table: String, row_id: u64, prior_values: Vec<Value> },
}

#[derive(Debug, Default)]
pub struct Transaction {
    active: bool,
    undo_stack: Vec<UndoEntry>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// §4.2 `BEGIN`. The source quietly re-initializes an already-active
    /// journal; this implementation instead reports a `TransactionError`,
    /// per the redesign recommendation against that ambiguity.
    pub fn begin(&mut self) -> Result<(), DbError> {
        if self.active {
            return Err(DbError::TransactionError(
                "transaction already active".to_string(),
            ));
        }
        self.active = true;
        self.undo_stack.clear();
        Ok(())
    }

    /// §4.2 `COMMIT`. Unlike `ROLLBACK`, committing with no active
    /// transaction is not an error: it is simply a no-op, matching the
    /// original source's unconditional commit.
    pub fn commit(&mut self) -> Result<(), DbError> {
        self.active = false;
        self.undo_stack.clear();
        Ok(())
    }

    /// §4.2 `ROLLBACK`: pops entries LIFO, applying each compensating
    /// operation, then clears `active`. Returns the number of compensations
    /// applied.
    pub fn rollback(&mut self, catalog: &mut Catalog) -> Result<usize, DbError> {
        if !self.active {
            return Err(DbError::TransactionError("no active transaction".to_string()));
        }
        let mut applied = 0;
        while let Some(entry) = self.undo_stack.pop() {
            apply_compensation(catalog, entry)?;
            applied += 1;
        }
        self.active = false;
        Ok(applied)
    }

    /// Records a compensating entry if a transaction is active; a no-op
    /// otherwise (autocommit statements don't journal).
    pub fn record(&mut self, entry: UndoEntry) {
        if self.active {
            self.undo_stack.push(entry);
        }
    }
}

fn apply_compensation(catalog: &mut Catalog, entry: UndoEntry) -> Result<(), DbError> {
    match entry {
        UndoEntry::Delete { table, row_id } => {
            catalog.table_mut(&table)?.delete(row_id);
        }
        UndoEntry::Insert { table, row_id, values } => {
            catalog.table_mut(&table)?.insert(values, Some(row_id))?;
        }
        UndoEntry::Update { table, row_id, prior_values } => {
            catalog.table_mut(&table)?.update(row_id, prior_values)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::types::{Column, Constraint, DataType};
    use crate::core::storage::Table;

    fn catalog_with_table() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .create_table(Table::new(
                "t".into(),
                vec![Column::new("id", DataType::Integer, vec![Constraint::PrimaryKey])],
                Vec::new(),
            ))
            .unwrap();
        catalog
    }

    #[test]
    fn begin_while_active_is_an_error() {
        let mut tx = Transaction::new();
        tx.begin().unwrap();
        assert!(matches!(tx.begin(), Err(DbError::TransactionError(_))));
    }

    #[test]
    fn commit_without_begin_is_a_noop() {
        let mut tx = Transaction::new();
        assert!(tx.commit().is_ok());
        assert!(!tx.is_active());
    }

    #[test]
    fn rollback_undoes_an_insert() {
        let mut catalog = catalog_with_table();
        let mut tx = Transaction::new();
        tx.begin().unwrap();
        catalog.table_mut("t").unwrap().insert(vec![Value::Int(1)], None).unwrap();
        tx.record(UndoEntry::Delete { table: "t".into(), row_id: 1 });

        let applied = tx.rollback(&mut catalog).unwrap();
        assert_eq!(applied, 1);
        assert!(catalog.table("t").unwrap().row(1).is_none());
        assert!(!tx.is_active());
    }

    #[test]
    fn rollback_undoes_multiple_entries_in_lifo_order() {
        let mut catalog = catalog_with_table();
        let mut tx = Transaction::new();
        tx.begin().unwrap();
        catalog.table_mut("t").unwrap().insert(vec![Value::Int(1)], None).unwrap();
        tx.record(UndoEntry::Delete { table: "t".into(), row_id: 1 });
        catalog.table_mut("t").unwrap().delete(1);
        tx.record(UndoEntry::Insert { table: "t".into(), row_id: 1, values: vec![Value::Int(1)] });

        let applied = tx.rollback(&mut catalog).unwrap();
        assert_eq!(applied, 2);
        assert!(catalog.table("t").unwrap().row(1).is_none());
    }

    #[test]
    fn commit_drops_the_journal() {
        let mut catalog = catalog_with_table();
        let mut tx = Transaction::new();
        tx.begin().unwrap();
        catalog.table_mut("t").unwrap().insert(vec![Value::Int(1)], None).unwrap();
        tx.record(UndoEntry::Delete { table: "t".into(), row_id: 1 });
        tx.commit().unwrap();
        assert!(catalog.table("t").unwrap().row(1).is_some());
    }
}
