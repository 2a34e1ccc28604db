//! A single table: its rows, its columns, and the indexes it owns.
//!
//! Rows live in one `row_id -> Vec<Value>` map; indexes hold only row-ids,
//! never copies of rows, so there is exactly one owner of row data and the
//! ownership graph stays tree-shaped (no cycles, no shared mutable state).

use std::collections::BTreeMap;

use crate::core::catalog::ForeignKey;
use crate::core::common::error::DbError;
use crate::core::common::types::{Column, Value};
use crate::core::storage::index::Index;
use crate::core::storage::predicate::Predicate;

const PRIMARY_INDEX: &str = "__pk__";

fn unique_index_name(column: &str) -> String {
    format!("__uniq_{column}")
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub column_map: BTreeMap<String, usize>,
    pub rows: BTreeMap<u64, Vec<Value>>,
    pub row_id_counter: u64,
    pub primary_key: Option<String>,
    pub unique_columns: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: BTreeMap<String, Index>,
    /// Column position backing each user-created secondary index, keyed by
    /// index name (PK/unique indexes are addressed structurally and never
    /// appear here).
    secondary_index_columns: BTreeMap<String, usize>,
}

impl Table {
    pub fn new(name: String, columns: Vec<Column>, foreign_keys: Vec<ForeignKey>) -> Self {
        let column_map = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();

        let primary_key = columns.iter().find(|c| c.is_primary_key()).map(|c| c.name.clone());
        let unique_columns: Vec<String> = columns
            .iter()
            .filter(|c| c.is_unique() && !c.is_primary_key())
            .map(|c| c.name.clone())
            .collect();

        let mut indexes = BTreeMap::new();
        if primary_key.is_some() {
            indexes.insert(PRIMARY_INDEX.to_string(), Index::new());
        }
        for col in &unique_columns {
            indexes.insert(unique_index_name(col), Index::new());
        }

        Self {
            name,
            columns,
            column_map,
            rows: BTreeMap::new(),
            row_id_counter: 1,
            primary_key,
            unique_columns,
            foreign_keys,
            indexes,
            secondary_index_columns: BTreeMap::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_map.get(name).copied()
    }

    pub fn primary_key_value<'a>(&self, row: &'a [Value]) -> Option<&'a Value> {
        self.primary_key.as_ref().and_then(|pk| self.column_index(pk)).map(|idx| &row[idx])
    }

    /// §4.1 `insert`: validate, check PK/unique constraints, resolve the
    /// final row-id, write the row, and maintain every index.
    pub fn insert(&mut self, values: Vec<Value>, row_id: Option<u64>) -> Result<u64, DbError> {
        if values.len() != self.columns.len() {
            return Err(DbError::TypeError(format!(
                "column count mismatch in {}: expected {}, got {}",
                self.name,
                self.columns.len(),
                values.len()
            )));
        }

        let validated: Vec<Value> = self
            .columns
            .iter()
            .zip(values.iter())
            .map(|(col, val)| col.validate(val))
            .collect::<Result<_, _>>()?;

        if let Some(pk) = &self.primary_key {
            let pk_idx = self.column_map[pk];
            let pk_val = &validated[pk_idx];
            if !pk_val.is_null() && self.indexes[PRIMARY_INDEX].contains(pk_val) {
                return Err(DbError::PrimaryKeyViolation(format!(
                    "{}.{pk} = {}",
                    self.name,
                    pk_val.text_repr()
                )));
            }
        }

        for col in &self.unique_columns {
            let idx = self.column_map[col];
            let val = &validated[idx];
            if !val.is_null() && self.indexes[&unique_index_name(col)].contains(val) {
                return Err(DbError::UniqueViolation(format!(
                    "{}.{col} = {}",
                    self.name,
                    val.text_repr()
                )));
            }
        }

        let final_id = row_id.unwrap_or(self.row_id_counter);
        if self.rows.contains_key(&final_id) {
            return Err(DbError::TransactionError(format!(
                "row id {final_id} already occupied in {}",
                self.name
            )));
        }

        self.rows.insert(final_id, validated.clone());
        if final_id >= self.row_id_counter {
            self.row_id_counter = final_id + 1;
        }
        self.index_row(final_id, &validated);

        tracing::debug!(table = %self.name, row_id = final_id, "inserted row");
        Ok(final_id)
    }

    /// §4.1 `update`: pre-check uniqueness against every *other* row, then
    /// swap the row and reindex it.
    pub fn update(&mut self, row_id: u64, new_values: Vec<Value>) -> Result<(), DbError> {
        if !self.rows.contains_key(&row_id) {
            return Ok(());
        }
        if new_values.len() != self.columns.len() {
            return Err(DbError::TypeError(format!(
                "column count mismatch in {}: expected {}, got {}",
                self.name,
                self.columns.len(),
                new_values.len()
            )));
        }

        let validated: Vec<Value> = self
            .columns
            .iter()
            .zip(new_values.iter())
            .map(|(col, val)| col.validate(val))
            .collect::<Result<_, _>>()?;

        if let Some(pk) = &self.primary_key {
            let pk_idx = self.column_map[pk];
            let pk_val = &validated[pk_idx];
            if !pk_val.is_null()
                && self.indexes[PRIMARY_INDEX].contains_excluding(pk_val, row_id)
            {
                return Err(DbError::PrimaryKeyViolation(format!(
                    "{}.{pk} = {}",
                    self.name,
                    pk_val.text_repr()
                )));
            }
        }

        for col in &self.unique_columns {
            let idx = self.column_map[col];
            let val = &validated[idx];
            if !val.is_null()
                && self.indexes[&unique_index_name(col)].contains_excluding(val, row_id)
            {
                return Err(DbError::UniqueViolation(format!(
                    "{}.{col} = {}",
                    self.name,
                    val.text_repr()
                )));
            }
        }

        let old_row = self.rows.get(&row_id).cloned().unwrap_or_default();
        self.unindex_row(row_id, &old_row);
        self.rows.insert(row_id, validated.clone());
        self.index_row(row_id, &validated);
        Ok(())
    }

    /// §4.1 `delete`: no error if the row is already absent.
    pub fn delete(&mut self, row_id: u64) {
        if let Some(row) = self.rows.remove(&row_id) {
            self.unindex_row(row_id, &row);
            tracing::debug!(table = %self.name, row_id, "deleted row");
        }
    }

    pub fn row(&self, row_id: u64) -> Option<&Vec<Value>> {
        self.rows.get(&row_id)
    }

    /// §4.1 `select`: probes the primary-key index for a lone `col = lit`
    /// predicate naming the PK, otherwise falls back to a full scan.
    pub fn select(&self, conditions: &[Predicate]) -> Vec<(u64, Vec<Value>)> {
        if let Some(pk) = &self.primary_key {
            if let Some(pred) = conditions
                .iter()
                .find(|p| p.column == *pk && p.op == crate::core::storage::predicate::CompareOp::Eq)
            {
                let candidates: Vec<u64> = self
                    .indexes
                    .get(PRIMARY_INDEX)
                    .and_then(|idx| idx.get(&pred.value))
                    .map(|ids| ids.iter().copied().collect())
                    .unwrap_or_default();
                return candidates
                    .into_iter()
                    .filter_map(|rid| {
                        let row = self.rows.get(&rid)?;
                        self.row_matches(row, conditions).then(|| (rid, row.clone()))
                    })
                    .collect();
            }
        }

        self.rows
            .iter()
            .filter(|(_, row)| self.row_matches(row, conditions))
            .map(|(rid, row)| (*rid, row.clone()))
            .collect()
    }

    fn row_matches(&self, row: &[Value], conditions: &[Predicate]) -> bool {
        conditions.iter().all(|pred| match self.column_index(&pred.column) {
            Some(idx) => pred.matches_cell(&row[idx]),
            None => false,
        })
    }

    /// §4.1 `create_index`: allocates a secondary index and backfills it
    /// from the rows currently present.
    pub fn create_index(&mut self, name: &str, column: &str) -> Result<(), DbError> {
        let col_idx = self
            .column_index(column)
            .ok_or_else(|| DbError::UnknownColumn(column.to_string()))?;
        let mut index = Index::new();
        for (rid, row) in &self.rows {
            index.insert(&row[col_idx], *rid);
        }
        self.indexes.insert(name.to_string(), index);
        self.secondary_index_columns.insert(name.to_string(), col_idx);
        Ok(())
    }

    fn index_row(&mut self, row_id: u64, values: &[Value]) {
        if let Some(pk) = self.primary_key.clone() {
            let idx = self.column_map[&pk];
            self.indexes.get_mut(PRIMARY_INDEX).unwrap().insert(&values[idx], row_id);
        }
        for col in self.unique_columns.clone() {
            let idx = self.column_map[&col];
            self.indexes.get_mut(&unique_index_name(&col)).unwrap().insert(&values[idx], row_id);
        }
        for (name, column) in self.secondary_index_columns.clone() {
            if let Some(index) = self.indexes.get_mut(&name) {
                index.insert(&values[column], row_id);
            }
        }
    }

    fn unindex_row(&mut self, row_id: u64, values: &[Value]) {
        if let Some(pk) = self.primary_key.clone() {
            let idx = self.column_map[&pk];
            self.indexes.get_mut(PRIMARY_INDEX).unwrap().remove(&values[idx], row_id);
        }
        for col in self.unique_columns.clone() {
            let idx = self.column_map[&col];
            self.indexes.get_mut(&unique_index_name(&col)).unwrap().remove(&values[idx], row_id);
        }
        for (name, column) in self.secondary_index_columns.clone() {
            if let Some(index) = self.indexes.get_mut(&name) {
                index.remove(&values[column], row_id);
            }
        }
    }
}
