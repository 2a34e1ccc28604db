//! The catalog maps table names to tables and stores the foreign-key
//! declarations that tie them together.
//!
//! Foreign keys store referenced table *names*, not handles: cross-table
//! lookups always resolve through the catalog, which keeps the ownership
//! graph tree-shaped and tolerates tables being dropped and recreated.

use std::collections::BTreeMap;

use crate::core::common::error::DbError;
use crate::core::storage::table::Table;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForeignKey {
    pub local_column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Catalog {
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table(&mut self, table: Table) -> Result<(), DbError> {
        if self.tables.contains_key(&table.name) {
            return Err(DbError::ParseError(format!("table '{}' already exists", table.name)));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) {
        self.tables.remove(name);
    }

    pub fn table(&self, name: &str) -> Result<&Table, DbError> {
        self.tables.get(name).ok_or_else(|| DbError::UnknownTable(name.to_string()))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table, DbError> {
        self.tables.get_mut(name).ok_or_else(|| DbError::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Table)> {
        self.tables.iter()
    }

    /// Tables other than `name` that declare a foreign key referencing it,
    /// used by the executor's delete-restrict enforcement.
    pub fn referencing_tables(&self, name: &str) -> Vec<&Table> {
        self.tables
            .values()
            .filter(|t| t.foreign_keys.iter().any(|fk| fk.referenced_table == name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::types::{Column, Constraint, DataType};

    fn sample_table(name: &str) -> Table {
        Table::new(
            name.to_string(),
            vec![Column::new("id", DataType::Integer, vec![Constraint::PrimaryKey])],
            Vec::new(),
        )
    }

    #[test]
    fn duplicate_table_creation_fails() {
        let mut catalog = Catalog::new();
        catalog.create_table(sample_table("t")).unwrap();
        assert!(catalog.create_table(sample_table("t")).is_err());
    }

    #[test]
    fn unknown_table_lookup_fails() {
        let catalog = Catalog::new();
        assert!(matches!(catalog.table("ghost"), Err(DbError::UnknownTable(_))));
    }

    #[test]
    fn drop_then_recreate_is_allowed() {
        let mut catalog = Catalog::new();
        catalog.create_table(sample_table("t")).unwrap();
        catalog.drop_table("t");
        assert!(catalog.create_table(sample_table("t")).is_ok());
    }
}
