//! Full-catalog snapshot persistence.
//!
//! `save`/`load` serialize and restore the entire [`Catalog`] — columns,
//! primary key, foreign keys, rows, the row-id counter, and every index —
//! to and from a single file. The format is private to this crate: there is
//! no cross-version or cross-implementation compatibility guarantee, only
//! that `load(save(catalog))` round-trips.

use std::path::Path;

use crate::core::catalog::Catalog;
use crate::core::common::error::DbError;

pub fn save(catalog: &Catalog, path: impl AsRef<Path>) -> Result<(), DbError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer(file, catalog)?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<Catalog, DbError> {
    let file = std::fs::File::open(path)?;
    let catalog = serde_json::from_reader(file)?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::types::{Column, Constraint, DataType, Value};
    use crate::core::storage::Table;
    use tempfile::NamedTempFile;

    #[test]
    fn round_trips_a_catalog_with_rows_and_indexes() {
        let mut catalog = Catalog::new();
        let mut table = Table::new(
            "users".into(),
            vec![
                Column::new("id", DataType::Integer, vec![Constraint::PrimaryKey]),
                Column::new("email", DataType::Text, vec![Constraint::Unique]),
            ],
            Vec::new(),
        );
        table.insert(vec![Value::Int(1), Value::Text("a@x".into())], None).unwrap();
        table.create_index("idx_email", "email").unwrap();
        catalog.create_table(table).unwrap();

        let file = NamedTempFile::new().unwrap();
        save(&catalog, file.path()).unwrap();
        let restored = load(file.path()).unwrap();

        let restored_table = restored.table("users").unwrap();
        assert_eq!(restored_table.row_id_counter, 2);
        assert!(restored_table.indexes.contains_key("idx_email"));
        assert_eq!(restored_table.rows.len(), 1);
    }
}
