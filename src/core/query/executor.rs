//! Statement dispatch: turns a parsed [`Statement`] into catalog mutations
//! or reads, enforcing foreign-key integrity and journaling every mutation
//! so an active transaction can roll it back.

use crate::core::audit::{record_if_present, AuditSink, FileAuditSink};
use crate::core::catalog::Catalog;
use crate::core::common::error::DbError;
use crate::core::common::types::{DataType, Value};
use crate::core::config::Config;
use crate::core::query::aggregate;
use crate::core::query::join;
use crate::core::query::sql::{self, SelectItem, SelectStatement, Statement};
use crate::core::storage::Table;
use crate::core::transaction::{Transaction, UndoEntry};

/// The shape every statement resolves to at the boundary: errors are
/// recovered into [`QueryResult::Error`] rather than propagated, matching
/// the `{status, message}` external contract.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    RowsAffected(u64),
    Inserted { row_id: u64 },
    Rows { columns: Vec<String>, rows: Vec<Vec<Value>> },
    Message(String),
    Error(String),
}

impl QueryResult {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows { rows, .. } => rows.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

#[derive(Debug)]
pub struct Database {
    catalog: Catalog,
    transaction: Transaction,
    config: Config,
    audit_sink: Option<Box<dyn AuditSink>>,
}

impl Database {
    pub fn new(config: Config) -> Self {
        let audit_sink: Option<Box<dyn AuditSink>> = if config.audit_enabled {
            config
                .audit_log_path
                .as_ref()
                .map(|p| Box::new(FileAuditSink::new(p.clone())) as Box<dyn AuditSink>)
        } else {
            None
        };
        Self { catalog: Catalog::new(), transaction: Transaction::new(), config, audit_sink }
    }

    pub fn in_memory() -> Self {
        Self::new(Config::in_memory())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), DbError> {
        crate::core::persistence::save(&self.catalog, path)
    }

    pub fn load(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), DbError> {
        self.catalog = crate::core::persistence::load(path)?;
        Ok(())
    }

    /// §6: the single entry point. Every statement is whitespace-normalized,
    /// audit-logged, then executed; failures are caught and reported as a
    /// value rather than propagated.
    pub fn execute(&mut self, statement: &str) -> QueryResult {
        let normalized = normalize_whitespace(statement);
        record_if_present(self.audit_sink.as_deref(), &normalized);

        match self.execute_inner(&normalized) {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!(error = %err, statement = %normalized, "statement failed");
                QueryResult::Error(err.to_string())
            }
        }
    }

    fn execute_inner(&mut self, statement: &str) -> Result<QueryResult, DbError> {
        let parsed = sql::parse(statement)?;
        match parsed {
            Statement::CreateTable { name, columns, foreign_keys } => {
                self.catalog.create_table(Table::new(name.clone(), columns, foreign_keys))?;
                Ok(QueryResult::Message(format!("table '{name}' created")))
            }
            Statement::CreateIndex { name, table, column } => {
                self.catalog.table_mut(&table)?.create_index(&name, &column)?;
                Ok(QueryResult::Message(format!("index '{name}' created on {table}({column})")))
            }
            Statement::DropTable { name } => {
                self.catalog.drop_table(&name);
                Ok(QueryResult::Message(format!("table '{name}' dropped")))
            }
            Statement::Insert { table, columns, values } => {
                self.execute_insert(&table, columns, values)
            }
            Statement::Select(select) => self.execute_select(select),
            Statement::Update { table, assignments, predicate } => {
                self.execute_update(&table, assignments, &predicate)
            }
            Statement::Delete { table, predicate } => self.execute_delete(&table, &predicate),
            Statement::Begin => {
                self.transaction.begin()?;
                Ok(QueryResult::Message("transaction started".to_string()))
            }
            Statement::Commit => {
                self.transaction.commit()?;
                Ok(QueryResult::Message("transaction committed".to_string()))
            }
            Statement::Rollback => {
                let applied = self.transaction.rollback(&mut self.catalog)?;
                Ok(QueryResult::Message(format!(
                    "transaction rolled back ({applied} operations undone)"
                )))
            }
        }
    }

    /// §4.1 insert plus §4.3 foreign-key enforcement and PK/row-id alignment.
    fn execute_insert(
        &mut self,
        table_name: &str,
        columns: Option<Vec<String>>,
        values: Vec<Value>,
    ) -> Result<QueryResult, DbError> {
        let table = self.catalog.table(table_name)?;
        let full_values = align_insert_values(table, columns, values)?;

        for fk in table.foreign_keys.clone() {
            let local_idx = table
                .column_index(&fk.local_column)
                .ok_or_else(|| DbError::UnknownColumn(fk.local_column.clone()))?;
            let local_value = &full_values[local_idx];
            if local_value.is_null() {
                continue;
            }
            let referenced = self.catalog.table(&fk.referenced_table)?;
            let ref_idx = referenced
                .column_index(&fk.referenced_column)
                .ok_or_else(|| DbError::UnknownColumn(fk.referenced_column.clone()))?;
            let exists = referenced
                .rows
                .values()
                .any(|row| row[ref_idx].text_repr() == local_value.text_repr());
            if !exists {
                return Err(DbError::ForeignKeyViolation(format!(
                    "{table_name}.{} = {} has no matching {}.{}",
                    fk.local_column,
                    local_value.text_repr(),
                    fk.referenced_table,
                    fk.referenced_column
                )));
            }
        }

        let row_id_hint = pk_row_id_hint(table, &full_values);
        let table = self.catalog.table_mut(table_name)?;
        let row_id = table.insert(full_values, row_id_hint)?;
        self.transaction.record(UndoEntry::Delete { table: table_name.to_string(), row_id });
        Ok(QueryResult::Inserted { row_id })
    }

    /// §4.3 delete-restrict: no child row may reference a row about to be removed.
    fn execute_delete(
        &mut self,
        table_name: &str,
        predicate: &[crate::core::storage::Predicate],
    ) -> Result<QueryResult, DbError> {
        let table = self.catalog.table(table_name)?;
        let matched = table.select(predicate);

        for (_, row) in &matched {
            for child in self.catalog.referencing_tables(table_name) {
                for fk in &child.foreign_keys {
                    if fk.referenced_table != table_name {
                        continue;
                    }
                    let Some(parent_idx) = table.column_index(&fk.referenced_column) else {
                        continue;
                    };
                    let Some(local_idx) = child.column_index(&fk.local_column) else {
                        continue;
                    };
                    let parent_value = &row[parent_idx];
                    let referenced = child
                        .rows
                        .values()
                        .any(|r| r[local_idx].text_repr() == parent_value.text_repr());
                    if referenced {
                        return Err(DbError::ForeignKeyViolation(format!(
                            "cannot delete {table_name}.{} = {}: referenced by {}.{}",
                            fk.referenced_column,
                            parent_value.text_repr(),
                            child.name,
                            fk.local_column
                        )));
                    }
                }
            }
        }

        let table = self.catalog.table_mut(table_name)?;
        let count = matched.len();
        for (row_id, values) in matched {
            table.delete(row_id);
            self.transaction.record(UndoEntry::Insert {
                table: table_name.to_string(),
                row_id,
                values,
            });
        }
        Ok(QueryResult::RowsAffected(count as u64))
    }

    fn execute_update(
        &mut self,
        table_name: &str,
        assignments: Vec<(String, Value)>,
        predicate: &[crate::core::storage::Predicate],
    ) -> Result<QueryResult, DbError> {
        let table = self.catalog.table(table_name)?;
        let matched = table.select(predicate);

        let mut assignment_indices = Vec::with_capacity(assignments.len());
        for (col, _) in &assignments {
            let idx =
                table.column_index(col).ok_or_else(|| DbError::UnknownColumn(col.clone()))?;
            assignment_indices.push(idx);
        }

        let table = self.catalog.table_mut(table_name)?;
        let count = matched.len();
        for (row_id, prior_values) in matched {
            let mut new_values = prior_values.clone();
            for (idx, (_, value)) in assignment_indices.iter().zip(assignments.iter()) {
                new_values[*idx] = value.clone();
            }
            table.update(row_id, new_values)?;
            self.transaction.record(UndoEntry::Update {
                table: table_name.to_string(),
                row_id,
                prior_values,
            });
        }
        Ok(QueryResult::RowsAffected(count as u64))
    }

    fn execute_select(&self, select: SelectStatement) -> Result<QueryResult, DbError> {
        match select {
            SelectStatement::Plain { items, table, predicate, group_by } => {
                let table = self.catalog.table(&table)?;
                if group_by.is_some() || items.iter().any(is_aggregate) {
                    let result =
                        aggregate::evaluate(table, &items, &predicate, group_by.as_deref())?;
                    Ok(QueryResult::Rows { columns: result.columns, rows: result.rows })
                } else {
                    select_plain(table, &items, &predicate)
                }
            }
            SelectStatement::Join { items, left_table, right_table, left_col, right_col } => {
                let result = join::hash_join(
                    &self.catalog,
                    &items,
                    &left_table,
                    &right_table,
                    &left_col,
                    &right_col,
                )?;
                Ok(QueryResult::Rows { columns: result.columns, rows: result.rows })
            }
        }
    }
}

fn is_aggregate(item: &SelectItem) -> bool {
    matches!(item, SelectItem::Aggregate { .. })
}

fn select_plain(
    table: &Table,
    items: &[SelectItem],
    predicate: &[crate::core::storage::Predicate],
) -> Result<QueryResult, DbError> {
    let matched = table.select(predicate);

    if items.len() == 1 && items[0] == SelectItem::Star {
        let columns = table.columns.iter().map(|c| c.name.clone()).collect();
        let rows = matched.into_iter().map(|(_, row)| row).collect();
        return Ok(QueryResult::Rows { columns, rows });
    }

    let mut indices = Vec::with_capacity(items.len());
    for item in items {
        match item {
            SelectItem::Column(name) => {
                indices.push(
                    table
                        .column_index(name)
                        .ok_or_else(|| DbError::UnknownColumn(name.clone()))?,
                );
            }
            SelectItem::Star => {
                return Err(DbError::UnsupportedFeature(
                    "`*` cannot be combined with other select items".to_string(),
                ))
            }
            SelectItem::Aggregate { .. } => {
                unreachable!("aggregates route through aggregate::evaluate")
            }
        }
    }

    let columns = items.iter().map(SelectItem::label).collect();
    let rows = matched
        .into_iter()
        .map(|(_, row)| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Ok(QueryResult::Rows { columns, rows })
}

/// Aligns an `INSERT`'s supplied values to the table's full column order,
/// filling omitted columns with `Null` when an explicit column list is given.
fn align_insert_values(
    table: &Table,
    columns: Option<Vec<String>>,
    values: Vec<Value>,
) -> Result<Vec<Value>, DbError> {
    match columns {
        None => {
            if values.len() != table.columns.len() {
                return Err(DbError::TypeError(format!(
                    "{} has {} columns but {} values were given",
                    table.name,
                    table.columns.len(),
                    values.len()
                )));
            }
            Ok(values)
        }
        Some(names) => {
            if names.len() != values.len() {
                return Err(DbError::TypeError(format!(
                    "column list has {} names but {} values were given",
                    names.len(),
                    values.len()
                )));
            }
            let mut full = vec![Value::Null; table.columns.len()];
            for (name, value) in names.into_iter().zip(values) {
                let idx = table
                    .column_index(&name)
                    .ok_or_else(|| DbError::UnknownColumn(name.clone()))?;
                full[idx] = value;
            }
            Ok(full)
        }
    }
}

/// §4.3: when the PK column is declared `INTEGER` and the supplied value is
/// itself an integer literal, align the row-id to it.
fn pk_row_id_hint(table: &Table, values: &[Value]) -> Option<u64> {
    let pk = table.primary_key.as_ref()?;
    let idx = table.column_index(pk)?;
    let column = table.columns.iter().find(|c| &c.name == pk)?;
    if column.data_type != DataType::Integer {
        return None;
    }
    match values.get(idx)? {
        Value::Int(i) if *i >= 0 => Some(*i as u64),
        _ => None,
    }
}

fn normalize_whitespace(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::in_memory()
    }

    #[test]
    fn create_insert_and_select() {
        let mut db = db();
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
        let result = db.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')");
        assert_eq!(result, QueryResult::Inserted { row_id: 1 });

        let result = db.execute("SELECT * FROM users WHERE id = 1");
        match result {
            QueryResult::Rows { columns, rows } => {
                assert_eq!(columns, vec!["id".to_string(), "name".to_string()]);
                assert_eq!(rows, vec![vec![Value::Int(1), Value::Text("Alice".into())]]);
            }
            other => panic!("expected Rows, got {other:?}"),
        }
    }

    #[test]
    fn foreign_key_violation_on_insert_is_reported() {
        let mut db = db();
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY)");
        db.execute(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER, \
             FOREIGN KEY (user_id) REFERENCES users (id))",
        );
        let result = db.execute("INSERT INTO orders (id, user_id) VALUES (1, 99)");
        assert!(matches!(result, QueryResult::Error(_)));
    }

    #[test]
    fn delete_restricted_by_referencing_child() {
        let mut db = db();
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY)");
        db.execute(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER, \
             FOREIGN KEY (user_id) REFERENCES users (id))",
        );
        db.execute("INSERT INTO users (id) VALUES (1)");
        db.execute("INSERT INTO orders (id, user_id) VALUES (1, 1)");
        let result = db.execute("DELETE FROM users WHERE id = 1");
        assert!(matches!(result, QueryResult::Error(_)));
    }

    #[test]
    fn rollback_restores_inserted_row() {
        let mut db = db();
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)");
        db.execute("BEGIN");
        db.execute("INSERT INTO t (id) VALUES (1)");
        db.execute("ROLLBACK");
        let result = db.execute("SELECT * FROM t");
        assert!(result.is_empty());
    }

    #[test]
    fn update_rejects_unknown_column() {
        let mut db = db();
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)");
        let result = db.execute("UPDATE t SET nope = 1 WHERE id = 1");
        assert!(result.is_error());
    }

    #[test]
    fn insert_with_too_few_values_and_no_column_list_is_reported_not_panicked() {
        let mut db = db();
        db.execute("CREATE TABLE p (id INTEGER PRIMARY KEY)");
        db.execute(
            "CREATE TABLE c (id INTEGER PRIMARY KEY, p_id INTEGER, \
             FOREIGN KEY (p_id) REFERENCES p (id))",
        );
        let result = db.execute("INSERT INTO c VALUES (1)");
        assert!(result.is_error());
    }

    #[test]
    fn foreign_key_may_reference_a_non_primary_unique_column() {
        let mut db = db();
        db.execute("CREATE TABLE p (id INTEGER PRIMARY KEY, code TEXT UNIQUE)");
        db.execute(
            "CREATE TABLE c (id INTEGER PRIMARY KEY, p_code TEXT, \
             FOREIGN KEY (p_code) REFERENCES p (code))",
        );
        db.execute("INSERT INTO p (id, code) VALUES (1, 'abc')");
        let result = db.execute("INSERT INTO c (id, p_code) VALUES (1, 'abc')");
        assert_eq!(result, QueryResult::Inserted { row_id: 1 });

        let bad = db.execute("INSERT INTO c (id, p_code) VALUES (2, 'zzz')");
        assert!(bad.is_error());
    }

    #[test]
    fn insert_without_column_list_assigns_pk_from_integer_literal() {
        let mut db = db();
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, label TEXT)");
        let result = db.execute("INSERT INTO t VALUES (5, 'x')");
        assert_eq!(result, QueryResult::Inserted { row_id: 5 });
    }
}
