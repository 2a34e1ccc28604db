//! Hash equi-join for two-table `SELECT ... JOIN ... ON col = col` statements.

use std::collections::HashMap;

use crate::core::catalog::Catalog;
use crate::core::common::error::DbError;
use crate::core::common::types::Value;
use crate::core::query::sql::SelectItem;
use crate::core::storage::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Resolves a (possibly `table.column`-qualified) ON-clause token to which
/// side of the join it names and that column's position within its table.
fn resolve_side(
    token: &str,
    left_name: &str,
    left: &Table,
    right_name: &str,
    right: &Table,
) -> Result<(Side, usize), DbError> {
    if let Some((table, col)) = token.split_once('.') {
        return if table == left_name {
            left.column_index(col)
                .map(|idx| (Side::Left, idx))
                .ok_or_else(|| DbError::UnknownColumn(col.to_string()))
        } else if table == right_name {
            right
                .column_index(col)
                .map(|idx| (Side::Right, idx))
                .ok_or_else(|| DbError::UnknownColumn(col.to_string()))
        } else {
            Err(DbError::UnknownTable(table.to_string()))
        };
    }

    match (left.column_index(token), right.column_index(token)) {
        (Some(idx), None) => Ok((Side::Left, idx)),
        (None, Some(idx)) => Ok((Side::Right, idx)),
        (Some(_), Some(_)) => {
            Err(DbError::ParseError(format!("ambiguous column '{token}' in join")))
        }
        (None, None) => Err(DbError::UnknownColumn(token.to_string())),
    }
}

/// Resolves a select-list column reference against the combined (left,
/// right) schema: qualified names go straight to their table, a bare name
/// resolves to the left table first, else the right.
fn resolve_projection(
    name: &str,
    left_name: &str,
    left: &Table,
    right_name: &str,
    right: &Table,
) -> Result<usize, DbError> {
    let left_width = left.columns.len();
    if let Some((table, col)) = name.split_once('.') {
        return if table == left_name {
            left.column_index(col).ok_or_else(|| DbError::UnknownColumn(col.to_string()))
        } else if table == right_name {
            right
                .column_index(col)
                .map(|idx| idx + left_width)
                .ok_or_else(|| DbError::UnknownColumn(col.to_string()))
        } else {
            Err(DbError::UnknownTable(table.to_string()))
        };
    }
    if let Some(idx) = left.column_index(name) {
        return Ok(idx);
    }
    if let Some(idx) = right.column_index(name) {
        return Ok(idx + left_width);
    }
    Err(DbError::UnknownColumn(name.to_string()))
}

pub struct JoinResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// §4.4: build the hash on the smaller table, probe with the larger, and
/// always present combined rows in the statement's declared (A, B) order.
pub fn hash_join(
    catalog: &Catalog,
    items: &[SelectItem],
    left_name: &str,
    right_name: &str,
    left_col: &str,
    right_col: &str,
) -> Result<JoinResult, DbError> {
    let left = catalog.table(left_name)?;
    let right = catalog.table(right_name)?;

    let (left_side, left_idx) = resolve_side(left_col, left_name, left, right_name, right)?;
    let (right_side, right_idx) = resolve_side(right_col, left_name, left, right_name, right)?;
    let (left_table_idx, right_table_idx) = match (left_side, right_side) {
        (Side::Left, Side::Right) => (left_idx, right_idx),
        (Side::Right, Side::Left) => (right_idx, left_idx),
        _ => {
            return Err(DbError::ParseError(
                "ON clause must compare a column from each joined table".to_string(),
            ))
        }
    };

    let build_on_left = left.rows.len() <= right.rows.len();
    let (build, probe, build_idx, probe_idx) = if build_on_left {
        (left, right, left_table_idx, right_table_idx)
    } else {
        (right, left, right_table_idx, left_table_idx)
    };

    let mut hash: HashMap<String, Vec<&Vec<Value>>> = HashMap::new();
    for row in build.rows.values() {
        let key = row[build_idx].text_repr();
        hash.entry(key).or_default().push(row);
    }

    let mut combined_rows = Vec::new();
    for probe_row in probe.rows.values() {
        let key = probe_row[probe_idx].text_repr();
        let Some(matches) = hash.get(&key) else { continue };
        for build_row in matches {
            let (left_row, right_row) =
                if build_on_left { (*build_row, probe_row) } else { (probe_row, *build_row) };
            let mut combined = left_row.clone();
            combined.extend(right_row.iter().cloned());
            combined_rows.push(combined);
        }
    }

    let projected_indices: Vec<usize> = if items.len() == 1 && items[0] == SelectItem::Star {
        (0..left.columns.len() + right.columns.len()).collect()
    } else {
        items
            .iter()
            .map(|item| match item {
                SelectItem::Star => Err(DbError::UnsupportedFeature(
                    "`*` cannot be combined with other select items".to_string(),
                )),
                SelectItem::Column(name) => {
                    resolve_projection(name, left_name, left, right_name, right)
                }
                SelectItem::Aggregate { .. } => Err(DbError::UnsupportedFeature(
                    "aggregates are not supported over joins".to_string(),
                )),
            })
            .collect::<Result<Vec<_>, DbError>>()?
    };

    let columns: Vec<String> = if items.len() == 1 && items[0] == SelectItem::Star {
        left.columns
            .iter()
            .map(|c| format!("{left_name}.{}", c.name))
            .chain(right.columns.iter().map(|c| format!("{right_name}.{}", c.name)))
            .collect()
    } else {
        items.iter().map(SelectItem::label).collect()
    };

    let rows = combined_rows
        .into_iter()
        .map(|row| projected_indices.iter().map(|&i| row[i].clone()).collect())
        .collect();

    Ok(JoinResult { columns, rows })
}
