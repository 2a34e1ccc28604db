//! Grouped aggregation for `SELECT ... FROM t [WHERE ...] [GROUP BY col]`.

use std::collections::BTreeMap;

use crate::core::common::error::DbError;
use crate::core::common::types::Value;
use crate::core::query::sql::{AggArg, AggFunc, SelectItem};
use crate::core::storage::{Predicate, Table};

pub struct AggregateResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// §4.5: filters by `predicate`, partitions by `group_by` (or one implicit
/// group when absent), then evaluates each select item per group.
pub fn evaluate(
    table: &Table,
    items: &[SelectItem],
    predicate: &[Predicate],
    group_by: Option<&str>,
) -> Result<AggregateResult, DbError> {
    let group_col_idx = match group_by {
        Some(col) => Some(
            table.column_index(col).ok_or_else(|| DbError::UnknownColumn(col.to_string()))?,
        ),
        None => None,
    };

    let matched = table.select(predicate);

    // Partition into groups keyed by the group column's textual value
    // (Null forms its own group), preserving group order by first
    // appearance for deterministic output.
    let mut groups: BTreeMap<String, Vec<(u64, Vec<Value>)>> = BTreeMap::new();
    let mut group_order: Vec<String> = Vec::new();
    for (row_id, row) in matched {
        let key = match group_col_idx {
            Some(idx) => row[idx].text_repr(),
            None => String::new(),
        };
        if !groups.contains_key(&key) {
            group_order.push(key.clone());
        }
        groups.entry(key).or_default().push((row_id, row));
    }
    if groups.is_empty() && group_col_idx.is_none() {
        // No GROUP BY: a single empty implicit group still reports COUNT(*) = 0 etc.
        // With GROUP BY, zero matching rows means zero groups, not one.
        groups.insert(String::new(), Vec::new());
        group_order.push(String::new());
    }

    let columns = items.iter().map(SelectItem::label).collect();

    let mut rows = Vec::new();
    for key in &group_order {
        let members = &groups[key];
        let mut out_row = Vec::with_capacity(items.len());
        for item in items {
            out_row.push(evaluate_item(table, item, members)?);
        }
        rows.push(out_row);
    }

    Ok(AggregateResult { columns, rows })
}

fn evaluate_item(
    table: &Table,
    item: &SelectItem,
    members: &[(u64, Vec<Value>)],
) -> Result<Value, DbError> {
    match item {
        SelectItem::Star => Err(DbError::UnsupportedFeature(
            "`*` is not valid alongside aggregation or GROUP BY".to_string(),
        )),
        SelectItem::Aggregate { func, arg } => Ok(evaluate_aggregate(table, *func, arg, members)?),
        SelectItem::Column(name) => {
            let idx = table
                .column_index(name)
                .ok_or_else(|| DbError::UnknownColumn(name.to_string()))?;
            // "first row" is defined as lowest row-id in the group for determinism.
            Ok(members.iter().min_by_key(|(row_id, _)| *row_id).map_or(Value::Null, |(_, row)| row[idx].clone()))
        }
    }
}

fn evaluate_aggregate(
    table: &Table,
    func: AggFunc,
    arg: &AggArg,
    members: &[(u64, Vec<Value>)],
) -> Result<Value, DbError> {
    if func == AggFunc::Count {
        return Ok(Value::Int(members.len() as i64));
    }

    let AggArg::Column(name) = arg else {
        return Err(DbError::UnsupportedFeature(format!(
            "{}(*) is not supported",
            func.keyword()
        )));
    };
    let idx = table.column_index(name).ok_or_else(|| DbError::UnknownColumn(name.clone()))?;
    let numerics: Vec<f64> =
        members.iter().filter_map(|(_, row)| row[idx].as_numeric()).collect();

    let result = if numerics.is_empty() {
        0.0
    } else {
        match func {
            AggFunc::Count => unreachable!(),
            AggFunc::Sum => numerics.iter().sum(),
            AggFunc::Avg => numerics.iter().sum::<f64>() / numerics.len() as f64,
            AggFunc::Min => numerics.iter().cloned().fold(f64::INFINITY, f64::min),
            AggFunc::Max => numerics.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        }
    };

    Ok(Value::Real(round_two_places(result)))
}

fn round_two_places(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::types::{Column, Constraint, DataType};

    fn sample_table() -> Table {
        let mut t = Table::new(
            "tx".into(),
            vec![
                Column::new("id", DataType::Integer, vec![Constraint::PrimaryKey]),
                Column::new("type", DataType::Text, vec![]),
                Column::new("amount", DataType::Real, vec![]),
            ],
            Vec::new(),
        );
        t.insert(vec![Value::Int(1), Value::Text("credit".into()), Value::Real(10.0)], None)
            .unwrap();
        t.insert(vec![Value::Int(2), Value::Text("debit".into()), Value::Real(4.0)], None)
            .unwrap();
        t.insert(vec![Value::Int(3), Value::Text("credit".into()), Value::Real(5.5)], None)
            .unwrap();
        t
    }

    #[test]
    fn count_star_without_group_by() {
        let t = sample_table();
        let items = vec![SelectItem::Aggregate { func: AggFunc::Count, arg: AggArg::Star }];
        let result = evaluate(&t, &items, &[], None).unwrap();
        assert_eq!(result.rows, vec![vec![Value::Int(3)]]);
    }

    #[test]
    fn sum_grouped_by_type() {
        let t = sample_table();
        let items = vec![
            SelectItem::Column("type".into()),
            SelectItem::Aggregate { func: AggFunc::Sum, arg: AggArg::Column("amount".into()) },
        ];
        let result = evaluate(&t, &items, &[], Some("type")).unwrap();
        assert_eq!(result.rows.len(), 2);
        let credit_row = result.rows.iter().find(|r| r[0] == Value::Text("credit".into())).unwrap();
        assert_eq!(credit_row[1], Value::Real(15.5));
    }

    #[test]
    fn empty_group_sum_is_zero() {
        let t = sample_table();
        let items = vec![SelectItem::Aggregate { func: AggFunc::Sum, arg: AggArg::Column("amount".into()) }];
        let predicate = vec![Predicate::new(
            "type",
            crate::core::storage::CompareOp::Eq,
            Value::Text("nonexistent".into()),
        )];
        let result = evaluate(&t, &items, &predicate, None).unwrap();
        assert_eq!(result.rows, vec![vec![Value::Real(0.0)]]);
    }

    #[test]
    fn group_by_with_no_matching_rows_yields_zero_groups() {
        let t = sample_table();
        let items = vec![
            SelectItem::Column("type".into()),
            SelectItem::Aggregate { func: AggFunc::Count, arg: AggArg::Star },
        ];
        let predicate = vec![Predicate::new(
            "type",
            crate::core::storage::CompareOp::Eq,
            Value::Text("nonexistent".into()),
        )];
        let result = evaluate(&t, &items, &predicate, Some("type")).unwrap();
        assert!(result.rows.is_empty());
    }
}
