//! The statement tree produced by the parser and consumed by the executor.

use crate::core::catalog::ForeignKey;
use crate::core::common::types::{Column, Value};
use crate::core::storage::Predicate;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable { name: String, columns: Vec<Column>, foreign_keys: Vec<ForeignKey> },
    CreateIndex { name: String, table: String, column: String },
    DropTable { name: String },
    Insert { table: String, columns: Option<Vec<String>>, values: Vec<Value> },
    Select(SelectStatement),
    Update { table: String, assignments: Vec<(String, Value)>, predicate: Vec<Predicate> },
    Delete { table: String, predicate: Vec<Predicate> },
    Begin,
    Commit,
    Rollback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectStatement {
    /// A plain or grouped-aggregate select over one table.
    Plain {
        items: Vec<SelectItem>,
        table: String,
        predicate: Vec<Predicate>,
        group_by: Option<String>,
    },
    /// `A JOIN B ON left_col = right_col`.
    Join {
        items: Vec<SelectItem>,
        left_table: String,
        right_table: String,
        left_col: String,
        right_col: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Star,
    /// A bare or `table.column`-qualified column reference.
    Column(String),
    Aggregate { func: AggFunc, arg: AggArg },
}

impl SelectItem {
    /// The label used for this item's output column, e.g. `SUM(amount)`.
    pub fn label(&self) -> String {
        match self {
            Self::Star => "*".to_string(),
            Self::Column(c) => c.clone(),
            Self::Aggregate { func, arg } => format!("{}({})", func.keyword(), arg.text()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggFunc {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "COUNT" => Some(Self::Count),
            "SUM" => Some(Self::Sum),
            "AVG" => Some(Self::Avg),
            "MIN" => Some(Self::Min),
            "MAX" => Some(Self::Max),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggArg {
    Star,
    Column(String),
}

impl AggArg {
    pub fn text(&self) -> String {
        match self {
            Self::Star => "*".to_string(),
            Self::Column(c) => c.clone(),
        }
    }
}
