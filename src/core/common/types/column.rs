//! Column declarations: a name, a declared type, and the constraints it carries.

use super::data_type::DataType;
use super::value::Value;
use crate::core::common::error::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Constraint {
    PrimaryKey,
    Unique,
    NotNull,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<Constraint>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType, constraints: Vec<Constraint>) -> Self {
        Self { name: name.into(), data_type, constraints }
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&Constraint::PrimaryKey)
    }

    pub fn is_unique(&self) -> bool {
        self.constraints.contains(&Constraint::Unique)
    }

    pub fn is_not_null(&self) -> bool {
        self.constraints.contains(&Constraint::NotNull) || self.is_primary_key()
    }

    /// Validates and coerces a candidate cell value against this column's
    /// declared type and nullability, per §4.1 step 2.
    pub fn validate(&self, value: &Value) -> Result<Value, DbError> {
        if value.is_null() {
            if self.is_not_null() {
                return Err(DbError::NullViolation(self.name.clone()));
            }
            return Ok(Value::Null);
        }
        value
            .coerce_to(self.data_type)
            .map_err(|msg| DbError::TypeError(format!("column '{}': {msg}", self.name)))
    }
}
