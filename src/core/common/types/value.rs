//! The runtime value domain every cell in every row is drawn from.

use super::data_type::DataType;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Int(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    /// An ISO-8601 date, stored and compared as text.
    Date(String),
    Null,
}

impl Value {
    /// Parses a literal token from the SQL surface: quoted text, `NULL`, or
    /// a bare number (`.` present selects `Real`, otherwise `Int`).
    pub fn parse_literal(token: &str) -> Self {
        let trimmed = token.trim();
        if trimmed.eq_ignore_ascii_case("NULL") {
            return Self::Null;
        }
        if (trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() >= 2)
            || (trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2)
        {
            return Self::Text(trimmed[1..trimmed.len() - 1].to_string());
        }
        if trimmed.contains('.') {
            if let Ok(r) = trimmed.parse::<f64>() {
                return Self::Real(r);
            }
        } else if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Int(i);
        }
        Self::Text(trimmed.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The textual representation used for `=`/FK comparisons, which compare
    /// by textual equality regardless of the underlying variant.
    pub fn text_repr(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Real(r) => r.to_string(),
            Self::Text(s) | Self::Date(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Null => String::new(),
        }
    }

    /// Best-effort numeric projection, used by `SUM`/`AVG`/`MIN`/`MAX`; cells
    /// that are not numeric are simply excluded by the aggregate operator.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Coerces this value into the declared type of a column, following the
    /// rules: compatible scalars convert, everything else is a type error.
    pub fn coerce_to(&self, declared: DataType) -> Result<Self, String> {
        if self.is_null() {
            return Ok(Self::Null);
        }
        match declared {
            DataType::Integer => match self {
                Self::Int(i) => Ok(Self::Int(*i)),
                Self::Real(r) => Ok(Self::Int(*r as i64)),
                Self::Text(s) => s
                    .parse::<i64>()
                    .map(Self::Int)
                    .map_err(|_| format!("'{s}' is not INTEGER")),
                other => Err(format!("{other:?} is not INTEGER")),
            },
            DataType::Real => match self {
                Self::Int(i) => Ok(Self::Real(*i as f64)),
                Self::Real(r) => Ok(Self::Real(*r)),
                Self::Text(s) => s
                    .parse::<f64>()
                    .map(Self::Real)
                    .map_err(|_| format!("'{s}' is not REAL")),
                other => Err(format!("{other:?} is not REAL")),
            },
            DataType::Text => Ok(Self::Text(self.text_repr())),
            DataType::Boolean => match self {
                Self::Bool(b) => Ok(Self::Bool(*b)),
                Self::Text(s) => Ok(Self::Bool(s.eq_ignore_ascii_case("TRUE"))),
                Self::Int(i) => Ok(Self::Bool(*i != 0)),
                Self::Real(r) => Ok(Self::Bool(*r != 0.0)),
                other => Err(format!("{other:?} is not BOOLEAN")),
            },
            DataType::Date => Ok(Self::Date(self.text_repr())),
        }
    }

    /// `>`/`<` comparisons, native to the cell's type; mixed-type
    /// comparisons are defined to be false rather than erroring.
    pub fn less_than(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a < b,
            (Self::Real(a), Self::Real(b)) => a < b,
            (Self::Int(a), Self::Real(b)) => (*a as f64) < *b,
            (Self::Real(a), Self::Int(b)) => *a < (*b as f64),
            (Self::Text(a), Self::Text(b)) | (Self::Date(a), Self::Date(b)) => a < b,
            _ => false,
        }
    }

    pub fn greater_than(&self, other: &Self) -> bool {
        other.less_than(self)
    }
}
