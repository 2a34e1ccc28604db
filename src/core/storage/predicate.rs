//! Row-matching predicates shared by `WHERE` filtering in plain selects,
//! joins, and aggregation.

use crate::core::common::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Like,
}

impl CompareOp {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            _ if token.eq_ignore_ascii_case("LIKE") => Some(Self::Like),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self { column: column.into(), op, value }
    }

    /// Evaluates this predicate against a cell, following §4.1's operator
    /// semantics: `=` is textual equality, `LIKE` strips every `%` and
    /// checks substring containment, `!=`/`>`/`<`/`>=`/`<=` compare
    /// natively and fall back to `false` across mismatched types. A `Null`
    /// cell always fails, per ternary logic collapsing to false.
    pub fn matches_cell(&self, cell: &Value) -> bool {
        if cell.is_null() {
            return false;
        }
        match self.op {
            CompareOp::Eq => cell.text_repr() == self.value.text_repr(),
            CompareOp::Like => {
                let needle = self.value.text_repr().replace('%', "");
                cell.text_repr().contains(&needle)
            }
            CompareOp::Ne => match native_cmp(cell, &self.value) {
                Some(ord) => ord != std::cmp::Ordering::Equal,
                None => false,
            },
            CompareOp::Gt => native_cmp(cell, &self.value) == Some(std::cmp::Ordering::Greater),
            CompareOp::Lt => native_cmp(cell, &self.value) == Some(std::cmp::Ordering::Less),
            CompareOp::Ge => matches!(
                native_cmp(cell, &self.value),
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
            CompareOp::Le => matches!(
                native_cmp(cell, &self.value),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),
        }
    }
}

/// `Some` ordering only when both sides are natively comparable (numeric
/// cross-type, or same-variant text/date); `None` otherwise.
fn native_cmp(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Real(x), Value::Real(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Real(y)) => (*x as f64).partial_cmp(y),
        (Value::Real(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Text(x), Value::Text(y)) | (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_is_textual() {
        let p = Predicate::new("id", CompareOp::Eq, Value::Text("1".into()));
        assert!(p.matches_cell(&Value::Int(1)));
    }

    #[test]
    fn like_strips_percent_and_checks_substring() {
        let p = Predicate::new("name", CompareOp::Like, Value::Text("%bob%".into()));
        assert!(p.matches_cell(&Value::Text("bobby".into())));
        assert!(!p.matches_cell(&Value::Text("alice".into())));
    }

    #[test]
    fn null_cell_never_matches() {
        let p = Predicate::new("x", CompareOp::Ne, Value::Int(1));
        assert!(!p.matches_cell(&Value::Null));
    }

    #[test]
    fn mixed_type_ordering_is_false() {
        let p = Predicate::new("x", CompareOp::Gt, Value::Text("abc".into()));
        assert!(!p.matches_cell(&Value::Int(5)));
    }

    #[test]
    fn ge_and_le_include_equal() {
        assert!(Predicate::new("x", CompareOp::Ge, Value::Int(5)).matches_cell(&Value::Int(5)));
        assert!(Predicate::new("x", CompareOp::Le, Value::Int(5)).matches_cell(&Value::Int(5)));
    }
}
