//! A single shape of index shared by the primary, unique, and secondary
//! flavors: a mapping from cell value to the set of row-ids holding it.
//!
//! Keys are stored as the value's textual representation
//! ([`Value::text_repr`]), matching the `=` operator's textual-equality
//! semantics so an index probe and a full scan never disagree on what
//! counts as a match.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::common::types::Value;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Index {
    entries: BTreeMap<String, BTreeSet<u64>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: &Value, row_id: u64) {
        if value.is_null() {
            return;
        }
        self.entries.entry(value.text_repr()).or_default().insert(row_id);
    }

    pub fn remove(&mut self, value: &Value, row_id: u64) {
        if value.is_null() {
            return;
        }
        let key = value.text_repr();
        if let Some(ids) = self.entries.get_mut(&key) {
            ids.remove(&row_id);
            if ids.is_empty() {
                self.entries.remove(&key);
            }
        }
    }

    pub fn get(&self, value: &Value) -> Option<&BTreeSet<u64>> {
        self.entries.get(&value.text_repr())
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.get(value).is_some_and(|ids| !ids.is_empty())
    }

    /// True when the key exists under a row-id other than `excluding`; used
    /// by unique-on-update pre-checks where the row's own prior value must
    /// not trip the constraint it already satisfies.
    pub fn contains_excluding(&self, value: &Value, excluding: u64) -> bool {
        self.get(value).is_some_and(|ids| ids.iter().any(|&id| id != excluding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_probe_roundtrip() {
        let mut idx = Index::new();
        idx.insert(&Value::Int(1), 7);
        assert!(idx.contains(&Value::Int(1)));
        assert_eq!(idx.get(&Value::Int(1)).unwrap(), &BTreeSet::from([7]));
    }

    #[test]
    fn null_values_are_never_indexed() {
        let mut idx = Index::new();
        idx.insert(&Value::Null, 1);
        assert!(!idx.contains(&Value::Null));
    }

    #[test]
    fn remove_drops_empty_buckets() {
        let mut idx = Index::new();
        idx.insert(&Value::Int(1), 7);
        idx.remove(&Value::Int(1), 7);
        assert!(idx.get(&Value::Int(1)).is_none());
    }

    #[test]
    fn contains_excluding_ignores_the_rows_own_entry() {
        let mut idx = Index::new();
        idx.insert(&Value::Text("a@x".into()), 2);
        assert!(!idx.contains_excluding(&Value::Text("a@x".into()), 2));
        assert!(idx.contains_excluding(&Value::Text("a@x".into()), 3));
    }

    #[test]
    fn text_repr_keying_unifies_int_and_text_equality() {
        let mut idx = Index::new();
        idx.insert(&Value::Int(1), 5);
        assert!(idx.contains(&Value::Text("1".into())));
    }
}
