//! Row storage: tables, their indexes, and the predicates used to filter them.

pub mod index;
pub mod predicate;
pub mod table;

pub use index::Index;
pub use predicate::{CompareOp, Predicate};
pub use table::Table;
