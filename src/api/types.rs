//! Public result type returned by [`crate::api::Connection::execute`].

pub use crate::core::query::executor::QueryResult;
