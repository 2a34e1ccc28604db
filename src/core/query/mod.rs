pub mod aggregate;
pub mod executor;
pub mod join;
pub mod sql;

pub use executor::Database;
