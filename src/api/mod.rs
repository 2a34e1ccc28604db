pub mod connection;
pub mod types;

pub use connection::Connection;
pub use types::QueryResult;
