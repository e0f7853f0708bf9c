//! Read-only SQLite access to the msgstore.db message store.

pub mod connection;
pub mod queries;
pub mod rows;

pub use connection::open_store;
pub use rows::{fetch_all, ChatRow, JidRow, MessageRow, RawTables};
