//! Error taxonomy for the analytics pipeline.
//!
//! Fatal errors (a source database we cannot build a model from) live here.
//! Row-level problems are not errors: malformed contact entries and dangling
//! message references are skipped and counted by the components that see them.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("message store not found at {path}")]
    StoreMissing { path: PathBuf },

    #[error("failed to open message store at {path}")]
    StoreUnreadable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{path} does not look like a message store: missing table '{table}'")]
    SchemaMismatch { path: PathBuf, table: String },

    #[error("message store query failed")]
    Query(#[from] rusqlite::Error),

    #[error("failed to write transcript for chat '{chat}'")]
    WriteFailed {
        chat: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
