//! Key-value snapshot store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {data_dir}: {source}")]
    Io { data_dir: String, #[source] source: std::io::Error },
}
