use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store document is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Store document at {0} is not a JSON object")]
    NotAnObject(PathBuf),
}
