use std::path::PathBuf;

use thiserror::Error;

/// Failures reading a saved campaign export.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid campaign export {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
