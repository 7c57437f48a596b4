use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by the randomizer.
#[derive(Debug, Error)]
pub enum RandomizeError {
    #[error(transparent)]
    Table(#[from] sheetjitter_core::Error),
    #[error("store access failed: {0}")]
    StoreAccess(#[from] StoreError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Failures reading from or writing to a table store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
