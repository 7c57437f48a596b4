use thiserror::Error;

/// Core error type shared across sheetjitter crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The table has no header row or a data row disagrees with its width.
    #[error("malformed table: {0}")]
    MalformedTable(String),
}

/// Convenience alias for results returned by sheetjitter crates.
pub type Result<T> = std::result::Result<T, Error>;
