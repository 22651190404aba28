use thiserror::Error;

use crate::link::Side;

#[derive(Debug, Error)]
pub enum MirrorError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Bad link, normalizer, or source declaration. Raised before any query runs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Query executor failure for one side. The run is aborted.
    #[error("dataset {side}: {message}")]
    Source { side: Side, message: String },

    /// A linked column is absent from a loaded result set.
    #[error("dataset {side}: missing column '{column}'")]
    MissingColumn { side: Side, column: String },

    /// A row whose value count does not match its column list.
    #[error("row has {found} value(s), expected {expected}")]
    RowShape { expected: usize, found: usize },

    /// IO error (report write, file read, etc.).
    #[error("IO error: {0}")]
    Io(String),
}

impl MirrorError {
    pub fn source_failed(side: Side, err: impl std::fmt::Display) -> Self {
        Self::Source {
            side,
            message: err.to_string(),
        }
    }
}
