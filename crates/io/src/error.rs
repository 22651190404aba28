use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("no such table: {0}")]
    UnknownTable(String),

    #[error("no such column: {table}.{column}")]
    UnknownColumn { table: String, column: String },

    #[error("{0}")]
    Shape(#[from] tablemirror::MirrorError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
