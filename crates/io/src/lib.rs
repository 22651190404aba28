//! Data sources and report exporters around the `tablemirror` engine.

pub mod csv_dir;
pub mod error;
pub mod export;
pub mod source;
pub mod sqlite;

pub use csv_dir::CsvDirSource;
pub use error::{ExportError, SourceError};
pub use source::DataSource;
pub use sqlite::SqliteSource;
