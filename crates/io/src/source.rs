use std::path::Path;

use tablemirror::config::{SourceConfig, SourceKind};
use tablemirror::{FilterClause, QueryExecutor, RowSet};

use crate::csv_dir::CsvDirSource;
use crate::error::SourceError;
use crate::sqlite::SqliteSource;

/// A configured data source of either kind.
pub enum DataSource {
    Sqlite(SqliteSource),
    Csv(CsvDirSource),
}

impl DataSource {
    /// Open the source described by `config`. Relative paths resolve
    /// against `base_dir` (the config file's directory).
    pub fn open(config: &SourceConfig, base_dir: &Path) -> Result<Self, SourceError> {
        let path = base_dir.join(&config.path);
        log::debug!("opening {} source {}", config.kind, path.display());
        match config.kind {
            SourceKind::Sqlite => {
                let source = SqliteSource::open(&path)?;
                if let Some(ms) = config.busy_timeout_ms {
                    source.set_busy_timeout(ms)?;
                }
                Ok(Self::Sqlite(source))
            }
            SourceKind::Csv => {
                if !path.is_dir() {
                    return Err(SourceError::Read {
                        path,
                        message: "not a directory".into(),
                    });
                }
                Ok(Self::Csv(CsvDirSource::new(path)))
            }
        }
    }
}

impl QueryExecutor for DataSource {
    type Error = SourceError;

    fn select(&self, table: &str, filter: &[FilterClause]) -> Result<RowSet, SourceError> {
        match self {
            Self::Sqlite(s) => s.select(table, filter),
            Self::Csv(s) => s.select(table, filter),
        }
    }
}
