// CSV-directory query executor: table `t` is the file `<dir>/t.csv`.
// Every field loads as text; filters compare against the value's canonical string.

use std::io::Read;
use std::path::{Path, PathBuf};

use tablemirror::{FilterClause, QueryExecutor, RowSet, Value};

use crate::error::SourceError;

pub struct CsvDirSource {
    dir: PathBuf,
    delimiter: u8,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }
}

/// Read file and convert to UTF-8, falling back to Windows-1252.
pub fn read_file_as_utf8(path: &Path) -> Result<String, SourceError> {
    let read_err = |e: std::io::Error| SourceError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

impl QueryExecutor for CsvDirSource {
    type Error = SourceError;

    fn select(&self, table: &str, filter: &[FilterClause]) -> Result<RowSet, SourceError> {
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(SourceError::UnknownTable(path.display().to_string()));
        }
        let content = read_file_as_utf8(&path)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        // (column index, expected text) per filter clause
        let mut conditions = Vec::with_capacity(filter.len());
        for clause in filter {
            let idx = headers.iter().position(|h| *h == clause.column).ok_or_else(|| {
                SourceError::UnknownColumn {
                    table: table.to_string(),
                    column: clause.column.clone(),
                }
            })?;
            conditions.push((idx, clause.value.to_string()));
        }

        let mut set = RowSet::new(headers);
        for result in reader.records() {
            let record = result?;
            if !conditions
                .iter()
                .all(|(idx, expected)| record.get(*idx) == Some(expected.as_str()))
            {
                continue;
            }
            set.push(record.iter().map(Value::from).collect())?;
        }
        log::debug!("csv: {} row(s) from {}", set.len(), path.display());
        Ok(set)
    }
}
