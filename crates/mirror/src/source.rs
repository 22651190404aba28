//! The query executor contract consumed by the engine.
//!
//! Executors return a fully materialized [`RowSet`] for
//! `SELECT * FROM <table> [WHERE c1 = ? AND c2 = ? ...]`. Filter values are
//! always passed separately from the table/column identifiers so executors
//! can bind them as parameters.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::link::FilterClause;
use crate::row::RowSet;

pub trait QueryExecutor {
    type Error: fmt::Display;

    fn select(&self, table: &str, filter: &[FilterClause]) -> Result<RowSet, Self::Error>;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    type Error = T::Error;

    fn select(&self, table: &str, filter: &[FilterClause]) -> Result<RowSet, Self::Error> {
        (**self).select(table, filter)
    }
}

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

/// Tables held in memory. Filtering compares values structurally.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, RowSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemorySourceError {
    #[error("no such table: {0}")]
    UnknownTable(String),
    #[error("no such column: {table}.{column}")]
    UnknownColumn { table: String, column: String },
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: impl Into<String>, rows: RowSet) {
        self.tables.insert(table.into(), rows);
    }

    pub fn with_table(mut self, table: impl Into<String>, rows: RowSet) -> Self {
        self.insert(table, rows);
        self
    }
}

impl QueryExecutor for MemorySource {
    type Error = MemorySourceError;

    fn select(&self, table: &str, filter: &[FilterClause]) -> Result<RowSet, Self::Error> {
        let source = self
            .tables
            .get(table)
            .ok_or_else(|| MemorySourceError::UnknownTable(table.to_string()))?;

        if let Some(clause) = filter.iter().find(|c| !source.has_column(&c.column)) {
            return Err(MemorySourceError::UnknownColumn {
                table: table.to_string(),
                column: clause.column.clone(),
            });
        }

        let mut rows = source.clone();
        rows.retain(|row| {
            filter
                .iter()
                .all(|c| row.get(&c.column).is_some_and(|v| *v == c.value))
        });
        Ok(rows)
    }
}
