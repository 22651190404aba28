use std::sync::Arc;

use crate::error::MirrorError;
use crate::value::Value;

/// One record: an ordered mapping from column name to value.
///
/// Rows of the same result set share their column list.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }
}

/// A fully materialized query result.
#[derive(Debug, Clone)]
pub struct RowSet {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; `values` must line up with the column list.
    pub fn push(&mut self, values: Vec<Value>) -> Result<(), MirrorError> {
        if values.len() != self.columns.len() {
            return Err(MirrorError::RowShape {
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        self.rows.push(Row {
            columns: Arc::clone(&self.columns),
            values,
        });
        Ok(())
    }

    pub fn with_row(mut self, values: Vec<Value>) -> Result<Self, MirrorError> {
        self.push(values)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Keep only rows for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Row) -> bool) {
        self.rows.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_column_name() {
        let set = RowSet::new(["id", "name"])
            .with_row(vec![Value::Integer(1), Value::text("Ada")])
            .unwrap();
        let row = &set.rows()[0];
        assert_eq!(row.get("name"), Some(&Value::text("Ada")));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.iter().count(), 2);
    }

    #[test]
    fn rejects_misaligned_rows() {
        let mut set = RowSet::new(["id", "name"]);
        let err = set.push(vec![Value::Integer(1)]).unwrap_err();
        assert!(err.to_string().contains("expected 2"));
        assert!(set.is_empty());
    }
}
