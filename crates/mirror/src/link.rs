use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::MirrorError;
use crate::normalize::{identity, Normalizer, SharedNormalizer};
use crate::value::Value;

/// Which of the two datasets a row, column, or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// How one column of dataset A corresponds to one column of dataset B.
#[derive(Clone)]
pub struct FieldLink {
    col_a: String,
    col_b: String,
    normalize_a: SharedNormalizer,
    normalize_b: SharedNormalizer,
    filter: Option<(Value, Value)>,
    identity: bool,
}

impl FieldLink {
    pub fn new(col_a: impl Into<String>, col_b: impl Into<String>) -> Self {
        Self {
            col_a: col_a.into(),
            col_b: col_b.into(),
            normalize_a: identity(),
            normalize_b: identity(),
            filter: None,
            identity: false,
        }
    }

    /// Mark this link as part of the record identity.
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Restrict both loads to rows where this column equals the given value.
    pub fn filter(mut self, value_a: impl Into<Value>, value_b: impl Into<Value>) -> Self {
        self.filter = Some((value_a.into(), value_b.into()));
        self
    }

    pub fn normalize_a(mut self, n: impl Normalizer + 'static) -> Self {
        self.normalize_a = Arc::new(n);
        self
    }

    pub fn normalize_b(mut self, n: impl Normalizer + 'static) -> Self {
        self.normalize_b = Arc::new(n);
        self
    }

    /// Same normalizer on both sides.
    pub fn normalize(mut self, n: impl Normalizer + 'static) -> Self {
        let shared: SharedNormalizer = Arc::new(n);
        self.normalize_a = Arc::clone(&shared);
        self.normalize_b = shared;
        self
    }

    pub fn col_a(&self) -> &str {
        &self.col_a
    }

    pub fn col_b(&self) -> &str {
        &self.col_b
    }

    pub fn column(&self, side: Side) -> &str {
        match side {
            Side::A => &self.col_a,
            Side::B => &self.col_b,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn is_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn filter_value(&self, side: Side) -> Option<&Value> {
        self.filter.as_ref().map(|(a, b)| match side {
            Side::A => a,
            Side::B => b,
        })
    }

    pub fn normalize_value(&self, side: Side, value: &Value) -> Value {
        match side {
            Side::A => self.normalize_a.normalize(value),
            Side::B => self.normalize_b.normalize(value),
        }
    }

    /// Column names for reporting.
    pub fn columns(&self) -> LinkColumns {
        LinkColumns {
            col_a: self.col_a.clone(),
            col_b: self.col_b.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), MirrorError> {
        if self.col_a.trim().is_empty() || self.col_b.trim().is_empty() {
            return Err(MirrorError::InvalidConfiguration(format!(
                "link '{}' <-> '{}': column names must not be empty",
                self.col_a, self.col_b
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for FieldLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldLink")
            .field("col_a", &self.col_a)
            .field("col_b", &self.col_b)
            .field("filter", &self.filter)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// The pair of column names a diagnostic refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkColumns {
    pub col_a: String,
    pub col_b: String,
}

// ---------------------------------------------------------------------------
// Filter clauses
// ---------------------------------------------------------------------------

/// One `column = value` condition. Executors bind `value` as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub column: String,
    pub value: Value,
}

/// Conjunction of the filter conditions declared for one side, in link order.
/// Empty when no link declares a filter.
pub fn filter_clauses(links: &[FieldLink], side: Side) -> Vec<FilterClause> {
    links
        .iter()
        .filter_map(|link| {
            link.filter_value(side).map(|value| FilterClause {
                column: link.column(side).to_string(),
                value: value.clone(),
            })
        })
        .collect()
}

/// Identity columns for one side, in link order.
pub fn identity_columns(links: &[FieldLink], side: Side) -> Vec<String> {
    links
        .iter()
        .filter(|l| l.is_identity())
        .map(|l| l.column(side).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{Pipeline, Step};

    #[test]
    fn defaults_are_plain_value_links() {
        let link = FieldLink::new("amount", "total");
        assert!(!link.is_identity());
        assert!(!link.is_filter());
        assert_eq!(link.column(Side::B), "total");
        assert_eq!(
            link.normalize_value(Side::A, &Value::text(" x ")),
            Value::text(" x ")
        );
    }

    #[test]
    fn filter_clauses_are_side_specific() {
        let links = vec![
            FieldLink::new("id", "client_id").identity(),
            FieldLink::new("status", "state").filter("active", "A"),
            FieldLink::new("region", "zone").filter("eu", "EU"),
        ];
        let a = filter_clauses(&links, Side::A);
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].column, "status");
        assert_eq!(a[0].value, Value::text("active"));
        assert_eq!(a[1].column, "region");

        let b = filter_clauses(&links, Side::B);
        assert_eq!(b[0].column, "state");
        assert_eq!(b[0].value, Value::text("A"));
        assert_eq!(b[1].value, Value::text("EU"));
    }

    #[test]
    fn no_filter_links_means_no_clauses() {
        let links = vec![FieldLink::new("id", "id").identity()];
        assert!(filter_clauses(&links, Side::A).is_empty());
        assert_eq!(identity_columns(&links, Side::B), vec!["id".to_string()]);
    }

    #[test]
    fn side_specific_normalizers() {
        let link = FieldLink::new("name", "name")
            .normalize_a(Pipeline::new(vec![Step::Trim]))
            .normalize_b(Step::Uppercase);
        assert_eq!(link.normalize_value(Side::A, &Value::text(" a ")), Value::text("a"));
        assert_eq!(link.normalize_value(Side::B, &Value::text("a")), Value::text("A"));
    }

    #[test]
    fn empty_column_names_are_rejected() {
        let err = FieldLink::new("", "id").validate().unwrap_err();
        assert!(matches!(err, MirrorError::InvalidConfiguration(_)));
    }
}
