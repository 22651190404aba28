use std::fmt;

use serde::Serialize;

use crate::bucket::Digest;
use crate::link::LinkColumns;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Bucket holds a different number of rows on each side.
    MissingMatch,
    /// Normalized values of a link differ.
    ValueMismatch,
    /// Raw values of a link have different data types.
    TypeMismatch,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMatch => write!(f, "missing_match"),
            Self::ValueMismatch => write!(f, "value_mismatch"),
            Self::TypeMismatch => write!(f, "type_mismatch"),
        }
    }
}

/// One detected divergence, with enough context to find the rows again.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Raw side-A value of the link; `None` for cardinality diagnostics.
    pub value_a: Option<Value>,
    pub value_b: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkColumns>,
    /// Identity values of the first side-A row, empty when side A has no rows.
    pub identity_a: Vec<Value>,
    pub identity_b: Vec<Value>,
    pub digest: Digest,
    pub rows_a: usize,
    pub rows_b: usize,
}

/// Accumulates diagnostics in detection order. No deduplication.
#[derive(Debug, Default)]
pub struct Report {
    entries: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("{}: {} [{}]", diagnostic.kind, diagnostic.message, diagnostic.digest);
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Diagnostic> {
        self.entries.last()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

/// A bucket that produced at least one diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct DivergentBucket {
    pub digest: Digest,
    pub rows_a: usize,
    pub rows_b: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MirrorSummary {
    pub rows_a: usize,
    pub rows_b: usize,
    pub buckets: usize,
    pub matched: usize,
    pub divergent: usize,
    pub missing_matches: usize,
    pub value_mismatches: usize,
    pub type_mismatches: usize,
}

impl MirrorSummary {
    pub fn has_divergences(&self) -> bool {
        self.divergent > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MirrorMeta {
    pub name: String,
    pub engine_version: String,
    pub run_at: String,
    pub identity_columns_a: Vec<String>,
    pub identity_columns_b: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MirrorReport {
    pub meta: MirrorMeta,
    pub summary: MirrorSummary,
    pub diagnostics: Vec<Diagnostic>,
    pub divergent: Vec<DivergentBucket>,
}

impl MirrorReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Compute summary statistics for one run.
pub fn compute_summary(
    rows_a: usize,
    rows_b: usize,
    buckets: usize,
    report: &Report,
    divergent: &[DivergentBucket],
) -> MirrorSummary {
    MirrorSummary {
        rows_a,
        rows_b,
        buckets,
        matched: buckets - divergent.len(),
        divergent: divergent.len(),
        missing_matches: report.count(DiagnosticKind::MissingMatch),
        value_mismatches: report.count(DiagnosticKind::ValueMismatch),
        type_mismatches: report.count(DiagnosticKind::TypeMismatch),
    }
}
