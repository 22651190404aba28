use crate::bucket::{Bucket, Buckets};
use crate::link::{FieldLink, Side};
use crate::report::{Diagnostic, DiagnosticKind, DivergentBucket, Report};
use crate::value::Value;

pub const MSG_NOT_FOUND: &str = "Matching record not found";

pub fn message_value_mismatch(col_a: &str, col_b: &str) -> String {
    format!("Columns '{col_a}' and '{col_b}' values not match")
}

pub fn message_type_mismatch(col_a: &str, col_b: &str) -> String {
    format!("Columns '{col_a}' and '{col_b}' values are not of the same type")
}

/// Walk every bucket in order and record one diagnostic per detected issue.
///
/// Per bucket: a cardinality check, then (only when both sides have rows)
/// a value check and a type check for every link, comparing the first row
/// of each side. Returns the buckets that produced at least one diagnostic.
pub fn isolate_divergences(
    buckets: &mut Buckets,
    links: &[FieldLink],
    report: &mut Report,
) -> Vec<DivergentBucket> {
    let mut divergent = Vec::new();

    for bucket in buckets.iter_mut() {
        let before = report.len();
        check_bucket(bucket, links, report);

        if report.len() > before {
            let message = report.last().map(|d| d.message.clone()).unwrap_or_default();
            bucket.message = Some(message.clone());
            divergent.push(DivergentBucket {
                digest: bucket.digest.clone(),
                rows_a: bucket.rows_a.len(),
                rows_b: bucket.rows_b.len(),
                message,
            });
        }
    }

    divergent
}

fn check_bucket(bucket: &Bucket, links: &[FieldLink], report: &mut Report) {
    // Cardinality: missing counterpart or duplicates on one side
    if !bucket.is_balanced() {
        report.push(diagnostic(bucket, links, DiagnosticKind::MissingMatch, MSG_NOT_FOUND.into(), None));
    }

    let (Some(row_a), Some(row_b)) = (bucket.first(Side::A), bucket.first(Side::B)) else {
        return;
    };

    for link in links {
        let raw_a = row_a.get(link.col_a()).unwrap_or(&Value::Null);
        let raw_b = row_b.get(link.col_b()).unwrap_or(&Value::Null);

        let norm_a = link.normalize_value(Side::A, raw_a);
        let norm_b = link.normalize_value(Side::B, raw_b);
        if norm_a != norm_b {
            report.push(diagnostic(
                bucket,
                links,
                DiagnosticKind::ValueMismatch,
                message_value_mismatch(link.col_a(), link.col_b()),
                Some(link),
            ));
        }

        if raw_a.kind() != raw_b.kind() {
            report.push(diagnostic(
                bucket,
                links,
                DiagnosticKind::TypeMismatch,
                message_type_mismatch(link.col_a(), link.col_b()),
                Some(link),
            ));
        }
    }
}

fn diagnostic(
    bucket: &Bucket,
    links: &[FieldLink],
    kind: DiagnosticKind,
    message: String,
    link: Option<&FieldLink>,
) -> Diagnostic {
    let raw = |side: Side| -> Option<Value> {
        let link = link?;
        let row = bucket.first(side)?;
        Some(row.get(link.column(side)).cloned().unwrap_or(Value::Null))
    };

    Diagnostic {
        kind,
        message,
        value_a: raw(Side::A),
        value_b: raw(Side::B),
        link: link.map(FieldLink::columns),
        identity_a: identity_values(bucket, links, Side::A),
        identity_b: identity_values(bucket, links, Side::B),
        digest: bucket.digest.clone(),
        rows_a: bucket.rows_a.len(),
        rows_b: bucket.rows_b.len(),
    }
}

/// Identity values of the first row on `side`; empty when the side has no rows.
fn identity_values(bucket: &Bucket, links: &[FieldLink], side: Side) -> Vec<Value> {
    let Some(row) = bucket.first(side) else {
        return Vec::new();
    };
    links
        .iter()
        .filter(|l| l.is_identity())
        .map(|l| row.get(l.column(side)).cloned().unwrap_or(Value::Null))
        .collect()
}
