//! Identity hashing and bucketing.
//!
//! Every row is keyed by the SHA-256 of its identity values: the canonical
//! strings of the identity columns, concatenated in link order and encoded
//! as Windows-1252. Rows from both datasets that share a digest land in the
//! same [`Bucket`].

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest as _, Sha256};

use crate::link::{FieldLink, Side};
use crate::row::Row;
use crate::value::Value;

/// Lowercase hex SHA-256 of a row's identity encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_hex(hex: &str) -> Self {
        Self(hex.to_string())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Windows-1252 bytes of `text`. Characters outside the codepage become
/// `&#NNNN;` references.
pub fn encode_legacy(text: &str) -> Vec<u8> {
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
    bytes.into_owned()
}

/// Digest of the identity values of `row`, read from each identity link's
/// column on `side`. A missing column hashes like `Null`.
pub fn identity_digest(row: &Row, links: &[FieldLink], side: Side) -> Digest {
    let mut hasher = Sha256::new();
    for link in links.iter().filter(|l| l.is_identity()) {
        let value = row.get(link.column(side)).unwrap_or(&Value::Null);
        hasher.update(encode_legacy(&value.to_string()));
    }
    Digest(hex(&hasher.finalize()))
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Rows from both datasets sharing one identity digest.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub digest: Digest,
    pub rows_a: Vec<Row>,
    pub rows_b: Vec<Row>,
    /// Last diagnostic message recorded for this bucket, if any.
    pub message: Option<String>,
}

impl Bucket {
    fn new(digest: Digest) -> Self {
        Self {
            digest,
            rows_a: Vec::new(),
            rows_b: Vec::new(),
            message: None,
        }
    }

    pub fn rows(&self, side: Side) -> &[Row] {
        match side {
            Side::A => &self.rows_a,
            Side::B => &self.rows_b,
        }
    }

    /// First row of `side`, the one compared by the per-link checks.
    pub fn first(&self, side: Side) -> Option<&Row> {
        self.rows(side).first()
    }

    pub fn is_balanced(&self) -> bool {
        self.rows_a.len() == self.rows_b.len()
    }
}

/// Buckets in first-insertion order, indexed by digest.
#[derive(Debug, Default)]
pub struct Buckets {
    order: Vec<Bucket>,
    index: HashMap<Digest, usize>,
}

impl Buckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash and insert every row of one dataset, preserving input order.
    pub fn sort_in(&mut self, rows: impl IntoIterator<Item = Row>, links: &[FieldLink], side: Side) {
        for row in rows {
            let digest = identity_digest(&row, links, side);
            self.add(digest, row, side);
        }
    }

    pub fn add(&mut self, digest: Digest, row: Row, side: Side) {
        let idx = match self.index.get(&digest) {
            Some(&idx) => idx,
            None => {
                let idx = self.order.len();
                self.index.insert(digest.clone(), idx);
                self.order.push(Bucket::new(digest));
                idx
            }
        };
        let bucket = &mut self.order[idx];
        match side {
            Side::A => bucket.rows_a.push(row),
            Side::B => bucket.rows_b.push(row),
        }
    }

    pub fn get(&self, digest: &Digest) -> Option<&Bucket> {
        self.index.get(digest).map(|&i| &self.order[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bucket> {
        self.order.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Bucket> {
        self.order.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
