//! `tablemirror`: two-table reconciliation engine.
//!
//! Pure engine crate: rows come in through a [`QueryExecutor`], diagnostics
//! come out as a [`MirrorReport`]. No database drivers or file formats here;
//! those live in `tablemirror-io`.

pub mod bucket;
pub mod config;
pub mod engine;
pub mod error;
pub mod isolate;
pub mod link;
pub mod normalize;
pub mod report;
pub mod row;
pub mod source;
pub mod value;

pub use config::MirrorConfig;
pub use engine::Mirror;
pub use error::MirrorError;
pub use link::{FieldLink, FilterClause, Side};
pub use normalize::{Normalizer, Pipeline, Step};
pub use report::{Diagnostic, DiagnosticKind, MirrorReport, MirrorSummary};
pub use row::{Row, RowSet};
pub use source::{MemorySource, QueryExecutor};
pub use value::{Value, ValueKind};
