use crate::bucket::Buckets;
use crate::error::MirrorError;
use crate::isolate::isolate_divergences;
use crate::link::{filter_clauses, identity_columns, FieldLink, Side};
use crate::report::{compute_summary, MirrorMeta, MirrorReport, Report};
use crate::row::RowSet;
use crate::source::QueryExecutor;

/// A configured reconciliation between two tables.
///
/// Holds only the link configuration; every run builds its own buckets and
/// report, so one `Mirror` can be run repeatedly.
#[derive(Debug, Clone)]
pub struct Mirror {
    name: String,
    links: Vec<FieldLink>,
}

impl Mirror {
    pub fn new(name: impl Into<String>, links: Vec<FieldLink>) -> Result<Self, MirrorError> {
        for link in &links {
            link.validate()?;
        }
        if !links.iter().any(FieldLink::is_identity) {
            log::warn!("no identity links: every row will share a single bucket");
        }
        Ok(Self {
            name: name.into(),
            links,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn links(&self) -> &[FieldLink] {
        &self.links
    }

    /// Load both tables, then compare them. Fails without producing a diff
    /// if either load fails.
    pub fn run_diff<A, B>(
        &self,
        source_a: &A,
        table_a: &str,
        source_b: &B,
        table_b: &str,
    ) -> Result<MirrorReport, MirrorError>
    where
        A: QueryExecutor + ?Sized,
        B: QueryExecutor + ?Sized,
    {
        log::info!("loading data...");
        let rows_a = self.load(source_a, table_a, Side::A)?;
        let rows_b = self.load(source_b, table_b, Side::B)?;
        self.compare(rows_a, rows_b)
    }

    /// Bucket and isolate two already-loaded row sets.
    pub fn compare(&self, rows_a: RowSet, rows_b: RowSet) -> Result<MirrorReport, MirrorError> {
        self.check_columns(&rows_a, Side::A)?;
        self.check_columns(&rows_b, Side::B)?;

        let (count_a, count_b) = (rows_a.len(), rows_b.len());

        log::info!("sorting data...");
        let mut buckets = Buckets::new();
        buckets.sort_in(rows_a.into_rows(), &self.links, Side::A);
        buckets.sort_in(rows_b.into_rows(), &self.links, Side::B);
        log::debug!("{} bucket(s) from {count_a} + {count_b} row(s)", buckets.len());

        log::info!("isolating divergences...");
        let mut report = Report::new();
        let divergent = isolate_divergences(&mut buckets, &self.links, &mut report);
        let summary = compute_summary(count_a, count_b, buckets.len(), &report, &divergent);
        log::info!("finished: {} diagnostic(s)", report.len());

        Ok(MirrorReport {
            meta: MirrorMeta {
                name: self.name.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                identity_columns_a: identity_columns(&self.links, Side::A),
                identity_columns_b: identity_columns(&self.links, Side::B),
            },
            summary,
            diagnostics: report.into_entries(),
            divergent,
        })
    }

    fn load<E>(&self, source: &E, table: &str, side: Side) -> Result<RowSet, MirrorError>
    where
        E: QueryExecutor + ?Sized,
    {
        let filter = filter_clauses(&self.links, side);
        log::debug!("dataset {side}: loading '{table}' with {} filter clause(s)", filter.len());
        let rows = source
            .select(table, &filter)
            .map_err(|e| MirrorError::source_failed(side, e))?;
        log::debug!("dataset {side}: {} row(s)", rows.len());
        Ok(rows)
    }

    /// Every linked column must exist in the result set.
    fn check_columns(&self, rows: &RowSet, side: Side) -> Result<(), MirrorError> {
        // An empty result from a source that reports no columns cannot be checked
        if rows.is_empty() && rows.columns().is_empty() {
            return Ok(());
        }
        for link in &self.links {
            let column = link.column(side);
            if !rows.has_column(column) {
                return Err(MirrorError::MissingColumn {
                    side,
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}
