use std::path::Path;
use std::sync::Arc;
use tracing::trace;

use super::matcher::SubstringMatcher;
use crate::errors::ScanError;
use crate::metrics::ScanMetrics;
use crate::patterns::PatternTable;
use crate::results::{FileReport, Verdict};

/// Classifies one content buffer against the table.
///
/// Rules are evaluated in table order (priority descending) and the
/// first hit wins; later rules are never evaluated. Returns
/// `Verdict::Unknown` when nothing matches.
pub fn classify(
    content: &[u8],
    table: &PatternTable,
    matcher: &dyn SubstringMatcher,
) -> Verdict {
    for record in table.records() {
        if matcher.contains(content, record.pattern.as_bytes()) {
            return Verdict::Known(record.label.clone());
        }
    }
    Verdict::Unknown
}

/// Runs the per-file pipeline: load content, classify, report.
///
/// Holds the shared read-only pieces of a scan (table, matcher,
/// metrics); one instance serves every worker.
pub struct FileProcessor<'a> {
    table: &'a PatternTable,
    matcher: Box<dyn SubstringMatcher>,
    metrics: Arc<ScanMetrics>,
}

impl<'a> FileProcessor<'a> {
    pub fn new(table: &'a PatternTable, matcher: Box<dyn SubstringMatcher>) -> Self {
        Self::with_metrics(table, matcher, Arc::new(ScanMetrics::new()))
    }

    pub fn with_metrics(
        table: &'a PatternTable,
        matcher: Box<dyn SubstringMatcher>,
        metrics: Arc<ScanMetrics>,
    ) -> Self {
        Self {
            table,
            matcher,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<ScanMetrics> {
        &self.metrics
    }

    /// Classifies an already-loaded buffer
    pub fn process_buffer(&self, file_name: &str, content: &[u8]) -> FileReport {
        self.metrics.record_file_scanned(content.len() as u64);
        let verdict = classify(content, self.table, self.matcher.as_ref());
        FileReport::classified(file_name, verdict)
    }

    /// Loads `path` and classifies it. A read failure becomes an
    /// error-bearing report for this file only; it never aborts the
    /// surrounding scan.
    pub fn process_file(&self, file_name: &str, path: &Path) -> FileReport {
        trace!("Processing file: {}", path.display());

        match std::fs::read(path) {
            Ok(content) => self.process_buffer(file_name, &content),
            Err(e) => FileReport::read_failed(file_name, ScanError::from_read_error(path, e)),
        }
    }
}
