use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use super::matcher::MatcherKind;
use super::processor::FileProcessor;
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::patterns::PatternTable;
use crate::results::ScanSummary;

/// A named content buffer awaiting classification
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub content: Vec<u8>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Classifies every regular file directly under `config.root_path`.
///
/// Work is fanned out one task per file onto a pool bounded by
/// `config.thread_count`; an unbounded thread-per-file policy would
/// exhaust resources on large directories. Each task loads its own
/// content, so no mutable state is shared between tasks; the table and
/// matcher are shared read-only. `collect` on the parallel iterator is
/// the join barrier, so no partial result is ever observable.
///
/// Reports are sorted by file name before return. Worker completion
/// order is nondeterministic; the sort makes the output deterministic.
pub fn scan(config: &ScanConfig, table: &PatternTable) -> ScanResult<ScanSummary> {
    info!(
        "Starting scan of {} with {} patterns ({:?})",
        config.root_path.display(),
        table.len(),
        config.algorithm
    );

    let files = list_files(config)?;
    debug!("Found {} files to classify", files.len());

    let metrics = Arc::new(ScanMetrics::new());
    let processor = FileProcessor::with_metrics(
        table,
        config.algorithm.build(metrics.clone()),
        metrics.clone(),
    );

    let reports: Vec<_> = worker_pool(config.thread_count)?.install(|| {
        files
            .par_iter()
            .map(|(name, path)| processor.process_file(name, path))
            .collect()
    });

    let mut summary = ScanSummary::new();
    for report in reports {
        summary.add_report(report);
    }
    summary.reports.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    metrics.log_stats();
    info!(
        "Scan complete: {} matched, {} unknown, {} failed",
        summary.files_matched, summary.files_unknown, summary.files_failed
    );

    Ok(summary)
}

/// Classifies pre-loaded buffers on a pool bounded by `thread_count`.
///
/// Same guarantees as [`scan`]: one report per entry, read-only shared
/// table and matcher, reports sorted by name.
pub fn scan_buffers(
    entries: &[FileEntry],
    table: &PatternTable,
    algorithm: MatcherKind,
    thread_count: NonZeroUsize,
) -> ScanResult<ScanSummary> {
    let metrics = Arc::new(ScanMetrics::new());
    let processor =
        FileProcessor::with_metrics(table, algorithm.build(metrics.clone()), metrics.clone());

    let reports: Vec<_> = worker_pool(thread_count)?.install(|| {
        entries
            .par_iter()
            .map(|entry| processor.process_buffer(&entry.name, &entry.content))
            .collect()
    });

    let mut summary = ScanSummary::new();
    for report in reports {
        summary.add_report(report);
    }
    summary.reports.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(summary)
}

fn worker_pool(thread_count: NonZeroUsize) -> ScanResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count.get())
        .build()
        .map_err(|e| ScanError::config_error(format!("failed to build worker pool: {e}")))
}

/// Lists regular files directly under the root, non-recursive
fn list_files(config: &ScanConfig) -> ScanResult<Vec<(String, PathBuf)>> {
    let root = &config.root_path;
    if !root.is_dir() {
        return Err(ScanError::not_a_directory(root.clone()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(root).map_err(|e| ScanError::from_read_error(root, e))? {
        let entry = entry.map_err(ScanError::IoError)?;
        let file_type = entry.file_type().map_err(ScanError::IoError)?;
        if !file_type.is_file() {
            continue;
        }
        files.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternRecord;
    use crate::results::{FileOutcome, Verdict};
    use tempfile::tempdir;

    fn table() -> PatternTable {
        PatternTable::from_records(vec![
            PatternRecord::new(2, "PK", "ZIP archive"),
            PatternRecord::new(1, "%PDF-", "PDF document"),
        ])
        .unwrap()
    }

    fn threads(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.zip"), b"PK\x03\x04").unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("c.txt"), b"nothing here").unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        std::fs::write(dir.path().join("subdir/skipped.zip"), b"PK").unwrap();

        let config = ScanConfig {
            root_path: dir.path().to_path_buf(),
            thread_count: threads(2),
            ..Default::default()
        };
        let summary = scan(&config, &table()).unwrap();

        // Non-recursive: the subdirectory's contents are not scanned
        assert_eq!(summary.files_scanned(), 3);
        assert_eq!(summary.files_matched, 2);
        assert_eq!(summary.files_unknown, 1);

        let names: Vec<&str> = summary
            .reports
            .iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.zip", "b.pdf", "c.txt"]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let config = ScanConfig {
            root_path: PathBuf::from("/definitely/not/here"),
            ..Default::default()
        };
        assert!(matches!(
            scan(&config, &table()),
            Err(ScanError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_scan_buffers_completeness_at_any_concurrency() {
        let entries: Vec<FileEntry> = (0..16)
            .map(|i| {
                let content = if i % 2 == 0 { &b"PK\x03\x04"[..] } else { &b"plain"[..] };
                FileEntry::new(format!("file{i:02}"), content)
            })
            .collect();
        let table = table();

        for concurrency in [1, 8, 16] {
            let summary =
                scan_buffers(&entries, &table, MatcherKind::Kmp, threads(concurrency)).unwrap();
            assert_eq!(summary.files_scanned(), 16);
            assert_eq!(summary.files_matched, 8);
            assert_eq!(summary.files_unknown, 8);

            // Every input name appears exactly once, in sorted order
            let names: Vec<&str> = summary
                .reports
                .iter()
                .map(|r| r.file_name.as_str())
                .collect();
            let mut expected: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
            expected.sort();
            assert_eq!(names, expected);
        }
    }

    #[test]
    fn test_both_algorithms_agree_on_summary() {
        let entries = vec![
            FileEntry::new("zip", &b"leading bytes PK\x03\x04 trailing"[..]),
            FileEntry::new("pdf", &b"%PDF-1.7"[..]),
            FileEntry::new("none", &b"aaaaaaaaaaaaaaaa"[..]),
        ];
        let table = table();

        let kmp = scan_buffers(&entries, &table, MatcherKind::Kmp, threads(3)).unwrap();
        let rk = scan_buffers(&entries, &table, MatcherKind::RabinKarp, threads(3)).unwrap();

        for (a, b) in kmp.reports.iter().zip(rk.reports.iter()) {
            assert_eq!(a.file_name, b.file_name);
            match (&a.outcome, &b.outcome) {
                (FileOutcome::Classified(va), FileOutcome::Classified(vb)) => assert_eq!(va, vb),
                other => panic!("unexpected outcomes: {other:?}"),
            }
        }
    }

    #[test]
    fn test_unreadable_file_does_not_poison_scan() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("good.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("other.txt"), b"text").unwrap();

        let config = ScanConfig {
            root_path: dir.path().to_path_buf(),
            thread_count: threads(2),
            ..Default::default()
        };

        // Race with deletion: the file is listed, then removed before
        // its task loads it
        let doomed = dir.path().join("doomed.bin");
        std::fs::write(&doomed, b"PK").unwrap();
        let files = list_files(&config).unwrap();
        assert_eq!(files.len(), 3);
        std::fs::remove_file(&doomed).unwrap();

        let table = table();
        let metrics = Arc::new(ScanMetrics::new());
        let processor = FileProcessor::with_metrics(
            &table,
            MatcherKind::Kmp.build(metrics.clone()),
            metrics,
        );
        let mut summary = ScanSummary::new();
        for (name, path) in &files {
            summary.add_report(processor.process_file(name, path));
        }

        assert_eq!(summary.files_scanned(), 3);
        assert_eq!(summary.files_failed, 1);
        assert_eq!(summary.files_matched, 1);
        let failed = summary
            .reports
            .iter()
            .find(|r| r.file_name == "doomed.bin")
            .unwrap();
        assert!(matches!(
            failed.outcome,
            FileOutcome::ReadFailed(ScanError::FileNotFound(_))
        ));
        let good = summary
            .reports
            .iter()
            .find(|r| r.file_name == "good.pdf")
            .unwrap();
        assert!(matches!(
            good.outcome,
            FileOutcome::Classified(Verdict::Known(_))
        ));
    }
}
