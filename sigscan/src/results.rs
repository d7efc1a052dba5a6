//! Per-file classification results and the aggregate scan summary.
//!
//! A read failure is kept as its own outcome variant rather than being
//! folded into `Unknown`. "No pattern matched" and "could not be read"
//! are different facts; the presentation layer may choose to print them
//! the same way, but the core never conflates them.

use std::fmt;

use crate::errors::ScanError;

/// What the classifier decided about a file it could read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The label of the highest-priority matching pattern
    Known(String),
    /// No pattern in the table matched
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Known(label) => f.write_str(label),
            Verdict::Unknown => f.write_str("unknown"),
        }
    }
}

/// The outcome of one file's scan task
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was read and classified
    Classified(Verdict),
    /// The file could not be read; the error is carried, not guessed over
    ReadFailed(ScanError),
}

/// One result per input file
#[derive(Debug)]
pub struct FileReport {
    /// The name the caller associated with this file's content
    pub file_name: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn classified(file_name: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            file_name: file_name.into(),
            outcome: FileOutcome::Classified(verdict),
        }
    }

    pub fn read_failed(file_name: impl Into<String>, error: ScanError) -> Self {
        Self {
            file_name: file_name.into(),
            outcome: FileOutcome::ReadFailed(error),
        }
    }
}

/// The complete result of one scan
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// One report per input file, sorted by file name
    pub reports: Vec<FileReport>,
    /// Files that matched some pattern
    pub files_matched: usize,
    /// Files read successfully but matching no pattern
    pub files_unknown: usize,
    /// Files that could not be read
    pub files_failed: usize,
}

impl ScanSummary {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a file report and updates the counters
    pub fn add_report(&mut self, report: FileReport) {
        match &report.outcome {
            FileOutcome::Classified(Verdict::Known(_)) => self.files_matched += 1,
            FileOutcome::Classified(Verdict::Unknown) => self.files_unknown += 1,
            FileOutcome::ReadFailed(_) => self.files_failed += 1,
        }
        self.reports.push(report);
    }

    /// Total number of files the scan produced a report for
    pub fn files_scanned(&self) -> usize {
        self.reports.len()
    }
}
