//! Concurrent classification of many files.
//!
//! The pipeline is deliberately lock-free: the pattern table and the
//! chosen matcher are built once, then shared read-only by every worker
//! on a bounded rayon pool. Each worker owns its file's content buffer
//! outright, so tasks never touch shared mutable state and a failure in
//! one file's task stays in that file's report.

pub mod engine;
pub mod matcher;
pub mod processor;

pub use engine::{scan, scan_buffers, FileEntry};
pub use matcher::{KmpMatcher, MatcherKind, RabinKarpMatcher, SubstringMatcher};
pub use processor::{classify, FileProcessor};
