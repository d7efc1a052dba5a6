pub mod config;
pub mod errors;
pub mod metrics;
pub mod patterns;
pub mod results;
pub mod scan;

pub use config::ScanConfig;
pub use errors::{ScanError, ScanResult};
pub use patterns::{PatternRecord, PatternTable};
pub use results::{FileOutcome, FileReport, ScanSummary, Verdict};
pub use scan::{scan, scan_buffers, FileEntry, MatcherKind, SubstringMatcher};
