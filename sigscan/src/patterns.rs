//! The prioritized signature table that drives classification.
//!
//! A table is built once at startup, sorted by descending priority with
//! a stable tie-break on input order, and shared read-only across all
//! scan workers. It is never mutated after construction, which is what
//! lets the workers read it without any locking.

use serde::{Deserialize, Serialize};

use crate::errors::{ScanError, ScanResult};

/// Field separator in the on-disk pattern database
const FIELD_DELIMITER: char = ';';

/// A single signature rule: if `pattern` occurs in a file's content,
/// the file is reported as `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    /// Rank used to order ambiguous matches; higher is checked first
    pub priority: u32,
    /// Fixed substring whose presence signals the file type (non-empty)
    pub pattern: String,
    /// Human-readable file type reported on a match
    pub label: String,
}

impl PatternRecord {
    pub fn new(priority: u32, pattern: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            priority,
            pattern: pattern.into(),
            label: label.into(),
        }
    }
}

/// An ordered, immutable collection of pattern records
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    records: Vec<PatternRecord>,
}

impl PatternTable {
    /// Builds a table from records in arbitrary order.
    ///
    /// Records are stable-sorted by priority descending, so records
    /// with equal priority keep their input order. Fails with
    /// `MalformedRecord` if any record has an empty pattern; the
    /// reported line number is the record's 1-based position.
    pub fn from_records(records: Vec<PatternRecord>) -> ScanResult<Self> {
        for (index, record) in records.iter().enumerate() {
            if record.pattern.is_empty() {
                return Err(ScanError::malformed_record(
                    index + 1,
                    format!("{};{:?};{:?}", record.priority, record.pattern, record.label),
                    "empty pattern",
                ));
            }
        }

        let mut records = records;
        records.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(Self { records })
    }

    /// Parses the pattern database format: one record per line,
    /// `priority;"pattern";"label"`, surrounding double quotes stripped.
    /// Blank lines are skipped. Any malformed line aborts the parse and
    /// reports its line number.
    pub fn parse(input: &str) -> ScanResult<Self> {
        let mut records = Vec::new();
        for (index, line) in input.lines().enumerate() {
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            records.push(Self::parse_record(line, line_number)?);
        }
        Self::from_records(records)
    }

    fn parse_record(line: &str, line_number: usize) -> ScanResult<PatternRecord> {
        let fields: Vec<&str> = line.splitn(3, FIELD_DELIMITER).collect();
        if fields.len() != 3 {
            return Err(ScanError::malformed_record(
                line_number,
                line,
                format!("expected 3 '{FIELD_DELIMITER}'-separated fields, got {}", fields.len()),
            ));
        }

        let priority: u32 = fields[0].trim().parse().map_err(|_| {
            ScanError::malformed_record(line_number, line, "priority is not a valid integer")
        })?;

        let pattern = strip_quotes(fields[1]);
        let label = strip_quotes(fields[2]);

        if pattern.is_empty() {
            return Err(ScanError::malformed_record(line_number, line, "empty pattern"));
        }

        Ok(PatternRecord::new(priority, pattern, label))
    }

    /// Records in match-evaluation order: priority descending, stable
    /// on input order for equal priorities.
    pub fn records(&self) -> &[PatternRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn strip_quotes(field: &str) -> String {
    let trimmed = field.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_priority_descending() {
        let table = PatternTable::from_records(vec![
            PatternRecord::new(1, "%PDF-", "PDF document"),
            PatternRecord::new(9, "PK", "ZIP archive"),
            PatternRecord::new(4, "pmview", "PCP pmview config"),
        ])
        .unwrap();

        let priorities: Vec<u32> = table.records().iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![9, 4, 1]);
    }

    #[test]
    fn test_equal_priority_keeps_input_order() {
        let table = PatternTable::from_records(vec![
            PatternRecord::new(5, "first", "First"),
            PatternRecord::new(5, "second", "Second"),
            PatternRecord::new(5, "third", "Third"),
        ])
        .unwrap();

        let labels: Vec<&str> = table.records().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let result = PatternTable::from_records(vec![
            PatternRecord::new(3, "ok", "Fine"),
            PatternRecord::new(2, "", "Broken"),
        ]);
        match result {
            Err(ScanError::MalformedRecord { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(reason, "empty pattern");
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_pattern_database() {
        let input = "1;\"%PDF-\";\"PDF document\"\n2;\"PK\";\"ZIP archive\"\n\n4;\"pmview\";\"PCP pmview config\"\n";
        let table = PatternTable::parse(input).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0].pattern, "pmview");
        assert_eq!(table.records()[1].pattern, "PK");
        assert_eq!(table.records()[2].label, "PDF document");
    }

    #[test]
    fn test_parse_keeps_delimiter_inside_label() {
        // splitn(3) means only the first two delimiters split fields
        let table = PatternTable::parse("1;\"-----BEGIN\";\"PEM key; private\"").unwrap();
        assert_eq!(table.records()[0].label, "PEM key; private");
    }

    #[test]
    fn test_parse_bad_field_count() {
        let err = PatternTable::parse("1;\"PK\"").unwrap_err();
        match err {
            ScanError::MalformedRecord { line, reason, .. } => {
                assert_eq!(line, 1);
                assert!(reason.contains("expected 3"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_non_numeric_priority() {
        let err = PatternTable::parse("one;\"PK\";\"ZIP archive\"").unwrap_err();
        match err {
            ScanError::MalformedRecord { line, reason, .. } => {
                assert_eq!(line, 1);
                assert_eq!(reason, "priority is not a valid integer");
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_reports_failing_line_number() {
        let input = "1;\"%PDF-\";\"PDF document\"\n2;\"PK\";\"ZIP archive\"\nnope\n";
        let err = PatternTable::parse(input).unwrap_err();
        assert!(matches!(err, ScanError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn test_unquoted_fields_accepted() {
        let table = PatternTable::parse("7;PK;ZIP archive").unwrap();
        assert_eq!(table.records()[0].pattern, "PK");
        assert_eq!(table.records()[0].label, "ZIP archive");
    }
}
