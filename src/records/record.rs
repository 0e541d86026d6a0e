//! Execution records: one detector observation of one test.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::config::InputConfig;
use crate::core::errors::{FlakeError, Result};
use crate::records::reader::RawRow;

/// Number of fields in a detector-run row:
/// `test, prefix_md5, tool, status, failure_md5, log`.
pub const FIELD_COUNT: usize = 6;

/// Outcome of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    #[must_use]
    pub const fn from_passed(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive: only `pass` and `fail` are accepted.
impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pass" => Ok(Self::Pass),
            "fail" => Ok(Self::Fail),
            _ => Err(()),
        }
    }
}

/// A validated detector-run row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// `TestClass#method`.
    pub test: String,
    /// Hash of the tests run before this one; empty when run alone.
    pub prefix_fingerprint: String,
    pub tool: String,
    pub status: Status,
    /// Hash of the failure message. Not used for categorization.
    pub failure_fingerprint: String,
    /// Free-form log; the seed for randomized-seed runs.
    pub log: String,
}

impl ExecutionRecord {
    /// Validate one raw row.
    ///
    /// Returns `Ok(None)` for header rows (the `test` field equals the
    /// configured marker), wherever they appear in the file.
    pub fn from_row(row: &RawRow, input: &InputConfig) -> Result<Option<Self>> {
        let [test, prefix, tool, status, failure, log] = row.fields.as_slice() else {
            return Err(FlakeError::FieldCount {
                line: row.line,
                expected: FIELD_COUNT,
                found: row.fields.len(),
                record: row.to_string(),
            });
        };

        if *test == input.header_marker {
            return Ok(None);
        }

        let status = match status.parse::<Status>() {
            Ok(status) if test.contains(input.test_separator) => status,
            _ => {
                return Err(FlakeError::MalformedRecord {
                    line: row.line,
                    record: row.to_string(),
                });
            }
        };

        Ok(Some(Self {
            test: test.clone(),
            prefix_fingerprint: prefix.clone(),
            tool: tool.clone(),
            status,
            failure_fingerprint: failure.clone(),
            log: log.clone(),
        }))
    }

    /// Whether this row came from a randomized-seed run.
    #[must_use]
    pub fn is_randomized_seed(&self, input: &InputConfig) -> bool {
        self.tool == input.nondex_tool
    }

    /// Seed identifier of a randomized-seed run.
    #[must_use]
    pub fn seed(&self) -> &str {
        &self.log
    }

    #[must_use]
    pub fn has_prefix(&self) -> bool {
        !self.prefix_fingerprint.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: [&str; 6]) -> RawRow {
        RawRow::new(7, fields)
    }

    #[test]
    fn parses_valid_row() {
        let input = InputConfig::default();
        let record = ExecutionRecord::from_row(
            &row(["A#m", "h1", "NonDex", "fail", "f1", "seed1"]),
            &input,
        )
        .unwrap()
        .expect("not a header");
        assert_eq!(record.test, "A#m");
        assert_eq!(record.status, Status::Fail);
        assert!(record.has_prefix());
        assert!(record.is_randomized_seed(&input));
        assert_eq!(record.seed(), "seed1");
        assert_eq!(record.failure_fingerprint, "f1");
    }

    #[test]
    fn header_row_is_skipped() {
        let input = InputConfig::default();
        let header = row(["test", "prefix_md5", "tool", "status", "failure_md5", "log"]);
        assert_eq!(ExecutionRecord::from_row(&header, &input).unwrap(), None);
    }

    #[test]
    fn missing_separator_is_malformed() {
        let input = InputConfig::default();
        let err = ExecutionRecord::from_row(&row(["NoSeparator", "", "OBO", "pass", "", ""]), &input)
            .unwrap_err();
        match err {
            FlakeError::MalformedRecord { line, record } => {
                assert_eq!(line, 7);
                assert!(record.contains("NoSeparator"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_status_is_malformed() {
        let input = InputConfig::default();
        for status in ["ERROR", "PASS", "Fail", " pass", ""] {
            let err = ExecutionRecord::from_row(&row(["A#m", "", "OBO", status, "", ""]), &input)
                .unwrap_err();
            assert_eq!(err.code(), "FLK-2001", "status {status:?} should be rejected");
        }
    }

    #[test]
    fn wrong_field_count_is_fatal() {
        let input = InputConfig::default();
        let err = ExecutionRecord::from_row(&RawRow::new(2, ["A#m", "", "OBO", "pass"]), &input)
            .unwrap_err();
        assert!(matches!(
            err,
            FlakeError::FieldCount {
                line: 2,
                expected: 6,
                found: 4,
                ..
            }
        ));
    }

    #[test]
    fn custom_markers_are_honored() {
        let input = InputConfig {
            header_marker: "name".to_string(),
            test_separator: '.',
            nondex_tool: "Shuffle".to_string(),
            ..InputConfig::default()
        };
        let header = row(["name", "", "", "", "", ""]);
        assert_eq!(ExecutionRecord::from_row(&header, &input).unwrap(), None);

        let record = ExecutionRecord::from_row(&row(["A.m", "", "Shuffle", "pass", "", "7"]), &input)
            .unwrap()
            .unwrap();
        assert!(record.is_randomized_seed(&input));

        // With the custom marker, a literal "test" row is an ordinary malformed record.
        let err = ExecutionRecord::from_row(&row(["test", "", "", "pass", "", ""]), &input)
            .unwrap_err();
        assert_eq!(err.code(), "FLK-2001");
    }

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!("pass".parse::<Status>(), Ok(Status::Pass));
        assert_eq!(Status::from_passed(false).as_str(), "fail");
    }
}
