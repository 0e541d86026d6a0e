//! Encoding detector runs into the delimited file the categorizer reads.

#![allow(missing_docs)]

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::records::record::Status;

/// Header row written ahead of every encoded run list.
pub const HEADER: &str = "test,prefix_md5,tool,status,failure_md5,log";

/// One detector execution as reported by a detector (OBO, Isolation, NonDex, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorRun {
    pub test: String,
    pub prefix_fingerprint: String,
    pub tool: String,
    pub passed: bool,
    pub failure: Option<String>,
    pub log: Option<String>,
}

impl DetectorRun {
    #[must_use]
    pub const fn status(&self) -> Status {
        Status::from_passed(self.passed)
    }
}

/// Newlines become a literal `\n` and commas a space, so free-form text
/// always stays inside its own field.
#[must_use]
pub fn escape_free_text(raw: &str) -> String {
    raw.replace('\n', "\\n").replace(',', " ")
}

/// Render runs as header + one comma-separated row per run.
#[must_use]
pub fn encode_detector_runs(runs: &[DetectorRun]) -> String {
    let mut out = String::from(HEADER);
    for run in runs {
        let failure = run.failure.as_deref().map(escape_free_text).unwrap_or_default();
        let log = run.log.as_deref().map(escape_free_text).unwrap_or_default();
        let _ = write!(
            out,
            "\n{},{},{},{},{failure},{log}",
            run.test,
            run.prefix_fingerprint,
            run.tool,
            run.status(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::InputConfig;
    use crate::records::reader::parse_delimited;
    use crate::records::record::ExecutionRecord;

    fn run(test: &str, tool: &str, passed: bool) -> DetectorRun {
        DetectorRun {
            test: test.to_string(),
            prefix_fingerprint: String::new(),
            tool: tool.to_string(),
            passed,
            failure: None,
            log: None,
        }
    }

    #[test]
    fn empty_run_list_is_header_only() {
        assert_eq!(encode_detector_runs(&[]), HEADER);
    }

    #[test]
    fn rows_follow_header() {
        let mut nondex = run("A#m", "NonDex", false);
        nondex.prefix_fingerprint = "h1".to_string();
        nondex.log = Some("933178".to_string());
        let encoded = encode_detector_runs(&[run("A#m", "Isolation", true), nondex]);
        assert_eq!(
            encoded,
            "test,prefix_md5,tool,status,failure_md5,log\n\
             A#m,,Isolation,pass,,\n\
             A#m,h1,NonDex,fail,,933178"
        );
    }

    #[test]
    fn free_text_cannot_break_fields() {
        let mut failing = run("A#m", "OBO", false);
        failing.failure = Some("expected 1,\ngot 2".to_string());
        failing.log = Some("a,b".to_string());
        let encoded = encode_detector_runs(&[failing]);
        assert!(encoded.ends_with("A#m,,OBO,fail,expected 1 \\ngot 2,a b"));

        let rows = parse_delimited(&encoded, ',').unwrap();
        let input = InputConfig::default();
        assert_eq!(ExecutionRecord::from_row(&rows[0], &input).unwrap(), None);
        let record = ExecutionRecord::from_row(&rows[1], &input).unwrap().unwrap();
        assert_eq!(record.failure_fingerprint, "expected 1 \\ngot 2");
        assert_eq!(record.status, Status::Fail);
    }
}
