//! Classification engine: aggregate detector runs per test, then label each test.
//!
//! ```rust
//! use flake_categorizer::classify::Classifier;
//! use flake_categorizer::core::config::InputConfig;
//!
//! let csv = "test,prefix_md5,tool,status,failure_md5,log\n\
//!            B#m,p1,OBO,fail,,\n\
//!            B#m,p2,OBO,pass,,";
//! let outcome = Classifier::new(&InputConfig::default()).classify_str(csv).unwrap();
//! assert_eq!(outcome.report.render_legacy(), r#"{ "B#m": "OD-Vic" }"#);
//! ```

#![allow(missing_docs)]

pub mod category;
pub mod evidence;
pub mod report;

#[cfg(test)]
mod test_properties;

use std::path::Path;

use serde::Serialize;

use crate::core::config::InputConfig;
use crate::core::errors::Result;
use crate::records::reader::{RawRow, parse_delimited, read_delimited};

use self::evidence::{AggregationStats, EvidenceLedger, aggregate};
use self::report::ClassificationReport;

/// Counters for one classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub rows_read: usize,
    pub headers_skipped: usize,
    pub records_applied: usize,
    pub tests: usize,
    pub flaky: usize,
}

/// Ledger and labels produced from one input.
#[derive(Debug, Clone)]
pub struct Classification {
    pub ledger: EvidenceLedger,
    pub report: ClassificationReport,
    pub stats: RunStats,
}

/// Reader + aggregation + decision procedure, configured once.
#[derive(Debug, Clone)]
pub struct Classifier {
    input: InputConfig,
}

impl Classifier {
    #[must_use]
    pub fn new(input: &InputConfig) -> Self {
        Self {
            input: input.clone(),
        }
    }

    /// Classify a detector-run file on disk.
    pub fn classify_path(&self, path: &Path) -> Result<Classification> {
        let rows = read_delimited(path, self.input.delimiter)?;
        self.classify_rows(rows)
    }

    /// Classify delimited text already in memory.
    pub fn classify_str(&self, raw: &str) -> Result<Classification> {
        let rows = parse_delimited(raw, self.input.delimiter)?;
        self.classify_rows(rows)
    }

    /// Classify pre-split rows.
    pub fn classify_rows<I>(&self, rows: I) -> Result<Classification>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let (ledger, aggregation) = aggregate(rows, &self.input)?;
        let report = ClassificationReport::from_ledger(&ledger);
        let stats = run_stats(aggregation, &report);
        Ok(Classification {
            ledger,
            report,
            stats,
        })
    }
}

fn run_stats(aggregation: AggregationStats, report: &ClassificationReport) -> RunStats {
    RunStats {
        rows_read: aggregation.rows_read,
        headers_skipped: aggregation.headers_skipped,
        records_applied: aggregation.records_applied,
        tests: report.len(),
        flaky: report.flaky_count(),
    }
}
