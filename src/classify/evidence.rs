//! Per-test evidence accumulation.
//!
//! Every validated record mutates the accumulator of its test; accumulators are
//! created on first sighting and never removed. Randomized-seed rows only feed
//! the seed sets, whatever their prefix says.

#![allow(missing_docs)]

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::config::InputConfig;
use crate::core::errors::Result;
use crate::records::reader::RawRow;
use crate::records::record::{ExecutionRecord, Status};

/// Everything observed about one test.
#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestEvidence {
    /// Prefix fingerprints under which the test passed.
    pub passes_with_prefix: BTreeSet<String>,
    /// Prefix fingerprints under which the test failed.
    pub fails_with_prefix: BTreeSet<String>,
    pub passed_without_prefix: bool,
    pub failed_without_prefix: bool,
    /// Seeds under which a randomized run failed.
    pub nondex_fails: BTreeSet<String>,
    /// Seeds under which a randomized run passed.
    pub nondex_passes: BTreeSet<String>,
}

impl TestEvidence {
    /// Fold one record into the accumulator.
    pub fn observe(&mut self, record: &ExecutionRecord, input: &InputConfig) {
        if record.is_randomized_seed(input) {
            let seeds = match record.status {
                Status::Pass => &mut self.nondex_passes,
                Status::Fail => &mut self.nondex_fails,
            };
            seeds.insert(record.seed().to_string());
            return;
        }

        match (record.has_prefix(), record.status) {
            (true, Status::Pass) => {
                self.passes_with_prefix
                    .insert(record.prefix_fingerprint.clone());
            }
            (true, Status::Fail) => {
                self.fails_with_prefix
                    .insert(record.prefix_fingerprint.clone());
            }
            (false, Status::Pass) => self.passed_without_prefix = true,
            (false, Status::Fail) => self.failed_without_prefix = true,
        }
    }

    #[must_use]
    pub fn passed_anywhere(&self) -> bool {
        self.passed_without_prefix || !self.passes_with_prefix.is_empty()
    }

    #[must_use]
    pub fn passed_and_failed_with_prefix(&self) -> bool {
        !self.passes_with_prefix.is_empty() && !self.fails_with_prefix.is_empty()
    }

    #[must_use]
    pub fn passed_and_failed_without_prefix(&self) -> bool {
        self.passed_without_prefix && self.failed_without_prefix
    }

    /// A seed that failed and never passed under that same seed.
    #[must_use]
    pub fn has_failing_only_seed(&self) -> bool {
        self.nondex_fails
            .iter()
            .any(|seed| !self.nondex_passes.contains(seed))
    }

    /// Some prefix fingerprint is recorded as both passing and failing.
    #[must_use]
    pub fn has_contradicting_prefix(&self) -> bool {
        !self.passes_with_prefix.is_disjoint(&self.fails_with_prefix)
    }
}

/// Evidence for every test seen, in first-sighting order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EvidenceLedger {
    tests: IndexMap<String, TestEvidence>,
}

impl EvidenceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one validated record.
    pub fn observe(&mut self, record: &ExecutionRecord, input: &InputConfig) {
        self.tests
            .entry(record.test.clone())
            .or_default()
            .observe(record, input);
    }

    #[must_use]
    pub fn get(&self, test: &str) -> Option<&TestEvidence> {
        self.tests.get(test)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TestEvidence)> {
        self.tests.iter().map(|(test, evidence)| (test.as_str(), evidence))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// Counters describing one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub rows_read: usize,
    pub headers_skipped: usize,
    pub records_applied: usize,
}

/// Build the ledger from raw rows.
///
/// The first malformed row aborts the whole pass; no partial ledger is returned.
pub fn aggregate<I>(rows: I, input: &InputConfig) -> Result<(EvidenceLedger, AggregationStats)>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut ledger = EvidenceLedger::new();
    let mut stats = AggregationStats::default();
    for row in rows {
        stats.rows_read += 1;
        match ExecutionRecord::from_row(&row, input)? {
            Some(record) => {
                ledger.observe(&record, input);
                stats.records_applied += 1;
            }
            None => stats.headers_skipped += 1,
        }
    }
    Ok((ledger, stats))
}
