//! Property tests for aggregation and the decision cascade.

use proptest::prelude::*;

use crate::classify::category::{FlakyCategory, categorize};
use crate::classify::evidence::TestEvidence;
use crate::core::config::InputConfig;
use crate::records::record::{ExecutionRecord, Status};

fn arb_status() -> impl Strategy<Value = Status> {
    any::<bool>().prop_map(Status::from_passed)
}

fn arb_record_with(status: impl Strategy<Value = Status>) -> impl Strategy<Value = ExecutionRecord> {
    (
        prop::sample::select(vec!["", "p1", "p2", "p3"]),
        prop::sample::select(vec!["OBO", "Isolation", "NonDex"]),
        status,
        prop::sample::select(vec!["1", "2", "3"]),
    )
        .prop_map(|(prefix, tool, status, seed)| ExecutionRecord {
            test: "T#m".to_string(),
            prefix_fingerprint: prefix.to_string(),
            tool: tool.to_string(),
            status,
            failure_fingerprint: String::new(),
            log: seed.to_string(),
        })
}

fn arb_records() -> impl Strategy<Value = Vec<ExecutionRecord>> {
    prop::collection::vec(arb_record_with(arb_status()), 0..24)
}

fn evidence_of(records: &[ExecutionRecord]) -> TestEvidence {
    let input = InputConfig::default();
    let mut evidence = TestEvidence::default();
    for record in records {
        evidence.observe(record, &input);
    }
    evidence
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Record order never changes the label.
    #[test]
    fn label_independent_of_record_order(
        (records, shuffled) in arb_records().prop_flat_map(|records| {
            let shuffled = Just(records.clone()).prop_shuffle();
            (Just(records), shuffled)
        })
    ) {
        prop_assert_eq!(
            categorize(&evidence_of(&records)),
            categorize(&evidence_of(&shuffled))
        );
    }

    /// Duplicated records add no evidence.
    #[test]
    fn duplicates_do_not_change_label(records in arb_records()) {
        let mut doubled = records.clone();
        doubled.extend(records.iter().cloned());
        prop_assert_eq!(evidence_of(&records), evidence_of(&doubled));
    }

    /// A test that only ever passes has no category.
    #[test]
    fn passing_only_is_uncategorized(
        records in prop::collection::vec(arb_record_with(Just(Status::Pass)), 0..24)
    ) {
        prop_assert_eq!(categorize(&evidence_of(&records)), None);
    }

    /// A test that only ever fails has no category.
    #[test]
    fn failing_only_is_uncategorized(
        records in prop::collection::vec(arb_record_with(Just(Status::Fail)), 0..24)
    ) {
        prop_assert_eq!(categorize(&evidence_of(&records)), None);
    }

    /// Whenever the seed rule applies, the label is ID or ID&NOD, never NOD or OD.
    #[test]
    fn seed_rule_takes_precedence(records in arb_records()) {
        let evidence = evidence_of(&records);
        let category = categorize(&evidence);
        if evidence.passed_anywhere() && evidence.has_failing_only_seed() {
            prop_assert!(matches!(
                category,
                Some(
                    FlakyCategory::IntermittentlyDeterministic
                        | FlakyCategory::IntermittentlyDeterministicAndNod
                )
            ));
        } else {
            prop_assert!(!matches!(
                category,
                Some(
                    FlakyCategory::IntermittentlyDeterministic
                        | FlakyCategory::IntermittentlyDeterministicAndNod
                )
            ));
        }
    }

    /// Contradicting outcomes under an identical context always produce a label.
    #[test]
    fn contradictions_are_always_labelled(records in arb_records()) {
        let evidence = evidence_of(&records);
        if evidence.passed_and_failed_with_prefix() || evidence.passed_and_failed_without_prefix() {
            prop_assert!(categorize(&evidence).is_some());
        }
    }
}
