//! Flakiness categories and the decision cascade that assigns them.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::classify::evidence::TestEvidence;

/// Coarse flakiness label for one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlakyCategory {
    /// Outcome tied to a randomized-seed run: fails under some seed, never passes under it.
    IntermittentlyDeterministic,
    /// Intermittently deterministic, and also fails when run without any prefix.
    IntermittentlyDeterministicAndNod,
    /// Order-dependent victim: only fails after some polluting test.
    OrderDependentVictim,
    /// Order-dependent brittle: only passes after some helping test.
    OrderDependentBrittle,
    /// Non-order-dependent: passes and fails under the same observed context.
    NonOrderDependent,
}

impl FlakyCategory {
    pub const ALL: [Self; 5] = [
        Self::IntermittentlyDeterministic,
        Self::IntermittentlyDeterministicAndNod,
        Self::OrderDependentVictim,
        Self::OrderDependentBrittle,
        Self::NonOrderDependent,
    ];

    /// Label used in every output format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::IntermittentlyDeterministic => "ID",
            Self::IntermittentlyDeterministicAndNod => "ID&NOD",
            Self::OrderDependentVictim => "OD-Vic",
            Self::OrderDependentBrittle => "OD-Brit",
            Self::NonOrderDependent => "NOD",
        }
    }
}

/// Label for an optional category; tests without one render as `""`.
#[must_use]
pub fn label_of(category: Option<FlakyCategory>) -> &'static str {
    category.map_or("", FlakyCategory::label)
}

impl fmt::Display for FlakyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FlakyCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| format!("unknown flaky category {s:?}"))
    }
}

impl Serialize for FlakyCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for FlakyCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Assign a category to one test. First matching rule wins:
///
/// 1. passed somewhere and some seed only ever failed: `ID`, or `ID&NOD` when it
///    also failed without a prefix;
/// 2. disjoint, non-empty passing and failing prefix sets: `OD-Vic` when it never
///    failed without a prefix, else `OD-Brit` when it never passed without one;
///    otherwise fall through;
/// 3. passed and failed with prefixes, or passed and failed without: `NOD`;
/// 4. nothing.
#[must_use]
pub fn categorize(evidence: &TestEvidence) -> Option<FlakyCategory> {
    if evidence.passed_anywhere() && evidence.has_failing_only_seed() {
        return Some(if evidence.failed_without_prefix {
            FlakyCategory::IntermittentlyDeterministicAndNod
        } else {
            FlakyCategory::IntermittentlyDeterministic
        });
    }

    if evidence.passed_and_failed_with_prefix() && !evidence.has_contradicting_prefix() {
        if !evidence.failed_without_prefix {
            return Some(FlakyCategory::OrderDependentVictim);
        }
        if !evidence.passed_without_prefix {
            return Some(FlakyCategory::OrderDependentBrittle);
        }
    }

    if evidence.passed_and_failed_with_prefix() || evidence.passed_and_failed_without_prefix() {
        return Some(FlakyCategory::NonOrderDependent);
    }

    None
}
