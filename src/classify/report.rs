//! Result mapping: test → category, in first-sighting order.

#![allow(missing_docs)]

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::classify::category::{FlakyCategory, categorize, label_of};
use crate::classify::evidence::EvidenceLedger;
use crate::core::errors::Result;

/// One label per distinct test seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationReport {
    categories: IndexMap<String, Option<FlakyCategory>>,
}

impl ClassificationReport {
    /// Run the decision procedure over every test in the ledger.
    #[must_use]
    pub fn from_ledger(ledger: &EvidenceLedger) -> Self {
        let categories = ledger
            .iter()
            .map(|(test, evidence)| (test.to_string(), categorize(evidence)))
            .collect();
        Self { categories }
    }

    /// Category of one test; `None` both for unknown tests and tests without a category.
    #[must_use]
    pub fn category_of(&self, test: &str) -> Option<FlakyCategory> {
        self.categories.get(test).copied().flatten()
    }

    #[must_use]
    pub fn contains(&self, test: &str) -> bool {
        self.categories.contains_key(test)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<FlakyCategory>)> {
        self.categories
            .iter()
            .map(|(test, category)| (test.as_str(), *category))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of tests that received a category.
    #[must_use]
    pub fn flaky_count(&self) -> usize {
        self.categories.values().filter(|c| c.is_some()).count()
    }

    /// `{ "A#m": "ID", "B#m": "" }`, the format downstream consumers parse.
    ///
    /// Keys and labels are written verbatim; an empty report renders as `{  }`.
    #[must_use]
    pub fn render_legacy(&self) -> String {
        let pairs: Vec<String> = self
            .iter()
            .map(|(test, category)| format!("\"{test}\": \"{}\"", label_of(category)))
            .collect();
        format!("{{ {} }}", pairs.join(", "))
    }

    /// Compact JSON object with escaped keys.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for ClassificationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (test, category) in self.iter() {
            map.serialize_entry(test, label_of(category))?;
        }
        map.end()
    }
}
