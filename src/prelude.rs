//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use flake_categorizer::prelude::*;
//! ```

// Core
pub use crate::core::config::{Config, InputConfig, OutputFormat};
pub use crate::core::errors::{FlakeError, Result};

// Records
pub use crate::records::reader::{RawRow, parse_delimited, read_delimited};
pub use crate::records::record::{ExecutionRecord, Status};
pub use crate::records::writer::{DetectorRun, encode_detector_runs};

// Classification
pub use crate::classify::category::{FlakyCategory, categorize};
pub use crate::classify::evidence::{EvidenceLedger, TestEvidence, aggregate};
pub use crate::classify::report::ClassificationReport;
pub use crate::classify::{Classification, Classifier, RunStats};
