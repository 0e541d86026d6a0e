//! Activity logging for classification runs.

pub mod jsonl;
