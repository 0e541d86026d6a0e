//! Detector-run records: reading, validating, and writing the delimited format.

pub mod reader;
pub mod record;
pub mod writer;
