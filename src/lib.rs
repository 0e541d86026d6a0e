#![forbid(unsafe_code)]

//! Labels flaky tests from repeated detector runs.
//!
//! Each detector run says whether one test passed or failed under one context:
//! after a given prefix of other tests, alone, or under a randomized NonDex
//! seed. The engine folds every run into per-test evidence and assigns one of
//! `ID`, `ID&NOD`, `OD-Vic`, `OD-Brit`, `NOD`, or no category.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use flake_categorizer::prelude::*;
//!
//! let config = Config::load(None)?;
//! let outcome = Classifier::new(&config.input).classify_path("runs.csv".as_ref())?;
//! println!("{}", outcome.report.render_legacy());
//! # Ok::<(), FlakeError>(())
//! ```

pub mod prelude;

pub mod classify;
pub mod core;
pub mod logger;
pub mod records;
