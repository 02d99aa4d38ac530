// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [pw-select](https://crates.io/crates/pw-select). For a higher-level
//! overview, see that documentation.
//!
//! The basic flow of operations is:
//! 1. A [`ReportSource`](report_source::ReportSource) obtains the runner's JSON test report.
//! 2. [`TestIndex`](list::TestIndex) flattens and deduplicates the report, and indexes its tags and
//!    spec files.
//! 3. The user picks spec files, tests or tags through a [`Selector`](choices::Selector).
//! 4. A [`FilterTranslator`](test_filter::FilterTranslator) turns the selection into runner
//!    arguments, which [`RunnerCommand`](invocation::RunnerCommand) merges into the final command
//!    line.

pub mod choices;
pub mod config;
pub mod errors;
pub mod invocation;
pub mod list;
pub mod report_source;
pub mod test_filter;
