// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactively pick Playwright spec files, tests or tags, then run just those.
//!
//! `pw-select run` lists the project's tests through `playwright test --list --reporter=json`,
//! asks which spec files, test titles or tags to run, and re-invokes the runner with a filter
//! for the selection. Arguments it doesn't recognize are forwarded to the runner.

#![warn(missing_docs)]

mod args;
mod dispatch;
mod errors;
mod output;
mod prompt;

#[doc(hidden)]
pub use args::SplitArgs;
#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputWriter;
