// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Machine-readable data consumed by [pw-select](https://crates.io/crates/pw-select).
//!
//! This crate contains the deserializable form of the report produced by
//! `playwright test --list --reporter=json`, along with the exit codes documented for
//! `pw-select`.

mod exit_codes;
mod report;

pub use exit_codes::*;
pub use report::*;
