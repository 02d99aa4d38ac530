// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `pw-select` failures.
///
/// `pw-select` runs may stop before the runner is launched for a variety of reasons. This
/// structure documents the exit codes that may occur in case of expected failures.
///
/// Once the runner has been launched, its own exit code is passed through unchanged.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum PwSelectExitCode {}

impl PwSelectExitCode {
    /// No errors occurred and pw-select exited normally.
    ///
    /// This is also the exit code when there was nothing to select: listing tests matched
    /// nothing, or the chosen filter mode had no choices to offer.
    pub const OK: i32 = 0;

    /// The user closed an interactive prompt.
    pub const USER_CANCELLED: i32 = 82;

    /// The selection could not be translated into a filter.
    pub const INVALID_SELECTION: i32 = 94;

    /// A user issue happened while setting up a pw-select invocation.
    pub const SETUP_ERROR: i32 = 96;

    /// The test report was structurally malformed.
    pub const REPORT_VALIDATION_FAILED: i32 = 103;

    /// The test report could not be obtained: listing failed, or the report file could not be
    /// read or parsed.
    pub const REPORT_ACQUISITION_FAILED: i32 = 104;

    /// The test runner could not be spawned.
    pub const RUNNER_EXEC_FAILED: i32 = 105;
}
