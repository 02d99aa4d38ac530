// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Obtaining the test report, either from the test runner or from a file on disk.

use crate::{errors::AcquisitionError, invocation::RunnerInvocation};
use camino::Utf8PathBuf;
use pw_select_metadata::TestReport;
use tracing::{debug, warn};

/// The message the runner prints when listing matches nothing.
pub const NO_TESTS_FOUND_MESSAGE: &str = "Error: No tests found";

/// Where the test report comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReportSource {
    /// A report captured earlier and saved to disk.
    File(Utf8PathBuf),

    /// The output of a listing invocation of the runner.
    Runner(RunnerInvocation),
}

impl ReportSource {
    /// Obtains and parses the report.
    ///
    /// A report that lists no tests results in [`AcquisitionError::NoTestsFound`], or in
    /// [`AcquisitionError::CollectionErrors`] if the runner reported errors while collecting tests.
    pub fn acquire(&self) -> Result<TestReport, AcquisitionError> {
        let report = match self {
            Self::File(path) => {
                debug!("reading test report from `{path}`");
                let json = std::fs::read_to_string(path).map_err(|err| AcquisitionError::ReadFile {
                    path: path.clone(),
                    err,
                })?;
                TestReport::parse(&json).map_err(|err| AcquisitionError::Parse {
                    origin: format!("`{path}`"),
                    err,
                })?
            }
            Self::Runner(invocation) => list_tests(invocation)?,
        };
        check_report(report)
    }
}

fn list_tests(invocation: &RunnerInvocation) -> Result<TestReport, AcquisitionError> {
    debug!("listing tests with `{invocation}`");
    let output = invocation
        .to_expression()
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .map_err(|err| AcquisitionError::Exec {
            command: invocation.to_string(),
            err,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let parsed = TestReport::parse(&stdout);
    if !output.status.success() {
        if stdout.contains(NO_TESTS_FOUND_MESSAGE) || stderr.contains(NO_TESTS_FOUND_MESSAGE) {
            return Err(AcquisitionError::NoTestsFound);
        }
        // The runner exits with a failure if a spec file fails to load, but still writes a report
        // describing the failure.
        if let Ok(report) = &parsed {
            if report.suites.is_empty() && !report.errors.is_empty() {
                return Err(collection_errors(report));
            }
        }
        return Err(AcquisitionError::CommandFailed {
            command: invocation.to_string(),
            exit_code: output.status.code(),
            stderr: stderr.into_owned(),
        });
    }

    parsed.map_err(|err| AcquisitionError::Parse {
        origin: format!("the output of `{invocation}`"),
        err,
    })
}

fn check_report(report: TestReport) -> Result<TestReport, AcquisitionError> {
    if report.suites.is_empty() {
        if report.errors.is_empty() {
            return Err(AcquisitionError::NoTestsFound);
        }
        return Err(collection_errors(&report));
    }

    for error in &report.errors {
        warn!(
            "the test runner reported an error while collecting tests: {}",
            error.message.as_deref().unwrap_or("(no message)")
        );
    }
    debug!(
        "report has {} spec files and {} specs",
        report.suites.len(),
        report.spec_count()
    );
    Ok(report)
}

fn collection_errors(report: &TestReport) -> AcquisitionError {
    AcquisitionError::CollectionErrors {
        messages: report
            .errors
            .iter()
            .map(|error| error.message.clone().unwrap_or_default())
            .collect(),
    }
}
