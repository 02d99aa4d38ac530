// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::FromPathBufError;
use owo_colors::OwoColorize;
use pw_select_metadata::PwSelectExitCode;
use pw_select_runner::{errors::*, report_source::NO_TESTS_FOUND_MESSAGE, test_filter::FilterMode};
use std::error::Error;
use swrite::{SWrite, swrite};
use thiserror::Error;
use tracing::{error, info};

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected failure: something went wrong before or while handing off to the test runner.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine the current directory")]
    CurrentDirFailed {
        #[source]
        err: std::io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 {
        #[source]
        err: FromPathBufError,
    },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("runner command parse error")]
    RunnerCommandParseError {
        #[source]
        err: RunnerCommandParseError,
    },
    #[error("failed to write to stdout")]
    WriteError {
        #[source]
        err: std::io::Error,
    },
    #[error("no tests found")]
    NoTestsFound,
    #[error("test report acquisition failed")]
    AcquisitionFailed {
        #[source]
        err: AcquisitionError,
    },
    #[error("test report validation failed")]
    ReportValidationFailed {
        #[from]
        err: ReportValidationError,
    },
    #[error("no choices for mode")]
    NoChoices { mode: FilterMode },
    #[error("the prompt was closed")]
    UserCancelled,
    #[error("prompt error")]
    PromptFailed {
        #[source]
        err: SelectorError,
    },
    #[error("invalid choice")]
    InvalidChoice {
        #[source]
        err: SelectError,
    },
    #[error("translate error")]
    TranslateFailed {
        #[from]
        err: TranslateError,
    },
    #[error("failed to launch the test runner")]
    LaunchFailed {
        #[from]
        err: LaunchError,
    },
}

impl From<AcquisitionError> for ExpectedError {
    fn from(err: AcquisitionError) -> Self {
        match err {
            AcquisitionError::NoTestsFound => Self::NoTestsFound,
            err => Self::AcquisitionFailed { err },
        }
    }
}

impl From<SelectError> for ExpectedError {
    fn from(err: SelectError) -> Self {
        match err {
            SelectError::EmptyChoiceSet { mode } => Self::NoChoices { mode },
            SelectError::Selector(err) => Self::PromptFailed { err },
            err @ (SelectError::UnknownChoice { .. } | SelectError::NothingChosen { .. }) => {
                Self::InvalidChoice { err }
            }
        }
    }
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::RunnerCommandParseError { .. }
            | Self::WriteError { .. }
            | Self::PromptFailed { .. } => PwSelectExitCode::SETUP_ERROR,
            Self::NoTestsFound | Self::NoChoices { .. } => PwSelectExitCode::OK,
            Self::AcquisitionFailed { .. } => PwSelectExitCode::REPORT_ACQUISITION_FAILED,
            Self::ReportValidationFailed { .. } => PwSelectExitCode::REPORT_VALIDATION_FAILED,
            Self::UserCancelled => PwSelectExitCode::USER_CANCELLED,
            Self::InvalidChoice { .. } | Self::TranslateFailed { .. } => {
                PwSelectExitCode::INVALID_SELECTION
            }
            Self::LaunchFailed { .. } => PwSelectExitCode::RUNNER_EXEC_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { err } => {
                error!("could not determine the current directory");
                Some(err as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { err } => {
                error!(
                    "current directory `{}` is not valid UTF-8",
                    err.as_path().display().style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse pw-select config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::RunnerCommandParseError { err } => {
                error!("invalid `{}` argument", "--runner".style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::WriteError { err } => {
                error!("failed to write to stdout");
                Some(err as &dyn Error)
            }
            Self::NoTestsFound => {
                error!(
                    target: NO_HEADING_TARGET,
                    "\n{}",
                    NO_TESTS_FOUND_MESSAGE.style(styles.notice)
                );
                None
            }
            Self::AcquisitionFailed { err } => match err {
                AcquisitionError::CommandFailed {
                    command,
                    exit_code,
                    stderr,
                } => {
                    let mut msg = format!("`{}` failed", command.style(styles.bold));
                    if let Some(code) = exit_code {
                        swrite!(msg, " with exit code {}", code.style(styles.bold));
                    }
                    let stderr = stderr.trim_end();
                    if !stderr.is_empty() {
                        swrite!(msg, "\n--- stderr:\n{}\n---", stderr);
                    }
                    error!("{msg}");
                    None
                }
                AcquisitionError::CollectionErrors { messages } => {
                    let mut msg = format!(
                        "the test runner reported {} while collecting tests:",
                        plural(messages.len(), "error", "errors").style(styles.bold)
                    );
                    for message in messages {
                        swrite!(msg, "\n  {}", message.trim_end().style(styles.warning_text));
                    }
                    error!("{msg}");
                    None
                }
                AcquisitionError::Exec { command, err } => {
                    error!("failed to execute `{}`", command.style(styles.bold));
                    Some(err as &dyn Error)
                }
                other => {
                    error!("{other}");
                    other.source()
                }
            },
            Self::ReportValidationFailed { err } => {
                error!("{err}");
                err.source()
            }
            Self::NoChoices { mode } => {
                info!(
                    target: NO_HEADING_TARGET,
                    "{}",
                    format!("no {} detected", mode.noun()).style(styles.notice)
                );
                None
            }
            Self::UserCancelled => {
                info!(
                    target: NO_HEADING_TARGET,
                    "\n{}",
                    "The prompt was closed".style(styles.notice)
                );
                None
            }
            Self::PromptFailed { err } => {
                error!("{err}");
                err.source()
            }
            Self::InvalidChoice { err } => {
                error!("{err}");
                err.source()
            }
            Self::TranslateFailed { err } => {
                error!("{err}");
                err.source()
            }
            Self::LaunchFailed { err } => {
                error!(
                    "failed to execute `{}`",
                    err.command().style(styles.bold)
                );
                err.source()
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
