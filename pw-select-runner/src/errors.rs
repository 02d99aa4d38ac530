// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by pw-select.

use crate::{choices::ChoiceId, test_filter::FilterMode};
use camino::Utf8PathBuf;
use config::ConfigError;
use std::fmt;
use thiserror::Error;

/// An error that occurred while parsing the pw-select config.
#[derive(Debug, Error)]
#[error("failed to parse pw-select config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),

    /// The runner command in the config was invalid.
    #[error("invalid `runner.command`")]
    RunnerCommand(#[source] RunnerCommandParseError),
}

/// An error that occurred while parsing a runner command.
#[derive(Clone, Debug, Error)]
pub enum RunnerCommandParseError {
    /// The command had no words in it.
    #[error("runner command is empty")]
    Empty,

    /// The command could not be split into words.
    #[error("failed to split runner command `{input}` into words")]
    Split {
        /// The input that failed to parse.
        input: String,

        /// The underlying error.
        #[source]
        err: shell_words::ParseError,
    },
}

/// An error that occurred while obtaining the test report.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Executing the listing command failed.
    #[error("failed to execute `{command}`")]
    Exec {
        /// The command that was run.
        command: String,

        /// The error that occurred.
        #[source]
        err: std::io::Error,
    },

    /// The listing command exited with a non-zero code.
    #[error("`{command}` failed")]
    CommandFailed {
        /// The command that was run.
        command: String,

        /// The exit code, if the process wasn't terminated by a signal.
        exit_code: Option<i32>,

        /// Standard error for the process.
        stderr: String,
    },

    /// The listing matched no tests.
    #[error("no tests found")]
    NoTestsFound,

    /// The report file could not be read.
    #[error("failed to read test report at `{path}`")]
    ReadFile {
        /// The path to the report.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        err: std::io::Error,
    },

    /// The report could not be parsed as JSON.
    #[error("failed to parse test report from {origin}")]
    Parse {
        /// Where the report came from.
        origin: String,

        /// The error that occurred.
        #[source]
        err: serde_json::Error,
    },

    /// The runner reported errors while collecting tests and produced no suites.
    #[error("the test runner reported {} errors while collecting tests", .messages.len())]
    CollectionErrors {
        /// The error messages from the report.
        messages: Vec<String>,
    },
}

/// An error indicating that the test report was structurally malformed.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid test report: {location} {kind}")]
pub struct ReportValidationError {
    location: NodeLocation,
    kind: ReportValidationErrorKind,
}

impl ReportValidationError {
    pub(crate) fn new(location: NodeLocation, kind: ReportValidationErrorKind) -> Self {
        Self { location, kind }
    }

    /// Returns the location of the offending node.
    pub fn location(&self) -> &NodeLocation {
        &self.location
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ReportValidationErrorKind {
        &self.kind
    }
}

/// The kind of structural problem found in a test report.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReportValidationErrorKind {
    /// A top-level suite is missing its `file`.
    MissingFile,

    /// A node is missing its `title`.
    MissingTitle,

    /// A node is missing its `line`.
    MissingLine,

    /// A suite is listed as its own descendant.
    Cycle {
        /// The title path of the ancestor that the suite repeats.
        ancestor_path: Vec<String>,
    },
}

impl fmt::Display for ReportValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile => write!(f, "is missing `file`"),
            Self::MissingTitle => write!(f, "is missing `title`"),
            Self::MissingLine => write!(f, "is missing `line`"),
            Self::Cycle { ancestor_path } => write!(
                f,
                "is listed as its own descendant (repeats `{}`)",
                ancestor_path.join(" › ")
            ),
        }
    }
}

/// Points at a node within a test report.
///
/// Nodes are identified by their parent's title path and their position among siblings of the
/// same kind, since the offending node itself may lack a title.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NodeLocation {
    /// The kind of node.
    pub kind: NodeLocationKind,

    /// The title path of the parent node. Empty for top-level suites.
    pub parent_path: Vec<String>,

    /// The zero-based index of the node among its siblings of the same kind.
    pub index: usize,
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind, self.index + 1)?;
        if !self.parent_path.is_empty() {
            write!(f, " in `{}`", self.parent_path.join(" › "))?;
        }
        Ok(())
    }
}

/// The kind of node a [`NodeLocation`] points at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NodeLocationKind {
    /// A top-level (per-file) suite.
    TopLevelSuite,

    /// A nested suite.
    Suite,

    /// A spec.
    Spec,
}

impl fmt::Display for NodeLocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLevelSuite => write!(f, "top-level suite"),
            Self::Suite => write!(f, "suite"),
            Self::Spec => write!(f, "spec"),
        }
    }
}

/// An error returned by a [`Selector`](crate::choices::Selector) implementation.
#[derive(Debug, Error)]
#[error("error reading prompt")]
pub struct SelectorError {
    #[source]
    err: std::io::Error,
}

impl SelectorError {
    /// Creates a new `SelectorError` from the underlying I/O error.
    pub fn new(err: std::io::Error) -> Self {
        Self { err }
    }
}

/// An error that occurred while asking the user to choose.
#[derive(Debug, Error)]
pub enum SelectError {
    /// The chosen filter mode has nothing to choose from.
    #[error("no {} detected", .mode.noun())]
    EmptyChoiceSet {
        /// The filter mode.
        mode: FilterMode,
    },

    /// The selector returned an identifier that wasn't offered.
    #[error("selector returned unknown choice {id} for prompt `{message}`")]
    UnknownChoice {
        /// The identifier returned.
        id: ChoiceId,

        /// The prompt message.
        message: String,
    },

    /// The selector returned nothing for a prompt that requires a choice.
    #[error("selector returned no choice for prompt `{message}`")]
    NothingChosen {
        /// The prompt message.
        message: String,
    },

    /// The selector failed.
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// An error that occurred while translating a selection into a filter expression.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TranslateError {
    /// Nothing was selected.
    #[error("no {} were selected", .mode.noun())]
    EmptySelection {
        /// The filter mode.
        mode: FilterMode,
    },

    /// A selected tag isn't present in the tag index.
    #[error("tag `{tag}` is not carried by any test")]
    UnknownTag {
        /// The tag.
        tag: String,
    },
}

/// An error that occurred while launching the test runner.
#[derive(Debug, Error)]
#[error("failed to execute `{command}`")]
pub struct LaunchError {
    command: String,
    #[source]
    err: std::io::Error,
}

impl LaunchError {
    pub(crate) fn new(command: impl Into<String>, err: std::io::Error) -> Self {
        Self {
            command: command.into(),
            err,
        }
    }

    /// Returns the command that failed to launch.
    pub fn command(&self) -> &str {
        &self.command
    }
}
