// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building and launching test runner command lines.

use crate::{
    errors::{LaunchError, RunnerCommandParseError},
    test_filter::FilterExpression,
};
use std::fmt;
use tracing::debug;

/// The arguments that put the runner into listing mode.
pub const LIST_ARGS: [&str; 2] = ["--list", "--reporter=json"];

/// The command that starts the test runner, e.g. `npx playwright test`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunnerCommand {
    program: String,
    base_args: Vec<String>,
}

impl RunnerCommand {
    /// Creates a new runner command from its words. The first word is the program.
    pub fn new(words: impl IntoIterator<Item = impl Into<String>>) -> Result<Self, RunnerCommandParseError> {
        let mut words = words.into_iter().map(Into::into);
        let program = words.next().ok_or(RunnerCommandParseError::Empty)?;
        if program.is_empty() {
            return Err(RunnerCommandParseError::Empty);
        }
        Ok(Self {
            program,
            base_args: words.collect(),
        })
    }

    /// Parses a runner command from a string, splitting it the way a POSIX shell would.
    pub fn from_shell_str(input: &str) -> Result<Self, RunnerCommandParseError> {
        let words = shell_words::split(input).map_err(|err| RunnerCommandParseError::Split {
            input: input.to_owned(),
            err,
        })?;
        Self::new(words)
    }

    /// The program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program before any others.
    pub fn base_args(&self) -> &[String] {
        &self.base_args
    }

    /// Returns the invocation that lists tests as a JSON report.
    pub fn list_invocation(&self, passthrough: &[String]) -> RunnerInvocation {
        let mut invocation = self.invocation();
        invocation.add_args(LIST_ARGS);
        invocation.add_args(passthrough.iter().map(String::as_str));
        invocation
    }

    /// Returns the invocation that runs the selected tests.
    ///
    /// Arguments are ordered as pass-through arguments, then the filter, then the arguments that
    /// were held back from the listing invocation.
    pub fn run_invocation(
        &self,
        passthrough: &[String],
        filter: &FilterExpression,
        set_aside: &[String],
    ) -> RunnerInvocation {
        let mut invocation = self.invocation();
        invocation.add_args(passthrough.iter().map(String::as_str));
        invocation.args.extend(filter.to_args());
        invocation.add_args(set_aside.iter().map(String::as_str));
        invocation
    }

    fn invocation(&self) -> RunnerInvocation {
        RunnerInvocation {
            program: self.program.clone(),
            args: self.base_args.clone(),
        }
    }
}

impl Default for RunnerCommand {
    fn default() -> Self {
        Self {
            program: "npx".to_owned(),
            base_args: vec!["playwright".to_owned(), "test".to_owned()],
        }
    }
}

/// A complete runner command line: the program and every argument passed to it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunnerInvocation {
    program: String,
    args: Vec<String>,
}

impl RunnerInvocation {
    /// The program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments passed to the program.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The program followed by its arguments.
    pub fn all_args(&self) -> Vec<&str> {
        let mut all_args = vec![self.program.as_str()];
        all_args.extend(self.args.iter().map(String::as_str));
        all_args
    }

    fn add_args<'a>(&mut self, args: impl IntoIterator<Item = &'a str>) -> &mut Self {
        self.args.extend(args.into_iter().map(str::to_owned));
        self
    }

    /// Returns a [`duct::Expression`] for this invocation.
    ///
    /// The program is looked up on `PATH`.
    pub fn to_expression(&self) -> duct::Expression {
        duct::cmd(self.program.as_str(), self.args.iter().map(String::as_str))
    }
}

impl fmt::Display for RunnerInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_words::join(self.all_args()))
    }
}

/// Runs the selected tests.
pub trait Launcher {
    /// Runs `invocation` to completion, returning its exit code.
    ///
    /// The exit code is `None` if the process was terminated by a signal.
    fn launch(&mut self, invocation: &RunnerInvocation) -> Result<Option<i32>, LaunchError>;
}

/// A [`Launcher`] that runs the invocation as a child process sharing this process's terminal.
#[derive(Clone, Debug, Default)]
pub struct DuctLauncher;

impl Launcher for DuctLauncher {
    fn launch(&mut self, invocation: &RunnerInvocation) -> Result<Option<i32>, LaunchError> {
        debug!("launching `{invocation}`");
        let output = invocation
            .to_expression()
            .unchecked()
            .run()
            .map_err(|err| LaunchError::new(invocation.to_string(), err))?;
        debug!("`{}` exited with {:?}", invocation.program(), output.status);
        Ok(output.status.code())
    }
}
