// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level application and command routing.

use super::select::SelectSettings;
use crate::{
    ExpectedError, Result,
    args::SplitArgs,
    output::{OutputContext, OutputOpts, OutputWriter},
    prompt::DialoguerSelector,
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Subcommand, ValueEnum};
use pw_select_runner::{
    config::PwSelectConfig,
    invocation::{DuctLauncher, RunnerCommand},
    report_source::ReportSource,
    test_filter::{FilterGrammar, FilterMode},
};

/// Interactively select Playwright specs, tests or tags to run.
///
/// Arguments pw-select doesn't recognize are forwarded to the test runner.
#[derive(Debug, clap::Parser)]
#[command(
    version,
    bin_name = "pw-select",
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct PwSelectApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl PwSelectApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(
        self,
        cli_args: SplitArgs,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        match self.command {
            Command::Run(opts) => opts.exec(cli_args, output, output_writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List tests, pick the ones to run and run them
    ///
    /// Flags not listed here are passed to `playwright test` unchanged, both when listing tests
    /// and when running the selection. `--reporter` and the UI mode flags are only passed when
    /// running the selection.
    Run(RunOpts),
}

#[derive(Debug, Args)]
struct RunOpts {
    /// Filter by spec files, skipping the mode prompt
    #[arg(long, conflicts_with_all = ["titles", "tags"], help_heading = "Selection")]
    specs: bool,

    /// Filter by test titles, skipping the mode prompt
    #[arg(long, conflicts_with = "tags", help_heading = "Selection")]
    titles: bool,

    /// Filter by tags, skipping the mode prompt
    #[arg(long, help_heading = "Selection")]
    tags: bool,

    /// Read the test report from this file instead of listing tests
    #[arg(long, value_name = "PATH", help_heading = "Selection")]
    json_data_path: Option<Utf8PathBuf>,

    /// Pressing Enter submits the highlighted choice
    #[arg(long, env = "PW_SELECT_SUBMIT_FOCUSED", help_heading = "Selection")]
    submit_focused: bool,

    /// How the selection is passed to the runner [default: from config]
    #[arg(long, value_enum, value_name = "GRAMMAR", help_heading = "Runner options")]
    grammar: Option<GrammarOpt>,

    /// Command that starts the test runner [default: from config]
    #[arg(
        long,
        value_name = "COMMAND",
        env = "PW_SELECT_RUNNER",
        help_heading = "Runner options"
    )]
    runner: Option<String>,

    /// pw-select config file [default: .config/pw-select.toml]
    #[arg(
        long,
        value_name = "PATH",
        env = "PW_SELECT_CONFIG",
        help_heading = "Config options"
    )]
    select_config: Option<Utf8PathBuf>,
}

impl RunOpts {
    fn exec(
        self,
        cli_args: SplitArgs,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let cwd = current_dir()?;
        let settings = self.into_settings(&cwd, cli_args)?;
        let mut selector = DialoguerSelector::new(settings.submit_focused, output.colorize_prompts());
        settings.run(&mut selector, &mut DuctLauncher, output, output_writer)
    }

    fn mode(&self) -> Option<FilterMode> {
        if self.specs {
            Some(FilterMode::Specs)
        } else if self.titles {
            Some(FilterMode::Titles)
        } else if self.tags {
            Some(FilterMode::Tags)
        } else {
            None
        }
    }

    fn into_settings(self, cwd: &Utf8Path, cli_args: SplitArgs) -> Result<SelectSettings> {
        let mode = self.mode();
        let config = PwSelectConfig::from_sources(cwd, self.select_config.as_deref())?;

        let runner_command = match &self.runner {
            Some(runner) => RunnerCommand::from_shell_str(runner)
                .map_err(|err| ExpectedError::RunnerCommandParseError { err })?,
            None => config.runner_command().clone(),
        };
        let grammar = self
            .grammar
            .map_or_else(|| config.grammar(), FilterGrammar::from);

        let SplitArgs {
            passthrough,
            set_aside,
            ..
        } = cli_args;
        let report_source = match self.json_data_path {
            Some(path) => ReportSource::File(path),
            None => ReportSource::Runner(runner_command.list_invocation(&passthrough)),
        };

        Ok(SelectSettings {
            mode,
            grammar,
            submit_focused: self.submit_focused,
            report_source,
            runner_command,
            filter_settings: config.filter_settings().clone(),
            title_separator: config.title_separator().to_owned(),
            passthrough,
            set_aside,
        })
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum GrammarOpt {
    /// Target tests by `file:line`
    Address,
    /// A `--grep` regular expression over titles and tags
    Pattern,
}

impl From<GrammarOpt> for FilterGrammar {
    fn from(opt: GrammarOpt) -> Self {
        match opt {
            GrammarOpt::Address => Self::Address,
            GrammarOpt::Pattern => Self::Pattern,
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(|err| ExpectedError::CurrentDirFailed { err })?;
    Utf8PathBuf::try_from(cwd).map_err(|err| ExpectedError::CurrentDirInvalidUtf8 { err })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> (PwSelectApp, SplitArgs) {
        let split = SplitArgs::new(args.iter().map(|arg| (*arg).to_owned()));
        let app = PwSelectApp::try_parse_from(&split.claimed).expect("arguments parse");
        (app, split)
    }

    fn settings(args: &[&str], cwd: &Utf8Path) -> Result<SelectSettings> {
        let (app, split) = parse(args);
        let Command::Run(opts) = app.command;
        opts.into_settings(cwd, split)
    }

    #[test]
    fn verify_app() {
        PwSelectApp::command().debug_assert();
    }

    #[test]
    fn mode_flags_conflict() {
        for args in [
            ["pw-select", "run", "--specs", "--tags"],
            ["pw-select", "run", "--titles", "--specs"],
            ["pw-select", "run", "--tags", "--titles"],
        ] {
            let err = PwSelectApp::try_parse_from(args).expect_err("modes conflict");
            assert_eq!(
                err.kind(),
                clap::error::ErrorKind::ArgumentConflict,
                "{args:?}"
            );
        }
    }

    #[test]
    fn settings_from_defaults() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let settings = settings(
            &["pw-select", "run", "--project", "chromium", "--reporter=dot"],
            dir.path(),
        )
        .expect("settings resolve");

        assert_eq!(settings.mode, None);
        assert_eq!(settings.grammar, FilterGrammar::Address);
        assert_eq!(settings.runner_command, RunnerCommand::default());
        assert_eq!(settings.passthrough, ["--project", "chromium"]);
        assert_eq!(settings.set_aside, ["--reporter=dot"]);
        let ReportSource::Runner(invocation) = &settings.report_source else {
            panic!("expected a runner source, got {:?}", settings.report_source);
        };
        // Displayed the way a shell would need it.
        assert_eq!(
            invocation.to_string(),
            "npx playwright test --list '--reporter=json' --project chromium"
        );
    }

    #[test]
    fn settings_from_flags() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let settings = settings(
            &[
                "pw-select",
                "run",
                "--tags",
                "--grammar",
                "pattern",
                "--runner=yarn playwright test",
                "--json-data-path",
                "report.json",
                "--submit-focused",
            ],
            dir.path(),
        )
        .expect("settings resolve");

        assert_eq!(settings.mode, Some(FilterMode::Tags));
        assert_eq!(settings.grammar, FilterGrammar::Pattern);
        assert!(settings.submit_focused);
        assert_eq!(settings.runner_command.program(), "yarn");
        assert_eq!(
            settings.report_source,
            ReportSource::File("report.json".into())
        );
    }

    #[test]
    fn invalid_runner_flag() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let err = settings(&["pw-select", "run", "--runner", "npx 'playwright"], dir.path())
            .expect_err("unterminated quote");
        assert!(
            matches!(err, ExpectedError::RunnerCommandParseError { .. }),
            "{err:?}"
        );
    }
}
