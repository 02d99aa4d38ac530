// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `run` pipeline: list, choose, translate, launch.

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputWriter},
};
use owo_colors::OwoColorize;
use pw_select_runner::{
    choices::{Selector, choose, choose_mode},
    invocation::{Launcher, RunnerCommand},
    list::TestIndex,
    report_source::ReportSource,
    test_filter::{FilterGrammar, FilterMode, FilterSettings, FilterTranslator},
};
use std::{fmt, io::Write};
use tracing::{debug, info};

/// Everything a `run` needs, resolved from the config and the command line.
#[derive(Clone, Debug)]
pub(crate) struct SelectSettings {
    /// The filter mode, if given on the command line. Otherwise the user is asked.
    pub(crate) mode: Option<FilterMode>,
    pub(crate) grammar: FilterGrammar,
    pub(crate) submit_focused: bool,
    pub(crate) report_source: ReportSource,
    pub(crate) runner_command: RunnerCommand,
    pub(crate) filter_settings: FilterSettings,
    pub(crate) title_separator: String,
    pub(crate) passthrough: Vec<String>,
    pub(crate) set_aside: Vec<String>,
}

impl SelectSettings {
    /// Runs the pipeline, returning the runner's exit code.
    pub(crate) fn run(
        &self,
        selector: &mut dyn Selector,
        launcher: &mut dyn Launcher,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let styles = output.stdout_styles();
        write_line(
            output_writer,
            format_args!("\n{}\n", "🎭 Playwright select".style(styles.bold)),
        )?;

        let report = self.report_source.acquire()?;
        let index = TestIndex::new(&report)?;
        debug!(
            "indexed {} tests in {} spec files with {} tags",
            index.tests().count(),
            index.spec_files().len(),
            index.tag_index().len()
        );

        let mode = match self.mode {
            Some(mode) => mode,
            None => choose_mode(selector)?.ok_or(ExpectedError::UserCancelled)?,
        };
        let selection = choose(selector, &index, mode, &self.title_separator)?
            .ok_or(ExpectedError::UserCancelled)?;
        debug!("selected {} {}", selection.len(), mode.noun());

        let translator = FilterTranslator::new(self.grammar, index.tag_index(), &self.filter_settings);
        let filter = translator.translate(&selection)?;
        let invocation =
            self.runner_command
                .run_invocation(&self.passthrough, &filter, &self.set_aside);

        write_line(
            output_writer,
            format_args!("{} {invocation}\n", "Arguments:".style(styles.bold)),
        )?;

        match launcher.launch(&invocation)? {
            Some(code) => Ok(code),
            None => {
                info!("`{}` was terminated by a signal", invocation.program());
                Ok(1)
            }
        }
    }
}

fn write_line(output_writer: &mut OutputWriter, line: fmt::Arguments<'_>) -> Result<()> {
    let mut writer = output_writer.stdout_writer();
    writeln!(writer, "{line}")
        .and_then(|()| writer.flush())
        .map_err(|err| ExpectedError::WriteError { err })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Color;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use pw_select_metadata::PwSelectExitCode;
    use pw_select_runner::{
        choices::{ChoiceId, ChoicePrompt},
        errors::{LaunchError, SelectorError},
        invocation::RunnerInvocation,
    };

    /// Two spec files: `a.spec.ts` with a tagged test, `b.spec.ts` with an untagged one.
    static TWO_FILES: &str = indoc! {r#"
        {
            "suites": [
                {
                    "title": "a.spec.ts",
                    "file": "a.spec.ts",
                    "specs": [{ "title": "T1", "line": 3, "tags": ["smoke"] }]
                },
                {
                    "title": "b.spec.ts",
                    "file": "b.spec.ts",
                    "specs": [{ "title": "T2", "line": 5, "tags": [] }]
                }
            ],
            "errors": []
        }
    "#};

    /// Answers prompts by label and records the prompts it was shown.
    #[derive(Default)]
    struct ScriptedSelector {
        answers: Vec<Option<Vec<&'static str>>>,
        seen: Vec<String>,
    }

    impl ScriptedSelector {
        fn new(answers: impl IntoIterator<Item = Option<Vec<&'static str>>>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                seen: Vec::new(),
            }
        }
    }

    impl Selector for ScriptedSelector {
        fn select(
            &mut self,
            prompt: &ChoicePrompt,
        ) -> Result<Option<Vec<ChoiceId>>, SelectorError> {
            self.seen.push(prompt.message.clone());
            let answer = self.answers.remove(0);
            Ok(answer.map(|labels| {
                labels
                    .into_iter()
                    .map(|label| {
                        prompt
                            .choices
                            .iter()
                            .find(|choice| choice.label == label)
                            .unwrap_or_else(|| panic!("`{label}` is not offered"))
                            .id
                    })
                    .collect()
            }))
        }
    }

    /// Records invocations instead of running them.
    struct RecordingLauncher {
        exit_code: Option<i32>,
        launched: Vec<RunnerInvocation>,
    }

    impl RecordingLauncher {
        fn exiting_with(exit_code: Option<i32>) -> Self {
            Self {
                exit_code,
                launched: Vec::new(),
            }
        }
    }

    impl Launcher for RecordingLauncher {
        fn launch(&mut self, invocation: &RunnerInvocation) -> Result<Option<i32>, LaunchError> {
            self.launched.push(invocation.clone());
            Ok(self.exit_code)
        }
    }

    struct Fixture {
        // Holds the report file.
        _dir: Utf8TempDir,
        settings: SelectSettings,
    }

    impl Fixture {
        fn new(report: &str) -> Self {
            let dir = Utf8TempDir::new().expect("created temp dir");
            let path = dir.path().join("report.json");
            std::fs::write(&path, report).expect("wrote report");
            let settings = SelectSettings {
                mode: None,
                grammar: FilterGrammar::Address,
                submit_focused: false,
                report_source: ReportSource::File(path),
                runner_command: RunnerCommand::default(),
                filter_settings: FilterSettings::default(),
                title_separator: " › ".to_owned(),
                passthrough: Vec::new(),
                set_aside: Vec::new(),
            };
            Self {
                _dir: dir,
                settings,
            }
        }

        fn run(
            &self,
            selector: &mut ScriptedSelector,
            launcher: &mut RecordingLauncher,
        ) -> (Result<i32>, String) {
            let output = OutputContext {
                color: Color::Never,
            };
            let mut output_writer = OutputWriter::Test { stdout: Vec::new() };
            let result = self
                .settings
                .run(selector, launcher, output, &mut output_writer);
            let OutputWriter::Test { stdout } = output_writer else {
                unreachable!("writer is a test writer");
            };
            let stdout = String::from_utf8(stdout).expect("stdout is UTF-8");
            (result, stdout)
        }
    }

    fn launched_args(launcher: &RecordingLauncher) -> Vec<Vec<&str>> {
        launcher
            .launched
            .iter()
            .map(RunnerInvocation::all_args)
            .collect()
    }

    #[test]
    fn selected_spec_file_only() {
        let fixture = Fixture::new(TWO_FILES);
        let mut selector = ScriptedSelector::new([Some(vec!["Specs"]), Some(vec!["a.spec.ts"])]);
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, stdout) = fixture.run(&mut selector, &mut launcher);
        assert_eq!(result.expect("run succeeds"), 0);
        assert_eq!(
            selector.seen,
            vec![
                "Choose to filter by specs, specific test titles or tags:",
                "Select specs to run:"
            ]
        );
        assert_eq!(
            launched_args(&launcher),
            vec![vec!["npx", "playwright", "test", "a.spec.ts"]]
        );
        assert_eq!(
            stdout,
            "\n🎭 Playwright select\n\nArguments: npx playwright test a.spec.ts\n\n"
        );
    }

    #[test]
    fn deeply_nested_tag() {
        let mut fixture = Fixture::new(indoc! {r#"
            {
                "suites": [{
                    "file": "deep.spec.ts",
                    "suites": [{
                        "title": "Root",
                        "line": 1,
                        "suites": [{
                            "title": "Mid",
                            "line": 2,
                            "suites": [{
                                "title": "Leaf",
                                "line": 3,
                                "specs": [
                                    { "title": "deep test", "line": 4, "tags": ["x"] },
                                    { "title": "shallow test", "line": 8, "tags": ["y"] }
                                ]
                            }]
                        }]
                    }]
                }]
            }
        "#});
        fixture.settings.mode = Some(FilterMode::Tags);
        let mut selector = ScriptedSelector::new([Some(vec!["x"])]);
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, _) = fixture.run(&mut selector, &mut launcher);
        result.expect("run succeeds");
        // The mode prompt is skipped.
        assert_eq!(selector.seen, vec!["Select tags to run:"]);
        assert_eq!(
            launched_args(&launcher),
            vec![vec!["npx", "playwright", "test", "deep.spec.ts:4"]]
        );
    }

    #[test]
    fn same_title_in_two_files() {
        let mut fixture = Fixture::new(indoc! {r#"
            {
                "suites": [
                    {
                        "file": "firstDir/another.spec.js",
                        "specs": [{ "title": "outside test", "line": 37, "tags": ["play"] }]
                    },
                    {
                        "file": "secondDir/example.spec.js",
                        "specs": [{ "title": "outside test", "line": 12, "tags": ["play"] }]
                    }
                ]
            }
        "#});
        fixture.settings.mode = Some(FilterMode::Titles);
        let mut selector = ScriptedSelector::new([Some(vec![
            "secondDir/example.spec.js › outside test",
            "firstDir/another.spec.js › outside test",
        ])]);
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, _) = fixture.run(&mut selector, &mut launcher);
        result.expect("run succeeds");
        assert_eq!(
            launched_args(&launcher),
            vec![vec![
                "npx",
                "playwright",
                "test",
                "secondDir/example.spec.js:12",
                "firstDir/another.spec.js:37"
            ]]
        );
    }

    #[test]
    fn no_tags_detected() {
        let mut fixture = Fixture::new(TWO_FILES.replace(r#"["smoke"]"#, "[]").as_str());
        fixture.settings.mode = Some(FilterMode::Tags);
        let mut selector = ScriptedSelector::default();
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, _) = fixture.run(&mut selector, &mut launcher);
        let err = result.expect_err("there are no tags");
        assert!(
            matches!(err, ExpectedError::NoChoices { mode: FilterMode::Tags }),
            "{err:?}"
        );
        // Nothing to choose from is a clean exit.
        assert_eq!(err.process_exit_code(), PwSelectExitCode::OK);
        assert!(selector.seen.is_empty(), "selector was not consulted");
        assert!(launcher.launched.is_empty());
    }

    #[test]
    fn cancelled_prompts() {
        let fixture = Fixture::new(TWO_FILES);

        // Cancelled at the mode prompt, then at the list prompt.
        for answers in [vec![None], vec![Some(vec!["Tags"]), None]] {
            let mut selector = ScriptedSelector::new(answers);
            let mut launcher = RecordingLauncher::exiting_with(Some(0));

            let (result, stdout) = fixture.run(&mut selector, &mut launcher);
            let err = result.expect_err("prompt was cancelled");
            assert!(matches!(err, ExpectedError::UserCancelled), "{err:?}");
            assert_eq!(err.process_exit_code(), PwSelectExitCode::USER_CANCELLED);
            assert!(launcher.launched.is_empty());
            assert!(!stdout.contains("Arguments:"), "{stdout}");
        }
    }

    #[test]
    fn pattern_grammar_argument_order() {
        let mut fixture = Fixture::new(TWO_FILES);
        fixture.settings.mode = Some(FilterMode::Tags);
        fixture.settings.grammar = FilterGrammar::Pattern;
        fixture.settings.passthrough = vec!["--project".to_owned(), "chromium".to_owned()];
        fixture.settings.set_aside = vec!["--reporter=dot".to_owned()];
        let mut selector = ScriptedSelector::new([Some(vec!["smoke"])]);
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, stdout) = fixture.run(&mut selector, &mut launcher);
        result.expect("run succeeds");
        assert_eq!(
            launched_args(&launcher),
            vec![vec![
                "npx",
                "playwright",
                "test",
                "--project",
                "chromium",
                "--grep",
                "@smoke",
                "--reporter=dot"
            ]]
        );
        assert!(
            stdout.contains(
                "Arguments: npx playwright test --project chromium --grep @smoke '--reporter=dot'\n"
            ),
            "{stdout}"
        );
    }

    #[test]
    fn selected_suite() {
        let mut fixture = Fixture::new(indoc! {r#"
            {
                "suites": [{
                    "file": "a.spec.ts",
                    "suites": [{
                        "title": "Login",
                        "line": 3,
                        "specs": [{ "title": "ok", "line": 4 }]
                    }]
                }]
            }
        "#});
        fixture.settings.mode = Some(FilterMode::Titles);
        let mut selector = ScriptedSelector::new([Some(vec!["a.spec.ts › Login"])]);
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, _) = fixture.run(&mut selector, &mut launcher);
        result.expect("run succeeds");
        assert_eq!(
            launched_args(&launcher),
            vec![vec!["npx", "playwright", "test", "a.spec.ts:3"]]
        );
    }

    #[test]
    fn runner_exit_code_is_returned() {
        let mut fixture = Fixture::new(TWO_FILES);
        fixture.settings.mode = Some(FilterMode::Specs);

        let mut selector = ScriptedSelector::new([Some(vec!["b.spec.ts"])]);
        let mut launcher = RecordingLauncher::exiting_with(Some(1));
        let (result, _) = fixture.run(&mut selector, &mut launcher);
        assert_eq!(result.expect("runner was launched"), 1);

        // Terminated by a signal.
        let mut selector = ScriptedSelector::new([Some(vec!["b.spec.ts"])]);
        let mut launcher = RecordingLauncher::exiting_with(None);
        let (result, _) = fixture.run(&mut selector, &mut launcher);
        assert_eq!(result.expect("runner was launched"), 1);
    }

    #[test]
    fn empty_selection_is_not_launched() {
        let mut fixture = Fixture::new(TWO_FILES);
        fixture.settings.mode = Some(FilterMode::Titles);
        let mut selector = ScriptedSelector::new([Some(vec![])]);
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, _) = fixture.run(&mut selector, &mut launcher);
        let err = result.expect_err("nothing was selected");
        assert_eq!(err.process_exit_code(), PwSelectExitCode::INVALID_SELECTION);
        assert!(launcher.launched.is_empty());
    }

    #[test]
    fn empty_report() {
        let fixture = Fixture::new(r#"{ "suites": [], "errors": [] }"#);
        let mut selector = ScriptedSelector::default();
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, _) = fixture.run(&mut selector, &mut launcher);
        let err = result.expect_err("no tests");
        assert!(matches!(err, ExpectedError::NoTestsFound), "{err:?}");
        assert_eq!(err.process_exit_code(), PwSelectExitCode::OK);
        assert!(selector.seen.is_empty());
    }

    #[test]
    fn malformed_report() {
        let fixture = Fixture::new(r#"{ "suites": [{ "specs": [] }] }"#);
        let mut selector = ScriptedSelector::default();
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, _) = fixture.run(&mut selector, &mut launcher);
        let err = result.expect_err("top-level suite has no file");
        assert_eq!(
            err.process_exit_code(),
            PwSelectExitCode::REPORT_VALIDATION_FAILED
        );
    }

    #[test]
    fn fixture_report() {
        let mut fixture = Fixture::new(include_str!("../../../fixtures/default.json"));
        fixture.settings.mode = Some(FilterMode::Tags);
        let mut selector = ScriptedSelector::new([Some(vec!["smoke"])]);
        let mut launcher = RecordingLauncher::exiting_with(Some(0));

        let (result, _) = fixture.run(&mut selector, &mut launcher);
        result.expect("run succeeds");
        assert_eq!(
            launched_args(&launcher),
            vec![vec![
                "npx",
                "playwright",
                "test",
                "firstDir/another.spec.js:5",
                "firstDir/another.spec.js:12",
                "secondDir/example.spec.js:37",
                "secondDir/example.spec.js:12"
            ]]
        );
    }
}
