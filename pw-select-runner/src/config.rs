// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration support for pw-select.

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    invocation::RunnerCommand,
    test_filter::{FilterGrammar, FilterSettings},
};
use camino::Utf8Path;
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use tracing::debug;

/// Overall configuration for pw-select.
#[derive(Clone, Debug)]
pub struct PwSelectConfig {
    runner_command: RunnerCommand,
    grammar: FilterGrammar,
    filter_settings: FilterSettings,
    title_separator: String,
}

impl PwSelectConfig {
    /// The default location of the config within a directory: `.config/pw-select.toml`.
    pub const CONFIG_PATH: &'static str = ".config/pw-select.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Project-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the given file, or if not specified from `.config/pw-select.toml`
    /// within `dir`.
    ///
    /// A file passed in explicitly must exist. If none is passed in and `dir` doesn't have
    /// `.config/pw-select.toml`, the default config is used.
    pub fn from_sources(
        dir: impl AsRef<Utf8Path>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = dir.as_ref().join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };
        debug!("reading config from `{config_file}`");

        let builder = Self::make_default_config().add_source(source);
        let inner = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(config_file.clone(), kind))?;
        Self::from_impl(inner).map_err(|kind| ConfigParseError::new(config_file, kind))
    }

    /// The command that starts the test runner.
    pub fn runner_command(&self) -> &RunnerCommand {
        &self.runner_command
    }

    /// The grammar selected tests are passed to the runner in.
    pub fn grammar(&self) -> FilterGrammar {
        self.grammar
    }

    /// Settings for writing filter expressions.
    pub fn filter_settings(&self) -> &FilterSettings {
        &self.filter_settings
    }

    /// The separator shown between titles when listing tests.
    pub fn title_separator(&self) -> &str {
        &self.title_separator
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<PwSelectConfigImpl, ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|err| ConfigParseErrorKind::BuildError(Box::new(err)))?;

        serde_path_to_error::deserialize(config)
            .map_err(|err| ConfigParseErrorKind::DeserializeError(Box::new(err)))
    }

    fn from_impl(inner: PwSelectConfigImpl) -> Result<Self, ConfigParseErrorKind> {
        let PwSelectConfigImpl { runner, filter } = inner;
        let runner_command = match runner.command {
            Some(words) => {
                RunnerCommand::new(words).map_err(ConfigParseErrorKind::RunnerCommand)?
            }
            None => RunnerCommand::default(),
        };
        Ok(Self {
            runner_command,
            grammar: filter.grammar,
            filter_settings: FilterSettings {
                tag_marker: filter.tag_marker,
                grep_flag: filter.grep_flag,
            },
            title_separator: filter.title_separator,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PwSelectConfigImpl {
    #[serde(default)]
    runner: RunnerConfigImpl,
    filter: FilterConfigImpl,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RunnerConfigImpl {
    // Arrays are merged element by element across config layers, so the default command is not
    // written into the default config.
    #[serde(default)]
    command: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FilterConfigImpl {
    grammar: FilterGrammar,
    tag_marker: String,
    grep_flag: String,
    title_separator: String,
}
