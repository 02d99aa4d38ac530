// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translating a user's selection into arguments the test runner filters on.
//!
//! The main structure in this module is [`FilterTranslator`], which turns a [`Selection`] into a
//! [`FilterExpression`] in one of two grammars:
//!
//! * [`FilterGrammar::Address`] (the default) targets tests by `file:line`, passed as positional
//!   arguments. Tags are resolved through the [`TagIndex`] to the addresses carrying them.
//! * [`FilterGrammar::Pattern`] builds a single `|`-separated regular expression passed to the
//!   runner's grep flag. Tests are matched by their space-joined title path, tags by their
//!   marker-prefixed text.
//!
//! In both grammars, spec files are passed as positional arguments.

use crate::{
    errors::TranslateError,
    list::{AddressableNode, TagIndex, TestAddress},
};
use camino::Utf8PathBuf;
use indexmap::IndexSet;
use itertools::Itertools;
use serde::Deserialize;
use std::fmt;

/// Which list the user filters tests by.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FilterMode {
    /// Whole spec files.
    Specs,

    /// Individual tests, by title.
    Titles,

    /// Tags.
    Tags,
}

impl FilterMode {
    /// All modes, in the order they are offered.
    pub const ALL: [Self; 3] = [Self::Specs, Self::Titles, Self::Tags];

    /// The label shown for this mode when the user is asked to choose one.
    pub fn label(self) -> &'static str {
        match self {
            Self::Specs => "Specs",
            Self::Titles => "Test titles",
            Self::Tags => "Tags",
        }
    }

    /// The plural noun for the things chosen in this mode.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Specs => "specs",
            Self::Titles => "tests",
            Self::Tags => "tags",
        }
    }
}

/// The things a user selected, in the order they were selected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selection {
    /// Spec files.
    Files(Vec<Utf8PathBuf>),

    /// Individual tests.
    Tests(Vec<AddressableNode>),

    /// Tags, without the tag marker.
    Tags(Vec<String>),
}

impl Selection {
    /// The mode this selection was made in.
    pub fn mode(&self) -> FilterMode {
        match self {
            Self::Files(_) => FilterMode::Specs,
            Self::Tests(_) => FilterMode::Titles,
            Self::Tags(_) => FilterMode::Tags,
        }
    }

    /// Returns the number of selected items.
    pub fn len(&self) -> usize {
        match self {
            Self::Files(files) => files.len(),
            Self::Tests(tests) => tests.len(),
            Self::Tags(tags) => tags.len(),
        }
    }

    /// Returns true if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The grammar a [`FilterExpression`] is written in.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterGrammar {
    /// Explicit `file:line` targets.
    #[default]
    Address,

    /// A `|`-separated pattern for the runner's grep flag.
    Pattern,
}

impl fmt::Display for FilterGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => write!(f, "address"),
            Self::Pattern => write!(f, "pattern"),
        }
    }
}

/// Settings that control how selections are written out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterSettings {
    /// The marker that tags are written with in test titles, e.g. `@`.
    pub tag_marker: String,

    /// The flag that introduces a pattern, e.g. `--grep`.
    pub grep_flag: String,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            tag_marker: "@".to_owned(),
            grep_flag: "--grep".to_owned(),
        }
    }
}

/// Arguments that restrict the runner to the selected tests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterExpression {
    /// Positional targets: spec files or `file:line` addresses.
    Targets(Vec<String>),

    /// A pattern passed to a grep-style flag.
    Pattern {
        /// The flag, e.g. `--grep`.
        flag: String,

        /// The `|`-separated pattern.
        pattern: String,
    },
}

impl FilterExpression {
    /// Returns the expression as command-line arguments.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::Targets(targets) => targets.clone(),
            Self::Pattern { flag, pattern } => vec![flag.clone(), pattern.clone()],
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_args().iter().join(" "))
    }
}

const PATTERN_SEPARATOR: &str = "|";

/// Translates selections into [`FilterExpression`]s.
#[derive(Clone, Debug)]
pub struct FilterTranslator<'a> {
    grammar: FilterGrammar,
    tag_index: &'a TagIndex,
    settings: &'a FilterSettings,
}

impl<'a> FilterTranslator<'a> {
    /// Creates a new translator.
    pub fn new(grammar: FilterGrammar, tag_index: &'a TagIndex, settings: &'a FilterSettings) -> Self {
        Self {
            grammar,
            tag_index,
            settings,
        }
    }

    /// Returns the grammar this translator writes.
    pub fn grammar(&self) -> FilterGrammar {
        self.grammar
    }

    /// Translates a selection.
    ///
    /// Items appear in the expression in selection order. Selecting nothing is an error rather
    /// than an expression that matches every test.
    pub fn translate(&self, selection: &Selection) -> Result<FilterExpression, TranslateError> {
        let expr = match (self.grammar, selection) {
            (_, Selection::Files(files)) => {
                FilterExpression::Targets(unique_items(files.iter().map(|file| file.to_string())))
            }
            (FilterGrammar::Address, Selection::Tests(tests)) => FilterExpression::Targets(
                unique_items(tests.iter().map(|node| node.address().to_string())),
            ),
            (FilterGrammar::Address, Selection::Tags(tags)) => {
                let mut targets = IndexSet::new();
                for tag in tags {
                    let addresses = self.resolve_tag(tag)?;
                    targets.extend(addresses.iter().map(ToString::to_string));
                }
                FilterExpression::Targets(targets.into_iter().collect())
            }
            (FilterGrammar::Pattern, Selection::Tests(tests)) => {
                self.pattern(tests.iter().map(AddressableNode::search_term))
            }
            (FilterGrammar::Pattern, Selection::Tags(tags)) => {
                let mut items = Vec::with_capacity(tags.len());
                for tag in tags {
                    self.resolve_tag(tag)?;
                    items.push(self.marked_tag(tag));
                }
                self.pattern(items)
            }
        };

        let is_empty = match &expr {
            FilterExpression::Targets(targets) => targets.is_empty(),
            FilterExpression::Pattern { pattern, .. } => pattern.is_empty(),
        };
        if is_empty {
            return Err(TranslateError::EmptySelection {
                mode: selection.mode(),
            });
        }
        Ok(expr)
    }

    fn resolve_tag(&self, tag: &str) -> Result<&'a IndexSet<TestAddress>, TranslateError> {
        let tag = tag.strip_prefix(self.settings.tag_marker.as_str()).unwrap_or(tag);
        self.tag_index
            .get(tag)
            .ok_or_else(|| TranslateError::UnknownTag {
                tag: tag.to_owned(),
            })
    }

    fn marked_tag(&self, tag: &str) -> String {
        if tag.starts_with(self.settings.tag_marker.as_str()) {
            tag.to_owned()
        } else {
            format!("{}{tag}", self.settings.tag_marker)
        }
    }

    fn pattern(&self, items: impl IntoIterator<Item = String>) -> FilterExpression {
        let pattern = unique_items(items)
            .iter()
            .map(|item| regex::escape(item))
            .join(PATTERN_SEPARATOR);
        FilterExpression::Pattern {
            flag: self.settings.grep_flag.clone(),
            pattern,
        }
    }
}

// Drops empty items and later repeats, keeping selection order.
fn unique_items(items: impl IntoIterator<Item = String>) -> Vec<String> {
    items
        .into_iter()
        .filter(|item| !item.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
