// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The lists of choices offered to the user, and the [`Selector`] seam through which the user
//! picks from them.
//!
//! Choices are identified by [`ChoiceId`]s rather than by their labels: two tests may share a
//! title path, and a selector only ever hands identifiers back. Mapping identifiers back to spec
//! files, tests or tags is done here, so selectors never need to know what they are choosing.

use crate::{
    errors::{SelectError, SelectorError},
    list::{AddressableNode, TestIndex},
    test_filter::{FilterMode, Selection},
};
use camino::Utf8PathBuf;
use indexmap::IndexSet;
use std::{cmp::Reverse, fmt};
use tracing::debug;

/// Identifies a [`Choice`] within a [`ChoicePrompt`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ChoiceId(pub usize);

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single entry in a [`ChoicePrompt`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Choice {
    /// The text shown for this choice.
    pub label: String,

    /// The text that queries are matched against.
    pub search_text: String,

    /// The identifier returned by a [`Selector`] when this choice is picked.
    pub id: ChoiceId,
}

/// A question put to the user, along with the choices they can pick from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChoicePrompt {
    /// The message shown above the choices.
    pub message: String,

    /// Choices in display order.
    pub choices: Vec<Choice>,

    /// Whether more than one choice may be picked.
    pub multiple: bool,

    /// Whether at least one choice must be picked.
    pub required: bool,
}

impl ChoicePrompt {
    /// Returns the choices matching `query`, best match first.
    ///
    /// Matching is case-insensitive. An exact match ranks above a prefix match, which ranks above a
    /// substring match, which ranks above a match of the query's characters in order with gaps in
    /// between. Choices that rank the same stay in display order. An empty query matches all
    /// choices.
    pub fn filter(&self, query: &str) -> Vec<&Choice> {
        let query = query.trim();
        if query.is_empty() {
            return self.choices.iter().collect();
        }

        let query = query.to_lowercase();
        let mut scored: Vec<_> = self
            .choices
            .iter()
            .filter_map(|choice| {
                match_score(&query, &choice.search_text.to_lowercase()).map(|score| (score, choice))
            })
            .collect();
        // sort_by_key is stable.
        scored.sort_by_key(|(score, _)| Reverse(*score));
        scored.into_iter().map(|(_, choice)| choice).collect()
    }

    /// Returns the choice with this identifier, if it belongs to this prompt.
    pub fn get(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == id)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
enum MatchTier {
    Subsequence,
    Substring,
    Prefix,
    Exact,
}

// Higher is better. Within a tier, matches closer to the start or with fewer gaps win.
fn match_score(query: &str, text: &str) -> Option<(MatchTier, Reverse<usize>)> {
    if text == query {
        return Some((MatchTier::Exact, Reverse(0)));
    }
    if text.starts_with(query) {
        return Some((MatchTier::Prefix, Reverse(text.len() - query.len())));
    }
    if let Some(idx) = text.find(query) {
        return Some((MatchTier::Substring, Reverse(idx)));
    }

    let mut query_chars = query.chars().peekable();
    let mut first = None;
    for (idx, ch) in text.chars().enumerate() {
        let Some(&next) = query_chars.peek() else {
            break;
        };
        if ch == next {
            first.get_or_insert(idx);
            query_chars.next();
            if query_chars.peek().is_none() {
                let span = idx + 1 - first.unwrap_or(idx);
                return Some((MatchTier::Subsequence, Reverse(span)));
            }
        }
    }
    None
}

/// Asks the user to pick from a [`ChoicePrompt`].
pub trait Selector {
    /// Presents `prompt` and returns the identifiers of the chosen entries, in the order they were
    /// chosen.
    ///
    /// Returns `Ok(None)` if the user cancelled the prompt.
    fn select(&mut self, prompt: &ChoicePrompt) -> Result<Option<Vec<ChoiceId>>, SelectorError>;
}

/// A [`ChoicePrompt`] together with the values its choices stand for.
#[derive(Clone, Debug)]
pub struct ChoiceList<T> {
    prompt: ChoicePrompt,
    values: Vec<T>,
}

impl<T: Clone> ChoiceList<T> {
    fn new(
        message: impl Into<String>,
        multiple: bool,
        entries: impl IntoIterator<Item = (String, T)>,
    ) -> Self {
        let (labels, values): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        let choices = labels
            .into_iter()
            .enumerate()
            .map(|(idx, label)| Choice {
                search_text: label.clone(),
                label,
                id: ChoiceId(idx),
            })
            .collect();
        Self {
            prompt: ChoicePrompt {
                message: message.into(),
                choices,
                multiple,
                required: true,
            },
            values,
        }
    }

    /// The prompt to show.
    pub fn prompt(&self) -> &ChoicePrompt {
        &self.prompt
    }

    /// Returns true if there is nothing to choose from.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Maps identifiers returned by a selector back to values, in the order given.
    ///
    /// An identifier given more than once is only resolved the first time.
    pub fn resolve(&self, ids: &[ChoiceId]) -> Result<Vec<T>, SelectError> {
        let ids: IndexSet<_> = ids.iter().copied().collect();
        ids.into_iter()
            .map(|id| {
                self.values
                    .get(id.0)
                    .cloned()
                    .ok_or_else(|| SelectError::UnknownChoice {
                        id,
                        message: self.prompt.message.clone(),
                    })
            })
            .collect()
    }

    /// Shows the prompt, returning the chosen values or `None` if the user cancelled.
    pub fn select_with(&self, selector: &mut dyn Selector) -> Result<Option<Vec<T>>, SelectError> {
        debug!(
            "prompting `{}` with {} choices",
            self.prompt.message,
            self.prompt.choices.len()
        );
        match selector.select(&self.prompt)? {
            Some(ids) => self.resolve(&ids).map(Some),
            None => Ok(None),
        }
    }
}

/// The prompt asking which list to filter by.
pub fn mode_choices() -> ChoiceList<FilterMode> {
    ChoiceList::new(
        "Choose to filter by specs, specific test titles or tags:",
        false,
        FilterMode::ALL
            .into_iter()
            .map(|mode| (mode.label().to_owned(), mode)),
    )
}

/// The prompt listing spec files, in report order.
pub fn spec_choices(index: &TestIndex) -> ChoiceList<Utf8PathBuf> {
    ChoiceList::new(
        "Select specs to run:",
        true,
        index
            .spec_files()
            .iter()
            .map(|file| (file.to_string(), file.to_owned())),
    )
}

/// The prompt listing tests and the suites that group them, in report order, labeled by their
/// title path.
///
/// Picking a suite selects everything under it.
pub fn test_choices(index: &TestIndex, separator: &str) -> ChoiceList<AddressableNode> {
    ChoiceList::new(
        "Select tests to run:",
        true,
        index
            .nodes()
            .iter()
            .map(|node| (node.display_title(separator), node.clone())),
    )
}

/// The prompt listing tags, sorted for display.
pub fn tag_choices(index: &TestIndex) -> ChoiceList<String> {
    ChoiceList::new(
        "Select tags to run:",
        true,
        index
            .tag_index()
            .sorted_tags()
            .into_iter()
            .map(|tag| (tag.to_owned(), tag.to_owned())),
    )
}

/// Asks the user which list to filter by.
///
/// Returns `Ok(None)` if the user cancelled.
pub fn choose_mode(selector: &mut dyn Selector) -> Result<Option<FilterMode>, SelectError> {
    let list = mode_choices();
    let Some(modes) = list.select_with(selector)? else {
        return Ok(None);
    };
    modes
        .first()
        .copied()
        .map(Some)
        .ok_or_else(|| SelectError::NothingChosen {
            message: list.prompt().message.clone(),
        })
}

/// Asks the user to pick from the list for `mode`.
///
/// Returns `Ok(None)` if the user cancelled. The selector is not consulted if there is nothing to
/// choose from.
pub fn choose(
    selector: &mut dyn Selector,
    index: &TestIndex,
    mode: FilterMode,
    title_separator: &str,
) -> Result<Option<Selection>, SelectError> {
    fn non_empty<T: Clone>(
        list: ChoiceList<T>,
        mode: FilterMode,
    ) -> Result<ChoiceList<T>, SelectError> {
        if list.is_empty() {
            Err(SelectError::EmptyChoiceSet { mode })
        } else {
            Ok(list)
        }
    }

    let selection = match mode {
        FilterMode::Specs => non_empty(spec_choices(index), mode)?
            .select_with(selector)?
            .map(Selection::Files),
        FilterMode::Titles => non_empty(test_choices(index, title_separator), mode)?
            .select_with(selector)?
            .map(Selection::Tests),
        FilterMode::Tags => non_empty(tag_choices(index), mode)?
            .select_with(selector)?
            .map(Selection::Tags),
    };
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use pw_select_metadata::TestReport;
    use test_case::test_case;

    static REPORT: &str = indoc! {r#"
        {
            "suites": [
                {
                    "file": "firstDir/another.spec.js",
                    "suites": [{
                        "title": "New tests @new",
                        "line": 3,
                        "specs": [
                            { "title": "has title", "line": 4, "tags": ["smoke", "sanity"] },
                            { "title": "$get started link", "line": 10, "tags": ["smoke"] }
                        ]
                    }]
                },
                {
                    "file": "secondDir/example.spec.js",
                    "specs": [{ "title": "outside test", "line": 37, "tags": ["play"] }]
                }
            ]
        }
    "#};

    fn index() -> TestIndex {
        TestIndex::new(&TestReport::parse(REPORT).expect("report parses")).expect("report is valid")
    }

    /// Replays canned answers and records the prompts it was shown.
    #[derive(Default)]
    struct ScriptedSelector {
        answers: Vec<Option<Vec<ChoiceId>>>,
        seen: Vec<ChoicePrompt>,
    }

    impl Selector for ScriptedSelector {
        fn select(
            &mut self,
            prompt: &ChoicePrompt,
        ) -> Result<Option<Vec<ChoiceId>>, SelectorError> {
            self.seen.push(prompt.clone());
            Ok(self.answers.remove(0))
        }
    }

    fn labels(prompt: &ChoicePrompt) -> Vec<&str> {
        prompt.choices.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn choice_lists() {
        let index = index();

        let modes = mode_choices();
        assert_eq!(labels(modes.prompt()), vec!["Specs", "Test titles", "Tags"]);
        assert!(!modes.prompt().multiple);

        let specs = spec_choices(&index);
        assert_eq!(specs.prompt().message, "Select specs to run:");
        assert_eq!(
            labels(specs.prompt()),
            vec!["firstDir/another.spec.js", "secondDir/example.spec.js"]
        );

        let tests = test_choices(&index, " › ");
        assert_eq!(
            labels(tests.prompt()),
            vec![
                "firstDir/another.spec.js › New tests @new",
                "firstDir/another.spec.js › New tests @new › has title",
                "firstDir/another.spec.js › New tests @new › $get started link",
                "secondDir/example.spec.js › outside test",
            ]
        );
        assert!(tests.prompt().multiple && tests.prompt().required);

        // Tag choices are sorted, not in first-seen order.
        let tags = tag_choices(&index);
        assert_eq!(labels(tags.prompt()), vec!["play", "sanity", "smoke"]);
    }

    #[test]
    fn resolve_keeps_selection_order() {
        let tags = tag_choices(&index());
        assert_eq!(
            tags.resolve(&[ChoiceId(2), ChoiceId(0), ChoiceId(2)])
                .expect("ids are known"),
            vec!["smoke".to_owned(), "play".to_owned()]
        );
    }

    #[test]
    fn resolve_rejects_foreign_ids() {
        let err = spec_choices(&index())
            .resolve(&[ChoiceId(7)])
            .expect_err("id 7 is out of range");
        assert!(
            matches!(err, SelectError::UnknownChoice { id: ChoiceId(7), .. }),
            "{err:?}"
        );
    }

    #[test]
    fn choose_maps_ids_to_selection() {
        let index = index();
        let mut selector = ScriptedSelector {
            answers: vec![Some(vec![ChoiceId(2)]), Some(vec![ChoiceId(2), ChoiceId(1)])],
            ..Default::default()
        };

        let mode = choose_mode(&mut selector).expect("mode prompt succeeds");
        assert_eq!(mode, Some(FilterMode::Tags));

        let selection = choose(&mut selector, &index, FilterMode::Titles, " › ")
            .expect("test prompt succeeds")
            .expect("not cancelled");
        let Selection::Tests(tests) = selection else {
            panic!("expected tests, got {selection:?}");
        };
        assert_eq!(
            tests.iter().map(|t| t.address().to_string()).collect::<Vec<_>>(),
            vec!["firstDir/another.spec.js:10", "firstDir/another.spec.js:4"]
        );
        assert_eq!(selector.seen[1].message, "Select tests to run:");
    }

    #[test]
    fn suites_can_be_chosen() {
        let report = TestReport::parse(indoc! {r#"
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
        "#})
        .expect("report parses");
        let index = TestIndex::new(&report).expect("report is valid");

        let tests = test_choices(&index, " › ");
        assert_eq!(
            labels(tests.prompt()),
            vec!["a.spec.ts › Login", "a.spec.ts › Login › ok"]
        );

        let mut selector = ScriptedSelector {
            answers: vec![Some(vec![ChoiceId(0)])],
            ..Default::default()
        };
        let selection = choose(&mut selector, &index, FilterMode::Titles, " › ")
            .expect("test prompt succeeds")
            .expect("not cancelled");
        let Selection::Tests(nodes) = selection else {
            panic!("expected tests, got {selection:?}");
        };
        assert_eq!(
            nodes.iter().map(|n| n.address().to_string()).collect::<Vec<_>>(),
            vec!["a.spec.ts:3"]
        );
    }

    #[test]
    fn cancel_is_not_an_error() {
        let mut selector = ScriptedSelector {
            answers: vec![None, None],
            ..Default::default()
        };
        assert_eq!(choose_mode(&mut selector).expect("no error"), None);
        let selection =
            choose(&mut selector, &index(), FilterMode::Specs, " › ").expect("no error");
        assert_eq!(selection, None);
    }

    #[test]
    fn empty_choice_set_skips_the_selector() {
        let report = TestReport::parse(
            r#"{ "suites": [{ "file": "a.spec.ts", "specs": [{ "title": "T", "line": 1 }] }] }"#,
        )
        .expect("report parses");
        let index = TestIndex::new(&report).expect("report is valid");
        let mut selector = ScriptedSelector::default();

        let err = choose(&mut selector, &index, FilterMode::Tags, " › ")
            .expect_err("no tags to choose from");
        assert_eq!(err.to_string(), "no tags detected");
        assert!(selector.seen.is_empty());
    }

    fn sample_prompt(labels: &[&str]) -> ChoicePrompt {
        ChoicePrompt {
            message: "pick".to_owned(),
            choices: labels
                .iter()
                .enumerate()
                .map(|(idx, label)| Choice {
                    label: (*label).to_owned(),
                    search_text: (*label).to_owned(),
                    id: ChoiceId(idx),
                })
                .collect(),
            multiple: true,
            required: true,
        }
    }

    #[test_case("", &["nested", "smoke", "Smoke test", "a smoke", "s-m-o-k-e"] ; "empty query keeps order")]
    #[test_case("smoke", &["smoke", "Smoke test", "a smoke", "s-m-o-k-e"] ; "ranked by tier")]
    #[test_case("SMO", &["smoke", "Smoke test", "a smoke", "s-m-o-k-e"] ; "case insensitive")]
    #[test_case("nst", &["nested"] ; "subsequence")]
    #[test_case("xyz", &[] ; "no match")]
    fn filter_ranks_matches(query: &str, expected: &[&str]) {
        let prompt = sample_prompt(&["nested", "smoke", "Smoke test", "a smoke", "s-m-o-k-e"]);
        let actual: Vec<_> = prompt
            .filter(query)
            .into_iter()
            .map(|choice| choice.label.as_str())
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn filter_ties_stay_in_display_order() {
        let prompt = sample_prompt(&["b smoke", "a smoke"]);
        let actual: Vec<_> = prompt
            .filter("smoke")
            .into_iter()
            .map(|choice| choice.label.as_str())
            .collect();
        assert_eq!(actual, vec!["b smoke", "a smoke"]);
    }
}
