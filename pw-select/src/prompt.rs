// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal prompts backed by `dialoguer`.

use dialoguer::{
    FuzzySelect, Input, MultiSelect, Select,
    theme::{ColorfulTheme, SimpleTheme, Theme},
};
use pw_select_runner::{
    choices::{Choice, ChoiceId, ChoicePrompt, Selector},
    errors::SelectorError,
};
use std::io;
use tracing::warn;

/// A [`Selector`] that asks on the terminal.
pub(crate) struct DialoguerSelector {
    submit_focused: bool,
    theme: Box<dyn Theme>,
}

impl DialoguerSelector {
    pub(crate) fn new(submit_focused: bool, colorize: bool) -> Self {
        let theme: Box<dyn Theme> = if colorize {
            Box::new(ColorfulTheme::default())
        } else {
            Box::new(SimpleTheme)
        };
        Self {
            submit_focused,
            theme,
        }
    }

    fn select_one(
        &self,
        prompt: &ChoicePrompt,
        fuzzy: bool,
    ) -> io::Result<Option<Vec<ChoiceId>>> {
        let labels = labels(prompt.choices.iter());
        let picked = if fuzzy {
            FuzzySelect::with_theme(&*self.theme)
                .with_prompt(&prompt.message)
                .items(&labels)
                .default(0)
                .interact_opt()
        } else {
            Select::with_theme(&*self.theme)
                .with_prompt(&prompt.message)
                .items(&labels)
                .default(0)
                .interact_opt()
        };
        let picked = picked.map_err(io::Error::from)?;

        Ok(picked.and_then(|idx| prompt.choices.get(idx)).map(|choice| vec![choice.id]))
    }

    fn select_many(&self, prompt: &ChoicePrompt) -> io::Result<Option<Vec<ChoiceId>>> {
        loop {
            let query: String = Input::with_theme(&*self.theme)
                .with_prompt(format!("{} filter (empty to list all)", prompt.message))
                .allow_empty(true)
                .interact_text()
                .map_err(io::Error::from)?;

            let matches = prompt.filter(&query);
            if matches.is_empty() {
                warn!("nothing matches `{query}`");
                continue;
            }

            let picked = MultiSelect::with_theme(&*self.theme)
                .with_prompt(&prompt.message)
                .items(&labels(matches.iter().copied()))
                .interact_opt()
                .map_err(io::Error::from)?;
            let Some(picked) = picked else {
                return Ok(None);
            };
            match picked_ids(&matches, picked, prompt.required, self.submit_focused) {
                Some(ids) => return Ok(Some(ids)),
                None => warn!("select at least one entry (space toggles, enter submits)"),
            }
        }
    }
}

impl Selector for DialoguerSelector {
    fn select(&mut self, prompt: &ChoicePrompt) -> Result<Option<Vec<ChoiceId>>, SelectorError> {
        let answer = match PromptStyle::new(prompt, self.submit_focused) {
            PromptStyle::Select => self.select_one(prompt, false),
            PromptStyle::FuzzySelect => self.select_one(prompt, true),
            PromptStyle::MultiSelect => self.select_many(prompt),
        };
        cancel_on_interrupt(answer)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum PromptStyle {
    Select,
    FuzzySelect,
    MultiSelect,
}

impl PromptStyle {
    fn new(prompt: &ChoicePrompt, submit_focused: bool) -> Self {
        match (prompt.multiple, submit_focused) {
            (true, _) => Self::MultiSelect,
            (false, true) => Self::FuzzySelect,
            (false, false) => Self::Select,
        }
    }
}

/// Maps the rows picked in a multi-select over `matches` back to choice ids.
///
/// With `submit_focused`, submitting without toggling anything picks the highlighted row, which is
/// always the top match since the cursor starts there. Returns `None` if the prompt must be asked
/// again.
fn picked_ids(
    matches: &[&Choice],
    picked: Vec<usize>,
    required: bool,
    submit_focused: bool,
) -> Option<Vec<ChoiceId>> {
    if picked.is_empty() {
        if submit_focused {
            return matches.first().map(|choice| vec![choice.id]);
        }
        if required {
            return None;
        }
    }

    Some(
        picked
            .into_iter()
            .filter_map(|idx| matches.get(idx).map(|choice| choice.id))
            .collect(),
    )
}

fn labels<'a>(choices: impl Iterator<Item = &'a Choice>) -> Vec<String> {
    choices.map(|choice| choice.label.clone()).collect()
}

// Ctrl-C while a prompt is open closes the prompt, same as Esc.
fn cancel_on_interrupt<T>(answer: io::Result<Option<T>>) -> Result<Option<T>, SelectorError> {
    match answer {
        Ok(answer) => Ok(answer),
        Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(SelectorError::new(err)),
    }
}
