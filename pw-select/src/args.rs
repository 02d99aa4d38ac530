// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splitting the command line between pw-select and the test runner.
//!
//! pw-select only claims the flags it knows about. Everything else is forwarded to the runner
//! unchanged, so these flags are separated out before clap sees the command line.

/// Flags pw-select claims that take no value.
const CLAIMED_SWITCHES: &[&str] = &[
    "--specs",
    "--titles",
    "--tags",
    "--submit-focused",
    "--verbose",
    "-v",
    "--help",
    "-h",
    "--version",
    "-V",
];

/// Flags pw-select claims that take a value.
const CLAIMED_OPTIONS: &[&str] = &[
    "--json-data-path",
    "--grammar",
    "--runner",
    "--select-config",
    "--color",
];

/// Runner flags that must not be passed while listing tests: they'd change the listing's output
/// format or start an interactive UI. They're added back when running the selected tests.
const SET_ASIDE_SWITCHES: &[&str] = &["--ui"];
const SET_ASIDE_OPTIONS: &[&str] = &["--reporter", "--ui-host", "--ui-port"];

/// The command line, split by who it is meant for.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[doc(hidden)]
pub struct SplitArgs {
    /// The program name, the subcommand and the flags pw-select parses itself.
    pub claimed: Vec<String>,

    /// Arguments forwarded to both the listing and the run invocations.
    pub passthrough: Vec<String>,

    /// Arguments forwarded to the run invocation only.
    pub set_aside: Vec<String>,
}

impl SplitArgs {
    /// Splits a full command line, starting with the program name.
    ///
    /// Both `--flag value` and `--flag=value` are recognized for flags that take a value. The
    /// subcommand is claimed if it comes before any forwarded argument. Everything after `--` is
    /// forwarded, without the `--` itself.
    pub fn new(args: impl IntoIterator<Item = String>) -> Self {
        let mut split = Self::default();
        let mut args = args.into_iter();
        split.claimed.extend(args.next());

        let mut subcommand_seen = false;
        while let Some(arg) = args.next() {
            if arg == "--" {
                split.passthrough.extend(args.by_ref());
                break;
            }

            let (name, has_value) = match arg.split_once('=') {
                Some((name, _)) if arg.starts_with("--") => (name.to_owned(), true),
                _ => (arg.clone(), false),
            };

            let dest = if CLAIMED_SWITCHES.contains(&name.as_str())
                || CLAIMED_OPTIONS.contains(&name.as_str())
            {
                &mut split.claimed
            } else if SET_ASIDE_SWITCHES.contains(&name.as_str())
                || SET_ASIDE_OPTIONS.contains(&name.as_str())
            {
                &mut split.set_aside
            } else if !subcommand_seen && !arg.starts_with('-') && split.passthrough.is_empty() {
                subcommand_seen = true;
                split.claimed.push(arg);
                continue;
            } else {
                split.passthrough.push(arg);
                continue;
            };

            let takes_value = CLAIMED_OPTIONS.contains(&name.as_str())
                || SET_ASIDE_OPTIONS.contains(&name.as_str());
            dest.push(arg);
            if takes_value && !has_value {
                dest.extend(args.next());
            }
        }

        split
    }
}
