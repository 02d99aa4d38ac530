// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Main entry point implementation.

use super::app::PwSelectApp;
use crate::{args::SplitArgs, output::OutputWriter};
use clap::Parser;

/// Main entry point for pw-select.
///
/// Splits the command line between pw-select and the test runner, parses pw-select's share and
/// runs the selected command, exiting with its code.
pub fn main_impl() -> ! {
    let cli_args = SplitArgs::new(
        std::env::args_os().map(|arg| arg.to_string_lossy().into_owned()),
    );

    let app = match PwSelectApp::try_parse_from(&cli_args.claimed) {
        Ok(app) => app,
        Err(err) => err.exit(),
    };
    let output = app.init_output();

    match app.exec(cli_args, output, &mut OutputWriter::default()) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error.display_to_stderr(&output.stderr_styles());
            std::process::exit(error.process_exit_code())
        }
    }
}
