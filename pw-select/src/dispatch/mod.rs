// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatch and execution.

mod app;
mod imp;
mod select;

pub use app::PwSelectApp;
pub use imp::main_impl;
