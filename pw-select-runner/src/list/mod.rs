// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support for turning a nested test report into a flat, addressable index of tests and tags.
//!
//! The main data structures in this module are:
//! * [`AddressableNode`], a single selectable suite or test
//! * [`TestIndex`], which owns the deduplicated nodes along with the [`TagIndex`] and the
//!   [`SpecFileIndex`] built from them

mod addressable;
mod dedupe;
mod flatten;
mod test_index;

pub use addressable::*;
pub use dedupe::*;
pub use flatten::*;
pub use test_index::*;
