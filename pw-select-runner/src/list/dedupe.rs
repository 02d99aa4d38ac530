// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::list::AddressableNode;
use indexmap::IndexSet;

/// Removes structurally duplicate nodes, keeping the first occurrence of each.
///
/// The relative order of the surviving nodes is unchanged.
pub fn dedupe(nodes: impl IntoIterator<Item = AddressableNode>) -> Vec<AddressableNode> {
    nodes
        .into_iter()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Collects the distinct tags carried by `nodes`, in the order they are first seen.
pub fn dedupe_tags<'a>(nodes: impl IntoIterator<Item = &'a AddressableNode>) -> Vec<String> {
    nodes
        .into_iter()
        .flat_map(|node| node.tags())
        .filter(|tag| !tag.is_empty())
        .cloned()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
