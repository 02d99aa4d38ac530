// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::ReportValidationError,
    list::{AddressableNode, NodeKind, TestAddress, dedupe, dedupe_tags, flatten},
};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use pw_select_metadata::{ReportSuite, TestReport};
use tracing::debug;

/// The deduplicated contents of a test report, together with the tag and file indexes built from
/// them.
#[derive(Clone, Debug)]
pub struct TestIndex {
    nodes: Vec<AddressableNode>,
    tag_index: TagIndex,
    spec_files: SpecFileIndex,
}

impl TestIndex {
    /// Flattens and deduplicates a report, then indexes the result.
    pub fn new(report: &TestReport) -> Result<Self, ReportValidationError> {
        let flattened = flatten(&report.suites)?;
        let flattened_len = flattened.len();
        let nodes = dedupe(flattened);
        if nodes.len() != flattened_len {
            debug!(
                "dropped {} duplicate nodes",
                flattened_len - nodes.len()
            );
        }

        let tag_index = TagIndex::new(&nodes);
        let spec_files = SpecFileIndex::new(&report.suites);
        debug!(
            "indexed {} nodes, {} tags, {} spec files",
            nodes.len(),
            tag_index.len(),
            spec_files.len()
        );

        Ok(Self {
            nodes,
            tag_index,
            spec_files,
        })
    }

    /// All nodes, in the order they were first seen in the report.
    pub fn nodes(&self) -> &[AddressableNode] {
        &self.nodes
    }

    /// Nodes that are individual tests, in report order.
    pub fn tests(&self) -> impl Iterator<Item = &AddressableNode> + '_ {
        self.nodes
            .iter()
            .filter(|node| node.kind() == NodeKind::Test)
    }

    /// The tag index.
    pub fn tag_index(&self) -> &TagIndex {
        &self.tag_index
    }

    /// The spec file index.
    pub fn spec_files(&self) -> &SpecFileIndex {
        &self.spec_files
    }
}

/// Maps each tag to the addresses of the nodes carrying it.
///
/// Tags are kept in first-seen order, and so are the addresses within a tag. The index never holds
/// an empty tag or a tag with no addresses.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagIndex {
    map: IndexMap<String, IndexSet<TestAddress>>,
}

impl TagIndex {
    /// Builds the index from a list of nodes.
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a AddressableNode>) -> Self {
        let nodes: Vec<_> = nodes.into_iter().collect();
        let mut map: IndexMap<String, IndexSet<TestAddress>> = dedupe_tags(nodes.iter().copied())
            .into_iter()
            .map(|tag| (tag, IndexSet::new()))
            .collect();
        for node in nodes {
            for tag in node.tags() {
                if let Some(addresses) = map.get_mut(tag) {
                    addresses.insert(node.address().clone());
                }
            }
        }
        Self { map }
    }

    /// Returns the addresses carrying `tag`, or `None` if no node carries it.
    pub fn get(&self, tag: &str) -> Option<&IndexSet<TestAddress>> {
        self.map.get(tag)
    }

    /// Iterates over tags in first-seen order.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.map.keys().map(String::as_str)
    }

    /// Returns tags sorted lexicographically, in the order they are shown to users.
    pub fn sorted_tags(&self) -> Vec<&str> {
        let mut tags: Vec<_> = self.tags().collect();
        tags.sort_unstable();
        tags
    }

    /// The number of distinct tags.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no node carries a tag.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The distinct spec files at the top level of a report, in report order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SpecFileIndex {
    files: IndexSet<Utf8PathBuf>,
}

impl SpecFileIndex {
    /// Builds the index from the top-level suites of a report.
    pub fn new(suites: &[ReportSuite]) -> Self {
        let files = suites
            .iter()
            .filter_map(|suite| suite.file.clone())
            .collect();
        Self { files }
    }

    /// Iterates over spec files.
    pub fn iter(&self) -> impl Iterator<Item = &Utf8Path> + '_ {
        self.files.iter().map(|file| file.as_path())
    }

    /// Returns true if `file` is one of the spec files.
    pub fn contains(&self, file: &Utf8Path) -> bool {
        self.files.contains(file)
    }

    /// The number of spec files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the report had no spec files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
