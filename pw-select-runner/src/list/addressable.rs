// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use std::{collections::BTreeSet, fmt};

/// The kind of an [`AddressableNode`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum NodeKind {
    /// A `describe` block.
    Suite,

    /// A single test.
    Test,
}

/// A runner-targeting coordinate, written as `file:line`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TestAddress {
    /// The spec file the node was declared in.
    pub file: Utf8PathBuf,

    /// The line the node was declared on.
    pub line: u32,
}

impl TestAddress {
    /// Creates a new address.
    pub fn new(file: impl Into<Utf8PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for TestAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A suite or test flattened out of a test report.
///
/// Two nodes are the same node if and only if all of their title path, kind, tags and address
/// are equal.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct AddressableNode {
    title_path: Vec<String>,
    kind: NodeKind,
    tags: BTreeSet<String>,
    address: TestAddress,
}

impl AddressableNode {
    /// Creates a new node.
    ///
    /// Empty tags are not real tags and are dropped.
    pub fn new<S: Into<String>>(
        title_path: Vec<String>,
        kind: NodeKind,
        tags: impl IntoIterator<Item = S>,
        address: TestAddress,
    ) -> Self {
        let tags = tags
            .into_iter()
            .map(Into::into)
            .filter(|tag: &String| !tag.is_empty())
            .collect();
        Self {
            title_path,
            kind,
            tags,
            address,
        }
    }

    /// The titles from the spec file down to this node, root first.
    pub fn title_path(&self) -> &[String] {
        &self.title_path
    }

    /// The kind of node.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The node's own tags.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns true if the node carries this tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// The node's `file:line` address.
    pub fn address(&self) -> &TestAddress {
        &self.address
    }

    /// The spec file the node belongs to.
    pub fn file(&self) -> &Utf8Path {
        &self.address.file
    }

    /// Returns the title path joined with `separator`, for display.
    pub fn display_title(&self, separator: &str) -> String {
        self.title_path.join(separator)
    }

    /// Returns the title path joined with plain spaces.
    ///
    /// This is the form the runner's `--grep` matches against.
    pub fn search_term(&self) -> String {
        self.title_path.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node() -> AddressableNode {
        AddressableNode::new(
            vec!["a.spec.ts".to_owned(), "Root".to_owned(), "T1".to_owned()],
            NodeKind::Test,
            ["smoke", "", "sanity"],
            TestAddress::new("a.spec.ts", 7),
        )
    }

    #[test]
    fn empty_tags_are_dropped() {
        let node = node();
        assert_eq!(
            node.tags().iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["sanity", "smoke"]
        );
        assert!(!node.has_tag(""));
    }

    #[test]
    fn titles_and_address() {
        let node = node();
        assert_eq!(node.display_title(" › "), "a.spec.ts › Root › T1");
        assert_eq!(node.search_term(), "a.spec.ts Root T1");
        assert_eq!(node.address().to_string(), "a.spec.ts:7");
        assert_eq!(node.file().as_str(), "a.spec.ts");
    }

    #[test]
    fn tag_order_does_not_affect_equality() {
        let reordered = AddressableNode::new(
            node().title_path().to_vec(),
            NodeKind::Test,
            ["sanity", "smoke"],
            TestAddress::new("a.spec.ts", 7),
        );
        assert_eq!(node(), reordered);
    }
}
