// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{NodeLocation, NodeLocationKind, ReportValidationError, ReportValidationErrorKind},
    list::{AddressableNode, NodeKind, TestAddress},
};
use camino::Utf8Path;
use pw_select_metadata::ReportSuite;
use tracing::debug;

/// Flattens the top-level suites of a report into a list of addressable nodes.
///
/// Nodes are produced in pre-order: a suite comes before its specs, which come before its nested
/// suites, all in source order. Top-level suites only group tests by file and do not produce nodes
/// of their own, but their `file` starts the title path of every descendant and is the address
/// file of every descendant.
///
/// A structurally malformed report is rejected as a whole.
pub fn flatten(suites: &[ReportSuite]) -> Result<Vec<AddressableNode>, ReportValidationError> {
    let mut nodes = Vec::new();

    for (index, suite) in suites.iter().enumerate() {
        let file = suite.file.as_deref().ok_or_else(|| {
            ReportValidationError::new(
                NodeLocation {
                    kind: NodeLocationKind::TopLevelSuite,
                    parent_path: Vec::new(),
                    index,
                },
                ReportValidationErrorKind::MissingFile,
            )
        })?;

        let mut walker = FileWalker {
            file,
            nodes: &mut nodes,
            ancestors: Vec::new(),
        };
        walker.walk_children(suite, &[file.to_string()])?;
    }

    debug!(
        "flattened {} top-level suites into {} nodes",
        suites.len(),
        nodes.len()
    );
    Ok(nodes)
}

struct FileWalker<'r, 'n> {
    file: &'r Utf8Path,
    nodes: &'n mut Vec<AddressableNode>,
    // Nested suites between the file and the current position, outermost first.
    ancestors: Vec<Ancestor<'r>>,
}

struct Ancestor<'r> {
    identity: SuiteIdentity<'r>,
    title_path: Vec<String>,
}

#[derive(Debug, Eq, PartialEq)]
struct SuiteIdentity<'r> {
    title: &'r str,
    line: u32,
    column: Option<u32>,
}

impl<'r> FileWalker<'r, '_> {
    fn walk_children(
        &mut self,
        suite: &'r ReportSuite,
        path: &[String],
    ) -> Result<(), ReportValidationError> {
        for (index, spec) in suite.specs.iter().enumerate() {
            let location = || NodeLocation {
                kind: NodeLocationKind::Spec,
                parent_path: path.to_vec(),
                index,
            };
            let title = spec.title.as_deref().ok_or_else(|| {
                ReportValidationError::new(location(), ReportValidationErrorKind::MissingTitle)
            })?;
            let line = spec.line.ok_or_else(|| {
                ReportValidationError::new(location(), ReportValidationErrorKind::MissingLine)
            })?;

            self.nodes.push(AddressableNode::new(
                child_path(path, title),
                NodeKind::Test,
                spec.tags.iter().flatten().cloned(),
                TestAddress::new(self.file, line),
            ));
        }

        for (index, child) in suite.suites.iter().enumerate() {
            let location = || NodeLocation {
                kind: NodeLocationKind::Suite,
                parent_path: path.to_vec(),
                index,
            };
            let title = child.title.as_deref().ok_or_else(|| {
                ReportValidationError::new(location(), ReportValidationErrorKind::MissingTitle)
            })?;
            let line = child.line.ok_or_else(|| {
                ReportValidationError::new(location(), ReportValidationErrorKind::MissingLine)
            })?;

            let identity = SuiteIdentity {
                title,
                line,
                column: child.column,
            };
            if let Some(ancestor) = self.ancestors.iter().find(|a| a.identity == identity) {
                return Err(ReportValidationError::new(
                    location(),
                    ReportValidationErrorKind::Cycle {
                        ancestor_path: ancestor.title_path.clone(),
                    },
                ));
            }

            let title_path = child_path(path, title);
            self.nodes.push(AddressableNode::new(
                title_path.clone(),
                NodeKind::Suite,
                child.tags.iter().flatten().cloned(),
                TestAddress::new(self.file, line),
            ));

            self.ancestors.push(Ancestor {
                identity,
                title_path: title_path.clone(),
            });
            self.walk_children(child, &title_path)?;
            self.ancestors.pop();
        }

        Ok(())
    }
}

fn child_path(path: &[String], title: &str) -> Vec<String> {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(title.to_owned());
    child
}
