// Copyright (c) The pw-select Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Root element of the report produced by `playwright test --list --reporter=json`.
///
/// Only the parts of the report that describe the shape of the test tree are modeled here. Other
/// fields (`config`, `stats`, per-spec `tests`) are ignored while deserializing.
///
/// Most fields are optional even though a well-formed report always carries them. A structurally
/// incomplete report should be rejected with an error pointing at the offending node, which is
/// easier to do after deserialization than from a serde error.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    /// Top-level suites, one per spec file.
    #[serde(default)]
    pub suites: Vec<ReportSuite>,

    /// Errors the runner reported while collecting tests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ReportError>,
}

impl TestReport {
    /// Parses a report from its JSON representation.
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Returns the total number of specs within this report, at any depth.
    pub fn spec_count(&self) -> usize {
        self.suites.iter().map(ReportSuite::spec_count).sum()
    }
}

/// A suite within a [`TestReport`].
///
/// Top-level suites stand for a spec file and carry `file`. Nested suites correspond to
/// `test.describe` blocks and inherit the file of their top-level ancestor.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSuite {
    /// The title of the suite. For top-level suites, this is usually the file path.
    #[serde(default)]
    pub title: Option<String>,

    /// The spec file this suite was declared in, relative to the runner's test directory.
    #[serde(default)]
    pub file: Option<Utf8PathBuf>,

    /// The line the suite was declared on.
    #[serde(default)]
    pub line: Option<u32>,

    /// The column the suite was declared on.
    #[serde(default)]
    pub column: Option<u32>,

    /// Tags declared on the suite, if any.
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Tests declared directly within this suite.
    #[serde(default)]
    pub specs: Vec<ReportSpec>,

    /// Suites nested within this suite.
    #[serde(default)]
    pub suites: Vec<ReportSuite>,
}

impl ReportSuite {
    /// Returns the number of specs within this suite, including nested suites.
    pub fn spec_count(&self) -> usize {
        self.specs.len() + self.suites.iter().map(Self::spec_count).sum::<usize>()
    }
}

/// A single test within a [`ReportSuite`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSpec {
    /// The title of the test.
    #[serde(default)]
    pub title: Option<String>,

    /// The spec file, if the runner repeats it on nested nodes.
    #[serde(default)]
    pub file: Option<Utf8PathBuf>,

    /// The line the test was declared on.
    #[serde(default)]
    pub line: Option<u32>,

    /// The column the test was declared on.
    #[serde(default)]
    pub column: Option<u32>,

    /// Tags for the test. The runner writes these without the leading `@`.
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// The runner's identifier for the test.
    #[serde(default)]
    pub id: Option<String>,
}

/// An error reported by the runner while collecting tests.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct ReportError {
    /// The error message.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn parse_ignores_unknown_fields() {
        let json = indoc! {r#"
            {
                "config": { "version": "1.44.0", "projects": [] },
                "suites": [
                    {
                        "title": "a.spec.ts",
                        "file": "a.spec.ts",
                        "line": 0,
                        "column": 0,
                        "specs": [
                            {
                                "title": "T1",
                                "ok": true,
                                "tags": ["smoke"],
                                "tests": [{ "timeout": 30000 }],
                                "id": "abc",
                                "file": "a.spec.ts",
                                "line": 3,
                                "column": 5
                            }
                        ]
                    }
                ],
                "errors": [],
                "stats": { "expected": 0 }
            }
        "#};

        let report = TestReport::parse(json).expect("report parses");
        assert_eq!(
            report,
            TestReport {
                suites: vec![ReportSuite {
                    title: Some("a.spec.ts".to_owned()),
                    file: Some("a.spec.ts".into()),
                    line: Some(0),
                    column: Some(0),
                    tags: None,
                    specs: vec![ReportSpec {
                        title: Some("T1".to_owned()),
                        file: Some("a.spec.ts".into()),
                        line: Some(3),
                        column: Some(5),
                        tags: Some(vec!["smoke".to_owned()]),
                        id: Some("abc".to_owned()),
                    }],
                    suites: vec![],
                }],
                errors: vec![],
            }
        );
    }

    #[test]
    fn missing_fields_deserialize_as_absent() {
        let json = r#"{ "suites": [{ "specs": [{ "title": "no line" }] }] }"#;
        let report = TestReport::parse(json).expect("report parses");
        let spec = &report.suites[0].specs[0];
        assert_eq!(spec.line, None);
        assert_eq!(spec.tags, None);
        assert_eq!(report.suites[0].file, None);
    }

    #[test_case(r#"{ "suites": [] }"#, 0 ; "empty")]
    #[test_case(r#"{ "suites": [{ "file": "a", "specs": [{}, {}] }] }"#, 2 ; "flat")]
    #[test_case(
        r#"{ "suites": [{ "file": "a", "specs": [{}], "suites": [{ "specs": [{}], "suites": [{ "specs": [{}] }] }] }] }"#,
        3
        ; "nested"
    )]
    fn spec_count(json: &str, expected: usize) {
        let report = TestReport::parse(json).expect("report parses");
        assert_eq!(report.spec_count(), expected);
    }

    #[test]
    fn parse_rejects_invalid_json() {
        TestReport::parse("Error: No tests found").expect_err("not JSON");
    }
}
