//! Compiler diagnostics as reported by `c3c build --lsp`.
//!
//! The compiler writes one line per problem to stderr:
//!
//! ```text
//! > LSPERR|error|"/ws/src/main.c3"|12|5|"Expected ';'"
//! ```
//!
//! Lines and columns are 1-based; column 0 flags the whole line.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::workspace_loader::doc_id_for_path;
use crate::base::{DocId, Position, Range, byte_to_utf16};

static LSPERR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^>\s*LSPERR\|(\w+)\|"(.*?)"\|(\d+)\|(\d+)\|"(.*)"\s*$"#).unwrap()
});

#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("compiler output has no LSPERR lines; is c3c too old?")]
    UnusableOutput,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    fn parse(text: &str) -> Self {
        match text.to_ascii_lowercase().as_str() {
            "warning" => Severity::Warning,
            "note" | "info" => Severity::Note,
            _ => Severity::Error,
        }
    }
}

/// One problem reported by the compiler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerDiagnostic {
    pub file: PathBuf,
    /// 0-based line.
    pub line: u32,
    /// 0-based column, `None` for the whole line.
    pub column: Option<u32>,
    pub severity: Severity,
    pub message: String,
}

impl CompilerDiagnostic {
    /// The range to highlight, given the text of the diagnostic's line when
    /// it is known.
    ///
    /// A column selects the identifier starting there, or a single
    /// character; no column selects the whole line.
    pub fn range(&self, line_text: Option<&str>) -> Range {
        let line_len = line_text.map(|t| byte_to_utf16(t.trim_end_matches('\r'))).unwrap_or(0);
        match self.column {
            None => Range::new(self.line, 0, self.line, line_len),
            Some(column) => {
                let word_len = line_text
                    .and_then(|text| identifier_len_at(text, column))
                    .unwrap_or(1);
                Range::from_positions(
                    Position::new(self.line, column),
                    Position::new(self.line, column + word_len),
                )
            }
        }
    }
}

fn identifier_len_at(line: &str, column: u32) -> Option<u32> {
    let start = crate::base::utf16_to_byte(line, column);
    let len = line[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$' || *c == '@')
        .count() as u32;
    (len > 0).then_some(len)
}

/// Result of scanning the compiler's stderr.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilerReport {
    pub diagnostics: Vec<CompilerDiagnostic>,
}

impl CompilerReport {
    /// Diagnostics grouped by document, files resolved against `root`.
    pub fn by_document(&self, root: &Path) -> IndexMap<DocId, Vec<CompilerDiagnostic>> {
        let mut grouped: IndexMap<DocId, Vec<CompilerDiagnostic>> = IndexMap::new();
        for diagnostic in &self.diagnostics {
            let path = if diagnostic.file.is_absolute() {
                diagnostic.file.clone()
            } else {
                root.join(&diagnostic.file)
            };
            grouped
                .entry(doc_id_for_path(&path))
                .or_default()
                .push(diagnostic.clone());
        }
        grouped
    }
}

/// Parse compiler stderr.
///
/// Output with text but without a single `LSPERR` line means the compiler
/// does not speak the format, which is an error.
pub fn parse_compiler_output(stderr: &str) -> Result<CompilerReport, DiagnosticsError> {
    let mut report = CompilerReport::default();
    for line in stderr.lines() {
        let Some(captures) = LSPERR_LINE.captures(line.trim()) else {
            continue;
        };
        let number = |i: usize| {
            captures
                .get(i)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(0)
        };
        let column = number(4);
        report.diagnostics.push(CompilerDiagnostic {
            file: PathBuf::from(&captures[2]),
            line: number(3).saturating_sub(1),
            column: (column > 0).then(|| column - 1),
            severity: Severity::parse(&captures[1]),
            message: captures[5].replace("\\\"", "\""),
        });
    }

    if report.diagnostics.is_empty() && !stderr.trim().is_empty() {
        return Err(DiagnosticsError::UnusableOutput);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_lsperr_lines() {
        let stderr = "Compiling...\n> LSPERR|error|\"/ws/src/main.c3\"|12|5|\"Expected ';'\"\n> LSPERR|warning|\"src/util.c3\"|1|0|\"Unused variable\"\n";
        let report = parse_compiler_output(stderr).unwrap();

        assert_eq!(report.diagnostics.len(), 2);
        let first = &report.diagnostics[0];
        assert_eq!(first.file, PathBuf::from("/ws/src/main.c3"));
        assert_eq!((first.line, first.column), (11, Some(4)));
        assert_eq!(first.severity, Severity::Error);
        assert_eq!(first.message, "Expected ';'");

        let second = &report.diagnostics[1];
        assert_eq!(second.column, None);
        assert_eq!(second.severity, Severity::Warning);
    }

    #[rstest]
    #[case("")]
    #[case("   \n")]
    fn test_empty_output_is_a_clean_build(#[case] stderr: &str) {
        assert_eq!(parse_compiler_output(stderr).unwrap(), CompilerReport::default());
    }

    #[test]
    fn test_foreign_output_is_unusable() {
        let stderr = "Error|main.c3|3|4|old format\n";
        assert!(matches!(parse_compiler_output(stderr), Err(DiagnosticsError::UnusableOutput)));
    }

    #[test]
    fn test_ranges() {
        let mut diagnostic = CompilerDiagnostic {
            file: PathBuf::from("a.c3"),
            line: 2,
            column: Some(4),
            severity: Severity::Error,
            message: String::new(),
        };
        assert_eq!(diagnostic.range(Some("int value = 3;")), Range::new(2, 4, 2, 9));
        assert_eq!(diagnostic.range(None), Range::new(2, 4, 2, 5));

        diagnostic.column = None;
        assert_eq!(diagnostic.range(Some("int value = 3;\r")), Range::new(2, 0, 2, 14));
    }

    #[test]
    fn test_group_by_document() {
        let report = parse_compiler_output(
            "> LSPERR|error|\"src/a.c3\"|1|1|\"x\"\n> LSPERR|error|\"src/a.c3\"|2|1|\"y\"\n> LSPERR|note|\"/abs/b.c3\"|1|1|\"z\"",
        )
        .unwrap();
        let grouped = report.by_document(Path::new("/ws"));

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&doc_id_for_path(Path::new("/ws/src/a.c3"))].len(), 2);
        assert_eq!(grouped[&doc_id_for_path(Path::new("/abs/b.c3"))][0].severity, Severity::Note);
    }
}
