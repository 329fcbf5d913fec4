use std::io;

use ariadne::{Color, Label, Report, ReportKind, Source};
use serde::Serialize;

use listenlint_analyzer::rule::REMOVE_LISTENERS;
use listenlint_common::{Diagnostic, Severity};

use crate::report::{FileReport, Finding};

/// Rule name reported for syntax errors in JSON output.
const SYNTAX_RULE: &str = "syntax";

// ============================================================================
// Pretty output
// ============================================================================

/// Print each finding of `report` to stderr. Warnings are skipped when
/// `quiet` is set.
pub fn print_pretty(report: &FileReport, quiet: bool) -> io::Result<()> {
    for finding in visible(report, quiet) {
        print_diagnostic(&finding.diagnostic, &report.source, &report.name)?;
    }
    Ok(())
}

fn print_diagnostic(diag: &Diagnostic, source: &str, file_name: &str) -> io::Result<()> {
    let kind = if diag.is_error() {
        ReportKind::Error
    } else {
        ReportKind::Warning
    };

    let Some(ref span) = diag.span else {
        eprintln!("{}: {}", diag.severity.as_str(), diag.message);
        if let Some(ref suggestion) = diag.suggestion {
            eprintln!("   = help: {}", suggestion);
        }
        eprintln!();
        return Ok(());
    };

    let start = char_offset(source, span.start.offset as usize);
    let end = char_offset(source, span.end.offset as usize).max(start + 1);
    let color = if diag.is_error() {
        Color::Red
    } else {
        Color::Yellow
    };

    let mut report = Report::build(kind, file_name, start).with_message(&diag.message);
    if let Some(code) = diag.code {
        report = report.with_code(code);
    }
    report = report.with_label(
        Label::new((file_name, start..end))
            .with_message(&diag.message)
            .with_color(color),
    );
    for related in &diag.related {
        let rs = char_offset(source, related.span.start.offset as usize);
        let re = char_offset(source, related.span.end.offset as usize).max(rs + 1);
        report = report.with_label(
            Label::new((file_name, rs..re))
                .with_message(&related.message)
                .with_color(Color::Blue),
        );
    }
    if let Some(ref suggestion) = diag.suggestion {
        report = report.with_help(suggestion);
    }

    report
        .finish()
        .eprint((file_name, Source::from(source)))
}

/// Labels are positioned in characters, spans in bytes.
fn char_offset(source: &str, byte_offset: usize) -> usize {
    source
        .get(..byte_offset)
        .map_or(byte_offset, |prefix| prefix.chars().count())
}

/// The closing summary line.
pub fn summary(files: usize, errors: usize, warnings: usize) -> String {
    format!(
        "Linted {} files: {} errors, {} warnings.",
        files, errors, warnings
    )
}

// ============================================================================
// JSON output
// ============================================================================

#[derive(Debug, Serialize)]
pub struct JsonFile<'a> {
    pub file: &'a str,
    pub diagnostics: Vec<JsonDiagnostic<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic<'a> {
    pub rule: &'static str,
    pub code: &'static str,
    pub severity: &'static str,
    pub message: &'a str,
    pub line: u32,
    pub column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<&'a str>,
}

/// Build the JSON document for every report, in order.
pub fn json_files(reports: &[FileReport], quiet: bool) -> Vec<JsonFile<'_>> {
    reports
        .iter()
        .map(|report| JsonFile {
            file: &report.name,
            diagnostics: visible(report, quiet).map(json_diagnostic).collect(),
        })
        .collect()
}

fn json_diagnostic(finding: &Finding) -> JsonDiagnostic<'_> {
    let diag = &finding.diagnostic;
    let identity = finding.identity.as_ref();
    let (line, column) = diag
        .span
        .as_ref()
        .map_or((0, 0), |s| (s.start.line, s.start.column));
    JsonDiagnostic {
        rule: if identity.is_some() {
            REMOVE_LISTENERS.name
        } else {
            SYNTAX_RULE
        },
        code: diag.code.unwrap_or_default(),
        severity: diag.severity.as_str(),
        message: &diag.message,
        line,
        column,
        scope: identity.map(|k| k.scope.as_str()),
        event: identity.map(|k| k.event.as_str()),
        handler: identity.map(|k| k.handler.as_str()),
    }
}

fn visible(report: &FileReport, quiet: bool) -> impl Iterator<Item = &Finding> {
    report
        .findings
        .iter()
        .filter(move |f| !(quiet && f.diagnostic.severity == Severity::Warning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use listenlint_analyzer::listeners::IdentityKey;
    use listenlint_common::{Position, Span};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn report() -> FileReport {
        let span = Span::new("app.js", Position::new(2, 5, 12), Position::new(2, 40, 47));
        FileReport {
            name: "app.js".to_string(),
            source: String::new(),
            findings: vec![
                Finding {
                    diagnostic: Diagnostic::warning("leaked")
                        .with_span(span.clone())
                        .with_code("unmatched-registration"),
                    identity: Some(IdentityKey::new("document", "click", "onClick")),
                },
                Finding {
                    diagnostic: Diagnostic::error("expected ';'")
                        .with_span(span)
                        .with_code("parse-error"),
                    identity: None,
                },
            ],
        }
    }

    #[test]
    fn json_shape() {
        let reports = vec![report()];
        let value = serde_json::to_value(json_files(&reports, false)).unwrap();
        assert_eq!(
            value,
            json!([{
                "file": "app.js",
                "diagnostics": [
                    {
                        "rule": "remove-listeners",
                        "code": "unmatched-registration",
                        "severity": "warning",
                        "message": "leaked",
                        "line": 2,
                        "column": 5,
                        "scope": "document",
                        "event": "click",
                        "handler": "onClick"
                    },
                    {
                        "rule": "syntax",
                        "code": "parse-error",
                        "severity": "error",
                        "message": "expected ';'",
                        "line": 2,
                        "column": 5
                    }
                ]
            }])
        );
    }

    #[test]
    fn quiet_hides_warnings() {
        let reports = vec![report()];
        let files = json_files(&reports, true);
        assert_eq!(files[0].diagnostics.len(), 1);
        assert_eq!(files[0].diagnostics[0].severity, "error");
    }

    #[test]
    fn char_offsets_for_labels() {
        let source = "é.addEventListener('x', f)";
        assert_eq!(char_offset(source, 0), 0);
        assert_eq!(char_offset(source, 2), 1);
    }

    #[test]
    fn summary_line() {
        assert_eq!(summary(3, 2, 1), "Linted 3 files: 2 errors, 1 warnings.");
    }
}
