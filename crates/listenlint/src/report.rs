use std::fs;
use std::path::Path;

use listenlint_analyzer::listeners::IdentityKey;
use listenlint_analyzer::{lint_source, LintOutcome};
use listenlint_common::{Diagnostic, LintManifest, Severity};

use crate::error::CliError;

/// A diagnostic ready for output, with the listener identity when there is one.
#[derive(Debug)]
pub struct Finding {
    pub diagnostic: Diagnostic,
    pub identity: Option<IdentityKey>,
}

/// Everything reported for one analysis unit.
#[derive(Debug)]
pub struct FileReport {
    /// Path as shown in output.
    pub name: String,
    pub source: String,
    pub findings: Vec<Finding>,
}

impl FileReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.diagnostic.severity == severity)
            .count()
    }
}

/// Read and lint one file, applying the configured severities.
///
/// Kinds configured as `off` are dropped. Syntax errors are always errors.
pub fn lint_file(path: &Path, manifest: &LintManifest) -> Result<FileReport, CliError> {
    let source = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = display_name(path);

    let findings = match lint_source(&source, &name) {
        LintOutcome::Analyzed(diagnostics) => diagnostics
            .into_iter()
            .filter_map(|finding| {
                let severity = manifest.severity_for(finding.kind.code());
                if severity == Severity::Off {
                    return None;
                }
                Some(Finding {
                    diagnostic: finding.to_diagnostic(severity),
                    identity: Some(finding.identity),
                })
            })
            .collect(),
        LintOutcome::SyntaxErrors(errors) => errors
            .into_iter()
            .map(|diagnostic| Finding {
                diagnostic,
                identity: None,
            })
            .collect(),
    };

    Ok(FileReport {
        name,
        source,
        findings,
    })
}

fn display_name(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}
