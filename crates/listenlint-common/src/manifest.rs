use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::Severity;

/// File name searched for when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "Listenlint.toml";

/// Diagnostic kinds that accept a severity override under `[lint.kinds]`.
pub const DIAGNOSTIC_KINDS: [&str; 3] = [
    "inline-handler",
    "orphan-removal",
    "unmatched-registration",
];

/// The parsed Listenlint.toml manifest.
#[derive(Debug, Clone)]
pub struct LintManifest {
    pub lint: LintSection,
    pub files: FilesSection,
    /// The directory containing the manifest (or the working directory for defaults).
    pub root_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LintSection {
    /// Severity applied to every kind without an override.
    pub severity: Severity,
    /// Per-kind overrides, keyed by kind code.
    pub kinds: HashMap<String, Severity>,
}

#[derive(Debug, Clone)]
pub struct FilesSection {
    /// Extensions (without the dot) picked up during directory discovery.
    pub extensions: Vec<String>,
    /// File or directory names skipped during directory discovery.
    pub ignore: Vec<String>,
}

impl LintManifest {
    /// Defaults used when no manifest exists.
    pub fn defaults(root_dir: PathBuf) -> Self {
        Self {
            lint: LintSection {
                severity: Severity::Error,
                kinds: HashMap::new(),
            },
            files: FilesSection {
                extensions: default_extensions(),
                ignore: Vec::new(),
            },
            root_dir,
        }
    }

    /// Effective severity for a diagnostic kind code.
    pub fn severity_for(&self, kind: &str) -> Severity {
        self.lint
            .kinds
            .get(kind)
            .copied()
            .unwrap_or(self.lint.severity)
    }

    /// True if `extension` (without the dot) is linted during discovery.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.files.extensions.iter().any(|e| e == extension)
    }

    /// True if a file or directory with this name is skipped during discovery.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.files.ignore.iter().any(|i| i == name)
    }
}

fn default_extensions() -> Vec<String> {
    vec!["js".to_string(), "mjs".to_string(), "cjs".to_string()]
}

/// Raw TOML structure for deserialization.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    lint: RawLint,
    #[serde(default)]
    files: RawFiles,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawLint {
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    kinds: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFiles {
    #[serde(default = "default_extensions")]
    extensions: Vec<String>,
    #[serde(default)]
    ignore: Vec<String>,
}

impl Default for RawFiles {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore: Vec::new(),
        }
    }
}

/// Errors that can occur when loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read Listenlint.toml: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid Listenlint.toml: {0}")]
    ParseError(String),
    #[error("invalid Listenlint.toml: `{key}` has unknown severity '{value}' (expected 'off', 'warn' or 'error')")]
    UnknownSeverity { key: String, value: String },
    #[error("invalid Listenlint.toml: unknown kind '{0}' in [lint.kinds] (expected one of: {kinds})", kinds = DIAGNOSTIC_KINDS.join(", "))]
    UnknownKind(String),
    #[error("invalid Listenlint.toml: [files] extensions must not be empty")]
    NoExtensions,
}

/// Walk up from `start_dir` looking for `Listenlint.toml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load and validate a manifest from a file path.
pub fn load_config(path: &Path) -> Result<LintManifest, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let root_dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    parse_config(&content, root_dir)
}

/// Parse and validate a manifest from a string.
pub fn parse_config(content: &str, root_dir: PathBuf) -> Result<LintManifest, ConfigError> {
    let raw: RawManifest =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    let severity = match raw.lint.severity {
        Some(value) => parse_severity("lint.severity", &value)?,
        None => Severity::Error,
    };

    let mut kinds = HashMap::new();
    for (kind, value) in raw.lint.kinds {
        if !DIAGNOSTIC_KINDS.contains(&kind.as_str()) {
            return Err(ConfigError::UnknownKind(kind));
        }
        let parsed = parse_severity(&format!("lint.kinds.{}", kind), &value)?;
        kinds.insert(kind, parsed);
    }

    let extensions: Vec<String> = raw
        .files
        .extensions
        .into_iter()
        .map(|e| e.trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect();
    if extensions.is_empty() {
        return Err(ConfigError::NoExtensions);
    }

    Ok(LintManifest {
        lint: LintSection { severity, kinds },
        files: FilesSection {
            extensions,
            ignore: raw.files.ignore,
        },
        root_dir,
    })
}

fn parse_severity(key: &str, value: &str) -> Result<Severity, ConfigError> {
    Severity::from_config(value).ok_or_else(|| ConfigError::UnknownSeverity {
        key: key.to_string(),
        value: value.to_string(),
    })
}
