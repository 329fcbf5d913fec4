use crate::span::Span;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Suppressed; never reaches output.
    Off,
    /// Reported, does not affect the exit code.
    Warning,
    /// Reported, causes a non-zero exit code.
    Error,
}

impl Severity {
    /// Parse a configuration spelling (`off`, `warn`/`warning`, `error`).
    pub fn from_config(value: &str) -> Option<Severity> {
        match value {
            "off" => Some(Severity::Off),
            "warn" | "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Off => "off",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A related source location providing additional context for a diagnostic.
#[derive(Debug, Clone)]
pub struct RelatedSpan {
    pub span: Span,
    pub message: String,
}

/// A diagnostic produced while reading, parsing, or linting a file.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    /// Stable identifier of what produced this diagnostic, e.g. `orphan-removal`.
    pub code: Option<&'static str>,
    pub related: Vec<RelatedSpan>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            span: None,
            code: None,
            related: Vec::new(),
            suggestion: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(RelatedSpan {
            span,
            message: message.into(),
        });
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.severity.as_str())?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(ref span) = self.span {
            write!(f, "\n  --> {}", span)?;
        }
        Ok(())
    }
}

/// Ordered collector for diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::error(message).with_span(span));
    }

    pub fn warning(&mut self, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::warning(message).with_span(span));
    }

    /// Move every diagnostic from `other` to the end of this bag.
    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    #[test]
    fn severity_config_spellings() {
        assert_eq!(Severity::from_config("off"), Some(Severity::Off));
        assert_eq!(Severity::from_config("warn"), Some(Severity::Warning));
        assert_eq!(Severity::from_config("warning"), Some(Severity::Warning));
        assert_eq!(Severity::from_config("error"), Some(Severity::Error));
        assert_eq!(Severity::from_config("fatal"), None);
    }

    #[test]
    fn display_includes_code_and_location() {
        let span = Span::new("a.js", Position::new(3, 5, 40), Position::new(3, 9, 44));
        let diag = Diagnostic::error("listener leaked")
            .with_code("unmatched-registration")
            .with_span(span);
        assert_eq!(
            diag.to_string(),
            "error[unmatched-registration]: listener leaked\n  --> a.js:3:5"
        );
    }

    #[test]
    fn bag_tracks_errors_in_order() {
        let mut bag = DiagnosticBag::new();
        bag.warning("first", Span::dummy());
        assert!(!bag.has_errors());
        bag.error("second", Span::dummy());
        assert!(bag.has_errors());
        let messages: Vec<_> = bag.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }
}
