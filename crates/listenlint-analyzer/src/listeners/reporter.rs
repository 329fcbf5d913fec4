use std::fmt;

use listenlint_common::{Diagnostic, Severity, Span};

use crate::rule::DiagnosticKind;

use super::resolver::IdentityKey;

const REPLACED_LABEL: &str = "replaced by a later registration of the same listener";

/// A finding of the listener pass, before any severity is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerDiagnostic {
    pub kind: DiagnosticKind,
    /// Span of the offending call expression.
    pub span: Span,
    pub identity: IdentityKey,
    pub message: String,
    /// Earlier registrations of the same listener that the reported one
    /// replaced.
    pub replaced: Vec<Span>,
}

impl ListenerDiagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, identity: IdentityKey) -> Self {
        let message = format_message(kind, &identity);
        Self {
            kind,
            span,
            identity,
            message,
            replaced: Vec::new(),
        }
    }

    pub fn with_replaced(mut self, replaced: Vec<Span>) -> Self {
        self.replaced = replaced;
        self
    }

    /// Convert into a common diagnostic carrying the kind's code and help.
    pub fn to_diagnostic(&self, severity: Severity) -> Diagnostic {
        let diagnostic = Diagnostic::new(severity, self.message.clone())
            .with_span(self.span.clone())
            .with_code(self.kind.code())
            .with_suggestion(self.kind.help());
        self.replaced.iter().fold(diagnostic, |diagnostic, span| {
            diagnostic.with_related(span.clone(), REPLACED_LABEL)
        })
    }
}

impl fmt::Display for ListenerDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn format_message(kind: DiagnosticKind, key: &IdentityKey) -> String {
    let IdentityKey {
        scope,
        event,
        handler,
    } = key;
    match kind {
        DiagnosticKind::InlineHandlerUsed => format!(
            "No inline addEventListener handlers allowed. {}.addEventListener('{}', {})",
            scope, event, handler
        ),
        DiagnosticKind::OrphanRemoval => format!(
            "No corresponding addEventListener found for the {}.removeEventListener('{}', {})",
            scope, event, handler
        ),
        DiagnosticKind::UnmatchedRegistration => format!(
            "EventListener added for '{}' on '{}' but not removed with removeEventListener for handler '{}'",
            event, scope, handler
        ),
    }
}
