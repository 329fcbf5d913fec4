//! Static metadata for the `remove-listeners` rule.
//!
//! The rule takes no options. Hosts use this metadata to describe the rule
//! and to map each diagnostic kind to a stable code.

/// Category of a lint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Language idioms and recommended patterns.
    BestPractice,
}

/// Static metadata for a lint rule.
#[derive(Debug)]
pub struct RuleMeta {
    /// Rule name, e.g. "remove-listeners".
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    pub category: Category,
    /// Enabled by default in a recommended configuration.
    pub recommended: bool,
    /// Option schema entries. Always empty: the rule is not configurable.
    pub schema: &'static [&'static str],
}

pub const REMOVE_LISTENERS: RuleMeta = RuleMeta {
    name: "remove-listeners",
    description: "Require a corresponding removeEventListener for each addEventListener",
    category: Category::BestPractice,
    recommended: true,
    schema: &[],
};

/// Code attached to syntax errors that stop a file from being analysed.
pub const PARSE_ERROR_CODE: &str = "parse-error";

/// The three conditions the listener pass reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// `addEventListener` called with a function literal as the handler.
    InlineHandlerUsed,
    /// `removeEventListener` with no pending registration for its identity.
    OrphanRemoval,
    /// A tracked registration still pending when the unit ends.
    UnmatchedRegistration,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 3] = [
        DiagnosticKind::InlineHandlerUsed,
        DiagnosticKind::OrphanRemoval,
        DiagnosticKind::UnmatchedRegistration,
    ];

    /// Stable code, also the key accepted under `[lint.kinds]`.
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::InlineHandlerUsed => "inline-handler",
            DiagnosticKind::OrphanRemoval => "orphan-removal",
            DiagnosticKind::UnmatchedRegistration => "unmatched-registration",
        }
    }

    /// Help text shown under the diagnostic.
    pub fn help(self) -> &'static str {
        match self {
            DiagnosticKind::InlineHandlerUsed => {
                "move the handler to a named function or method so it can be removed later"
            }
            DiagnosticKind::OrphanRemoval => {
                "check that the target, event and handler match an earlier addEventListener call"
            }
            DiagnosticKind::UnmatchedRegistration => {
                "call removeEventListener with the same target, event and handler, or pass { once: true }"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listenlint_common::manifest::DIAGNOSTIC_KINDS;

    #[test]
    fn codes_match_configurable_kinds() {
        let codes: Vec<_> = DiagnosticKind::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes, DIAGNOSTIC_KINDS);
    }

    #[test]
    fn rule_takes_no_options() {
        assert_eq!(REMOVE_LISTENERS.name, "remove-listeners");
        assert!(REMOVE_LISTENERS.schema.is_empty());
        assert!(REMOVE_LISTENERS.recommended);
    }
}
