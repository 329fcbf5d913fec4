pub mod errors;
pub mod manifest;
pub mod span;

pub use errors::{Diagnostic, DiagnosticBag, RelatedSpan, Severity};
pub use manifest::{ConfigError, LintManifest};
pub use span::{Position, Span};
