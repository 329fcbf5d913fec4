pub mod ast;
pub mod lexer;
pub mod listeners;
pub mod parser;
pub mod rule;

use listenlint_common::{Diagnostic, DiagnosticBag};

use crate::ast::Program;
use crate::lexer::Lexer;
use crate::listeners::{ListenerDiagnostic, ListenerPass};
use crate::parser::Parser;
use crate::rule::PARSE_ERROR_CODE;

/// Result of linting one analysis unit.
#[derive(Debug)]
pub enum LintOutcome {
    /// The unit parsed; these are the listener findings in emission order.
    Analyzed(Vec<ListenerDiagnostic>),
    /// The unit did not parse and was not analysed.
    SyntaxErrors(Vec<Diagnostic>),
}

/// Lex and parse `source`.
///
/// Any lexical or syntax error fails the whole unit. Lexical errors are
/// returned on their own, since parsing a broken token stream only adds
/// noise. The returned diagnostics carry the `parse-error` code.
pub fn parse_source(source: &str, file: &str) -> Result<Program, Vec<Diagnostic>> {
    let (tokens, lex_diags) = Lexer::new(source, file).tokenize();
    if lex_diags.has_errors() {
        return Err(syntax_errors(lex_diags));
    }

    let (program, parse_diags) = Parser::new(tokens).parse();
    if parse_diags.has_errors() {
        return Err(syntax_errors(parse_diags));
    }
    Ok(program)
}

fn syntax_errors(bag: DiagnosticBag) -> Vec<Diagnostic> {
    bag.into_diagnostics()
        .into_iter()
        .map(|d| d.with_code(PARSE_ERROR_CODE))
        .collect()
}

/// Run the `remove-listeners` pass over one source file.
#[tracing::instrument(level = "debug", skip_all, fields(file = %file, bytes = source.len()))]
pub fn lint_source(source: &str, file: &str) -> LintOutcome {
    match parse_source(source, file) {
        Ok(program) => {
            let diagnostics = ListenerPass::check_program(&program, source);
            tracing::debug!(count = diagnostics.len(), "listener pass complete");
            LintOutcome::Analyzed(diagnostics)
        }
        Err(errors) => {
            tracing::debug!(count = errors.len(), "syntax errors, unit skipped");
            LintOutcome::SyntaxErrors(errors)
        }
    }
}
