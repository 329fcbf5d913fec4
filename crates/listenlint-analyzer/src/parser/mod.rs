mod expressions;
mod functions;
mod statements;

use listenlint_common::{DiagnosticBag, Span};

use crate::ast::*;
use crate::lexer::token::{Token, TokenKind};

/// Recursive descent parser for JavaScript.
///
/// Uses Pratt parsing for binary operator precedence.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: DiagnosticBag,
    /// Set while parsing a `for (...)` head, where `in` ends the left side.
    no_in: bool,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map_or_else(Span::dummy, |t| t.span.clone());
            tokens.push(Token::eof(span));
        }
        Self {
            tokens,
            pos: 0,
            diagnostics: DiagnosticBag::new(),
            no_in: false,
        }
    }

    /// Parse the entire token stream into a Program.
    pub fn parse(mut self) -> (Program, DiagnosticBag) {
        let mut body = Vec::new();
        let start = self.current_span();

        while !self.is_at_end() {
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => {
                    // Error recovery: skip to next synchronization point
                    self.synchronize();
                }
            }
        }

        let end = self.current_span();
        let span = start.merge(&end);
        (Program { body, span }, self.diagnostics)
    }

    // ========================================================================
    // Token manipulation helpers
    // ========================================================================

    /// Peek at the current token kind.
    fn peek(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Peek at the next token kind (one ahead).
    fn peek_next(&self) -> TokenKind {
        self.peek_at(1)
    }

    /// Peek at a token kind N positions ahead.
    fn peek_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Get the current token.
    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Get the token N positions ahead, clamped to the final `Eof`.
    fn token_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    /// Get the previous token (the one just consumed).
    fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Advance past the current token and return it.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    /// Consume a token of the expected kind, or report an error.
    fn expect(&mut self, kind: TokenKind) -> Option<&Token> {
        if self.peek() == kind {
            self.advance();
            Some(self.previous())
        } else {
            let span = self.current_span();
            self.diagnostics.error(
                format!("expected {:?}, found {:?}", kind, self.peek()),
                span,
            );
            None
        }
    }

    /// Consume if the current token matches, otherwise do nothing.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// True if the current token is the identifier `word` (`async`, `of`, `get`, ...).
    fn is_contextual(&self, word: &str) -> bool {
        self.peek() == TokenKind::Identifier && self.current().lexeme == word
    }

    /// Check if the parser has reached EOF.
    fn is_at_end(&self) -> bool {
        self.peek() == TokenKind::Eof
    }

    /// Get the span of the current token.
    fn current_span(&self) -> Span {
        self.current().span.clone()
    }

    /// Get the span of the previous token.
    fn previous_span(&self) -> Span {
        self.previous().span.clone()
    }

    /// End a statement: an explicit `;`, or an inserted one before `}`, at
    /// the end of input, or after a line break.
    fn consume_semicolon(&mut self) -> Option<()> {
        if self.eat(TokenKind::Semicolon) {
            return Some(());
        }
        if matches!(self.peek(), TokenKind::RightBrace | TokenKind::Eof)
            || self.current().newline_before
        {
            return Some(());
        }
        let span = self.current_span();
        self.diagnostics.error(
            format!("expected ';', found {:?}", self.peek()),
            span,
        );
        None
    }

    /// Consume a binding identifier (`let`, `yield` and `await` are allowed
    /// as names in sloppy-mode scripts).
    fn expect_binding_identifier(&mut self) -> Option<String> {
        if is_binding_identifier(self.peek()) {
            Some(self.advance().lexeme.clone())
        } else {
            let span = self.current_span();
            self.diagnostics.error(
                format!("expected identifier, found {:?}", self.peek()),
                span,
            );
            None
        }
    }

    /// Consume any IdentifierName, reserved words included (`a.default`).
    fn expect_identifier_name(&mut self) -> Option<String> {
        if self.peek().is_identifier_name() {
            Some(self.advance().lexeme.clone())
        } else {
            let span = self.current_span();
            self.diagnostics.error(
                format!("expected property name, found {:?}", self.peek()),
                span,
            );
            None
        }
    }

    /// Run `f` with the `in` operator allowed again (inside brackets, parens
    /// and function bodies nested in a `for` head).
    fn allow_in<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.no_in, false);
        let result = f(self);
        self.no_in = saved;
        result
    }

    /// Error recovery: skip tokens until we find a synchronization point.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            // After a semicolon or a stray `}`, we're at a statement boundary
            if matches!(
                self.previous().kind,
                TokenKind::Semicolon | TokenKind::RightBrace
            ) {
                return;
            }
            // These token kinds start new statements
            match self.peek() {
                TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Throw
                | TokenKind::Try
                | TokenKind::Switch
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::RightBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

fn is_binding_identifier(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier | TokenKind::Let | TokenKind::Yield | TokenKind::Await
    )
}

/// Tokens that may begin a property key in an object literal or class body.
fn starts_property_key(kind: TokenKind) -> bool {
    kind.is_identifier_name()
        || matches!(
            kind,
            TokenKind::StringLiteral
                | TokenKind::NumberLiteral
                | TokenKind::BigIntLiteral
                | TokenKind::LeftBracket
                | TokenKind::PrivateName
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_with_errors(source: &str) -> (Program, DiagnosticBag) {
        let (tokens, lex_diags) = Lexer::new(source, "test.js").tokenize();
        assert!(
            !lex_diags.has_errors(),
            "lex errors: {:?}",
            lex_diags.diagnostics()
        );
        Parser::new(tokens).parse()
    }

    #[test]
    fn empty_token_stream_gets_eof() {
        let (program, diags) = Parser::new(Vec::new()).parse();
        assert!(program.body.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn recovers_after_bad_statement() {
        let (program, diags) = parse_with_errors("let = ;\nfoo();\nbar();");
        assert!(diags.has_errors());
        // Both calls after the broken declaration are still parsed
        let calls = program
            .body
            .iter()
            .filter(|s| matches!(s.kind, StmtKind::Expr(_)))
            .count();
        assert_eq!(calls, 2);
    }

    #[test]
    fn stray_closing_brace_is_reported() {
        let (program, diags) = parse_with_errors("a(); } b();");
        assert!(diags.has_errors());
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn missing_semicolon_on_same_line() {
        let (_, diags) = parse_with_errors("a() b()");
        assert!(diags.has_errors());
    }
}
