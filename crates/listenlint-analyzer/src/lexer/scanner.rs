use listenlint_common::{DiagnosticBag, Position};

use super::cursor::{is_line_terminator, Cursor};
use super::token::{Token, TokenKind};

/// Lexer mode for template literal tracking.
#[derive(Debug, Clone, Copy)]
enum LexerMode {
    /// Inside a `${...}` substitution within a template literal.
    Substitution { brace_depth: u32 },
}

/// Hand-written lexer for JavaScript source.
///
/// Supports: all reserved words and punctuators, single/double quoted
/// strings with every escape form, template literals with nested
/// substitutions, regular expression literals, numeric literals in all
/// radixes (with separators and BigInt suffix), private names, line and
/// block comments, and a leading hashbang line.
///
/// Every token records whether a line terminator preceded it, which the
/// parser uses for automatic semicolon insertion.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    diagnostics: DiagnosticBag,
    mode_stack: Vec<LexerMode>,
    /// Kind of the previous significant token, used to tell `/` from a regex.
    last_kind: Option<TokenKind>,
    /// One entry per open `(`: true when it opens the head of `if`, `while`,
    /// `for` or `with`.
    paren_stack: Vec<bool>,
    /// The previous token was `if`, `while`, `for`, `with` or `for await`.
    control_keyword: bool,
    /// The previous token closed a control statement head, so a `/` starts
    /// the body, as in `if (ok) /x/.test(s)`.
    after_control_head: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, file: impl Into<String>) -> Self {
        Self {
            cursor: Cursor::new(source, file),
            diagnostics: DiagnosticBag::new(),
            mode_stack: Vec::new(),
            last_kind: None,
            paren_stack: Vec::new(),
            control_keyword: false,
            after_control_head: false,
        }
    }

    /// Tokenize the entire source, returning all tokens and diagnostics.
    pub fn tokenize(mut self) -> (Vec<Token>, DiagnosticBag) {
        self.skip_hashbang();

        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            self.note_token(token.kind);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    /// Scan the next token, skipping characters that cannot start one.
    fn next_token(&mut self) -> Token {
        let mut newline_before = false;
        loop {
            newline_before |= self.skip_whitespace_and_comments();

            if self.cursor.is_eof() {
                let pos = self.cursor.position();
                let mut token = Token::eof(self.cursor.span_from(pos));
                token.newline_before = newline_before;
                return token;
            }

            let start = self.cursor.position();
            if let Some(mut token) = self.scan_token(start) {
                token.newline_before = newline_before;
                return token;
            }
        }
    }

    /// Scan one token starting at `start`. Returns `None` after reporting an
    /// unexpected character.
    fn scan_token(&mut self, start: Position) -> Option<Token> {
        let ch = self.cursor.advance()?;

        let token = match ch {
            // === Delimiters ===
            '(' => self.make_token(TokenKind::LeftParen, start),
            ')' => self.make_token(TokenKind::RightParen, start),
            '[' => self.make_token(TokenKind::LeftBracket, start),
            ']' => self.make_token(TokenKind::RightBracket, start),
            ';' => self.make_token(TokenKind::Semicolon, start),
            ',' => self.make_token(TokenKind::Comma, start),
            ':' => self.make_token(TokenKind::Colon, start),
            '~' => self.make_token(TokenKind::Tilde, start),
            '@' => self.make_token(TokenKind::At, start),
            '{' => {
                if let Some(LexerMode::Substitution { brace_depth }) = self.mode_stack.last_mut() {
                    *brace_depth += 1;
                }
                self.make_token(TokenKind::LeftBrace, start)
            }
            '}' => {
                match self.mode_stack.last_mut() {
                    Some(LexerMode::Substitution { brace_depth: 0 }) => {
                        // End of substitution; resume template scanning
                        self.mode_stack.pop();
                        return Some(self.scan_template_content(start, false));
                    }
                    Some(LexerMode::Substitution { brace_depth }) => *brace_depth -= 1,
                    None => {}
                }
                self.make_token(TokenKind::RightBrace, start)
            }

            // === Operators (multi-char disambiguation) ===
            '.' => {
                if self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number(start, '.')
                } else if self.cursor.peek() == Some('.') && self.cursor.peek_second() == Some('.') {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.make_token(TokenKind::DotDotDot, start)
                } else {
                    self.make_token(TokenKind::Dot, start)
                }
            }
            '?' => {
                if self.cursor.peek() == Some('.')
                    && !self.cursor.peek_second().is_some_and(|c| c.is_ascii_digit())
                {
                    self.cursor.advance();
                    self.make_token(TokenKind::QuestionDot, start)
                } else if self.cursor.eat('?') {
                    if self.cursor.eat('=') {
                        self.make_token(TokenKind::QuestionQuestionEqual, start)
                    } else {
                        self.make_token(TokenKind::QuestionQuestion, start)
                    }
                } else {
                    self.make_token(TokenKind::Question, start)
                }
            }
            '=' => {
                if self.cursor.eat('=') {
                    if self.cursor.eat('=') {
                        self.make_token(TokenKind::EqualEqualEqual, start)
                    } else {
                        self.make_token(TokenKind::EqualEqual, start)
                    }
                } else if self.cursor.eat('>') {
                    self.make_token(TokenKind::FatArrow, start)
                } else {
                    self.make_token(TokenKind::Equal, start)
                }
            }
            '!' => {
                if self.cursor.eat('=') {
                    if self.cursor.eat('=') {
                        self.make_token(TokenKind::BangEqualEqual, start)
                    } else {
                        self.make_token(TokenKind::BangEqual, start)
                    }
                } else {
                    self.make_token(TokenKind::Bang, start)
                }
            }
            '<' => {
                if self.cursor.eat('<') {
                    if self.cursor.eat('=') {
                        self.make_token(TokenKind::LessLessEqual, start)
                    } else {
                        self.make_token(TokenKind::LessLess, start)
                    }
                } else if self.cursor.eat('=') {
                    self.make_token(TokenKind::LessEqual, start)
                } else {
                    self.make_token(TokenKind::Less, start)
                }
            }
            '>' => {
                if self.cursor.eat('>') {
                    if self.cursor.eat('>') {
                        if self.cursor.eat('=') {
                            self.make_token(TokenKind::GreaterGreaterGreaterEqual, start)
                        } else {
                            self.make_token(TokenKind::GreaterGreaterGreater, start)
                        }
                    } else if self.cursor.eat('=') {
                        self.make_token(TokenKind::GreaterGreaterEqual, start)
                    } else {
                        self.make_token(TokenKind::GreaterGreater, start)
                    }
                } else if self.cursor.eat('=') {
                    self.make_token(TokenKind::GreaterEqual, start)
                } else {
                    self.make_token(TokenKind::Greater, start)
                }
            }
            '+' => {
                if self.cursor.eat('+') {
                    self.make_token(TokenKind::PlusPlus, start)
                } else if self.cursor.eat('=') {
                    self.make_token(TokenKind::PlusEqual, start)
                } else {
                    self.make_token(TokenKind::Plus, start)
                }
            }
            '-' => {
                if self.cursor.eat('-') {
                    self.make_token(TokenKind::MinusMinus, start)
                } else if self.cursor.eat('=') {
                    self.make_token(TokenKind::MinusEqual, start)
                } else {
                    self.make_token(TokenKind::Minus, start)
                }
            }
            '*' => {
                if self.cursor.eat('*') {
                    if self.cursor.eat('=') {
                        self.make_token(TokenKind::StarStarEqual, start)
                    } else {
                        self.make_token(TokenKind::StarStar, start)
                    }
                } else if self.cursor.eat('=') {
                    self.make_token(TokenKind::StarEqual, start)
                } else {
                    self.make_token(TokenKind::Star, start)
                }
            }
            '/' => {
                if self.regex_allowed() {
                    self.scan_regex(start)
                } else if self.cursor.eat('=') {
                    self.make_token(TokenKind::SlashEqual, start)
                } else {
                    self.make_token(TokenKind::Slash, start)
                }
            }
            '%' => {
                if self.cursor.eat('=') {
                    self.make_token(TokenKind::PercentEqual, start)
                } else {
                    self.make_token(TokenKind::Percent, start)
                }
            }
            '&' => {
                if self.cursor.eat('&') {
                    if self.cursor.eat('=') {
                        self.make_token(TokenKind::AmpAmpEqual, start)
                    } else {
                        self.make_token(TokenKind::AmpAmp, start)
                    }
                } else if self.cursor.eat('=') {
                    self.make_token(TokenKind::AmpEqual, start)
                } else {
                    self.make_token(TokenKind::Amp, start)
                }
            }
            '|' => {
                if self.cursor.eat('|') {
                    if self.cursor.eat('=') {
                        self.make_token(TokenKind::PipePipeEqual, start)
                    } else {
                        self.make_token(TokenKind::PipePipe, start)
                    }
                } else if self.cursor.eat('=') {
                    self.make_token(TokenKind::PipeEqual, start)
                } else {
                    self.make_token(TokenKind::Pipe, start)
                }
            }
            '^' => {
                if self.cursor.eat('=') {
                    self.make_token(TokenKind::CaretEqual, start)
                } else {
                    self.make_token(TokenKind::Caret, start)
                }
            }

            // === String and template literals ===
            '\'' | '"' => self.scan_string(start, ch),
            '`' => self.scan_template_content(start, true),

            // === Number literals ===
            c if c.is_ascii_digit() => self.scan_number(start, c),

            // === Private names ===
            '#' if self.cursor.peek().is_some_and(is_ident_start) => {
                let name_start = self.cursor.position();
                self.cursor.eat_while(is_ident_continue);
                let name = self.cursor.slice_from(name_start.offset);
                Token::new(TokenKind::PrivateName, name, self.cursor.span_from(start))
            }

            // === Identifiers and keywords ===
            c if is_ident_start(c) => self.scan_identifier(start),
            '\\' if self.cursor.peek() == Some('u') => {
                self.scan_escaped_identifier(start, String::new())
            }

            _ => {
                let span = self.cursor.span_from(start);
                self.diagnostics
                    .error(format!("unexpected character '{}'", ch), span);
                return None;
            }
        };
        Some(token)
    }

    /// A `/` starts a regular expression unless it follows an operand.
    fn regex_allowed(&self) -> bool {
        self.after_control_head || self.last_kind.map_or(true, |kind| !kind.ends_operand())
    }

    /// Record `kind` as the previous token and track control statement heads.
    fn note_token(&mut self, kind: TokenKind) {
        let is_property_name = matches!(
            self.last_kind,
            Some(TokenKind::Dot | TokenKind::QuestionDot)
        );
        self.after_control_head = match kind {
            TokenKind::LeftParen => {
                self.paren_stack.push(self.control_keyword);
                false
            }
            TokenKind::RightParen => self.paren_stack.pop().unwrap_or(false),
            _ => false,
        };
        self.control_keyword = match kind {
            TokenKind::If | TokenKind::While | TokenKind::For | TokenKind::With => {
                !is_property_name
            }
            TokenKind::Await => self.control_keyword,
            _ => false,
        };
        self.last_kind = Some(kind);
    }

    // ---------------------------------------------------------------
    // Whitespace & comments
    // ---------------------------------------------------------------

    /// Skip `#!...` on the very first line.
    fn skip_hashbang(&mut self) {
        if self.cursor.peek() == Some('#') && self.cursor.peek_second() == Some('!') {
            self.cursor.eat_while(|c| !is_line_terminator(c));
        }
    }

    /// Skip whitespace and comments. Returns true if a line terminator was crossed.
    fn skip_whitespace_and_comments(&mut self) -> bool {
        let mut newline = false;
        loop {
            match self.cursor.peek() {
                Some(c) if is_line_terminator(c) => {
                    newline = true;
                    self.cursor.advance();
                }
                Some(c) if c.is_whitespace() || c == '\u{FEFF}' => {
                    self.cursor.advance();
                }
                Some('/') => match self.cursor.peek_second() {
                    Some('/') => {
                        self.cursor.eat_while(|c| !is_line_terminator(c));
                    }
                    Some('*') => {
                        let start = self.cursor.position();
                        self.cursor.advance(); // /
                        self.cursor.advance(); // *
                        newline |= self.skip_block_comment(start);
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        newline
    }

    /// Skip a block comment body. Returns true if it spanned a line break.
    fn skip_block_comment(&mut self, start: Position) -> bool {
        let mut newline = false;
        loop {
            match self.cursor.advance() {
                Some('*') if self.cursor.peek() == Some('/') => {
                    self.cursor.advance();
                    return newline;
                }
                Some(c) if is_line_terminator(c) => newline = true,
                Some(_) => {}
                None => {
                    let span = self.cursor.span_from(start);
                    self.diagnostics.error("unterminated block comment", span);
                    return newline;
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // String scanning
    // ---------------------------------------------------------------

    /// Scan a quoted string after the opening quote is consumed.
    fn scan_string(&mut self, start: Position, quote: char) -> Token {
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                Some(c) if c == quote => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.scan_escape(&mut value, start);
                }
                Some(c) if c == '\n' || c == '\r' => {
                    let span = self.cursor.span_from(start);
                    self.diagnostics.error("unterminated string literal", span);
                    break;
                }
                Some(c) => {
                    self.cursor.advance();
                    value.push(c);
                }
                None => {
                    let span = self.cursor.span_from(start);
                    self.diagnostics.error("unterminated string literal", span);
                    break;
                }
            }
        }
        Token::new(TokenKind::StringLiteral, value, self.cursor.span_from(start))
    }

    /// Scan template text after `` ` `` (when `is_start`) or after the `}`
    /// that closes a substitution.
    fn scan_template_content(&mut self, start: Position, is_start: bool) -> Token {
        let mut value = String::new();
        loop {
            match self.cursor.advance() {
                Some('`') => {
                    let kind = if is_start {
                        TokenKind::NoSubstitutionTemplate
                    } else {
                        TokenKind::TemplateTail
                    };
                    return Token::new(kind, value, self.cursor.span_from(start));
                }
                Some('$') if self.cursor.peek() == Some('{') => {
                    self.cursor.advance(); // consume '{'
                    self.mode_stack
                        .push(LexerMode::Substitution { brace_depth: 0 });
                    let kind = if is_start {
                        TokenKind::TemplateHead
                    } else {
                        TokenKind::TemplateMiddle
                    };
                    return Token::new(kind, value, self.cursor.span_from(start));
                }
                Some('\\') => self.scan_escape(&mut value, start),
                Some('\r') => {
                    self.cursor.eat('\n');
                    value.push('\n');
                }
                Some(c) => value.push(c),
                None => {
                    let span = self.cursor.span_from(start);
                    self.diagnostics
                        .error("unterminated template literal", span.clone());
                    let kind = if is_start {
                        TokenKind::NoSubstitutionTemplate
                    } else {
                        TokenKind::TemplateTail
                    };
                    return Token::new(kind, value, span);
                }
            }
        }
    }

    /// Decode one escape sequence. Called after the `\` has been consumed.
    fn scan_escape(&mut self, value: &mut String, literal_start: Position) {
        match self.cursor.advance() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('b') => value.push('\u{8}'),
            Some('f') => value.push('\u{c}'),
            Some('v') => value.push('\u{b}'),
            Some('0') if !self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) => {
                value.push('\0')
            }
            Some('x') => self.scan_hex_escape(value, literal_start, 2),
            Some('u') => {
                if self.cursor.eat('{') {
                    let hex_start = self.cursor.position();
                    self.cursor.eat_while(|c| c.is_ascii_hexdigit());
                    let hex = self.cursor.slice_from(hex_start.offset);
                    if !self.cursor.eat('}') || hex.is_empty() {
                        let span = self.cursor.span_from(literal_start);
                        self.diagnostics.error("malformed unicode escape", span);
                        return;
                    }
                    self.push_code_point(value, hex, literal_start);
                } else {
                    self.scan_hex_escape(value, literal_start, 4);
                }
            }
            // Line continuation
            Some('\r') => {
                self.cursor.eat('\n');
            }
            Some(c) if is_line_terminator(c) => {}
            Some(c) => value.push(c),
            None => {
                let span = self.cursor.span_from(literal_start);
                self.diagnostics.error("unterminated escape sequence", span);
            }
        }
    }

    /// Decode exactly `digits` hex digits (`\xHH`, `\uHHHH`).
    fn scan_hex_escape(&mut self, value: &mut String, literal_start: Position, digits: usize) {
        let hex_start = self.cursor.position();
        for _ in 0..digits {
            if !self.cursor.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                let span = self.cursor.span_from(literal_start);
                self.diagnostics.error("malformed hexadecimal escape", span);
                return;
            }
            self.cursor.advance();
        }
        let hex = self.cursor.slice_from(hex_start.offset);
        self.push_code_point(value, hex, literal_start);
    }

    fn push_code_point(&mut self, value: &mut String, hex: &str, literal_start: Position) {
        match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
            Some(ch) => value.push(ch),
            // Lone surrogates have no `char`; keep a replacement so the text stays usable.
            None if u32::from_str_radix(hex, 16).is_ok_and(|cp| (0xD800..=0xDFFF).contains(&cp)) => {
                value.push(char::REPLACEMENT_CHARACTER)
            }
            None => {
                let span = self.cursor.span_from(literal_start);
                self.diagnostics
                    .error(format!("invalid code point in escape: {}", hex), span);
            }
        }
    }

    // ---------------------------------------------------------------
    // Regular expressions
    // ---------------------------------------------------------------

    /// Scan a regular expression literal after the opening `/`.
    fn scan_regex(&mut self, start: Position) -> Token {
        let mut in_class = false;
        loop {
            match self.cursor.peek() {
                Some(c) if is_line_terminator(c) => {
                    let span = self.cursor.span_from(start);
                    self.diagnostics
                        .error("unterminated regular expression literal", span.clone());
                    return Token::new(TokenKind::RegexLiteral, self.cursor.slice_from(start.offset), span);
                }
                None => {
                    let span = self.cursor.span_from(start);
                    self.diagnostics
                        .error("unterminated regular expression literal", span.clone());
                    return Token::new(TokenKind::RegexLiteral, self.cursor.slice_from(start.offset), span);
                }
                Some('\\') => {
                    self.cursor.advance();
                    if !self.cursor.peek().is_some_and(is_line_terminator) {
                        self.cursor.advance();
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.cursor.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.cursor.advance();
                }
                Some('/') if !in_class => {
                    self.cursor.advance();
                    break;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        // Flags
        self.cursor.eat_while(is_ident_continue);
        self.make_token(TokenKind::RegexLiteral, start)
    }

    // ---------------------------------------------------------------
    // Number scanning
    // ---------------------------------------------------------------

    /// Scan a numeric literal. `first` is the already-consumed first character
    /// (a digit, or `.` for literals like `.5`).
    fn scan_number(&mut self, start: Position, first: char) -> Token {
        if first == '0' {
            let radix = match self.cursor.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.cursor.advance(); // consume prefix
                let digit_start = self.cursor.position();
                self.cursor
                    .eat_while(|c| c.is_digit(radix) || c == '_');
                if self.cursor.position().offset == digit_start.offset {
                    let span = self.cursor.span_from(start);
                    self.diagnostics.error(
                        format!("expected digits after '{}'", self.cursor.slice_from(start.offset)),
                        span,
                    );
                }
                return self.finish_number(start, true);
            }
        }

        let mut is_integer = first != '.';
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');

        if first != '.' && self.cursor.peek() == Some('.') {
            self.cursor.advance(); // consume '.'
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            is_integer = false;
        }

        // Exponent
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            let has_digits = match self.cursor.peek_second() {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => true,
                _ => false,
            };
            if has_digits {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some('+' | '-')) {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
                is_integer = false;
            }
        }

        self.finish_number(start, is_integer)
    }

    /// Handle the BigInt suffix and reject identifiers glued to the number.
    fn finish_number(&mut self, start: Position, is_integer: bool) -> Token {
        let kind = if is_integer && self.cursor.eat('n') {
            TokenKind::BigIntLiteral
        } else {
            TokenKind::NumberLiteral
        };
        if self.cursor.peek().is_some_and(is_ident_start) {
            let span = self.cursor.span_from(start);
            self.diagnostics.error(
                "identifier starts immediately after numeric literal",
                span,
            );
            self.cursor.eat_while(is_ident_continue);
        }
        self.make_token(kind, start)
    }

    // ---------------------------------------------------------------
    // Identifier / keyword scanning
    // ---------------------------------------------------------------

    /// Scan an identifier or reserved word.
    fn scan_identifier(&mut self, start: Position) -> Token {
        self.cursor.eat_while(is_ident_continue);
        let lexeme = self.cursor.slice_from(start.offset);
        if self.cursor.eat('\\') {
            return self.scan_escaped_identifier(start, lexeme.to_string());
        }
        let kind = TokenKind::keyword_from_str(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    /// Continue an identifier just after a `\`, decoding `\uXXXX` and
    /// `\u{...}` escapes into `name`. An escaped reserved word stays an
    /// identifier.
    fn scan_escaped_identifier(&mut self, start: Position, mut name: String) -> Token {
        loop {
            if self.cursor.peek() == Some('u') {
                self.scan_escape(&mut name, start);
            } else {
                let span = self.cursor.span_from(start);
                self.diagnostics
                    .error("expected unicode escape in identifier", span);
            }
            let rest = self.cursor.position().offset;
            self.cursor.eat_while(is_ident_continue);
            name.push_str(self.cursor.slice_from(rest));
            if !self.cursor.eat('\\') {
                break;
            }
        }
        Token::new(TokenKind::Identifier, name, self.cursor.span_from(start))
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    /// Create a token using the slice from `start` to current position.
    fn make_token(&self, kind: TokenKind, start: Position) -> Token {
        let lexeme = self.cursor.slice_from(start.offset);
        let span = self.cursor.span_from(start);
        Token::new(kind, lexeme, span)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == '$'
        || c == '\u{200C}'
        || c == '\u{200D}'
        || (!c.is_ascii() && c.is_alphanumeric())
}
