use listenlint_common::Span;
use std::fmt;

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text for punctuators, names, numbers and regular expressions;
    /// the cooked value for strings and template parts.
    pub lexeme: String,
    pub span: Span,
    /// A line terminator appeared between the previous token and this one.
    pub newline_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
            newline_before: false,
        }
    }

    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, String::new(), span)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.lexeme)
    }
}

/// All token kinds of the JavaScript subset listenlint reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Literals ===
    NumberLiteral,
    BigIntLiteral,
    StringLiteral,
    /// `` `text` `` with no substitutions.
    NoSubstitutionTemplate,
    /// `` `text${ ``
    TemplateHead,
    /// `}text${`
    TemplateMiddle,
    /// `` }text` ``
    TemplateTail,
    /// `/body/flags`; the lexeme is the full source text.
    RegexLiteral,

    // === Names ===
    Identifier,
    /// `#name` inside a class body.
    PrivateName,

    // === Reserved words ===
    Await,
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Export,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    Let,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,
    Yield,

    // === Operators ===
    Plus,                // +
    Minus,               // -
    Star,                // *
    StarStar,            // **
    Slash,               // /
    Percent,             // %
    PlusPlus,            // ++
    MinusMinus,          // --
    Less,                // <
    Greater,             // >
    LessEqual,           // <=
    GreaterEqual,        // >=
    EqualEqual,          // ==
    BangEqual,           // !=
    EqualEqualEqual,     // ===
    BangEqualEqual,      // !==
    LessLess,            // <<
    GreaterGreater,      // >>
    GreaterGreaterGreater, // >>>
    Amp,                 // &
    Pipe,                // |
    Caret,               // ^
    Tilde,               // ~
    Bang,                // !
    AmpAmp,              // &&
    PipePipe,            // ||
    QuestionQuestion,    // ??
    Question,            // ?
    QuestionDot,         // ?.
    Equal,               // =
    PlusEqual,           // +=
    MinusEqual,          // -=
    StarEqual,           // *=
    StarStarEqual,       // **=
    SlashEqual,          // /=
    PercentEqual,        // %=
    LessLessEqual,       // <<=
    GreaterGreaterEqual, // >>=
    GreaterGreaterGreaterEqual, // >>>=
    AmpEqual,            // &=
    PipeEqual,           // |=
    CaretEqual,          // ^=
    AmpAmpEqual,         // &&=
    PipePipeEqual,       // ||=
    QuestionQuestionEqual, // ??=
    FatArrow,            // =>
    Dot,                 // .
    DotDotDot,           // ...
    At,                  // @

    // === Delimiters ===
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,
    Semicolon,    // ;
    Colon,        // :

    // === Special ===
    Eof,
}

impl TokenKind {
    /// Try to match an identifier string to a reserved word.
    ///
    /// Contextual words (`async`, `of`, `get`, `set`, `static`, `from`, `as`)
    /// stay identifiers and are recognised by the parser.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "await" => Some(TokenKind::Await),
            "break" => Some(TokenKind::Break),
            "case" => Some(TokenKind::Case),
            "catch" => Some(TokenKind::Catch),
            "class" => Some(TokenKind::Class),
            "const" => Some(TokenKind::Const),
            "continue" => Some(TokenKind::Continue),
            "debugger" => Some(TokenKind::Debugger),
            "default" => Some(TokenKind::Default),
            "delete" => Some(TokenKind::Delete),
            "do" => Some(TokenKind::Do),
            "else" => Some(TokenKind::Else),
            "export" => Some(TokenKind::Export),
            "extends" => Some(TokenKind::Extends),
            "false" => Some(TokenKind::False),
            "finally" => Some(TokenKind::Finally),
            "for" => Some(TokenKind::For),
            "function" => Some(TokenKind::Function),
            "if" => Some(TokenKind::If),
            "import" => Some(TokenKind::Import),
            "in" => Some(TokenKind::In),
            "instanceof" => Some(TokenKind::Instanceof),
            "let" => Some(TokenKind::Let),
            "new" => Some(TokenKind::New),
            "null" => Some(TokenKind::Null),
            "return" => Some(TokenKind::Return),
            "super" => Some(TokenKind::Super),
            "switch" => Some(TokenKind::Switch),
            "this" => Some(TokenKind::This),
            "throw" => Some(TokenKind::Throw),
            "true" => Some(TokenKind::True),
            "try" => Some(TokenKind::Try),
            "typeof" => Some(TokenKind::Typeof),
            "var" => Some(TokenKind::Var),
            "void" => Some(TokenKind::Void),
            "while" => Some(TokenKind::While),
            "with" => Some(TokenKind::With),
            "yield" => Some(TokenKind::Yield),
            _ => None,
        }
    }

    /// Reserved words. These are valid property names after `.` and as object keys.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Await
                | Break
                | Case
                | Catch
                | Class
                | Const
                | Continue
                | Debugger
                | Default
                | Delete
                | Do
                | Else
                | Export
                | Extends
                | False
                | Finally
                | For
                | Function
                | If
                | Import
                | In
                | Instanceof
                | Let
                | New
                | Null
                | Return
                | Super
                | Switch
                | This
                | Throw
                | True
                | Try
                | Typeof
                | Var
                | Void
                | While
                | With
                | Yield
        )
    }

    /// An IdentifierName: an identifier or any reserved word.
    pub fn is_identifier_name(self) -> bool {
        self == TokenKind::Identifier || self.is_keyword()
    }

    /// After a token of this kind, a `/` is a division operator rather than
    /// the start of a regular expression.
    pub fn ends_operand(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Identifier
                | PrivateName
                | NumberLiteral
                | BigIntLiteral
                | StringLiteral
                | NoSubstitutionTemplate
                | TemplateTail
                | RegexLiteral
                | This
                | Super
                | True
                | False
                | Null
                | RightParen
                | RightBracket
                | RightBrace
                | PlusPlus
                | MinusMinus
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contextual_words_are_identifiers() {
        for word in ["async", "of", "get", "set", "static", "from", "as", "undefined"] {
            assert_eq!(TokenKind::keyword_from_str(word), None, "{word}");
        }
        assert_eq!(TokenKind::keyword_from_str("this"), Some(TokenKind::This));
    }

    #[test]
    fn keywords_are_identifier_names() {
        assert!(TokenKind::Default.is_identifier_name());
        assert!(TokenKind::Identifier.is_identifier_name());
        assert!(!TokenKind::Dot.is_identifier_name());
    }
}
