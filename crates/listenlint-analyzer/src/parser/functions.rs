use listenlint_common::Span;

use crate::ast::*;
use crate::lexer::token::TokenKind;

use super::{is_binding_identifier, starts_property_key, Parser};

impl Parser {
    // ========================================================================
    // Functions
    // ========================================================================

    /// Parse `[async] function [*] name(params) { body }` as a statement.
    pub(super) fn parse_function_decl(&mut self) -> Option<Stmt> {
        let function = self.parse_function(true)?;
        let span = function.span.clone();
        Some(Stmt::new(StmtKind::Function(function), span))
    }

    /// Parse a function expression; the name is optional.
    pub(super) fn parse_function_expr(&mut self) -> Option<Expr> {
        let function = self.parse_function(false)?;
        let span = function.span.clone();
        Some(Expr::new(ExprKind::Function(Box::new(function)), span))
    }

    fn parse_function(&mut self, require_name: bool) -> Option<Function> {
        let start = self.current_span();
        let is_async = self.is_contextual("async");
        if is_async {
            self.advance();
        }
        self.expect(TokenKind::Function)?;
        let is_generator = self.eat(TokenKind::Star);

        let name = if is_binding_identifier(self.peek()) {
            Some(self.advance().lexeme.clone())
        } else if require_name {
            let span = self.current_span();
            self.diagnostics.error("function declaration needs a name", span);
            return None;
        } else {
            None
        };

        self.parse_function_rest(start, name, is_async, is_generator)
    }

    /// Parse the parameter list and body shared by every function form.
    fn parse_function_rest(
        &mut self,
        start: Span,
        name: Option<String>,
        is_async: bool,
        is_generator: bool,
    ) -> Option<Function> {
        let params = self.parse_params()?;
        let body = self.parse_function_body()?;
        let span = start.merge(&body.span);
        Some(Function {
            name,
            params,
            body,
            is_async,
            is_generator,
            span,
        })
    }

    /// Parse `(a, b = 1, { c }, ...rest)`.
    pub(super) fn parse_params(&mut self) -> Option<Vec<Expr>> {
        self.expect(TokenKind::LeftParen)?;
        self.allow_in(|p| {
            let mut params = Vec::new();
            while p.peek() != TokenKind::RightParen {
                let param = if p.peek() == TokenKind::DotDotDot {
                    let start = p.current_span();
                    p.advance(); // consume '...'
                    let target = p.parse_binding_target()?;
                    let span = start.merge(&target.span);
                    Expr::new(ExprKind::Spread(Box::new(target)), span)
                } else {
                    p.parse_binding_element()?
                };
                params.push(param);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RightParen)?;
            Some(params)
        })
    }

    /// A binding target optionally followed by `= default`.
    fn parse_binding_element(&mut self) -> Option<Expr> {
        let target = self.parse_binding_target()?;
        if !self.eat(TokenKind::Equal) {
            return Some(target);
        }
        let default = self.parse_assignment()?;
        let span = target.span.merge(&default.span);
        Some(Expr::new(
            ExprKind::Assign {
                target: Box::new(target),
                op: AssignOp::Assign,
                value: Box::new(default),
            },
            span,
        ))
    }

    /// An identifier, or an array/object destructuring pattern.
    pub(super) fn parse_binding_target(&mut self) -> Option<Expr> {
        match self.peek() {
            TokenKind::LeftBracket | TokenKind::LeftBrace => self.parse_primary(),
            _ => {
                let span = self.current_span();
                let name = self.expect_binding_identifier()?;
                Some(Expr::new(ExprKind::Identifier(name), span))
            }
        }
    }

    /// Function bodies reset the `for`-head restriction on `in`.
    fn parse_function_body(&mut self) -> Option<Block> {
        self.allow_in(|p| p.parse_block())
    }

    /// Parse the body after `=>`: a block or a single assignment expression.
    pub(super) fn parse_arrow_rest(
        &mut self,
        start: Span,
        params: Vec<Expr>,
        is_async: bool,
    ) -> Option<Expr> {
        if self.current().newline_before {
            let span = self.current_span();
            self.diagnostics
                .error("line break is not allowed before '=>'", span);
            return None;
        }
        self.expect(TokenKind::FatArrow)?;

        let body = if self.peek() == TokenKind::LeftBrace {
            ArrowBody::Block(self.parse_function_body()?)
        } else {
            ArrowBody::Expr(Box::new(self.parse_assignment()?))
        };
        let end = match &body {
            ArrowBody::Block(block) => block.span.clone(),
            ArrowBody::Expr(expr) => expr.span.clone(),
        };
        let span = start.merge(&end);
        Some(Expr::new(
            ExprKind::Arrow(Box::new(ArrowFunction {
                params,
                body,
                is_async,
                span: span.clone(),
            })),
            span,
        ))
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// Parse `class Name [extends Base] { members }` as a statement.
    pub(super) fn parse_class_decl(&mut self) -> Option<Stmt> {
        let class = self.parse_class(true)?;
        let span = class.span.clone();
        Some(Stmt::new(StmtKind::Class(class), span))
    }

    /// Parse a class expression; the name is optional.
    pub(super) fn parse_class_expr(&mut self) -> Option<Expr> {
        let class = self.parse_class(false)?;
        let span = class.span.clone();
        Some(Expr::new(ExprKind::Class(Box::new(class)), span))
    }

    fn parse_class(&mut self, require_name: bool) -> Option<Class> {
        let start = self.current_span();
        self.expect(TokenKind::Class)?;

        let name = if is_binding_identifier(self.peek()) {
            Some(self.advance().lexeme.clone())
        } else if require_name {
            let span = self.current_span();
            self.diagnostics.error("class declaration needs a name", span);
            return None;
        } else {
            None
        };

        let super_class = if self.eat(TokenKind::Extends) {
            Some(Box::new(self.parse_lhs_expression()?))
        } else {
            None
        };

        self.expect(TokenKind::LeftBrace)?;
        let members = self.allow_in(|p| {
            let mut members = Vec::new();
            while !matches!(p.peek(), TokenKind::RightBrace | TokenKind::Eof) {
                if p.eat(TokenKind::Semicolon) {
                    continue;
                }
                members.push(p.parse_class_member()?);
            }
            Some(members)
        })?;
        self.expect(TokenKind::RightBrace)?;

        let span = start.merge(&self.previous_span());
        Some(Class {
            name,
            super_class,
            members,
            span,
        })
    }

    /// True if the contextual word at the cursor is a modifier (`static`,
    /// `async`, `get`, `set`) rather than the member's own name.
    fn is_member_modifier(&self, word: &str) -> bool {
        self.is_contextual(word)
            && (starts_property_key(self.peek_next()) || self.peek_next() == TokenKind::Star)
    }

    fn parse_class_member(&mut self) -> Option<ClassMember> {
        let start = self.current_span();

        if self.is_contextual("static") && self.peek_next() == TokenKind::LeftBrace {
            self.advance(); // consume 'static'
            let block = self.parse_function_body()?;
            return Some(ClassMember::StaticBlock(block));
        }

        let is_static = self.is_member_modifier("static");
        if is_static {
            self.advance();
        }

        let (key, kind, is_async, is_generator) = self.parse_method_head()?;

        if self.peek() == TokenKind::LeftParen {
            let function = self.parse_function_rest(start.clone(), None, is_async, is_generator)?;
            let kind = if kind == MethodKind::Method
                && !is_static
                && key.static_name() == Some("constructor")
            {
                MethodKind::Constructor
            } else {
                kind
            };
            let span = start.merge(&function.span);
            return Some(ClassMember::Method {
                key,
                kind,
                is_static,
                function,
                span,
            });
        }

        if kind != MethodKind::Method || is_async || is_generator {
            let span = self.current_span();
            self.diagnostics.error("expected '(' after method name", span);
            return None;
        }

        let value = if self.eat(TokenKind::Equal) {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        let span = start.merge(&self.previous_span());
        Some(ClassMember::Field {
            key,
            value,
            is_static,
            span,
        })
    }

    /// Parse `[async] [*] [get|set] key` in front of a method or field.
    pub(super) fn parse_method_head(&mut self) -> Option<(PropertyKey, MethodKind, bool, bool)> {
        let is_async = self.is_member_modifier("async") && !self.token_at(1).newline_before;
        if is_async {
            self.advance();
        }
        let is_generator = self.eat(TokenKind::Star);

        let mut kind = MethodKind::Method;
        if !is_async && !is_generator {
            if self.is_member_modifier("get") {
                self.advance();
                kind = MethodKind::Getter;
            } else if self.is_member_modifier("set") {
                self.advance();
                kind = MethodKind::Setter;
            }
        }

        let key = self.parse_property_key()?;
        Some((key, kind, is_async, is_generator))
    }

    /// Parse a property name: identifier, string, number, `[computed]` or `#private`.
    pub(super) fn parse_property_key(&mut self) -> Option<PropertyKey> {
        match self.peek() {
            kind if kind.is_identifier_name() => {
                Some(PropertyKey::Identifier(self.advance().lexeme.clone()))
            }
            TokenKind::StringLiteral => Some(PropertyKey::String(self.advance().lexeme.clone())),
            TokenKind::NumberLiteral => {
                let token = self.advance().clone();
                let value = self.number_value(&token.lexeme, &token.span);
                Some(PropertyKey::Number(value))
            }
            TokenKind::BigIntLiteral => {
                let digits = self.advance().lexeme.trim_end_matches('n').replace('_', "");
                Some(PropertyKey::String(digits))
            }
            TokenKind::PrivateName => Some(PropertyKey::Private(self.advance().lexeme.clone())),
            TokenKind::LeftBracket => {
                self.advance(); // consume '['
                let expr = self.allow_in(|p| p.parse_assignment())?;
                self.expect(TokenKind::RightBracket)?;
                Some(PropertyKey::Computed(Box::new(expr)))
            }
            other => {
                let span = self.current_span();
                self.diagnostics
                    .error(format!("expected property name, found {:?}", other), span);
                None
            }
        }
    }

    /// Parse `(params) { body }` after an object or class method key.
    pub(super) fn parse_method_function(
        &mut self,
        start: Span,
        is_async: bool,
        is_generator: bool,
    ) -> Option<Function> {
        self.parse_function_rest(start, None, is_async, is_generator)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn parse(source: &str) -> Program {
        let (tokens, lex_diags) = Lexer::new(source, "test.js").tokenize();
        assert!(
            !lex_diags.has_errors(),
            "lex errors: {:?}",
            lex_diags.diagnostics()
        );
        let (program, parse_diags) = Parser::new(tokens).parse();
        assert!(
            !parse_diags.has_errors(),
            "parse errors: {:?}",
            parse_diags.diagnostics()
        );
        program
    }

    fn get_class(prog: &Program) -> &Class {
        match &prog.body[0].kind {
            StmtKind::Class(c) => c,
            other => panic!("expected Class, got {:?}", other),
        }
    }

    #[test]
    fn parse_function_declaration() {
        let prog = parse("async function* load(a, b = 2, { c }, [d], ...rest) { yield a; }");
        match &prog.body[0].kind {
            StmtKind::Function(f) => {
                assert_eq!(f.name.as_deref(), Some("load"));
                assert!(f.is_async);
                assert!(f.is_generator);
                assert_eq!(f.params.len(), 5);
                assert!(matches!(f.params[1].kind, ExprKind::Assign { .. }));
                assert!(matches!(f.params[2].kind, ExprKind::Object(_)));
                assert!(matches!(f.params[3].kind, ExprKind::Array(_)));
                assert!(matches!(f.params[4].kind, ExprKind::Spread(_)));
            }
            other => panic!("expected Function, got {:?}", other),
        }
    }

    #[test]
    fn anonymous_function_declaration_is_an_error() {
        let (tokens, _) = Lexer::new("function () {}", "test.js").tokenize();
        let (_, diags) = Parser::new(tokens).parse();
        assert!(diags.has_errors());
    }

    #[test]
    fn parse_class_members() {
        let prog = parse(
            r#"
            class Widget extends HTMLElement {
                count = 0;
                static instances;
                #handler = () => {};
                constructor() { super(); }
                static create() {}
                get size() { return 1; }
                set size(v) {}
                async load() {}
                *items() {}
                ['computed']() {}
                static { Widget.ready = true; }
                get() {}
                static = 1;
            }
            "#,
        );
        let class = get_class(&prog);
        assert_eq!(class.name.as_deref(), Some("Widget"));
        assert!(class.super_class.is_some());
        assert_eq!(class.members.len(), 13);

        match &class.members[2] {
            ClassMember::Field { key, value, .. } => {
                assert!(matches!(key, PropertyKey::Private(name) if name == "handler"));
                assert!(value.is_some());
            }
            other => panic!("expected Field, got {:?}", other),
        }
        match &class.members[3] {
            ClassMember::Method { kind, .. } => assert_eq!(*kind, MethodKind::Constructor),
            other => panic!("expected Method, got {:?}", other),
        }
        match &class.members[4] {
            ClassMember::Method { is_static, .. } => assert!(is_static),
            other => panic!("expected Method, got {:?}", other),
        }
        match &class.members[5] {
            ClassMember::Method { kind, .. } => assert_eq!(*kind, MethodKind::Getter),
            other => panic!("expected Method, got {:?}", other),
        }
        match &class.members[7] {
            ClassMember::Method { function, .. } => assert!(function.is_async),
            other => panic!("expected Method, got {:?}", other),
        }
        assert!(matches!(class.members[10], ClassMember::StaticBlock(_)));
        match &class.members[11] {
            ClassMember::Method { key, kind, .. } => {
                assert_eq!(key.static_name(), Some("get"));
                assert_eq!(*kind, MethodKind::Method);
            }
            other => panic!("expected Method, got {:?}", other),
        }
        match &class.members[12] {
            ClassMember::Field { key, is_static, .. } => {
                assert_eq!(key.static_name(), Some("static"));
                assert!(!is_static);
            }
            other => panic!("expected Field, got {:?}", other),
        }
    }

    #[test]
    fn class_expression_without_name() {
        let prog = parse("const C = class extends Base {};");
        match &prog.body[0].kind {
            StmtKind::Var(decl) => {
                let init = decl.declarators[0].init.as_ref().expect("initializer");
                match &init.kind {
                    ExprKind::Class(c) => assert!(c.name.is_none()),
                    other => panic!("expected Class, got {:?}", other),
                }
            }
            other => panic!("expected Var, got {:?}", other),
        }
    }
}
