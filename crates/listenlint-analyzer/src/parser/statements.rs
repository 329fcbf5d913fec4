use listenlint_common::Span;

use crate::ast::*;
use crate::lexer::token::TokenKind;

use super::{is_binding_identifier, Parser};

impl Parser {
    /// Parse a statement or declaration.
    pub(super) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek() {
            TokenKind::LeftBrace => {
                let block = self.parse_block()?;
                let span = block.span.clone();
                Some(Stmt::new(StmtKind::Block(block), span))
            }
            TokenKind::Var => self.parse_var_stmt(VarKind::Var),
            TokenKind::Const => self.parse_var_stmt(VarKind::Const),
            TokenKind::Let if self.is_let_declaration() => self.parse_var_stmt(VarKind::Let),
            TokenKind::Function => self.parse_function_decl(),
            TokenKind::Identifier if self.is_async_function() => self.parse_function_decl(),
            TokenKind::Class => self.parse_class_decl(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Do => self.parse_do_while_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Break | TokenKind::Continue => self.parse_jump_stmt(),
            TokenKind::Throw => self.parse_throw_stmt(),
            TokenKind::Try => self.parse_try_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::With => self.parse_with_stmt(),
            TokenKind::Import
                if !matches!(self.peek_next(), TokenKind::LeftParen | TokenKind::Dot) =>
            {
                self.parse_import_decl()
            }
            TokenKind::Export => self.parse_export_decl(),
            TokenKind::Semicolon => {
                let span = self.advance().span.clone();
                Some(Stmt::new(StmtKind::Empty, span))
            }
            TokenKind::Debugger => {
                let start = self.current_span();
                self.advance();
                self.consume_semicolon()?;
                let span = start.merge(&self.previous_span());
                Some(Stmt::new(StmtKind::Debugger, span))
            }
            TokenKind::Identifier if self.peek_next() == TokenKind::Colon => {
                self.parse_labeled_stmt()
            }
            _ => self.parse_expr_stmt(),
        }
    }

    /// `let` starts a declaration only when a binding follows it.
    fn is_let_declaration(&self) -> bool {
        matches!(
            self.peek_next(),
            TokenKind::Identifier
                | TokenKind::LeftBracket
                | TokenKind::LeftBrace
                | TokenKind::Let
                | TokenKind::Yield
                | TokenKind::Await
        )
    }

    /// `async function` with no line break between the two words.
    pub(super) fn is_async_function(&self) -> bool {
        self.is_contextual("async")
            && self.peek_next() == TokenKind::Function
            && !self.token_at(1).newline_before
    }

    /// Parse `{ statements }`.
    pub(super) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(TokenKind::LeftBrace)?;

        let mut body = Vec::new();
        while !matches!(self.peek(), TokenKind::RightBrace | TokenKind::Eof) {
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => self.synchronize(),
            }
        }

        self.expect(TokenKind::RightBrace)?;
        let span = start.merge(&self.previous_span());
        Some(Block { body, span })
    }

    /// Parse an expression statement: `expr;`
    fn parse_expr_stmt(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression()?;
        self.consume_semicolon()?;
        let span = expr.span.merge(&self.previous_span());
        Some(Stmt::new(StmtKind::Expr(expr), span))
    }

    /// Parse `var|let|const a = 1, b;`
    fn parse_var_stmt(&mut self, kind: VarKind) -> Option<Stmt> {
        let start = self.current_span();
        let decl = self.parse_var_decl(kind)?;
        self.consume_semicolon()?;
        let span = start.merge(&self.previous_span());
        Some(Stmt::new(StmtKind::Var(decl), span))
    }

    /// Parse the keyword and declarator list of a variable declaration.
    /// Initializers respect the current `no_in` setting.
    fn parse_var_decl(&mut self, kind: VarKind) -> Option<VarDecl> {
        self.advance(); // consume 'var' / 'let' / 'const'

        let mut declarators = Vec::new();
        loop {
            let start = self.current_span();
            let target = self.parse_binding_target()?;
            let init = if self.eat(TokenKind::Equal) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let span = start.merge(&self.previous_span());
            declarators.push(VarDeclarator { target, init, span });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Some(VarDecl { kind, declarators })
    }

    /// Parse `if (test) consequent [else alternate]`
    fn parse_if_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'if'

        let test = self.parse_paren_expression()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(
            StmtKind::If {
                test,
                consequent,
                alternate,
            },
            span,
        ))
    }

    /// Parse `( expr )` as used by `if`, `while`, `switch` and `with`.
    fn parse_paren_expression(&mut self) -> Option<Expr> {
        self.expect(TokenKind::LeftParen)?;
        let expr = self.allow_in(|p| p.parse_expression())?;
        self.expect(TokenKind::RightParen)?;
        Some(expr)
    }

    /// Parse `for (;;)`, `for (x in y)`, `for (x of y)` and `for await (x of y)`.
    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'for'

        let is_await = self.eat(TokenKind::Await);
        self.expect(TokenKind::LeftParen)?;

        let saved = std::mem::replace(&mut self.no_in, true);
        let init = match self.peek() {
            TokenKind::Semicolon => None,
            TokenKind::Var => self.parse_var_decl(VarKind::Var).map(ForInit::Var),
            TokenKind::Const => self.parse_var_decl(VarKind::Const).map(ForInit::Var),
            TokenKind::Let if self.is_let_declaration() => {
                self.parse_var_decl(VarKind::Let).map(ForInit::Var)
            }
            _ => self.parse_expression().map(ForInit::Expr),
        };
        self.no_in = saved;

        // A failed initializer has already reported its error
        if init.is_none() && self.peek() != TokenKind::Semicolon {
            return None;
        }

        let each_kind = if self.eat(TokenKind::In) {
            Some(ForEachKind::In)
        } else if self.is_contextual("of") {
            self.advance();
            Some(ForEachKind::Of)
        } else {
            None
        };

        if let Some(kind) = each_kind {
            let Some(left) = init else {
                let span = self.previous_span();
                self.diagnostics
                    .error("expected a binding before 'in' or 'of'", span);
                return None;
            };
            let right = match kind {
                ForEachKind::In => self.allow_in(|p| p.parse_expression())?,
                ForEachKind::Of => self.allow_in(|p| p.parse_assignment())?,
            };
            self.expect(TokenKind::RightParen)?;
            let body = Box::new(self.parse_statement()?);
            let span = start.merge(&self.previous_span());
            return Some(Stmt::new(
                StmtKind::ForEach {
                    kind,
                    left,
                    right,
                    body,
                    is_await,
                },
                span,
            ));
        }

        self.expect(TokenKind::Semicolon)?;
        let test = if self.peek() != TokenKind::Semicolon {
            Some(self.allow_in(|p| p.parse_expression())?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        let update = if self.peek() != TokenKind::RightParen {
            Some(self.allow_in(|p| p.parse_expression())?)
        } else {
            None
        };
        self.expect(TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(
            StmtKind::For {
                init,
                test,
                update,
                body,
            },
            span,
        ))
    }

    /// Parse `while (test) body`
    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'while'

        let test = self.parse_paren_expression()?;
        let body = Box::new(self.parse_statement()?);

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(StmtKind::While { test, body }, span))
    }

    /// Parse `do body while (test)`; the trailing `;` is always optional.
    fn parse_do_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'do'

        let body = Box::new(self.parse_statement()?);
        self.expect(TokenKind::While)?;
        let test = self.parse_paren_expression()?;
        self.eat(TokenKind::Semicolon);

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(StmtKind::DoWhile { body, test }, span))
    }

    /// Parse `return [expr];`; a line break after `return` ends the statement.
    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'return'

        let value = if self.ends_statement() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(StmtKind::Return(value), span))
    }

    /// Parse `break [label];` and `continue [label];`
    fn parse_jump_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let is_break = self.advance().kind == TokenKind::Break;

        let label = if self.peek() == TokenKind::Identifier && !self.current().newline_before {
            Some(self.advance().lexeme.clone())
        } else {
            None
        };
        self.consume_semicolon()?;

        let span = start.merge(&self.previous_span());
        let kind = if is_break {
            StmtKind::Break(label)
        } else {
            StmtKind::Continue(label)
        };
        Some(Stmt::new(kind, span))
    }

    /// Parse `throw expr;`
    fn parse_throw_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'throw'

        if self.current().newline_before {
            let span = self.current_span();
            self.diagnostics
                .error("line break is not allowed after 'throw'", span);
            return None;
        }
        let value = self.parse_expression()?;
        self.consume_semicolon()?;

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(StmtKind::Throw(value), span))
    }

    /// Parse `try { } catch (e) { } finally { }`
    fn parse_try_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'try'

        let block = self.parse_block()?;

        let handler = if self.peek() == TokenKind::Catch {
            let catch_start = self.current_span();
            self.advance(); // consume 'catch'
            let param = if self.eat(TokenKind::LeftParen) {
                let param = self.parse_binding_target()?;
                self.expect(TokenKind::RightParen)?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            let span = catch_start.merge(&body.span);
            Some(CatchClause { param, body, span })
        } else {
            None
        };

        let finalizer = if self.eat(TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            let span = self.current_span();
            self.diagnostics
                .error("expected 'catch' or 'finally' after try block", span);
            return None;
        }

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(
            StmtKind::Try {
                block,
                handler,
                finalizer,
            },
            span,
        ))
    }

    /// Parse `switch (expr) { case a: ... default: ... }`
    fn parse_switch_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'switch'

        let discriminant = self.parse_paren_expression()?;
        self.expect(TokenKind::LeftBrace)?;

        let mut cases = Vec::new();
        while !matches!(self.peek(), TokenKind::RightBrace | TokenKind::Eof) {
            let case_start = self.current_span();
            let test = match self.peek() {
                TokenKind::Case => {
                    self.advance();
                    Some(self.allow_in(|p| p.parse_expression())?)
                }
                TokenKind::Default => {
                    self.advance();
                    None
                }
                other => {
                    self.diagnostics.error(
                        format!("expected 'case' or 'default', found {:?}", other),
                        case_start,
                    );
                    return None;
                }
            };
            self.expect(TokenKind::Colon)?;

            let mut body = Vec::new();
            while !matches!(
                self.peek(),
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
            ) {
                match self.parse_statement() {
                    Some(stmt) => body.push(stmt),
                    None => self.synchronize(),
                }
            }
            let span = case_start.merge(&self.previous_span());
            cases.push(SwitchCase { test, body, span });
        }

        self.expect(TokenKind::RightBrace)?;
        let span = start.merge(&self.previous_span());
        Some(Stmt::new(
            StmtKind::Switch {
                discriminant,
                cases,
            },
            span,
        ))
    }

    /// Parse `with (object) body`
    fn parse_with_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'with'

        let object = self.parse_paren_expression()?;
        let body = Box::new(self.parse_statement()?);

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(StmtKind::With { object, body }, span))
    }

    /// Parse `label: body`
    fn parse_labeled_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let label = self.advance().lexeme.clone();
        self.advance(); // consume ':'

        let body = Box::new(self.parse_statement()?);
        let span = start.merge(&self.previous_span());
        Some(Stmt::new(StmtKind::Labeled { label, body }, span))
    }

    /// True where an optional trailing expression is absent.
    fn ends_statement(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) || self.current().newline_before
    }

    // ========================================================================
    // Modules
    // ========================================================================

    /// Parse an import declaration.
    ///
    /// ```js
    /// import "side-effect";
    /// import def, { a, b as c } from "mod";
    /// import * as ns from "mod";
    /// ```
    fn parse_import_decl(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'import'

        let mut specifiers = Vec::new();
        if self.peek() != TokenKind::StringLiteral {
            if is_binding_identifier(self.peek()) {
                specifiers.push(ImportSpecifier::Default(self.advance().lexeme.clone()));
                if !self.eat(TokenKind::Comma) {
                    return self.finish_import(start, specifiers);
                }
            }
            match self.peek() {
                TokenKind::Star => {
                    self.advance();
                    if !self.is_contextual("as") {
                        let span = self.current_span();
                        self.diagnostics.error("expected 'as' after '*'", span);
                        return None;
                    }
                    self.advance();
                    let local = self.expect_binding_identifier()?;
                    specifiers.push(ImportSpecifier::Namespace(local));
                }
                TokenKind::LeftBrace => {
                    self.advance();
                    while self.peek() != TokenKind::RightBrace {
                        let imported = self.parse_module_export_name()?;
                        let local = if self.is_contextual("as") {
                            self.advance();
                            self.expect_binding_identifier()?
                        } else {
                            imported.clone()
                        };
                        specifiers.push(ImportSpecifier::Named { imported, local });
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RightBrace)?;
                }
                other => {
                    let span = self.current_span();
                    self.diagnostics
                        .error(format!("unexpected {:?} in import", other), span);
                    return None;
                }
            }
        }
        self.finish_import(start, specifiers)
    }

    /// Parse `from "mod"` (when specifiers were given), import attributes, and `;`.
    fn finish_import(
        &mut self,
        start: Span,
        specifiers: Vec<ImportSpecifier>,
    ) -> Option<Stmt> {
        if !specifiers.is_empty() {
            if !self.is_contextual("from") {
                let span = self.current_span();
                self.diagnostics.error("expected 'from' in import", span);
                return None;
            }
            self.advance();
        }
        let source = self.expect(TokenKind::StringLiteral)?.lexeme.clone();
        self.skip_import_attributes()?;
        self.consume_semicolon()?;

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(
            StmtKind::Import(ImportDecl { specifiers, source }),
            span,
        ))
    }

    /// `with { type: "json" }` / `assert { ... }` after a module specifier.
    fn skip_import_attributes(&mut self) -> Option<()> {
        let has_attributes = (self.peek() == TokenKind::With || self.is_contextual("assert"))
            && self.peek_next() == TokenKind::LeftBrace
            && !self.current().newline_before;
        if has_attributes {
            self.advance();
            self.parse_primary()?;
        }
        Some(())
    }

    /// An IdentifierName or a string literal, as allowed in import/export lists.
    fn parse_module_export_name(&mut self) -> Option<String> {
        if self.peek() == TokenKind::StringLiteral {
            Some(self.advance().lexeme.clone())
        } else {
            self.expect_identifier_name()
        }
    }

    /// Parse an export declaration.
    fn parse_export_decl(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'export'

        let export = match self.peek() {
            TokenKind::Star => {
                self.advance();
                let exported = if self.is_contextual("as") {
                    self.advance();
                    Some(self.parse_module_export_name()?)
                } else {
                    None
                };
                let source = self.parse_from_clause()?;
                self.skip_import_attributes()?;
                self.consume_semicolon()?;
                ExportDecl::All { exported, source }
            }
            TokenKind::LeftBrace => {
                self.advance();
                let mut specifiers = Vec::new();
                while self.peek() != TokenKind::RightBrace {
                    let local = self.parse_module_export_name()?;
                    let exported = if self.is_contextual("as") {
                        self.advance();
                        self.parse_module_export_name()?
                    } else {
                        local.clone()
                    };
                    specifiers.push(ExportSpecifier { local, exported });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RightBrace)?;
                let source = if self.is_contextual("from") {
                    let source = self.parse_from_clause()?;
                    self.skip_import_attributes()?;
                    Some(source)
                } else {
                    None
                };
                self.consume_semicolon()?;
                ExportDecl::Named { specifiers, source }
            }
            TokenKind::Default => {
                self.advance();
                let expr = match self.peek() {
                    TokenKind::Function => self.parse_function_expr()?,
                    TokenKind::Identifier if self.is_async_function() => {
                        self.parse_function_expr()?
                    }
                    TokenKind::Class => self.parse_class_expr()?,
                    _ => {
                        let expr = self.parse_assignment()?;
                        self.consume_semicolon()?;
                        expr
                    }
                };
                ExportDecl::Default(expr)
            }
            TokenKind::Var
            | TokenKind::Let
            | TokenKind::Const
            | TokenKind::Function
            | TokenKind::Class => ExportDecl::Declaration(Box::new(self.parse_statement()?)),
            TokenKind::Identifier if self.is_async_function() => {
                ExportDecl::Declaration(Box::new(self.parse_statement()?))
            }
            other => {
                let span = self.current_span();
                self.diagnostics
                    .error(format!("unexpected {:?} after 'export'", other), span);
                return None;
            }
        };

        let span = start.merge(&self.previous_span());
        Some(Stmt::new(StmtKind::Export(export), span))
    }

    /// Parse `from "mod"`.
    fn parse_from_clause(&mut self) -> Option<String> {
        if !self.is_contextual("from") {
            let span = self.current_span();
            self.diagnostics.error("expected 'from'", span);
            return None;
        }
        self.advance();
        Some(self.expect(TokenKind::StringLiteral)?.lexeme.clone())
    }
}
