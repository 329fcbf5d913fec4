use listenlint_common::Span;

use crate::ast::*;
use crate::lexer::token::TokenKind;

use super::{is_binding_identifier, Parser};

// ============================================================================
// Binding powers for Pratt parsing
// ============================================================================
//
// Higher values bind tighter. (left_bp, right_bp): left < right = left-assoc.
//
// Assignment, arrow functions, `yield` and the conditional operator sit
// below the table and are handled by `parse_assignment`.
//
//  Logical OR / nullish  ||, ??                 (4, 5)
//  Logical AND           &&                     (6, 7)
//  Bitwise OR            |                      (8, 9)
//  Bitwise XOR           ^                      (10, 11)
//  Bitwise AND           &                      (12, 13)
//  Equality              == != === !==          (14, 15)
//  Relational            < > <= >= instanceof in (16, 17)
//  Shift                 << >> >>>              (18, 19)
//  Additive              + -                    (20, 21)
//  Multiplicative        * / %                  (22, 23)
//  Exponent              **                     (25, 24) right-assoc
//  Prefix                ! ~ + - typeof void delete await   26
//  Postfix               () [] . ?. `tpl`       handled in parse_call_tail

fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    match kind {
        TokenKind::PipePipe | TokenKind::QuestionQuestion => Some((4, 5)),
        TokenKind::AmpAmp => Some((6, 7)),
        TokenKind::Pipe => Some((8, 9)),
        TokenKind::Caret => Some((10, 11)),
        TokenKind::Amp => Some((12, 13)),
        TokenKind::EqualEqual
        | TokenKind::BangEqual
        | TokenKind::EqualEqualEqual
        | TokenKind::BangEqualEqual => Some((14, 15)),
        TokenKind::Less
        | TokenKind::Greater
        | TokenKind::LessEqual
        | TokenKind::GreaterEqual
        | TokenKind::Instanceof
        | TokenKind::In => Some((16, 17)),
        TokenKind::LessLess | TokenKind::GreaterGreater | TokenKind::GreaterGreaterGreater => {
            Some((18, 19))
        }
        TokenKind::Plus | TokenKind::Minus => Some((20, 21)),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((22, 23)),
        TokenKind::StarStar => Some((25, 24)),
        _ => None,
    }
}

/// Prefix binding power for unary operators.
fn prefix_binding_power(kind: TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Bang
        | TokenKind::Tilde
        | TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Typeof
        | TokenKind::Void
        | TokenKind::Delete
        | TokenKind::Await => Some(26),
        _ => None,
    }
}

fn token_to_binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::StarStar => BinaryOp::Exp,
        TokenKind::EqualEqual => BinaryOp::Eq,
        TokenKind::BangEqual => BinaryOp::Neq,
        TokenKind::EqualEqualEqual => BinaryOp::StrictEq,
        TokenKind::BangEqualEqual => BinaryOp::StrictNeq,
        TokenKind::Less => BinaryOp::Lt,
        TokenKind::Greater => BinaryOp::Gt,
        TokenKind::LessEqual => BinaryOp::Lte,
        TokenKind::GreaterEqual => BinaryOp::Gte,
        TokenKind::In => BinaryOp::In,
        TokenKind::Instanceof => BinaryOp::Instanceof,
        TokenKind::LessLess => BinaryOp::Shl,
        TokenKind::GreaterGreater => BinaryOp::Shr,
        TokenKind::GreaterGreaterGreater => BinaryOp::UShr,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::QuestionQuestion => BinaryOp::Nullish,
        _ => return None,
    };
    Some(op)
}

fn token_to_assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Equal => AssignOp::Assign,
        TokenKind::PlusEqual => AssignOp::AddAssign,
        TokenKind::MinusEqual => AssignOp::SubAssign,
        TokenKind::StarEqual => AssignOp::MulAssign,
        TokenKind::SlashEqual => AssignOp::DivAssign,
        TokenKind::PercentEqual => AssignOp::ModAssign,
        TokenKind::StarStarEqual => AssignOp::ExpAssign,
        TokenKind::LessLessEqual => AssignOp::ShlAssign,
        TokenKind::GreaterGreaterEqual => AssignOp::ShrAssign,
        TokenKind::GreaterGreaterGreaterEqual => AssignOp::UShrAssign,
        TokenKind::AmpEqual => AssignOp::BitAndAssign,
        TokenKind::PipeEqual => AssignOp::BitOrAssign,
        TokenKind::CaretEqual => AssignOp::BitXorAssign,
        TokenKind::AmpAmpEqual => AssignOp::AndAssign,
        TokenKind::PipePipeEqual => AssignOp::OrAssign,
        TokenKind::QuestionQuestionEqual => AssignOp::NullishAssign,
        _ => return None,
    };
    Some(op)
}

fn token_to_unary_op(kind: TokenKind) -> Option<UnaryOp> {
    let op = match kind {
        TokenKind::Bang => UnaryOp::Not,
        TokenKind::Tilde => UnaryOp::BitNot,
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Minus => UnaryOp::Neg,
        TokenKind::Typeof => UnaryOp::Typeof,
        TokenKind::Void => UnaryOp::Void,
        TokenKind::Delete => UnaryOp::Delete,
        _ => return None,
    };
    Some(op)
}

/// Numeric value of a number literal's source text.
fn parse_number(lexeme: &str) -> Option<f64> {
    let clean = lexeme.replace('_', "");
    let radix = match clean.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => return clean.parse().ok(),
    };
    u64::from_str_radix(&clean[2..], radix)
        .ok()
        .map(|value| value as f64)
}

impl Parser {
    /// Parse a full expression, including the comma operator.
    pub(super) fn parse_expression(&mut self) -> Option<Expr> {
        let first = self.parse_assignment()?;
        if self.peek() != TokenKind::Comma {
            return Some(first);
        }

        let mut exprs = vec![first];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_assignment()?);
        }
        let span = exprs[0].span.merge(&self.previous_span());
        Some(Expr::new(ExprKind::Sequence(exprs), span))
    }

    /// Parse an AssignmentExpression: arrows, `yield`, conditionals and assignments.
    pub(super) fn parse_assignment(&mut self) -> Option<Expr> {
        if let Some(arrow) = self.try_parse_arrow() {
            return arrow;
        }

        if self.peek() == TokenKind::Yield {
            return self.parse_yield();
        }

        let lhs = self.parse_conditional()?;

        if let Some(op) = token_to_assign_op(self.peek()) {
            self.advance(); // consume operator
            let rhs = self.parse_assignment()?;
            let span = lhs.span.merge(&rhs.span);
            return Some(Expr::new(
                ExprKind::Assign {
                    target: Box::new(lhs),
                    op,
                    value: Box::new(rhs),
                },
                span,
            ));
        }

        Some(lhs)
    }

    /// Detect and parse an arrow function at the cursor. Returns `None` when
    /// the cursor does not start one, `Some(None)` when it does but fails.
    fn try_parse_arrow(&mut self) -> Option<Option<Expr>> {
        let start = self.current_span();

        // async x => ...  /  async (a, b) => ...
        if self.is_contextual("async") && !self.token_at(1).newline_before {
            if is_binding_identifier(self.peek_next()) && self.peek_at(2) == TokenKind::FatArrow {
                self.advance(); // consume 'async'
                let param = self.parse_binding_target();
                return Some(param.and_then(|p| self.parse_arrow_rest(start, vec![p], true)));
            }
            if self.peek_next() == TokenKind::LeftParen && self.is_arrow_params_at(self.pos + 1) {
                self.advance(); // consume 'async'
                let params = self.parse_params();
                return Some(params.and_then(|p| self.parse_arrow_rest(start, p, true)));
            }
        }

        // x => ...
        if is_binding_identifier(self.peek()) && self.peek_next() == TokenKind::FatArrow {
            let param = self.parse_binding_target();
            return Some(param.and_then(|p| self.parse_arrow_rest(start, vec![p], false)));
        }

        // (a, b) => ...
        if self.peek() == TokenKind::LeftParen && self.is_arrow_params_at(self.pos) {
            let params = self.parse_params();
            return Some(params.and_then(|p| self.parse_arrow_rest(start, p, false)));
        }

        None
    }

    /// True if the `(` at token index `open` closes with a `)` that is
    /// directly followed by `=>`.
    fn is_arrow_params_at(&self, open: usize) -> bool {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                    depth += 1
                }
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return token.kind == TokenKind::RightParen
                            && self
                                .tokens
                                .get(index + 1)
                                .is_some_and(|next| next.kind == TokenKind::FatArrow);
                    }
                }
                TokenKind::TemplateHead => depth += 1,
                TokenKind::TemplateTail => depth = depth.saturating_sub(1),
                TokenKind::Eof => return false,
                _ => {}
            }
        }
        false
    }

    /// Parse `yield [*] [expr]`.
    fn parse_yield(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.advance(); // consume 'yield'

        let delegate = !self.current().newline_before && self.eat(TokenKind::Star);
        let has_argument = delegate
            || (!self.current().newline_before
                && !matches!(
                    self.peek(),
                    TokenKind::RightParen
                        | TokenKind::RightBracket
                        | TokenKind::RightBrace
                        | TokenKind::Comma
                        | TokenKind::Semicolon
                        | TokenKind::Colon
                        | TokenKind::TemplateMiddle
                        | TokenKind::TemplateTail
                        | TokenKind::Eof
                ));

        let argument = if has_argument {
            Some(Box::new(self.parse_assignment()?))
        } else {
            None
        };
        let span = start.merge(&self.previous_span());
        Some(Expr::new(ExprKind::Yield { argument, delegate }, span))
    }

    /// Parse `test ? consequent : alternate`.
    fn parse_conditional(&mut self) -> Option<Expr> {
        let test = self.parse_expr_bp(0)?;
        if !self.eat(TokenKind::Question) {
            return Some(test);
        }

        let consequent = self.allow_in(|p| p.parse_assignment())?;
        self.expect(TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = test.span.merge(&alternate.span);
        Some(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        ))
    }

    /// Core Pratt parser: parse a binary expression with a minimum binding power.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = if self.at_private_brand_check(min_bp) {
            let token = self.advance();
            Expr::new(ExprKind::PrivateName(token.lexeme.clone()), token.span.clone())
        } else {
            self.parse_prefix()?
        };

        loop {
            let op_kind = self.peek();
            if op_kind == TokenKind::In && self.no_in {
                break;
            }

            let Some((left_bp, right_bp)) = infix_binding_power(op_kind) else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            let Some(op) = token_to_binary_op(op_kind) else {
                break;
            };
            self.advance(); // consume operator

            let rhs = self.parse_expr_bp(right_bp)?;
            let span = lhs.span.merge(&rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    left: Box::new(lhs),
                    op,
                    right: Box::new(rhs),
                },
                span,
            );
        }

        Some(lhs)
    }

    /// `#x in obj`: a private name may start a relational expression.
    fn at_private_brand_check(&self, min_bp: u8) -> bool {
        self.peek() == TokenKind::PrivateName
            && self.peek_next() == TokenKind::In
            && !self.no_in
            && infix_binding_power(TokenKind::In).is_some_and(|(left_bp, _)| left_bp >= min_bp)
    }

    /// Parse a prefix expression (unary, prefix update, or postfix).
    fn parse_prefix(&mut self) -> Option<Expr> {
        let kind = self.peek();
        let start = self.current_span();

        if let Some(bp) = prefix_binding_power(kind) {
            self.advance(); // consume operator
            let operand = self.parse_expr_bp(bp)?;
            let span = start.merge(&operand.span);
            let expr = match token_to_unary_op(kind) {
                Some(op) => ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                None => ExprKind::Await(Box::new(operand)),
            };
            return Some(Expr::new(expr, span));
        }

        if matches!(kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            self.advance(); // consume operator
            let operand = self.parse_prefix()?;
            let span = start.merge(&operand.span);
            return Some(Expr::new(
                ExprKind::Update {
                    op: update_op(kind),
                    prefix: true,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        let expr = self.parse_lhs_expression()?;

        // Postfix update: no line break allowed before the operator
        let next = self.peek();
        if matches!(next, TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.current().newline_before
        {
            self.advance();
            let span = expr.span.merge(&self.previous_span());
            return Some(Expr::new(
                ExprKind::Update {
                    op: update_op(next),
                    prefix: false,
                    operand: Box::new(expr),
                },
                span,
            ));
        }

        Some(expr)
    }

    // ========================================================================
    // Left-hand-side expressions
    // ========================================================================

    /// Parse `new` expressions, primaries, and their member/call tails.
    pub(super) fn parse_lhs_expression(&mut self) -> Option<Expr> {
        let expr = if self.peek() == TokenKind::New {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        self.parse_call_tail(expr, true)
    }

    /// Parse `new Callee(args)`, `new Callee`, or `new.target`.
    fn parse_new(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.advance(); // consume 'new'

        if self.eat(TokenKind::Dot) {
            let property = self.expect_identifier_name()?;
            let span = start.merge(&self.previous_span());
            return Some(Expr::new(
                ExprKind::MetaProperty {
                    meta: "new".to_string(),
                    property,
                },
                span,
            ));
        }

        let callee = if self.peek() == TokenKind::New {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        // Member accesses bind to the callee; the first `(` is the constructor call
        let callee = self.parse_call_tail(callee, false)?;

        let args = if self.peek() == TokenKind::LeftParen {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let span = start.merge(&self.previous_span());
        Some(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            span,
        ))
    }

    /// Parse postfix operations: member access, optional chaining, calls and
    /// tagged templates. Calls are skipped when `allow_call` is false.
    fn parse_call_tail(&mut self, mut expr: Expr, allow_call: bool) -> Option<Expr> {
        loop {
            match self.peek() {
                // Member access: expr.name / expr.#name
                TokenKind::Dot => {
                    self.advance(); // consume '.'
                    let property = self.parse_member_name()?;
                    let span = expr.span.merge(&self.previous_span());
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                            optional: false,
                        },
                        span,
                    );
                }

                // Optional chain: expr?.name / expr?.[key] / expr?.(args)
                TokenKind::QuestionDot if allow_call => {
                    self.advance(); // consume '?.'
                    match self.peek() {
                        TokenKind::LeftParen => {
                            let args = self.parse_arguments()?;
                            let span = expr.span.merge(&self.previous_span());
                            expr = Expr::new(
                                ExprKind::Call {
                                    callee: Box::new(expr),
                                    args,
                                    optional: true,
                                },
                                span,
                            );
                        }
                        TokenKind::LeftBracket => {
                            let property = self.parse_computed_member()?;
                            let span = expr.span.merge(&self.previous_span());
                            expr = Expr::new(
                                ExprKind::Member {
                                    object: Box::new(expr),
                                    property,
                                    optional: true,
                                },
                                span,
                            );
                        }
                        _ => {
                            let property = self.parse_member_name()?;
                            let span = expr.span.merge(&self.previous_span());
                            expr = Expr::new(
                                ExprKind::Member {
                                    object: Box::new(expr),
                                    property,
                                    optional: true,
                                },
                                span,
                            );
                        }
                    }
                }

                // Computed member: expr[key]
                TokenKind::LeftBracket => {
                    let property = self.parse_computed_member()?;
                    let span = expr.span.merge(&self.previous_span());
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                            optional: false,
                        },
                        span,
                    );
                }

                // Call: expr(args)
                TokenKind::LeftParen if allow_call => {
                    let args = self.parse_arguments()?;
                    let span = expr.span.merge(&self.previous_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                            optional: false,
                        },
                        span,
                    );
                }

                // Tagged template: tag`text`
                TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead => {
                    let quasi = self.parse_template()?;
                    let span = expr.span.merge(&quasi.span);
                    expr = Expr::new(
                        ExprKind::TaggedTemplate {
                            tag: Box::new(expr),
                            quasi,
                        },
                        span,
                    );
                }

                _ => return Some(expr),
            }
        }
    }

    /// The name after `.` or `?.`: any IdentifierName or a `#private` name.
    fn parse_member_name(&mut self) -> Option<MemberProperty> {
        if self.peek() == TokenKind::PrivateName {
            return Some(MemberProperty::Private(self.advance().lexeme.clone()));
        }
        if self.peek().is_identifier_name() {
            return Some(MemberProperty::Named(self.advance().lexeme.clone()));
        }
        let span = self.current_span();
        self.diagnostics.error(
            format!("expected property name after '.', found {:?}", self.peek()),
            span,
        );
        None
    }

    /// Parse `[expr]` after an object.
    fn parse_computed_member(&mut self) -> Option<MemberProperty> {
        self.advance(); // consume '['
        let key = self.allow_in(|p| p.parse_expression())?;
        self.expect(TokenKind::RightBracket)?;
        Some(MemberProperty::Computed(Box::new(key)))
    }

    /// Parse a call argument list `(a, ...b, c,)`.
    fn parse_arguments(&mut self) -> Option<Vec<Expr>> {
        self.expect(TokenKind::LeftParen)?;
        self.allow_in(|p| {
            let mut args = Vec::new();
            while p.peek() != TokenKind::RightParen {
                args.push(p.parse_spread_or_assignment()?);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RightParen)?;
            Some(args)
        })
    }

    /// `...expr` or a plain assignment expression.
    fn parse_spread_or_assignment(&mut self) -> Option<Expr> {
        if self.peek() != TokenKind::DotDotDot {
            return self.parse_assignment();
        }
        let start = self.current_span();
        self.advance(); // consume '...'
        let inner = self.parse_assignment()?;
        let span = start.merge(&inner.span);
        Some(Expr::new(ExprKind::Spread(Box::new(inner)), span))
    }

    // ========================================================================
    // Primary expressions
    // ========================================================================

    /// Parse a primary expression.
    pub(super) fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.peek() {
            TokenKind::NumberLiteral => {
                let token = self.advance().clone();
                let value = self.number_value(&token.lexeme, &token.span);
                Some(Expr::new(
                    ExprKind::Literal(Literal::Number(value)),
                    token.span,
                ))
            }

            TokenKind::BigIntLiteral => {
                let token = self.advance().clone();
                let digits = token.lexeme.trim_end_matches('n').replace('_', "");
                Some(Expr::new(
                    ExprKind::Literal(Literal::BigInt(digits)),
                    token.span,
                ))
            }

            TokenKind::StringLiteral => {
                let token = self.advance().clone();
                Some(Expr::new(
                    ExprKind::Literal(Literal::String(token.lexeme)),
                    token.span,
                ))
            }

            TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead => {
                let template = self.parse_template()?;
                let span = template.span.clone();
                Some(Expr::new(ExprKind::Template(template), span))
            }

            TokenKind::RegexLiteral => {
                let token = self.advance().clone();
                let (pattern, flags) = split_regex(&token.lexeme);
                Some(Expr::new(ExprKind::Regex { pattern, flags }, token.span))
            }

            TokenKind::True | TokenKind::False => {
                let token = self.advance().clone();
                let value = token.kind == TokenKind::True;
                Some(Expr::new(
                    ExprKind::Literal(Literal::Bool(value)),
                    token.span,
                ))
            }

            TokenKind::Null => {
                self.advance();
                Some(Expr::new(ExprKind::Literal(Literal::Null), start))
            }

            TokenKind::This => {
                self.advance();
                Some(Expr::new(ExprKind::This, start))
            }

            TokenKind::Super => {
                self.advance();
                Some(Expr::new(ExprKind::Super, start))
            }

            TokenKind::Identifier if self.is_async_function() => self.parse_function_expr(),

            TokenKind::Identifier | TokenKind::Let | TokenKind::Yield | TokenKind::Await => {
                let name = self.advance().lexeme.clone();
                Some(Expr::new(ExprKind::Identifier(name), start))
            }

            TokenKind::Function => self.parse_function_expr(),

            TokenKind::Class => self.parse_class_expr(),

            // Grouping: (expr). Arrow parameter lists are handled before we get here.
            TokenKind::LeftParen => {
                self.advance(); // consume '('
                let inner = self.allow_in(|p| p.parse_expression())?;
                self.expect(TokenKind::RightParen)?;
                let span = start.merge(&self.previous_span());
                Some(Expr::new(ExprKind::Grouping(Box::new(inner)), span))
            }

            TokenKind::LeftBracket => self.parse_array_literal(),

            TokenKind::LeftBrace => self.parse_object_literal(),

            // import(...) and import.meta
            TokenKind::Import => {
                self.advance(); // consume 'import'
                if self.eat(TokenKind::Dot) {
                    let property = self.expect_identifier_name()?;
                    let span = start.merge(&self.previous_span());
                    return Some(Expr::new(
                        ExprKind::MetaProperty {
                            meta: "import".to_string(),
                            property,
                        },
                        span,
                    ));
                }
                if self.peek() != TokenKind::LeftParen {
                    let span = self.current_span();
                    self.diagnostics
                        .error("expected '(' or '.' after 'import'", span);
                    return None;
                }
                Some(Expr::new(ExprKind::Identifier("import".to_string()), start))
            }

            _ => {
                let span = self.current_span();
                self.diagnostics.error(
                    format!("expected expression, found {:?}", self.peek()),
                    span,
                );
                None
            }
        }
    }

    /// Numeric value of a number token, reporting malformed literals.
    pub(super) fn number_value(&mut self, lexeme: &str, span: &Span) -> f64 {
        parse_number(lexeme).unwrap_or_else(|| {
            self.diagnostics
                .error(format!("invalid number literal '{}'", lexeme), span.clone());
            0.0
        })
    }

    /// Parse a template literal starting at `NoSubstitutionTemplate` or `TemplateHead`.
    fn parse_template(&mut self) -> Option<Template> {
        let start = self.current_span();
        let head = self.advance().clone();

        let mut quasis = vec![head.lexeme];
        let mut expressions = Vec::new();

        if head.kind == TokenKind::TemplateHead {
            loop {
                expressions.push(self.allow_in(|p| p.parse_expression())?);
                match self.peek() {
                    TokenKind::TemplateMiddle => {
                        quasis.push(self.advance().lexeme.clone());
                    }
                    TokenKind::TemplateTail => {
                        quasis.push(self.advance().lexeme.clone());
                        break;
                    }
                    other => {
                        let span = self.current_span();
                        self.diagnostics.error(
                            format!("expected '}}' to close template substitution, found {:?}", other),
                            span,
                        );
                        return None;
                    }
                }
            }
        }

        let span = start.merge(&self.previous_span());
        Some(Template {
            quasis,
            expressions,
            span,
        })
    }

    /// Parse `[a, , ...b]`.
    fn parse_array_literal(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.advance(); // consume '['

        let elements = self.allow_in(|p| {
            let mut elements = Vec::new();
            while p.peek() != TokenKind::RightBracket {
                if p.eat(TokenKind::Comma) {
                    elements.push(None); // hole
                    continue;
                }
                elements.push(Some(p.parse_spread_or_assignment()?));
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            Some(elements)
        })?;

        self.expect(TokenKind::RightBracket)?;
        let span = start.merge(&self.previous_span());
        Some(Expr::new(ExprKind::Array(elements), span))
    }

    /// Parse `{ a: 1, b, c = 2, [d]: 3, m() {}, get e() {}, ...f }`.
    ///
    /// `c = 2` is only meaningful in a destructuring pattern; it is accepted
    /// here and stored as an assignment value.
    fn parse_object_literal(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.advance(); // consume '{'

        let members = self.allow_in(|p| {
            let mut members = Vec::new();
            while p.peek() != TokenKind::RightBrace {
                members.push(p.parse_object_member()?);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            Some(members)
        })?;

        self.expect(TokenKind::RightBrace)?;
        let span = start.merge(&self.previous_span());
        Some(Expr::new(ExprKind::Object(members), span))
    }

    fn parse_object_member(&mut self) -> Option<ObjectMember> {
        let start = self.current_span();

        if self.eat(TokenKind::DotDotDot) {
            let inner = self.parse_assignment()?;
            return Some(ObjectMember::Spread(inner));
        }

        let key_token = self.current().clone();
        let (key, kind, is_async, is_generator) = self.parse_method_head()?;

        if self.peek() == TokenKind::LeftParen {
            let function = self.parse_method_function(start.clone(), is_async, is_generator)?;
            let span = start.merge(&function.span);
            return Some(ObjectMember::Method {
                key,
                kind,
                function,
                span,
            });
        }

        if kind != MethodKind::Method || is_async || is_generator {
            let span = self.current_span();
            self.diagnostics.error("expected '(' after method name", span);
            return None;
        }

        if self.eat(TokenKind::Colon) {
            let value = self.parse_assignment()?;
            let span = start.merge(&value.span);
            return Some(ObjectMember::Property {
                key,
                value,
                shorthand: false,
                span,
            });
        }

        // Shorthand `{ a }` or `{ a = default }`
        let name = match &key {
            PropertyKey::Identifier(name) if is_binding_identifier(key_token.kind) => name.clone(),
            _ => {
                let span = self.current_span();
                self.diagnostics.error(
                    format!("expected ':' after property name, found {:?}", self.peek()),
                    span,
                );
                return None;
            }
        };
        let mut value = Expr::new(ExprKind::Identifier(name), key_token.span.clone());
        if self.eat(TokenKind::Equal) {
            let default = self.parse_assignment()?;
            let span = value.span.merge(&default.span);
            value = Expr::new(
                ExprKind::Assign {
                    target: Box::new(value),
                    op: AssignOp::Assign,
                    value: Box::new(default),
                },
                span,
            );
        }
        let span = start.merge(&value.span);
        Some(ObjectMember::Property {
            key,
            value,
            shorthand: true,
            span,
        })
    }
}

fn update_op(kind: TokenKind) -> UpdateOp {
    if kind == TokenKind::PlusPlus {
        UpdateOp::Increment
    } else {
        UpdateOp::Decrement
    }
}

/// Split `/body/flags` at the last `/`.
fn split_regex(lexeme: &str) -> (String, String) {
    let body = lexeme.strip_prefix('/').unwrap_or(lexeme);
    match body.rfind('/') {
        Some(end) => (body[..end].to_string(), body[end + 1..].to_string()),
        None => (body.to_string(), String::new()),
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

    /// Parse a single expression statement and return its expression.
    fn expr(source: &str) -> Expr {
        let prog = parse(source);
        match prog.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(e)) => e,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn parse_listener_call_shape() {
        let e = expr("this.div.addEventListener('click', this.onClick, { once: true });");
        match &e.kind {
            ExprKind::Call { callee, args, .. } => {
                assert_eq!(args.len(), 3);
                match &callee.kind {
                    ExprKind::Member {
                        object, property, ..
                    } => {
                        assert!(matches!(property, MemberProperty::Named(n) if n == "addEventListener"));
                        assert!(matches!(object.kind, ExprKind::Member { .. }));
                    }
                    other => panic!("expected Member, got {:?}", other),
                }
                assert!(matches!(args[2].kind, ExprKind::Object(_)));
            }
            other => panic!("expected Call, got {:?}", other),
        }
    }

    #[test]
    fn precedence() {
        let e = expr("a + b * c ** d ** e;");
        match &e.kind {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(*op, BinaryOp::Add);
                match &right.kind {
                    ExprKind::Binary { op, right, .. } => {
                        assert_eq!(*op, BinaryOp::Mul);
                        // ** is right-associative
                        match &right.kind {
                            ExprKind::Binary { op, right, .. } => {
                                assert_eq!(*op, BinaryOp::Exp);
                                assert!(matches!(
                                    right.kind,
                                    ExprKind::Binary {
                                        op: BinaryOp::Exp,
                                        ..
                                    }
                                ));
                            }
                            other => panic!("expected Binary, got {:?}", other),
                        }
                    }
                    other => panic!("expected Binary, got {:?}", other),
                }
            }
            other => panic!("expected Binary, got {:?}", other),
        }
    }

    #[test]
    fn logical_and_conditional() {
        let e = expr("a ?? b || c && d ? x : y;");
        assert!(matches!(e.kind, ExprKind::Conditional { .. }));
    }

    #[test]
    fn assignment_is_right_associative() {
        let e = expr("a = b += c;");
        match &e.kind {
            ExprKind::Assign { op, value, .. } => {
                assert_eq!(*op, AssignOp::Assign);
                assert!(matches!(
                    value.kind,
                    ExprKind::Assign {
                        op: AssignOp::AddAssign,
                        ..
                    }
                ));
            }
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn arrow_functions() {
        let e = expr("items.forEach((item, i) => { use(item); });");
        match &e.kind {
            ExprKind::Call { args, .. } => match &args[0].kind {
                ExprKind::Arrow(arrow) => {
                    assert_eq!(arrow.params.len(), 2);
                    assert!(matches!(arrow.body, ArrowBody::Block(_)));
                }
                other => panic!("expected Arrow, got {:?}", other),
            },
            other => panic!("expected Call, got {:?}", other),
        }

        let e = expr("x => x * 2;");
        assert!(matches!(e.kind, ExprKind::Arrow(_)));

        let e = expr("async ({ a }, [b] = []) => a + b;");
        match &e.kind {
            ExprKind::Arrow(arrow) => {
                assert!(arrow.is_async);
                assert_eq!(arrow.params.len(), 2);
            }
            other => panic!("expected Arrow, got {:?}", other),
        }
    }

    #[test]
    fn async_call_is_not_an_arrow() {
        let e = expr("async(a, b);");
        assert!(matches!(e.kind, ExprKind::Call { .. }));
    }

    #[test]
    fn grouping_is_kept() {
        let e = expr("(a, b);");
        match &e.kind {
            ExprKind::Grouping(inner) => assert!(matches!(inner.kind, ExprKind::Sequence(_))),
            other => panic!("expected Grouping, got {:?}", other),
        }
        assert!(matches!(e.unparenthesized().kind, ExprKind::Sequence(_)));
    }

    #[test]
    fn optional_chaining() {
        let e = expr("el?.addEventListener?.('x', h);");
        match &e.kind {
            ExprKind::Call {
                callee, optional, ..
            } => {
                assert!(optional);
                assert!(matches!(callee.kind, ExprKind::Member { optional: true, .. }));
            }
            other => panic!("expected Call, got {:?}", other),
        }
        let e = expr("a?.[0];");
        assert!(matches!(
            e.kind,
            ExprKind::Member {
                property: MemberProperty::Computed(_),
                optional: true,
                ..
            }
        ));
    }

    #[test]
    fn new_expressions() {
        let e = expr("new Foo.Bar(1).baz();");
        match &e.kind {
            ExprKind::Call { callee, .. } => match &callee.kind {
                ExprKind::Member { object, .. } => match &object.kind {
                    ExprKind::New { callee, args } => {
                        assert_eq!(args.len(), 1);
                        assert!(matches!(callee.kind, ExprKind::Member { .. }));
                    }
                    other => panic!("expected New, got {:?}", other),
                },
                other => panic!("expected Member, got {:?}", other),
            },
            other => panic!("expected Call, got {:?}", other),
        }
        let e = expr("new Date;");
        assert!(matches!(e.kind, ExprKind::New { ref args, .. } if args.is_empty()));
    }

    #[test]
    fn object_literal_members() {
        let e = expr("({ a: 1, b, 'c': 2, [d]: 3, m() {}, get g() { return 1; }, async *h() {}, ...rest, 4: x });");
        let members = match &e.unparenthesized().kind {
            ExprKind::Object(members) => members,
            other => panic!("expected Object, got {:?}", other),
        };
        assert_eq!(members.len(), 9);
        assert!(matches!(
            &members[1],
            ObjectMember::Property {
                shorthand: true,
                ..
            }
        ));
        assert!(matches!(
            &members[2],
            ObjectMember::Property { key: PropertyKey::String(s), .. } if s == "c"
        ));
        assert!(matches!(
            &members[3],
            ObjectMember::Property {
                key: PropertyKey::Computed(_),
                ..
            }
        ));
        assert!(matches!(
            &members[5],
            ObjectMember::Method {
                kind: MethodKind::Getter,
                ..
            }
        ));
        assert!(matches!(&members[7], ObjectMember::Spread(_)));
        assert!(matches!(
            &members[8],
            ObjectMember::Property {
                key: PropertyKey::Number(n),
                ..
            } if *n == 4.0
        ));
    }

    #[test]
    fn templates_and_tags() {
        let e = expr("`a${b}c${d}e`;");
        match &e.kind {
            ExprKind::Template(t) => {
                assert_eq!(t.quasis, vec!["a", "c", "e"]);
                assert_eq!(t.expressions.len(), 2);
            }
            other => panic!("expected Template, got {:?}", other),
        }
        let e = expr("html`<p>${x}</p>`;");
        assert!(matches!(e.kind, ExprKind::TaggedTemplate { .. }));
    }

    #[test]
    fn literals() {
        assert!(matches!(
            expr("0x1F;").kind,
            ExprKind::Literal(Literal::Number(n)) if n == 31.0
        ));
        assert!(matches!(
            expr("1_000.5;").kind,
            ExprKind::Literal(Literal::Number(n)) if n == 1000.5
        ));
        assert!(matches!(
            expr("12n;").kind,
            ExprKind::Literal(Literal::BigInt(ref d)) if d == "12"
        ));
        match expr("/ab+c/gi;").kind {
            ExprKind::Regex { pattern, flags } => {
                assert_eq!(pattern, "ab+c");
                assert_eq!(flags, "gi");
            }
            other => panic!("expected Regex, got {:?}", other),
        }
    }

    #[test]
    fn postfix_update_respects_line_breaks() {
        let prog = parse("a\n++b");
        assert_eq!(prog.body.len(), 2);
        match &prog.body[1].kind {
            StmtKind::Expr(e) => {
                assert!(matches!(e.kind, ExprKind::Update { prefix: true, .. }))
            }
            other => panic!("expected Expr, got {:?}", other),
        }
    }

    #[test]
    fn unary_and_await() {
        let prog = parse("async function f() { return typeof await load(); }");
        let body = match &prog.body[0].kind {
            StmtKind::Function(f) => &f.body.body,
            other => panic!("expected Function, got {:?}", other),
        };
        match &body[0].kind {
            StmtKind::Return(Some(e)) => match &e.kind {
                ExprKind::Unary { op, operand } => {
                    assert_eq!(*op, UnaryOp::Typeof);
                    assert!(matches!(operand.kind, ExprKind::Await(_)));
                }
                other => panic!("expected Unary, got {:?}", other),
            },
            other => panic!("expected Return, got {:?}", other),
        }
    }

    #[test]
    fn private_brand_check() {
        let prog = parse("class A { #x; has(o) { return #x in o && ok; } }");
        let StmtKind::Class(class) = &prog.body[0].kind else {
            panic!("expected Class, got {:?}", prog.body[0].kind);
        };
        assert_eq!(class.members.len(), 2);

        let e = expr("#x in o;");
        match &e.kind {
            ExprKind::Binary { left, op, right } => {
                assert!(matches!(&left.kind, ExprKind::PrivateName(n) if n == "x"));
                assert_eq!(*op, BinaryOp::In);
                assert!(matches!(&right.kind, ExprKind::Identifier(n) if n == "o"));
            }
            other => panic!("expected Binary, got {:?}", other),
        }
    }

    #[test]
    fn private_name_alone_is_rejected() {
        let (tokens, _) = Lexer::new("x = #y + 1;", "test.js").tokenize();
        let (_, diags) = Parser::new(tokens).parse();
        assert!(diags.has_errors());
    }

    #[test]
    fn dynamic_import_and_meta() {
        let e = expr("import('./mod.js');");
        assert!(matches!(e.kind, ExprKind::Call { .. }));
        let e = expr("import.meta.url;");
        match &e.kind {
            ExprKind::Member { object, .. } => {
                assert!(matches!(object.kind, ExprKind::MetaProperty { .. }))
            }
            other => panic!("expected Member, got {:?}", other),
        }
    }

    #[test]
    fn keyword_property_names() {
        let e = expr("promise.catch(handle).finally(done);");
        assert!(matches!(e.kind, ExprKind::Call { .. }));
    }
}
