//! Derives the `(scope, event, handler)` triple from a listener call.
//!
//! Every derivation degrades to a fallback instead of failing: an unusual
//! receiver becomes `window`, an unusual event expression is named by its
//! source text.

use std::fmt;

use crate::ast::{Expr, ExprKind, Literal, MemberProperty};

/// Scope used when the receiver gives no better name.
pub const DEFAULT_SCOPE: &str = "window";

/// Rendered handler name of a function literal without a name.
pub const ANONYMOUS_HANDLER: &str = "<anonymous>";

/// Identity of a listener relationship. Two call sites pair up only when
/// all three parts are textually equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub scope: String,
    pub event: String,
    pub handler: String,
}

impl IdentityKey {
    pub fn new(
        scope: impl Into<String>,
        event: impl Into<String>,
        handler: impl Into<String>,
    ) -> Self {
        Self {
            scope: scope.into(),
            event: event.into(),
            handler: handler.into(),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.scope, self.event, self.handler)
    }
}

/// What a handler argument looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerShape {
    /// `handler`
    Named(String),
    /// `this.handler`
    InstanceMember(String),
    /// `obj.handler`, any receiver other than `this`
    Member(String),
    /// `function name() {}`, `function () {}` or an arrow function
    Inline { name: Option<String> },
    /// Computed or private members, calls, literals and everything else.
    Unsupported,
}

impl HandlerShape {
    /// The name used in the identity key, if the shape has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            HandlerShape::Named(name)
            | HandlerShape::InstanceMember(name)
            | HandlerShape::Member(name) => Some(name),
            HandlerShape::Inline { name } => name.as_deref(),
            HandlerShape::Unsupported => None,
        }
    }

    /// Shapes a registration can be tracked under.
    pub fn is_trackable(&self) -> bool {
        matches!(self, HandlerShape::Named(_) | HandlerShape::InstanceMember(_))
    }

    /// Shapes a deregistration is matched under.
    pub fn is_removable(&self) -> bool {
        matches!(
            self,
            HandlerShape::Named(_) | HandlerShape::InstanceMember(_) | HandlerShape::Member(_)
        )
    }
}

/// Name of the object that owns the listener, from the receiver of
/// `receiver.addEventListener(...)`.
pub fn scope_name(receiver: Option<&Expr>) -> String {
    let Some(receiver) = receiver.map(Expr::unparenthesized) else {
        return DEFAULT_SCOPE.to_string();
    };
    match &receiver.kind {
        ExprKind::Member { property, .. } => match property {
            MemberProperty::Named(name) => name.clone(),
            MemberProperty::Private(_) | MemberProperty::Computed(_) => DEFAULT_SCOPE.to_string(),
        },
        ExprKind::Identifier(name) if name == "document" => "document".to_string(),
        ExprKind::This => "this".to_string(),
        ExprKind::Identifier(name) => name.clone(),
        _ => DEFAULT_SCOPE.to_string(),
    }
}

/// Textual name of the event argument.
///
/// Literals give their value, identifiers their name and plain member chains
/// their dotted path. Anything else is named by its exact source text.
pub fn event_name(event: &Expr, source: &str) -> String {
    let event = event.unparenthesized();
    match &event.kind {
        ExprKind::Literal(literal) => literal_text(literal),
        ExprKind::Identifier(name) => name.clone(),
        ExprKind::Template(template) if template.expressions.is_empty() => {
            template.quasis.concat()
        }
        ExprKind::Member { .. } => {
            member_path(event).unwrap_or_else(|| source_text(event, source))
        }
        _ => source_text(event, source),
    }
}

/// Classify the handler argument.
pub fn handler_shape(handler: &Expr) -> HandlerShape {
    let handler = handler.unparenthesized();
    match &handler.kind {
        ExprKind::Identifier(name) => HandlerShape::Named(name.clone()),
        ExprKind::Member {
            object,
            property: MemberProperty::Named(name),
            ..
        } => {
            if matches!(object.unparenthesized().kind, ExprKind::This) {
                HandlerShape::InstanceMember(name.clone())
            } else {
                HandlerShape::Member(name.clone())
            }
        }
        ExprKind::Function(function) => HandlerShape::Inline {
            name: function.name.clone(),
        },
        ExprKind::Arrow(_) => HandlerShape::Inline { name: None },
        _ => HandlerShape::Unsupported,
    }
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::String(value) => value.clone(),
        Literal::Number(value) => value.to_string(),
        Literal::BigInt(digits) => digits.clone(),
        Literal::Bool(value) => value.to_string(),
        Literal::Null => "null".to_string(),
    }
}

/// `A.B.C` or `this.x.y`, when every link is a plain name.
fn member_path(expr: &Expr) -> Option<String> {
    match &expr.unparenthesized().kind {
        ExprKind::Identifier(name) => Some(name.clone()),
        ExprKind::This => Some("this".to_string()),
        ExprKind::Member {
            object,
            property: MemberProperty::Named(name),
            optional: false,
        } => {
            let mut path = member_path(object)?;
            path.push('.');
            path.push_str(name);
            Some(path)
        }
        _ => None,
    }
}

fn source_text(expr: &Expr, source: &str) -> String {
    source
        .get(expr.span.range())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StmtKind;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    /// Parse `source` as a single expression statement.
    fn expr(source: &str) -> Expr {
        let (tokens, lex_diags) = Lexer::new(source, "test.js").tokenize();
        assert!(lex_diags.is_empty(), "{:?}", lex_diags.diagnostics());
        let (program, diags) = Parser::new(tokens).parse();
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match program.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(expr)) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    /// Receiver of `source`, which must be `<receiver>.method(...)`.
    fn scope_of(source: &str) -> String {
        let call = expr(source);
        let ExprKind::Call { callee, .. } = call.kind else {
            panic!("expected call");
        };
        let ExprKind::Member { object, .. } = callee.kind else {
            panic!("expected member callee");
        };
        scope_name(Some(&*object))
    }

    #[test]
    fn scope_from_receiver() {
        assert_eq!(scope_of("document.addEventListener('a', f)"), "document");
        assert_eq!(scope_of("this.addEventListener('a', f)"), "this");
        assert_eq!(scope_of("this.div.addEventListener('a', f)"), "div");
        assert_eq!(scope_of("a.b.c.addEventListener('a', f)"), "c");
        assert_eq!(scope_of("button.addEventListener('a', f)"), "button");
        assert_eq!(scope_of("(document).addEventListener('a', f)"), "document");
    }

    #[test]
    fn scope_falls_back_to_window() {
        assert_eq!(scope_name(None), "window");
        assert_eq!(scope_of("this.#el.addEventListener('a', f)"), "window");
        assert_eq!(scope_of("els[0].addEventListener('a', f)"), "window");
        assert_eq!(scope_of("getEl().addEventListener('a', f)"), "window");
    }

    #[test]
    fn event_names() {
        let source = "'click'";
        assert_eq!(event_name(&expr(source), source), "click");
        let source = "SaveEvent";
        assert_eq!(event_name(&expr(source), source), "SaveEvent");
        let source = "Constants.SaveEvent";
        assert_eq!(event_name(&expr(source), source), "Constants.SaveEvent");
        let source = "A.B.C";
        assert_eq!(event_name(&expr(source), source), "A.B.C");
        let source = "this.eventName";
        assert_eq!(event_name(&expr(source), source), "this.eventName");
        let source = "`keyup`";
        assert_eq!(event_name(&expr(source), source), "keyup");
        let source = "42";
        assert_eq!(event_name(&expr(source), source), "42");
    }

    #[test]
    fn other_events_use_source_text() {
        let source = "prefix + 'down'";
        assert_eq!(event_name(&expr(source), source), "prefix + 'down'");
        let source = "events[0]";
        assert_eq!(event_name(&expr(source), source), "events[0]");
        let source = "`on${name}`";
        assert_eq!(event_name(&expr(source), source), "`on${name}`");
    }

    #[test]
    fn handler_shapes() {
        assert_eq!(handler_shape(&expr("onClick")), HandlerShape::Named("onClick".into()));
        assert_eq!(
            handler_shape(&expr("this.onClick")),
            HandlerShape::InstanceMember("onClick".into())
        );
        assert_eq!(
            handler_shape(&expr("handlers.onClick")),
            HandlerShape::Member("onClick".into())
        );
        assert_eq!(
            handler_shape(&expr("(function testFn() {})")),
            HandlerShape::Inline {
                name: Some("testFn".into())
            }
        );
        assert_eq!(handler_shape(&expr("() => {}")), HandlerShape::Inline { name: None });
        assert_eq!(handler_shape(&expr("this[name]")), HandlerShape::Unsupported);
        assert_eq!(handler_shape(&expr("this.#onClick")), HandlerShape::Unsupported);
        assert_eq!(handler_shape(&expr("f.bind(this)")), HandlerShape::Unsupported);
    }

    #[test]
    fn trackable_and_removable_shapes() {
        assert!(HandlerShape::Named("f".into()).is_trackable());
        assert!(HandlerShape::InstanceMember("f".into()).is_trackable());
        assert!(!HandlerShape::Member("f".into()).is_trackable());
        assert!(HandlerShape::Member("f".into()).is_removable());
        assert!(!HandlerShape::Inline { name: None }.is_removable());
        assert!(!HandlerShape::Unsupported.is_removable());
    }
}
