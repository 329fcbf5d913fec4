//! Decides what a call expression means to the listener pass.

use listenlint_common::Span;

use crate::ast::{Expr, ExprKind, Literal, MemberProperty, ObjectMember, PropertyKey};

use super::resolver::{self, HandlerShape, IdentityKey, ANONYMOUS_HANDLER};

const ADD_METHOD: &str = "addEventListener";
const REMOVE_METHOD: &str = "removeEventListener";
const ONCE_OPTION: &str = "once";

/// A call expression seen during traversal.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub callee: &'a Expr,
    pub args: &'a [Expr],
    /// Span of the whole call expression.
    pub span: &'a Span,
    /// Text of the unit the call belongs to.
    pub source: &'a str,
}

impl<'a> CallSite<'a> {
    /// View `expr` as a call site, if it is a call.
    pub fn from_expr(expr: &'a Expr, source: &'a str) -> Option<Self> {
        match &expr.kind {
            ExprKind::Call { callee, args, .. } => Some(CallSite {
                callee,
                args,
                span: &expr.span,
                source,
            }),
            _ => None,
        }
    }
}

/// Outcome of classifying one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerCall {
    /// `addEventListener` with a function literal handler. Always reported,
    /// never tracked.
    InlineRegistration(IdentityKey),
    /// `addEventListener` to record in the ledger.
    Register(IdentityKey),
    /// `removeEventListener` to match against the ledger.
    Deregister(IdentityKey),
    Ignored(IgnoreReason),
}

/// Why a call produced no ledger update and no diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not a `.addEventListener` / `.removeEventListener` call.
    NotListenerCall,
    /// Fewer than two arguments.
    TooFewArguments,
    /// A handler the identity key cannot name.
    UnsupportedHandler,
    /// Options object with a `once` key.
    FireOnce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Add,
    Remove,
}

pub fn classify(call: &CallSite<'_>) -> ListenerCall {
    let Some((method, receiver)) = listener_method(call.callee) else {
        return ListenerCall::Ignored(IgnoreReason::NotListenerCall);
    };
    let [event, handler, rest @ ..] = call.args else {
        return ListenerCall::Ignored(IgnoreReason::TooFewArguments);
    };

    let shape = resolver::handler_shape(handler);
    let identity = |handler: &str| {
        IdentityKey::new(
            resolver::scope_name(Some(receiver)),
            resolver::event_name(event, call.source),
            handler,
        )
    };

    match method {
        Method::Add => match &shape {
            HandlerShape::Inline { name } => {
                let name = name.as_deref().unwrap_or(ANONYMOUS_HANDLER);
                ListenerCall::InlineRegistration(identity(name))
            }
            _ if has_once_option(rest.first()) => ListenerCall::Ignored(IgnoreReason::FireOnce),
            HandlerShape::Named(name) | HandlerShape::InstanceMember(name) => {
                ListenerCall::Register(identity(name))
            }
            _ => ListenerCall::Ignored(IgnoreReason::UnsupportedHandler),
        },
        Method::Remove => match shape.name() {
            Some(name) if shape.is_removable() => ListenerCall::Deregister(identity(name)),
            _ => ListenerCall::Ignored(IgnoreReason::UnsupportedHandler),
        },
    }
}

/// `receiver.addEventListener` or `receiver?.removeEventListener`, written
/// with a plain property name.
fn listener_method(callee: &Expr) -> Option<(Method, &Expr)> {
    match &callee.unparenthesized().kind {
        ExprKind::Member {
            object,
            property: MemberProperty::Named(name),
            ..
        } => {
            let method = match name.as_str() {
                ADD_METHOD => Method::Add,
                REMOVE_METHOD => Method::Remove,
                _ => return None,
            };
            Some((method, &**object))
        }
        _ => None,
    }
}

/// True if `options` is an object literal with a `once` key. The value is
/// not inspected.
fn has_once_option(options: Option<&Expr>) -> bool {
    let Some(ExprKind::Object(members)) = options.map(|o| &o.unparenthesized().kind) else {
        return false;
    };
    members.iter().any(|member| match member {
        ObjectMember::Property { key, .. } | ObjectMember::Method { key, .. } => {
            is_once_key(key)
        }
        ObjectMember::Spread(_) => false,
    })
}

/// `once`, `'once'` or `['once']`.
fn is_once_key(key: &PropertyKey) -> bool {
    match key {
        PropertyKey::Computed(expr) => matches!(
            &expr.unparenthesized().kind,
            ExprKind::Literal(Literal::String(name)) if name == ONCE_OPTION
        ),
        _ => key.static_name() == Some(ONCE_OPTION),
    }
}
