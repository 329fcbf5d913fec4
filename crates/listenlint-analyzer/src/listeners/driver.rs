use crate::ast::visitor::{walk_expr, Visitor};
use crate::ast::{Expr, Program};
use crate::rule::DiagnosticKind;

use super::classifier::{classify, CallSite, ListenerCall};
use super::ledger::Ledger;
use super::reporter::ListenerDiagnostic;
use super::resolver::IdentityKey;

/// Pairs `addEventListener` and `removeEventListener` calls within one
/// analysis unit.
///
/// Calls must be fed with [`on_call`](Self::on_call) in source order.
/// [`finish`](Self::finish) reports the registrations left over.
pub struct ListenerPass<'src> {
    source: &'src str,
    ledger: Ledger,
    diagnostics: Vec<ListenerDiagnostic>,
}

impl<'src> ListenerPass<'src> {
    pub fn new(source: &'src str, ledger: Ledger) -> Self {
        Self {
            source,
            ledger,
            diagnostics: Vec::new(),
        }
    }

    /// Walk `program` and return every finding, in emission order.
    pub fn check_program(program: &Program, source: &str) -> Vec<ListenerDiagnostic> {
        let mut pass = ListenerPass::new(source, Ledger::new());
        pass.visit_program(program);
        pass.finish()
    }

    pub fn on_call(&mut self, call: &CallSite<'_>) {
        match classify(call) {
            ListenerCall::InlineRegistration(key) => {
                tracing::trace!(%key, "inline handler");
                self.report(DiagnosticKind::InlineHandlerUsed, call, key);
            }
            ListenerCall::Register(key) => {
                self.ledger.insert(key, call.span.clone());
            }
            ListenerCall::Deregister(key) => {
                if self.ledger.remove(&key).is_none() {
                    tracing::trace!(%key, "no pending registration");
                    self.report(DiagnosticKind::OrphanRemoval, call, key);
                }
            }
            ListenerCall::Ignored(reason) => {
                tracing::trace!(?reason, at = %call.span, "call ignored");
            }
        }
    }

    /// Report every registration still pending and return all findings.
    pub fn finish(mut self) -> Vec<ListenerDiagnostic> {
        let pending = self.ledger.drain_pending();
        tracing::trace!(count = pending.len(), "unit finished");
        self.diagnostics.extend(pending.into_iter().map(|entry| {
            ListenerDiagnostic::new(DiagnosticKind::UnmatchedRegistration, entry.span, entry.key)
                .with_replaced(entry.replaced)
        }));
        self.diagnostics
    }

    fn report(&mut self, kind: DiagnosticKind, call: &CallSite<'_>, key: IdentityKey) {
        self.diagnostics
            .push(ListenerDiagnostic::new(kind, call.span.clone(), key));
    }
}

impl Visitor for ListenerPass<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        if let Some(call) = CallSite::from_expr(expr, self.source) {
            self.on_call(&call);
        }
        walk_expr(self, expr);
    }
}
