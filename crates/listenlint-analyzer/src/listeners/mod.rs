//! The `remove-listeners` pass.
//!
//! Every `addEventListener` call with a trackable handler must be matched by
//! a later `removeEventListener` call with the same scope, event and handler
//! in the same unit. Inline function handlers are always reported, since
//! they can never be removed by reference.

mod classifier;
mod driver;
mod ledger;
mod reporter;
mod resolver;

pub use classifier::{classify, CallSite, IgnoreReason, ListenerCall};
pub use driver::ListenerPass;
pub use ledger::{Ledger, PendingRegistration};
pub use reporter::ListenerDiagnostic;
pub use resolver::{
    event_name, handler_shape, scope_name, HandlerShape, IdentityKey, ANONYMOUS_HANDLER,
    DEFAULT_SCOPE,
};
