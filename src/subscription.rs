//! Subscriptions and the ordered registry that dispatches to them.
//!
//! Dispatch order is subscription order. Every handler invocation gets its
//! own fresh message instance, and a failing handler is isolated at the
//! per-handler boundary: its error is converted into an
//! `UnexpectedExceptionMessage` on the reply channel it was handed, and the
//! remaining subscriptions still run.

use std::cell::RefCell;
use std::rc::Rc;

use crate::message::{unexpected_exception, Message, MessageDef};
use crate::pattern::Pattern;
use crate::reply::ReplyChannel;

/// Error surfaced by a handler. Converted into bus traffic, never propagated
/// to the publisher.
pub type HandlerError = Box<dyn std::error::Error>;

pub type HandlerResult = Result<(), HandlerError>;

/// A subscriber callback. Receives an owned instance (mutation is invisible
/// to sibling handlers) and the reply channel scoped to the publish call.
/// The `Rc` identity is what `off` compares against.
pub type Handler = Rc<dyn Fn(Message, &ReplyChannel) -> HandlerResult>;

/// Wrap a closure as a [`Handler`]. Keep a clone if you intend to remove the
/// subscription later.
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(Message, &ReplyChannel) -> HandlerResult + 'static,
{
    Rc::new(f)
}

/// Optional per-publish constructor, applied to every fresh instance.
pub(crate) type Constructor = Rc<dyn Fn(&mut Message)>;

/// A registered `(pattern, handler)` pair.
#[derive(Clone)]
pub(crate) struct Subscription {
    pub(crate) pattern: Rc<Pattern>,
    pub(crate) handler: Handler,
}

impl Subscription {
    pub(crate) fn matches(&self, message_type: &str) -> bool {
        self.pattern.matches(message_type)
    }
}

/// Ordered collection of subscriptions for one channel. Insertion order is
/// dispatch order.
#[derive(Default)]
pub(crate) struct SubscriptionRegistry {
    subscriptions: RefCell<Vec<Subscription>>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, pattern: Pattern, handler: Handler) -> Subscription {
        let subscription = Subscription {
            pattern: Rc::new(pattern),
            handler,
        };
        self.subscriptions.borrow_mut().push(subscription.clone());
        subscription
    }

    /// Remove every subscription matching by pattern-source equality and
    /// handler identity. Removing a non-existent subscription is a no-op.
    pub(crate) fn remove(&self, source: &str, handler: &Handler) {
        self.subscriptions
            .borrow_mut()
            .retain(|s| !(s.pattern.source() == source && Rc::ptr_eq(&s.handler, handler)));
    }

    /// Snapshot of the subscriptions matching a routing key, in insertion
    /// order. Taken before any handler runs, so registry mutation from
    /// inside a handler never corrupts the pass and additions made during
    /// dispatch are not visited until the next publish.
    fn matching(&self, message_type: &str) -> Vec<Subscription> {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|s| s.matches(message_type))
            .cloned()
            .collect()
    }

    pub(crate) fn dispatch(
        &self,
        def: &MessageDef,
        ctor: Option<&Constructor>,
        reply: &ReplyChannel,
    ) {
        for subscription in self.matching(def.message_type()) {
            invoke(&subscription.handler, def, ctor, reply);
        }
    }
}

/// Invoke one handler with a fresh instance, isolating any failure.
pub(crate) fn invoke(
    handler: &Handler,
    def: &MessageDef,
    ctor: Option<&Constructor>,
    reply: &ReplyChannel,
) {
    let mut message = def.instantiate();
    if let Some(ctor) = ctor {
        ctor(&mut message);
    }
    if let Err(error) = handler(message, reply) {
        let detail = error.to_string();
        reply.publish_with(&unexpected_exception(), move |message| {
            message.set("exception", detail.clone());
        });
    }
}
