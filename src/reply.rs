//! Reply channels: per-publish dispatch scopes with replay and bubbling.
//!
//! Every `publish` call allocates one reply channel, shared by all handlers
//! invoked for that call. Handlers publish follow-up messages on it; those
//! follow-ups fan out to the reply channel's own subscribers, are recorded
//! in its replay queue for late subscribers, and bubble up through every
//! ancestor channel to the root.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::channel::Channel;
use crate::error::BusError;
use crate::logging;
use crate::message::{Message, MessageDef};
use crate::pattern::IntoPattern;
use crate::subscription::{invoke, Constructor, Handler, SubscriptionRegistry};

/// A dispatch scope created for one publish call.
///
/// Mirrors [`Channel`]'s contract with two additions: `on` synchronously
/// replays this channel's history to the new subscriber, and `publish`
/// bubbles the delivery into the enclosing channel chain.
#[derive(Clone)]
pub struct ReplyChannel {
    inner: Rc<ReplyInner>,
}

struct ReplyInner {
    registry: SubscriptionRegistry,
    queue: RefCell<Vec<QueuedDispatch>>,
    /// Set once at construction; the chain is a forward-only tree rooted at
    /// the originating channel.
    target: BubbleTarget,
}

enum BubbleTarget {
    Channel(Channel),
    Reply(ReplyChannel),
}

/// One recorded delivery: enough to re-run the dispatch against a late
/// subscriber exactly as it ran originally.
#[derive(Clone)]
struct QueuedDispatch {
    def: MessageDef,
    ctor: Option<Constructor>,
    /// Weak because the entry for a publish made on this very channel points
    /// back at this channel.
    reply: Weak<ReplyInner>,
}

impl ReplyChannel {
    pub(crate) fn rooted_at(channel: Channel) -> Self {
        Self::with_target(BubbleTarget::Channel(channel))
    }

    pub(crate) fn nested_in(parent: ReplyChannel) -> Self {
        Self::with_target(BubbleTarget::Reply(parent))
    }

    fn with_target(target: BubbleTarget) -> Self {
        Self {
            inner: Rc::new(ReplyInner {
                registry: SubscriptionRegistry::new(),
                queue: RefCell::new(Vec::new()),
                target,
            }),
        }
    }

    /// Register a subscription, then synchronously replay every matching
    /// delivery already recorded on this channel, in original publish order,
    /// before returning. A late subscriber observes history exactly as if it
    /// had been present from the start; it never sees messages published on
    /// ancestors.
    pub fn on(&self, subject: impl IntoPattern, handler: Handler) -> Result<&Self, BusError> {
        let subscription = self.inner.registry.add(subject.into_pattern()?, handler);

        let history: Vec<QueuedDispatch> = self.inner.queue.borrow().clone();
        for entry in history {
            if subscription.matches(entry.def.message_type()) {
                let reply = entry
                    .reply
                    .upgrade()
                    .map(|inner| ReplyChannel { inner })
                    .unwrap_or_else(|| self.clone());
                invoke(&subscription.handler, &entry.def, entry.ctor.as_ref(), &reply);
            }
        }

        Ok(self)
    }

    /// Unregister a subscription by `(pattern, handler)` identity.
    pub fn off(&self, subject: impl IntoPattern, handler: &Handler) -> Result<&Self, BusError> {
        let pattern = subject.into_pattern()?;
        self.inner.registry.remove(pattern.source(), handler);
        Ok(self)
    }

    /// Publish a follow-up message on this reply scope.
    ///
    /// Handlers subscribed here receive *this* channel as their reply
    /// argument, so every handler of the original publish keeps sharing one
    /// scope. The delivery is recorded for replay and forwarded unchanged to
    /// the bubbling target. Returns a fresh child scope for this specific
    /// call.
    pub fn publish(&self, def: &MessageDef) -> ReplyChannel {
        self.publish_opt(def, None)
    }

    /// Like [`ReplyChannel::publish`], applying `ctor` to each handler's
    /// fresh instance before delivery.
    pub fn publish_with<F>(&self, def: &MessageDef, ctor: F) -> ReplyChannel
    where
        F: Fn(&mut Message) + 'static,
    {
        self.publish_opt(def, Some(Rc::new(ctor)))
    }

    fn publish_opt(&self, def: &MessageDef, ctor: Option<Constructor>) -> ReplyChannel {
        logging::log_line(&format!("message bus: publishing {}", def.message_type()));
        let child = ReplyChannel::nested_in(self.clone());
        self.deliver(def, ctor.as_ref(), self);
        child
    }

    /// Deliver to this level and keep bubbling: dispatch to own subscribers,
    /// record for replay, forward the identical delivery to the target.
    fn deliver(&self, def: &MessageDef, ctor: Option<&Constructor>, reply: &ReplyChannel) {
        self.inner.registry.dispatch(def, ctor, reply);
        self.inner.queue.borrow_mut().push(QueuedDispatch {
            def: def.clone(),
            ctor: ctor.cloned(),
            reply: Rc::downgrade(&reply.inner),
        });
        match &self.inner.target {
            BubbleTarget::Channel(channel) => channel.deliver(def, ctor, reply),
            BubbleTarget::Reply(parent) => parent.deliver(def, ctor, reply),
        }
    }
}
