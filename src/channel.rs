//! The root-level dispatcher.

use std::rc::Rc;

use crate::error::BusError;
use crate::logging;
use crate::message::{Message, MessageDef};
use crate::pattern::IntoPattern;
use crate::reply::ReplyChannel;
use crate::subscription::{Constructor, Handler, SubscriptionRegistry};

/// Root publish/subscribe channel: owns one subscription registry and is the
/// terminus of every reply channel's bubbling chain.
///
/// `Channel` is a cheap-clone handle over shared interior state, so the
/// handle held by a reply channel and the handle held by the caller address
/// the same registry. Dispatch is synchronous and re-entrant: a handler may
/// publish or subscribe on the same channel from inside its own invocation.
///
/// ## Example
///
/// ```
/// use message_bus_rust::{define, handler, Channel};
///
/// let order_placed = define("OrderPlaced");
/// let channel = Channel::new();
///
/// channel
///     .on(&order_placed, handler(|message, _reply| {
///         assert!(message.is(&define("OrderPlaced")));
///         Ok(())
///     }))
///     .unwrap();
///
/// channel.publish(&order_placed);
/// ```
#[derive(Clone, Default)]
pub struct Channel {
    inner: Rc<ChannelInner>,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").finish_non_exhaustive()
    }
}

#[derive(Default)]
struct ChannelInner {
    registry: SubscriptionRegistry,
}

impl Channel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription. The subject is either a message definition
    /// (exact match) or a raw regex source string. Returns `self` for
    /// chaining; fails only if the subject cannot be resolved to a pattern.
    pub fn on(&self, subject: impl IntoPattern, handler: Handler) -> Result<&Self, BusError> {
        self.inner.registry.add(subject.into_pattern()?, handler);
        Ok(self)
    }

    /// Unregister a subscription by `(pattern, handler)` identity. Removing
    /// a subscription that was never added is a no-op.
    pub fn off(&self, subject: impl IntoPattern, handler: &Handler) -> Result<&Self, BusError> {
        let pattern = subject.into_pattern()?;
        self.inner.registry.remove(pattern.source(), handler);
        Ok(self)
    }

    /// Publish a message and return the reply channel scoped to this call.
    ///
    /// Every matching handler is invoked synchronously, in subscription
    /// order, with its own fresh instance and with the one shared reply
    /// channel. Subscribe on the returned channel to observe whatever the
    /// handlers publish in response.
    pub fn publish(&self, def: &MessageDef) -> ReplyChannel {
        self.publish_opt(def, None)
    }

    /// Like [`Channel::publish`], applying `ctor` to each handler's fresh
    /// instance before delivery.
    pub fn publish_with<F>(&self, def: &MessageDef, ctor: F) -> ReplyChannel
    where
        F: Fn(&mut Message) + 'static,
    {
        self.publish_opt(def, Some(Rc::new(ctor)))
    }

    fn publish_opt(&self, def: &MessageDef, ctor: Option<Constructor>) -> ReplyChannel {
        logging::log_line(&format!("message bus: publishing {}", def.message_type()));
        let reply = ReplyChannel::rooted_at(self.clone());
        self.inner.registry.dispatch(def, ctor.as_ref(), &reply);
        reply
    }

    /// Deliver a publish that bubbled up from a descendant reply channel.
    /// The root keeps no replay queue; it only dispatches.
    pub(crate) fn deliver(
        &self,
        def: &MessageDef,
        ctor: Option<&Constructor>,
        reply: &ReplyChannel,
    ) {
        self.inner.registry.dispatch(def, ctor, reply);
    }
}
