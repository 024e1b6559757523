//! In-process publish/subscribe engine.
//!
//! Producers publish typed, named messages; consumers subscribe by exact
//! definition or by raw regex pattern over routing keys. Every `publish`
//! returns a [`ReplyChannel`] scoped to that call: handlers publish
//! follow-up messages on it, late subscribers get its history replayed, and
//! everything published on it bubbles up to the originating [`Channel`].
//!
//! Dispatch is synchronous, single-threaded, and re-entrant. A failing
//! handler never aborts delivery to its siblings; its error is re-published
//! as an `UnexpectedExceptionMessage` on the reply channel it was handed.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use message_bus_rust::{define, handler, Channel};
//!
//! let greeting = define("Greeting");
//! let greeted = define("Greeted");
//! let channel = Channel::new();
//!
//! channel
//!     .on(&greeting, handler(|_message, reply| {
//!         reply.publish(&define("Greeted"));
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! // Subscribing after the fact still sees the reply: history is replayed.
//! let replied = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&replied);
//! channel
//!     .publish(&greeting)
//!     .on(&greeted, handler(move |_message, _reply| {
//!         flag.set(true);
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! assert!(replied.get());
//! ```

mod channel;
mod error;
mod intern;
mod logging;
mod message;
mod pattern;
mod reply;
mod subscription;

pub use channel::Channel;
pub use error::BusError;
pub use logging::{set_logger, Logger, NullLogger};
pub use message::{
    define, unexpected_exception, Message, MessageDef, UNEXPECTED_EXCEPTION_TYPE,
};
pub use pattern::{to_pattern, IntoPattern, Pattern};
pub use reply::ReplyChannel;
pub use subscription::{handler, Handler, HandlerError, HandlerResult};
