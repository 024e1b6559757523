//! Message definitions and instances.
//!
//! A [`MessageDef`] is a named factory: the name is the routing key used for
//! all subscription matching, and [`MessageDef::instantiate`] produces a
//! fresh, independent instance per call. Instances are plain value objects
//! whose payload is a set of JSON fields fixed at definition time.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::intern::intern;

/// Routing key of the message emitted by the dispatch machinery when a
/// handler fails. Carries a single `exception` field.
pub const UNEXPECTED_EXCEPTION_TYPE: &str = "UnexpectedExceptionMessage";

/// Define a message type with no payload fields.
///
/// Routing keys are interned process-wide, so two `define("Foo")` calls
/// produce interchangeable definitions backed by the same allocation.
pub fn define(name: &str) -> MessageDef {
    MessageDef::new(name)
}

/// The well-known definition for handler failures. Subscribe to it like any
/// other type to observe exceptions raised inside sibling handlers.
pub fn unexpected_exception() -> MessageDef {
    MessageDef::with_fields(UNEXPECTED_EXCEPTION_TYPE, &["exception"])
}

/// A named message factory. The name never changes after creation.
#[derive(Debug, Clone)]
pub struct MessageDef {
    message_type: Arc<str>,
    fields: Arc<[String]>,
}

impl MessageDef {
    pub fn new(name: &str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Define a message type with a fixed payload schema. Instances start
    /// with every declared field present and set to `Value::Null`.
    pub fn with_fields(name: &str, fields: &[&str]) -> Self {
        Self {
            message_type: intern(name),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// The routing key.
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Produce a fresh, independent instance. Two calls never share payload
    /// storage, so mutation of one instance is invisible through the other.
    pub fn instantiate(&self) -> Message {
        let mut fields = Map::new();
        for field in self.fields.iter() {
            fields.insert(field.clone(), Value::Null);
        }
        Message {
            message_type: self.message_type.to_string(),
            fields,
        }
    }
}

impl PartialEq for MessageDef {
    fn eq(&self, other: &Self) -> bool {
        self.message_type == other.message_type
    }
}

impl Eq for MessageDef {}

/// An ephemeral message instance: a routing key plus mutable payload fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    message_type: String,
    fields: Map<String, Value>,
}

impl Message {
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Structural type check: does this instance carry the definition's
    /// routing key?
    pub fn is(&self, def: &MessageDef) -> bool {
        self.message_type == def.message_type()
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}
