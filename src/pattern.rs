//! Resolution of subscription subjects into compiled patterns.
//!
//! A raw string is used verbatim as a regex source and left unanchored, so
//! `"^Test"` matches every routing key starting with `Test`. A message
//! definition resolves to the anchored exact match `^<messageType>$`.

use regex::Regex;

use crate::error::BusError;
use crate::message::MessageDef;

/// A compiled subscription pattern. The `source` string doubles as the
/// identity used when removing a subscription.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, message_type: &str) -> bool {
        self.regex.is_match(message_type)
    }

    fn raw(source: &str) -> Result<Self, BusError> {
        let regex = Regex::new(source).map_err(|e| {
            BusError::InvalidMessageType(format!(
                "pattern {:?} is not a valid regular expression: {}",
                source, e
            ))
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    fn exact(def: &MessageDef) -> Result<Self, BusError> {
        // Escape the name so a routing key containing regex metacharacters
        // still matches only itself.
        Self::raw(&format!("^{}$", regex::escape(def.message_type())))
    }
}

/// Subjects accepted by `on`, `off`, and [`to_pattern`]: message definitions
/// (exact match) and raw regex source strings.
pub trait IntoPattern {
    fn into_pattern(self) -> Result<Pattern, BusError>;
}

impl IntoPattern for &MessageDef {
    fn into_pattern(self) -> Result<Pattern, BusError> {
        Pattern::exact(self)
    }
}

impl IntoPattern for &str {
    fn into_pattern(self) -> Result<Pattern, BusError> {
        Pattern::raw(self)
    }
}

impl IntoPattern for String {
    fn into_pattern(self) -> Result<Pattern, BusError> {
        Pattern::raw(&self)
    }
}

impl IntoPattern for &String {
    fn into_pattern(self) -> Result<Pattern, BusError> {
        Pattern::raw(self)
    }
}

impl IntoPattern for Pattern {
    fn into_pattern(self) -> Result<Pattern, BusError> {
        Ok(self)
    }
}

/// Resolve a subscription subject into a compiled pattern. Pure; the only
/// failure is a raw source that does not compile as a regex.
pub fn to_pattern(subject: impl IntoPattern) -> Result<Pattern, BusError> {
    subject.into_pattern()
}
