use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The supplied subscription subject could not be resolved to a pattern.
    InvalidMessageType(String),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::InvalidMessageType(detail) => {
                write!(f, "invalid message type: {}", detail)
            }
        }
    }
}

impl std::error::Error for BusError {}
