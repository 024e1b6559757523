//! Injectable logging capability.
//!
//! The engine emits one diagnostic line per `publish` call through whatever
//! sink is configured here. The default sink discards everything, so leaving
//! logging unconfigured never affects dispatch.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

/// A logging sink: anything that can accept one line of text.
pub trait Logger {
    fn log(&self, message: &str);
}

/// The default sink. Discards every line.
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _message: &str) {}
}

// Any plain closure over a line of text works as a sink.
impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

static LOGGER: Lazy<RwLock<Arc<dyn Logger + Send + Sync>>> =
    Lazy::new(|| RwLock::new(Arc::new(NullLogger)));

/// Replace the process-wide logging sink.
pub fn set_logger(logger: impl Logger + Send + Sync + 'static) {
    let mut slot = LOGGER.write().unwrap_or_else(|e| e.into_inner());
    *slot = Arc::new(logger);
}

pub(crate) fn log_line(message: &str) {
    // Clone the sink out of the slot so it is not invoked under the lock.
    let sink = {
        let slot = LOGGER.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&slot)
    };
    sink.log(message);
}
