use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

// Pool of routing keys so repeated `define` calls for the same name share one
// allocation and definitions clone cheaply into replay queues.
static TYPE_INTERN: Lazy<Mutex<HashMap<String, Arc<str>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

pub(crate) fn intern(name: &str) -> Arc<str> {
    let mut pool = TYPE_INTERN.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(existing) = pool.get(name) {
        return Arc::clone(existing);
    }
    let arc: Arc<str> = Arc::from(name);
    pool.insert(name.to_string(), Arc::clone(&arc));
    arc
}
