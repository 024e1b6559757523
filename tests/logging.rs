use std::sync::{Arc, Mutex};

use message_bus_rust::{define, handler, set_logger, Channel, NullLogger};

#[test]
fn one_diagnostic_line_per_publish_call() {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    set_logger(move |line: &str| sink.lock().unwrap().push(line.to_string()));

    let channel = Channel::new();
    channel
        .on(&define("LoggedMessage"), handler(|_message, _reply| Ok(())))
        .unwrap();

    let reply = channel.publish(&define("LoggedMessage"));
    reply.publish(&define("LoggedReply"));

    set_logger(NullLogger);

    let lines = lines.lock().unwrap();
    let count = |expected: &str| lines.iter().filter(|l| l.as_str() == expected).count();

    // One line per publish call, even though the reply publish also bubbled
    // into the root channel.
    assert_eq!(count("message bus: publishing LoggedMessage"), 1);
    assert_eq!(count("message bus: publishing LoggedReply"), 1);
}
