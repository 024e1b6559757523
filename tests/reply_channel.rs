use std::cell::{Cell, RefCell};
use std::rc::Rc;

use message_bus_rust::{define, handler, unexpected_exception, Channel, Handler};

fn type_recorder(log: &Rc<RefCell<Vec<String>>>) -> Handler {
    let log = Rc::clone(log);
    handler(move |message, _reply| {
        log.borrow_mut().push(message.message_type().to_string());
        Ok(())
    })
}

#[test]
fn late_subscriber_replays_history_in_order() {
    let reply = Channel::new().publish(&define("Start"));
    reply.publish(&define("FirstReply"));
    reply.publish(&define("SecondReply"));

    let seen = Rc::new(RefCell::new(Vec::new()));
    reply.on("Reply$", type_recorder(&seen)).unwrap();

    assert_eq!(*seen.borrow(), vec!["FirstReply", "SecondReply"]);
}

#[test]
fn replay_applies_the_constructor_to_fresh_instances() {
    let reply = Channel::new().publish(&define("Start"));
    reply.publish_with(&define("Seeded"), |message| message.set("data", "payload"));

    let observed = Rc::new(RefCell::new(Vec::new()));
    for _ in 0..2 {
        let observed = Rc::clone(&observed);
        reply
            .on(&define("Seeded"), handler(move |mut message, _reply| {
                observed
                    .borrow_mut()
                    .push(message.get_str("data").unwrap().to_string());
                message.set("data", "clobbered");
                Ok(())
            }))
            .unwrap();
    }

    // Both late subscribers got their own instance with the constructor
    // applied; the first one's mutation leaked nowhere.
    assert_eq!(*observed.borrow(), vec!["payload", "payload"]);
}

#[test]
fn one_reply_scope_is_shared_across_nested_publishes() {
    let channel = Channel::new();
    let fired = Rc::new(Cell::new(false));

    let flag = Rc::clone(&fired);
    channel
        .on(&define("TestMessage"), handler(move |_message, reply| {
            let flag = Rc::clone(&flag);
            reply
                .on(&define("TestMessage2"), handler(move |_message, reply2| {
                    let flag = Rc::clone(&flag);
                    reply2
                        .on(&define("TestMessage3"), handler(move |_message, _reply| {
                            flag.set(true);
                            Ok(())
                        }))
                        .unwrap();
                    Ok(())
                }))
                .unwrap();
            Ok(())
        }))
        .unwrap();

    let reply = channel.publish(&define("TestMessage"));
    reply.publish(&define("TestMessage2"));
    reply.publish(&define("TestMessage3"));

    assert!(fired.get());
}

#[test]
fn sibling_handler_subscription_sees_later_sibling_publish() {
    let channel = Channel::new();
    let test_message = define("TestMessage");
    let fired = Rc::new(Cell::new(false));

    // First handler subscribes on the shared reply scope.
    let flag = Rc::clone(&fired);
    channel
        .on(&test_message, handler(move |_message, reply| {
            let flag = Rc::clone(&flag);
            reply
                .on(&define("SiblingNews"), handler(move |_message, _reply| {
                    flag.set(true);
                    Ok(())
                }))
                .unwrap();
            Ok(())
        }))
        .unwrap();

    // Second handler publishes on the same scope.
    channel
        .on(&test_message, handler(|_message, reply| {
            reply.publish(&define("SiblingNews"));
            Ok(())
        }))
        .unwrap();

    channel.publish(&test_message);
    assert!(fired.get());
}

#[test]
fn sibling_handler_subscription_replays_earlier_sibling_publish() {
    let channel = Channel::new();
    let test_message = define("TestMessage");
    let fired = Rc::new(Cell::new(false));

    // First handler publishes before the second handler subscribes; the
    // shared scope's replay queue closes the gap.
    channel
        .on(&test_message, handler(|_message, reply| {
            reply.publish(&define("SiblingNews"));
            Ok(())
        }))
        .unwrap();

    let flag = Rc::clone(&fired);
    channel
        .on(&test_message, handler(move |_message, reply| {
            let flag = Rc::clone(&flag);
            reply
                .on(&define("SiblingNews"), handler(move |_message, _reply| {
                    flag.set(true);
                    Ok(())
                }))
                .unwrap();
            Ok(())
        }))
        .unwrap();

    channel.publish(&test_message);
    assert!(fired.get());
}

#[test]
fn bubbled_messages_enter_every_ancestor_replay_queue() {
    let channel = Channel::new();
    let reply = channel.publish(&define("Start"));
    reply.publish(&define("FirstLevel"));
    let nested = reply.publish(&define("SecondLevelSpawner"));
    nested.publish(&define("SecondLevel"));

    // The parent saw its own publishes plus everything bubbled from below.
    let parent_history = Rc::new(RefCell::new(Vec::new()));
    reply.on("Level", type_recorder(&parent_history)).unwrap();
    assert_eq!(
        *parent_history.borrow(),
        vec!["FirstLevel", "SecondLevelSpawner", "SecondLevel"]
    );

    // The child's history is only its own; nothing from ancestors.
    let child_history = Rc::new(RefCell::new(Vec::new()));
    nested.on("Level", type_recorder(&child_history)).unwrap();
    assert_eq!(*child_history.borrow(), vec!["SecondLevel"]);
}

#[test]
fn the_root_channel_keeps_no_history() {
    let channel = Channel::new();
    let reply = channel.publish(&define("Start"));
    reply.publish(&define("AlreadyGone"));

    let seen = Rc::new(RefCell::new(Vec::new()));
    channel.on(&define("AlreadyGone"), type_recorder(&seen)).unwrap();

    assert!(seen.borrow().is_empty());
}

#[test]
fn each_publish_call_gets_an_isolated_scope() {
    let channel = Channel::new();
    let test_message = define("TestMessage");

    let first = channel.publish(&test_message);
    let second = channel.publish(&test_message);
    first.publish(&define("OnlyOnFirst"));

    let seen = Rc::new(RefCell::new(Vec::new()));
    second.on(".", type_recorder(&seen)).unwrap();

    assert!(seen.borrow().is_empty());
}

#[test]
fn failure_during_replay_is_reported_on_the_same_scope() {
    let reply = Channel::new().publish(&define("Start"));
    reply.publish(&define("Poisoned"));

    reply
        .on(&define("Poisoned"), handler(|_message, _reply| {
            Err("replay failure".into())
        }))
        .unwrap();

    let exceptions = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&exceptions);
    reply
        .on(&unexpected_exception(), handler(move |message, _reply| {
            log.borrow_mut()
                .push(message.get_str("exception").unwrap().to_string());
            Ok(())
        }))
        .unwrap();

    assert_eq!(*exceptions.borrow(), vec!["replay failure"]);
}

#[test]
fn failure_on_a_reply_scope_bubbles_to_the_root() {
    let channel = Channel::new();
    let exceptions = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&exceptions);
    channel
        .on(&unexpected_exception(), handler(move |message, _reply| {
            log.borrow_mut()
                .push(message.get_str("exception").unwrap().to_string());
            Ok(())
        }))
        .unwrap();

    let reply = channel.publish(&define("Start"));
    reply
        .on(&define("Doomed"), handler(|_message, _reply| {
            Err("scoped failure".into())
        }))
        .unwrap();
    reply.publish(&define("Doomed"));

    assert_eq!(*exceptions.borrow(), vec!["scoped failure"]);
}

#[test]
fn nested_scope_bubbles_through_the_whole_chain() {
    let channel = Channel::new();
    let at_root = Rc::new(RefCell::new(Vec::new()));
    channel.on(&define("DeepNews"), type_recorder(&at_root)).unwrap();

    let reply = channel.publish(&define("Start"));
    let nested = reply.publish(&define("Intermediate"));
    let deepest = nested.publish(&define("Deeper"));
    deepest.publish(&define("DeepNews"));

    assert_eq!(*at_root.borrow(), vec!["DeepNews"]);
}
