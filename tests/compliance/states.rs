//! Deferred value states

use thenable::{harness, DeferredState, Value};

use crate::support::{after_turns, event_loop, Recorder};

#[test]
fn pending_may_transition_to_fulfilled() {
    let lp = event_loop();
    let h = harness(&lp);
    assert!(h.deferred.is_pending());
    h.resolve.resolve(1);
    assert_eq!(h.deferred.state(), DeferredState::Fulfilled(Value::Int(1)));
}

#[test]
fn fulfilled_cannot_transition() {
    let lp = event_loop();
    let recorder = Recorder::default();
    let h = harness(&lp);
    h.deferred.then(recorder.handler("fulfilled"), recorder.handler("rejected"));

    h.resolve.resolve("dummy");
    h.reject.reject("other");
    h.resolve.resolve("again");
    lp.run().unwrap();

    assert_eq!(recorder.entries(), vec!["fulfilled:dummy"]);
    assert_eq!(h.deferred.state(), DeferredState::Fulfilled(Value::from("dummy")));
}

#[test]
fn rejected_cannot_transition_even_when_settled_later() {
    let lp = event_loop();
    let recorder = Recorder::default();
    let h = harness(&lp);
    h.deferred.then(recorder.handler("fulfilled"), recorder.handler("rejected"));

    let (resolve, reject) = (h.resolve.clone(), h.reject.clone());
    after_turns(&lp, 2, move || {
        reject.reject("first");
        resolve.resolve("second");
    });
    lp.run().unwrap();

    assert_eq!(recorder.entries(), vec!["rejected:first"]);
}

#[test]
fn setup_fault_becomes_rejection() {
    let lp = event_loop();
    let d = lp.create(|_resolve, _reject| Err(Value::from("broken setup")));
    let recorder = Recorder::default();
    d.then(Value::Undefined, recorder.handler("rejected"));
    lp.run().unwrap();
    assert_eq!(recorder.entries(), vec!["rejected:broken setup"]);
}
