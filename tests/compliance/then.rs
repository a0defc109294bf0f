//! The `then` method

use std::sync::Arc;

use parking_lot::Mutex;
use thenable::{harness, Deferred, DeferredState, Function, Object, Value};

use crate::support::{after_turns, event_loop, rejected, resolved, Recorder};

#[test]
fn non_function_handlers_pass_through() {
    let lp = event_loop();
    let junk = [
        Value::Undefined,
        Value::Null,
        Value::Bool(false),
        Value::Int(5),
        Object::new().into(),
        Value::List(vec![Value::Int(1)]),
    ];
    let mut children = Vec::new();
    for handler in junk {
        children.push((
            resolved(&lp, "v").then(handler.clone(), Value::Undefined),
            rejected(&lp, "r").then(Value::Undefined, handler),
        ));
    }
    lp.run().unwrap();
    for (fulfilled, rejected) in children {
        assert_eq!(fulfilled.state(), DeferredState::Fulfilled(Value::from("v")));
        assert_eq!(rejected.state(), DeferredState::Rejected(Value::from("r")));
    }
}

#[test]
fn on_fulfilled_called_with_value_once() {
    let lp = event_loop();
    let recorder = Recorder::default();
    let h = harness(&lp);
    h.deferred.then(recorder.handler("ok"), Value::Undefined);

    let (resolve, resolve_again) = (h.resolve.clone(), h.resolve.clone());
    after_turns(&lp, 1, move || {
        resolve.resolve("sentinel");
    });
    after_turns(&lp, 3, move || {
        resolve_again.resolve("other");
    });
    lp.run().unwrap();
    assert_eq!(recorder.entries(), vec!["ok:sentinel"]);
}

#[test]
fn on_rejected_not_called_before_rejection() {
    let lp = event_loop();
    let recorder = Recorder::default();
    let h = harness(&lp);
    h.deferred.then(Value::Undefined, recorder.handler("rejected"));

    let marker = recorder.clone();
    let reject = h.reject.clone();
    after_turns(&lp, 2, move || {
        marker.record("rejecting");
        reject.reject("late");
    });
    lp.run().unwrap();
    assert_eq!(recorder.entries(), vec!["rejecting", "rejected:late"]);
}

#[test]
fn handlers_run_after_then_returns_for_settled_and_pending() {
    let lp = event_loop();
    let recorder = Recorder::default();

    let settled = resolved(&lp, "early");
    settled.then(recorder.handler("settled"), Value::Undefined);
    recorder.record("then returned (settled)");

    let h = harness(&lp);
    h.deferred.then(recorder.handler("pending"), Value::Undefined);
    recorder.record("then returned (pending)");
    h.resolve.resolve("late");
    recorder.record("resolve returned");

    assert_eq!(
        recorder.entries(),
        vec!["then returned (settled)", "then returned (pending)", "resolve returned"]
    );
    lp.run().unwrap();
    assert_eq!(
        recorder.entries(),
        vec![
            "then returned (settled)",
            "then returned (pending)",
            "resolve returned",
            "settled:early",
            "pending:late",
        ]
    );
}

#[test]
fn handler_attached_inside_handler_runs_later() {
    let lp = event_loop();
    let recorder = Recorder::default();
    let d = resolved(&lp, 1);

    let inner = d.clone();
    let outer_recorder = recorder.clone();
    d.then(
        Function::unary(move |_| {
            outer_recorder.record("outer");
            inner.then(outer_recorder.handler("inner"), Value::Undefined);
            outer_recorder.record("outer done");
            Ok(Value::Undefined)
        }),
        Value::Undefined,
    );
    d.then(recorder.handler("sibling"), Value::Undefined);
    lp.run().unwrap();

    assert_eq!(
        recorder.entries(),
        vec!["outer", "outer done", "sibling:1", "inner:1"]
    );
}

#[test]
fn multiple_handlers_run_in_order_for_fulfilled_and_rejected() {
    let lp = event_loop();
    let recorder = Recorder::default();
    let ok = harness(&lp);
    let err = harness(&lp);
    for label in ["a", "b", "c"] {
        ok.deferred.then(recorder.handler(label), Value::Undefined);
    }
    for label in ["x", "y"] {
        err.deferred.then(Value::Undefined, recorder.handler(label));
    }
    ok.resolve.resolve(1);
    err.reject.reject(2);
    lp.run().unwrap();
    assert_eq!(recorder.entries(), vec!["a:1", "b:1", "c:1", "x:2", "y:2"]);
}

#[test]
fn handler_throwing_rejects_child_independently() {
    let lp = event_loop();
    let d = resolved(&lp, "v");
    let throwing = d.then(Function::unary(|_| Err(Value::from("e1"))), Value::Undefined);
    let fine = d.then(Function::unary(|v| Ok(v)), Value::Undefined);
    lp.run().unwrap();
    assert_eq!(throwing.state(), DeferredState::Rejected(Value::from("e1")));
    assert_eq!(fine.state(), DeferredState::Fulfilled(Value::from("v")));
}

#[test]
fn chained_rejection_recovers() {
    let lp = event_loop();
    let d = lp.create(|_resolve, reject| {
        reject.reject("boom");
        Ok(())
    });
    let recovered = d.then(
        Value::Undefined,
        Function::unary(|r| Ok(format!("{}!", r).into())),
    );
    lp.run().unwrap();
    assert_eq!(recovered.state(), DeferredState::Fulfilled(Value::from("boom!")));
}

#[test]
fn then_is_reachable_as_a_property() {
    let lp = event_loop();
    let d = resolved(&lp, 4);
    let recorder = Recorder::default();
    let then = Value::from(d.clone()).get("then").unwrap();
    let child = then
        .call(&Value::Undefined, &[recorder.handler("via property"), Value::Undefined])
        .unwrap();
    assert!(child.as_deferred().is_some_and(Deferred::is_pending));
    lp.run().unwrap();
    assert_eq!(recorder.entries(), vec!["via property:4"]);
}

#[test]
fn handlers_share_the_value_instance() {
    let lp = event_loop();
    let value = Object::new();
    let d = resolved(&lp, value.clone());
    let seen = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..2 {
        let seen = seen.clone();
        d.then(
            Function::unary(move |v| {
                seen.lock().push(v);
                Ok(Value::Undefined)
            }),
            Value::Undefined,
        );
    }
    lp.run().unwrap();
    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|v| v.same_value(&Value::from(value.clone()))));
}
