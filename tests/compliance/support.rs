//! Shared fixtures for the compliance suite

use std::sync::Arc;

use parking_lot::Mutex;
use thenable::{harness, Deferred, EventLoop, EventLoopConfig, Function, Object, Value};

pub fn event_loop() -> EventLoop {
    thenable::util::logger::init_with_level(thenable::util::logger::LogLevel::Warn);
    EventLoop::with_config(EventLoopConfig {
        max_turns: Some(10_000),
        trace_turns: false,
    })
}

/// Fulfilled through the raw capability, like an external test adapter would.
pub fn resolved(
    lp: &EventLoop,
    value: impl Into<Value>,
) -> Deferred {
    let h = harness(lp);
    h.resolve.resolve(value);
    h.deferred
}

pub fn rejected(
    lp: &EventLoop,
    reason: impl Into<Value>,
) -> Deferred {
    let h = harness(lp);
    h.reject.reject(reason);
    h.deferred
}

/// Run `job` after `turns` further turns of the loop.
pub fn after_turns<F>(
    lp: &EventLoop,
    turns: usize,
    job: F,
) where
    F: FnOnce() + Send + 'static,
{
    if turns == 0 {
        lp.schedule("delayed", job);
        return;
    }
    let next = lp.clone();
    lp.schedule("delay", move || after_turns(&next, turns - 1, job));
}

/// Ordered log shared between handlers and assertions.
#[derive(Clone, Default)]
pub struct Recorder {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn record(
        &self,
        entry: impl Into<String>,
    ) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Handler recording `label:value` and returning `Undefined`.
    pub fn handler(
        &self,
        label: &'static str,
    ) -> Value {
        let recorder = self.clone();
        Function::unary(move |v| {
            recorder.record(format!("{}:{}", label, v));
            Ok(Value::Undefined)
        })
        .into()
    }
}

/// Object thenable whose `then` runs `body(adopt, fail)`.
pub fn thenable<F>(body: F) -> Value
where
    F: Fn(Value, Value) -> Result<(), Value> + Send + Sync + 'static,
{
    let then = Function::new(move |_this, args| {
        let adopt = args.first().cloned().unwrap_or_default();
        let fail = args.get(1).cloned().unwrap_or_default();
        body(adopt, fail)?;
        Ok(Value::Undefined)
    });
    Object::new().with("then", then).into()
}

/// Call a callback value with one argument, ignoring the result.
pub fn invoke(
    callback: &Value,
    argument: impl Into<Value>,
) {
    let _ = callback.call(&Value::Undefined, &[argument.into()]);
}
