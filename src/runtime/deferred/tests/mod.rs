//! Deferred value unit tests


use std::sync::Arc;

use parking_lot::Mutex;

use crate::runtime::scheduler::EventLoop;
use crate::runtime::value::{Function, Value};
use crate::util::config::EventLoopConfig;

fn event_loop() -> EventLoop {
    EventLoop::with_config(EventLoopConfig::default())
}

/// Shared log of observed events.
#[derive(Clone, Default)]
struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    fn push(
        &self,
        entry: impl Into<String>,
    ) {
        self.entries.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Handler that records `label:value` and returns its argument.
    fn handler(
        &self,
        label: &'static str,
    ) -> Value {
        let journal = self.clone();
        Function::unary(move |v| {
            journal.push(format!("{}:{}", label, v));
            Ok(v)
        })
        .into()
    }
}
