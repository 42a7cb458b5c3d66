//! Wall-clock time limit
//!
//! The engine polls an interrupt handler while it runs. The handler is
//! installed once per runtime; each evaluation arms a deadline and the
//! handler trips once it has passed.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub(crate) struct Deadline {
    budget: Cell<Option<Duration>>,
    expires: Cell<Option<Instant>>,
    tripped: Cell<bool>,
}

impl Deadline {
    pub(crate) fn new(budget: Option<Duration>) -> Self {
        let deadline = Self::default();
        deadline.budget.set(budget);
        deadline
    }

    pub(crate) fn set_budget(&self, budget: Option<Duration>) {
        self.budget.set(budget);
    }

    pub(crate) fn budget(&self) -> Option<Duration> {
        self.budget.get()
    }

    /// Starts the clock for one evaluation. Disarmed when the guard drops.
    pub(crate) fn arm(&self) -> Armed<'_> {
        self.tripped.set(false);
        self.expires
            .set(self.budget.get().map(|budget| Instant::now() + budget));
        Armed { deadline: self }
    }

    fn poll(&self) -> bool {
        match self.expires.get() {
            Some(expires) if Instant::now() >= expires => {
                self.tripped.set(true);
                true
            }
            _ => false,
        }
    }

    /// Whether the last interrupt came from this deadline; clears the flag.
    pub(crate) fn take_tripped(&self) -> bool {
        self.tripped.replace(false)
    }
}

pub(crate) struct Armed<'a> {
    deadline: &'a Deadline,
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        self.deadline.expires.set(None);
    }
}

/// Handler installed into the engine runtime.
pub(crate) fn interrupt_handler(deadline: Rc<Deadline>) -> Box<dyn FnMut() -> bool> {
    Box::new(move || deadline.poll())
}
