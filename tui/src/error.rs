//! Engine errors and the process-wide error reporter.
//!
//! Per the error-handling policy the engine never propagates internal
//! failures to the mutator: they are normalized, clamped or retried, and the
//! fact is surfaced through the reporter hook (default: `log::error!`).

use std::cell::RefCell;

use thiserror::Error;

/// Errors the engine swallows and reports instead of propagating.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("stdout write failed: {0}")]
    RenderWrite(std::io::Error),

    #[error("destroy callback panicked for component {index}")]
    CleanupPanicked { index: usize },

    #[error("async branch rejected without a catch handler: {message}")]
    UnhandledRejection { message: String },

    #[error("{api} called outside a component; ignored")]
    LifecycleOutOfContext { api: &'static str },
}

type Reporter = Box<dyn Fn(&EngineError)>;

thread_local! {
    static REPORTER: RefCell<Option<Reporter>> = const { RefCell::new(None) };
}

/// Install a process-wide reporter receiving every swallowed engine error.
pub fn set_reporter(reporter: impl Fn(&EngineError) + 'static) {
    REPORTER.with(|r| {
        *r.borrow_mut() = Some(Box::new(reporter));
    });
}

/// Route an error to the installed reporter, or `log::error!` by default.
pub fn report(error: &EngineError) {
    let handled = REPORTER.with(|r| {
        if let Some(reporter) = r.borrow().as_ref() {
            reporter(error);
            true
        } else {
            false
        }
    });
    if !handled {
        log::error!("{error}");
    }
}

/// Remove the installed reporter (for test isolation).
pub fn reset_reporter() {
    REPORTER.with(|r| r.borrow_mut().take());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn reporter_receives_errors() {
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        set_reporter(move |_| s.set(s.get() + 1));

        report(&EngineError::CleanupPanicked { index: 3 });
        report(&EngineError::LifecycleOutOfContext { api: "on_mount" });
        assert_eq!(seen.get(), 2);

        reset_reporter();
    }
}
