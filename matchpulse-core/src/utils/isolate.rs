//! Failure isolation for user-supplied callbacks.
//!
//! Handlers, listeners and detectors run inside the pipeline's own control
//! flow. A failing one is logged and skipped; it must never abort the
//! caller or starve the callbacks registered after it.

use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{error, warn};

/// Run `f`, logging and swallowing both returned errors and panics.
///
/// Returns `Some(value)` when `f` completed successfully.
pub fn run_isolated<T>(
    component: &'static str,
    label: &str,
    f: impl FnOnce() -> anyhow::Result<T>,
) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!(component, callback = label, error = %e, "Callback returned an error");
            None
        }
        Err(payload) => {
            error!(
                component,
                callback = label,
                panic = panic_message(payload.as_ref()),
                "Callback panicked"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
