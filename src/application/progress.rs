//! Labelled progress steps

use crate::domain::ports::{DeployEvent, DeployEventSink};
use crate::error::DeployResult;

/// Run `f` between `StepStarted` and `StepFinished`/`StepFailed` events
pub fn step<T>(
    events: &dyn DeployEventSink,
    label: &str,
    f: impl FnOnce() -> DeployResult<T>,
) -> DeployResult<T> {
    events.on_event(DeployEvent::StepStarted {
        label: label.to_string(),
    });
    match f() {
        Ok(value) => {
            events.on_event(DeployEvent::StepFinished {
                label: label.to_string(),
            });
            Ok(value)
        }
        Err(err) => {
            events.on_event(DeployEvent::StepFailed {
                label: label.to_string(),
                error: err.to_string(),
            });
            Err(err)
        }
    }
}
