//! Completion guard for an in-flight metric.

use super::recorder::Recorder;
use crate::models::{Completion, MetricId};

pub(crate) const CANCELLED_MESSAGE: &str = "operation cancelled";
pub(crate) const PANICKED_MESSAGE: &str = "operation panicked";

/// Guard returned by `Recorder::start_timer`.
///
/// `finish` ends the metric with the given outcome. A timer dropped without
/// finishing (the owning future was cancelled, or the work panicked) ends the
/// metric as an error, so every started metric reaches a terminal state.
#[must_use = "dropping a MetricTimer immediately records the metric as cancelled"]
pub struct MetricTimer {
    recorder: Recorder,
    id: MetricId,
    finished: bool,
}

impl MetricTimer {
    pub(crate) fn new(recorder: Recorder, id: MetricId) -> Self {
        MetricTimer {
            recorder,
            id,
            finished: false,
        }
    }

    /// Empty when the recorder was disabled at start.
    pub fn id(&self) -> &MetricId {
        &self.id
    }

    pub fn finish(mut self, completion: Completion) {
        self.finished = true;
        self.recorder.end_metric(&self.id, completion);
    }

    pub fn succeed(self) {
        self.finish(Completion::success());
    }

    pub fn fail(self, message: impl Into<String>) {
        self.finish(Completion::error(message));
    }
}

impl Drop for MetricTimer {
    fn drop(&mut self) {
        if self.finished || self.id.is_empty() {
            return;
        }

        if std::thread::panicking() {
            // Listeners are skipped while unwinding; a second panic would abort.
            self.recorder
                .complete(&self.id, Completion::error(PANICKED_MESSAGE), false);
        } else {
            self.recorder
                .complete(&self.id, Completion::error(CANCELLED_MESSAGE), true);
        }
    }
}
