//! Performance telemetry recording.
//!
//! [`Recorder`] keeps a bounded FIFO history of timed operations, notifies
//! listeners as each one completes, and derives statistics on demand.

mod listeners;
mod recorder;
mod timer;
mod track;

pub use listeners::{MetricListener, Subscription};
pub use recorder::Recorder;
pub use timer::MetricTimer;
pub use track::serialized_size;
