// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
#[allow(clippy::module_inception)]
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod recorder;

pub use config::*;
pub use dashboard::*;
pub use logging::*;
pub use recorder::*;
