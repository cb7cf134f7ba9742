//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod poller;
pub mod report;

pub use poller::poller_task;
pub use report::report_task;
