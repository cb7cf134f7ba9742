//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use gcpad_drivers::StateQueue;

use crate::config::QUEUE_DEPTH;

/// Decoded controller states, newest last
///
/// Filled by the poller task. When the report task falls behind the oldest
/// state is dropped.
pub static STATE_QUEUE: StateQueue<CriticalSectionRawMutex, QUEUE_DEPTH> = StateQueue::new();

