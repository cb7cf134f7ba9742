//! Controller drivers for the gcpad adapter
//!
//! - [`joybus`] - Bit-banged Joybus transceiver for GameCube controllers
//! - [`poller`] - Periodic poll task and the state queue it feeds

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod joybus;
pub mod poller;

pub use joybus::{poll, Joybus, PollError, POLL_COMMAND};
pub use poller::{run, PollStats, Poller, StateQueue, StateSink, Transceiver};
