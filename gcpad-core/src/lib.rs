//! Board-agnostic core types for the GameCube controller poller
//!
//! This crate contains everything that does not depend on a pin or a
//! clock:
//!
//! - The 8-byte controller state and its button/axis addressing
//! - Human-readable formatting of a state
//! - Poller configuration and its validation

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod state;

pub use config::{ConfigError, PollerConfig};
pub use state::{get_axis, get_button, AxisId, ButtonId, ControllerState, STATE_LEN};
