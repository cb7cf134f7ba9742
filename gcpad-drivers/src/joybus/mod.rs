//! Joybus protocol transceiver (GameCube controller)
//!
//! The controller shares one open-drain data line with the host. A poll is
//! a single request/response exchange:
//!
//! 1. Host sends the 3-byte poll command followed by a stop bit
//! 2. Host releases the line
//! 3. Controller answers with 8 bytes (64 bits) and a stop bit
//!
//! All bits are sent MSB first. See [`timing`] for the bit encoding.
//!
//! # Response Layout
//!
//! The 8 response bytes are stored unchanged in a
//! [`ControllerState`](gcpad_core::ControllerState); see `gcpad_core::state`
//! for the button and axis addresses.
//!
//! # Failure
//!
//! There is no way to abort or resume an exchange once started. Any missed
//! edge or deadline fails the whole poll and the caller decides whether to
//! try again on its next cycle.

use core::fmt;

pub mod timing;
pub mod transceiver;

#[cfg(test)]
pub(crate) mod sim;

pub use timing::BitTiming;
pub use transceiver::{poll, Joybus};

/// Poll command: read buttons and axes, analog mode 3, rumble off
pub const POLL_COMMAND: [u8; 3] = [0x40, 0x03, 0x02];

/// Number of data bits in a poll response
pub const RESPONSE_BITS: usize = 64;

/// Reasons a poll can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollError {
    /// An expected edge never came, or a transmit deadline was missed
    Timeout,
    /// The response stop bit was missing or held low
    Framing,
    /// Something else was holding the line low before we transmitted
    LineUnavailable,
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::Timeout => f.write_str("protocol timeout"),
            PollError::Framing => f.write_str("response stop bit missing or malformed"),
            PollError::LineUnavailable => f.write_str("line held low by another device"),
        }
    }
}
