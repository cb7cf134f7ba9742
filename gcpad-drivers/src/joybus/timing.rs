//! Joybus bit timing
//!
//! Every bit occupies a 4 µs cell that starts with a falling edge:
//!
//! ```text
//!        ┌ cell ──────────────┐
//!  "0"   ‾‾\___________/‾‾‾‾‾‾\__   3 µs low, 1 µs high
//!  "1"   ‾‾\___/‾‾‾‾‾‾‾‾‾‾‾‾‾‾\__   1 µs low, 3 µs high
//! ```
//!
//! The receiver only needs the length of the low phase: shorter than half
//! a cell means the high phase was long, which is a `1`.

use gcpad_hal::ReferenceClock;

/// Bit cell length
pub const BIT_CELL_US: u32 = 4;

/// Short phase (low part of a `1`, high part of a `0`)
pub const SHORT_PHASE_US: u32 = 1;

/// Long phase (low part of a `0`, high part of a `1`)
pub const LONG_PHASE_US: u32 = 3;

/// Low phases shorter than this decode as `1`
pub const DECODE_THRESHOLD_US: u32 = 2;

/// Time allowed between our stop bit and the controller's first edge
pub const REPLY_TIMEOUT_US: u32 = 100;

/// Time allowed between consecutive edges inside a response
pub const EDGE_TIMEOUT_US: u32 = 2 * BIT_CELL_US;

/// How late a transmit phase boundary may be before the exchange is void
pub const MAX_LATENESS_US: u32 = 1;

/// Protocol timing converted to reference clock ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    pub cell: u32,
    pub short: u32,
    pub long: u32,
    pub threshold: u32,
    pub reply_timeout: u32,
    pub edge_timeout: u32,
    pub max_lateness: u32,
}

impl BitTiming {
    /// Derive tick counts from a clock's tick rate
    pub fn for_clock<C: ReferenceClock + ?Sized>(clock: &C) -> Self {
        Self {
            cell: clock.us_to_ticks(BIT_CELL_US),
            short: clock.us_to_ticks(SHORT_PHASE_US),
            long: clock.us_to_ticks(LONG_PHASE_US),
            threshold: clock.us_to_ticks(DECODE_THRESHOLD_US),
            reply_timeout: clock.us_to_ticks(REPLY_TIMEOUT_US),
            edge_timeout: clock.us_to_ticks(EDGE_TIMEOUT_US),
            max_lateness: clock.us_to_ticks(MAX_LATENESS_US),
        }
    }

    /// Low-phase length used to transmit a bit
    pub fn low_phase(&self, one: bool) -> u32 {
        if one {
            self.short
        } else {
            self.long
        }
    }

    /// Classify a measured low phase
    pub fn decode(&self, low_ticks: u32) -> bool {
        low_ticks < self.threshold
    }
}
