//! RP2040-specific HAL for the controller poller
//!
//! This crate provides RP2040 implementations of the shared `gcpad-hal`
//! traits:
//!
//! - Open-drain controller line on any GPIO (`Flex` pin, direction toggling)
//! - SysTick-based reference clock at core clock resolution
//! - `take_pin!` for config-driven pin assignment

#![no_std]

pub mod clock;
pub mod line;
pub mod pins;

pub use clock::SysTickClock;
pub use line::Rp2040Line;

// Re-export shared traits from gcpad-hal for convenience
pub use gcpad_hal::{ClockedLine, OpenDrainPin, ReferenceClock};
