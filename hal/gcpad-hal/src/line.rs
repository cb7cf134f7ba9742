//! Single-wire line abstractions
//!
//! The controller data line is open-drain with a pull-up: either side may
//! pull it low, and it floats high when everyone lets go. The host never
//! drives it high.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::clock::ReferenceClock;

/// Shared open-drain data line
///
/// Implementations should switch as quickly as the hardware allows; the
/// protocol distinguishes 1 µs and 3 µs phases.
pub trait OpenDrainPin {
    /// Pull the line low
    fn drive_low(&mut self);

    /// Stop driving and let the pull-up take the line high
    fn release(&mut self);

    /// Sample the line (logic 1 when nobody pulls it low)
    fn is_high(&mut self) -> bool;

    /// Sample the line, inverted
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }
}

/// Line that can be timed against a reference clock
///
/// This is what the transceiver borrows for one exchange.
pub trait ClockedLine: OpenDrainPin + ReferenceClock {}

// Blanket implementation for types that implement both traits
impl<T: OpenDrainPin + ReferenceClock> ClockedLine for T {}

/// Adapter for a true open-drain `embedded-hal` pin plus a clock
///
/// Chips with an open-drain output mode (where `set_high` releases the pin
/// and the input buffer stays connected) can use their HAL pin directly.
/// The RP2040 has no such mode and uses its own line type instead.
pub struct EmbeddedHalLine<P, C> {
    pin: P,
    clock: C,
}

impl<P, C> EmbeddedHalLine<P, C>
where
    P: OutputPin + InputPin + ErrorType<Error = Infallible>,
    C: ReferenceClock,
{
    /// Wrap a pin and clock, leaving the line released
    pub fn new(pin: P, clock: C) -> Self {
        let mut line = Self { pin, clock };
        line.release();
        line
    }

    /// Give back the pin and clock
    pub fn into_parts(self) -> (P, C) {
        (self.pin, self.clock)
    }
}

impl<P, C> OpenDrainPin for EmbeddedHalLine<P, C>
where
    P: OutputPin + InputPin + ErrorType<Error = Infallible>,
{
    fn drive_low(&mut self) {
        match self.pin.set_low() {
            Ok(()) => {}
            Err(e) => match e {},
        }
    }

    fn release(&mut self) {
        match self.pin.set_high() {
            Ok(()) => {}
            Err(e) => match e {},
        }
    }

    fn is_high(&mut self) -> bool {
        match InputPin::is_high(&mut self.pin) {
            Ok(high) => high,
            Err(e) => match e {},
        }
    }
}

impl<P, C: ReferenceClock> ReferenceClock for EmbeddedHalLine<P, C> {
    fn now(&self) -> u32 {
        self.clock.now()
    }

    fn ticks_per_us(&self) -> u32 {
        self.clock.ticks_per_us()
    }
}
