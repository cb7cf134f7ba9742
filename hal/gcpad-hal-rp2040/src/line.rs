//! Controller data line on an RP2040 GPIO
//!
//! RP2040 pins have no open-drain output mode, so open drain is emulated:
//! the output latch is held low and the line is driven by switching the
//! pin between output (pulled low) and input (released).
//!
//! The internal pull-up is too weak for clean 1 µs edges on a long cable;
//! boards should fit an external ~1 kΩ pull-up to 3.3 V.

use embassy_rp::gpio::{Flex, Pin, Pull};
use embassy_rp::Peri;
use gcpad_hal::{OpenDrainPin, ReferenceClock};

use crate::clock::SysTickClock;

/// Joybus line: one GPIO plus the SysTick reference clock
pub struct Rp2040Line<'d> {
    pin: Flex<'d>,
    clock: SysTickClock,
}

impl<'d> Rp2040Line<'d> {
    /// Configure `pin` as an emulated open-drain line, starting released
    pub fn new(pin: Peri<'d, impl Pin>, clock: SysTickClock) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_pull(Pull::Up);
        pin.set_low();
        pin.set_as_input();

        #[cfg(feature = "defmt")]
        if pin.is_low() {
            defmt::warn!("Controller line reads low at startup; check the pull-up");
        }

        Self { pin, clock }
    }
}

impl OpenDrainPin for Rp2040Line<'_> {
    fn drive_low(&mut self) {
        self.pin.set_as_output();
    }

    fn release(&mut self) {
        self.pin.set_as_input();
    }

    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}

impl ReferenceClock for Rp2040Line<'_> {
    fn now(&self) -> u32 {
        self.clock.now()
    }

    fn ticks_per_us(&self) -> u32 {
        self.clock.ticks_per_us()
    }
}
