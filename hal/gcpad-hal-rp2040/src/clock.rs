//! SysTick reference clock
//!
//! The embassy time driver runs from the 1 MHz TIMER peripheral, which is
//! far too coarse to tell a 1 µs phase from a 3 µs one. SysTick counts core
//! clock cycles instead (125 ticks/µs at the default 125 MHz).
//!
//! SysTick is a 24-bit down-counter. [`SysTickClock::now`] turns it into a
//! 32-bit up-counter by noticing wraps between reads. A wrap takes ~134 ms
//! at 125 MHz, so reads inside one exchange never miss one; across idle
//! periods the extended value may jump, which nothing relies on.

use core::cell::Cell;

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use gcpad_hal::ReferenceClock;

/// Full 24-bit reload value
const RELOAD: u32 = 0x00FF_FFFF;

/// Free-running clock on the Cortex-M SysTick counter
pub struct SysTickClock {
    _syst: SYST,
    ticks_per_us: u32,
    last: Cell<u32>,
    upper: Cell<u32>,
}

impl SysTickClock {
    /// Start SysTick free-running from the core clock
    ///
    /// The SysTick interrupt stays disabled.
    pub fn new(mut syst: SYST, core_hz: u32) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(RELOAD);
        syst.clear_current();
        syst.disable_interrupt();
        syst.enable_counter();

        let ticks_per_us = (core_hz / 1_000_000).max(1);
        #[cfg(feature = "defmt")]
        defmt::debug!("SysTick clock: {} Hz, {} ticks/us", core_hz, ticks_per_us);

        Self {
            _syst: syst,
            ticks_per_us,
            last: Cell::new(0),
            upper: Cell::new(0),
        }
    }
}

impl ReferenceClock for SysTickClock {
    fn now(&self) -> u32 {
        let count = RELOAD - SYST::get_current();
        if count < self.last.get() {
            self.upper.set(self.upper.get().wrapping_add(RELOAD + 1));
        }
        self.last.set(count);
        self.upper.get().wrapping_add(count)
    }

    fn ticks_per_us(&self) -> u32 {
        self.ticks_per_us
    }
}
