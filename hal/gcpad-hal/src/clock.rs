//! Reference clock abstraction
//!
//! Bit timing is expressed as absolute deadlines in clock ticks rather than
//! sleeps, so a late phase never shifts the cells that follow it.

/// Free-running tick counter
///
/// The counter wraps at `u32::MAX`. Callers compare ticks with
/// [`ticks_since`] so that a wrap in the middle of an exchange is harmless.
pub trait ReferenceClock {
    /// Current tick count
    ///
    /// Takes `&self`: reading the counter has no observable side effect on
    /// the line, even if an implementation extends a narrower hardware
    /// counter internally.
    fn now(&self) -> u32;

    /// Number of ticks per microsecond (at least 1)
    fn ticks_per_us(&self) -> u32;

    /// Convert a duration in microseconds to ticks
    fn us_to_ticks(&self, us: u32) -> u32 {
        us.saturating_mul(self.ticks_per_us())
    }
}

/// Signed distance from `earlier` to `later`, tolerant of counter wrap
///
/// Positive when `later` is after `earlier`. Valid as long as the two ticks
/// are less than 2^31 ticks apart.
pub fn ticks_since(later: u32, earlier: u32) -> i32 {
    later.wrapping_sub(earlier) as i32
}

/// Check whether `deadline` has been reached at tick `now`
pub fn reached(now: u32, deadline: u32) -> bool {
    ticks_since(now, deadline) >= 0
}
