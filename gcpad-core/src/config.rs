//! Poller configuration
//!
//! The only user-facing timing knob is the poll period. Bit-level timing
//! is fixed by the protocol and lives with the transceiver.

use core::fmt;

/// Shortest accepted poll period in microseconds
///
/// One exchange blocks for up to ~460 µs; anything faster would leave
/// sibling tasks with almost no time on the executor.
pub const MIN_PERIOD_US: u32 = 1_000;

/// Longest accepted poll period in microseconds (1 s)
pub const MAX_PERIOD_US: u32 = 1_000_000;

/// Default poll period (200 Hz)
pub const DEFAULT_PERIOD_US: u32 = 5_000;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Period below [`MIN_PERIOD_US`]
    PeriodTooShort,
    /// Period above [`MAX_PERIOD_US`]
    PeriodTooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::PeriodTooShort => {
                write!(f, "poll period must be at least {} us", MIN_PERIOD_US)
            }
            ConfigError::PeriodTooLong => {
                write!(f, "poll period must be at most {} us", MAX_PERIOD_US)
            }
        }
    }
}

/// Poller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollerConfig {
    period_us: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            period_us: DEFAULT_PERIOD_US,
        }
    }
}

impl PollerConfig {
    /// Create a validated configuration
    pub fn new(period_us: u32) -> Result<Self, ConfigError> {
        if period_us < MIN_PERIOD_US {
            return Err(ConfigError::PeriodTooShort);
        }
        if period_us > MAX_PERIOD_US {
            return Err(ConfigError::PeriodTooLong);
        }
        Ok(Self { period_us })
    }

    /// Poll period in microseconds
    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Poll rate in Hz, rounded down
    pub fn rate_hz(&self) -> u32 {
        1_000_000 / self.period_us
    }
}
