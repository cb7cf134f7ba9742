//! Periodic controller poller
//!
//! Runs one Joybus exchange per period and hands every successful result to
//! a [`StateSink`]. Each cycle goes:
//!
//! ```text
//! Idle ──(deadline)──▶ Polling ──ok──▶ Dispatching ──▶ Idle
//!                         └────err──▶ Skipping ─────▶ Idle
//! ```
//!
//! The only await point is the deadline timer. The exchange itself blocks
//! for a bounded ~0.5 ms, so the poller can share an executor with other
//! cooperative tasks.
//!
//! # Scheduling
//!
//! Deadlines advance by exactly one period from the previous deadline, so
//! wake-up latency does not accumulate as drift. If a cycle overruns past
//! the next deadline, the schedule re-anchors to the current instant
//! instead of firing a burst of catch-up polls.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, ReceiveFuture, TrySendError};
use embassy_time::{Duration, Instant, Timer};
use portable_atomic::{AtomicU32, Ordering};

use gcpad_core::{ControllerState, PollerConfig};

use crate::joybus::PollError;

/// Log link statistics every this many polls
pub const STATS_LOG_INTERVAL: u32 = 1_000;

/// Anything that can run one poll exchange
pub trait Transceiver {
    /// Fill `state` from the controller
    ///
    /// `state` must not be trusted after an error.
    fn poll(&mut self, state: &mut ControllerState) -> Result<(), PollError>;
}

impl<T: Transceiver + ?Sized> Transceiver for &mut T {
    fn poll(&mut self, state: &mut ControllerState) -> Result<(), PollError> {
        (**self).poll(state)
    }
}

/// Consumer of decoded states
///
/// `push` must not block; buffering and backpressure are the consumer's
/// business.
pub trait StateSink {
    fn push(&mut self, state: ControllerState);
}

impl<S: StateSink + ?Sized> StateSink for &mut S {
    fn push(&mut self, state: ControllerState) {
        (**self).push(state)
    }
}

/// Bounded state queue that drops the oldest entry when full
///
/// The poller never waits on a slow consumer; the consumer always sees the
/// most recent `N` states.
pub struct StateQueue<M: RawMutex, const N: usize> {
    channel: Channel<M, ControllerState, N>,
    dropped: AtomicU32,
}

impl<M: RawMutex, const N: usize> StateQueue<M, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue a state, evicting the oldest one if the queue is full
    pub fn push(&self, state: ControllerState) {
        let mut state = state;
        loop {
            match self.channel.try_send(state) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    state = rejected;
                    if self.channel.try_receive().is_ok() {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }
    }

    /// Wait for the next state
    pub fn receive(&self) -> ReceiveFuture<'_, M, ControllerState, N> {
        self.channel.receive()
    }

    /// Take the next state if one is queued
    pub fn try_receive(&self) -> Option<ControllerState> {
        self.channel.try_receive().ok()
    }

    /// Number of states evicted because the consumer fell behind
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<M: RawMutex, const N: usize> Default for StateQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> StateSink for &StateQueue<M, N> {
    fn push(&mut self, state: ControllerState) {
        StateQueue::push(self, state)
    }
}

/// Poll outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollStats {
    pub polls: u32,
    pub successes: u32,
    pub timeouts: u32,
    pub framing_errors: u32,
    pub line_unavailable: u32,
}

impl PollStats {
    pub fn record(&mut self, result: Result<(), PollError>) {
        self.polls = self.polls.wrapping_add(1);
        let counter = match result {
            Ok(()) => &mut self.successes,
            Err(PollError::Timeout) => &mut self.timeouts,
            Err(PollError::Framing) => &mut self.framing_errors,
            Err(PollError::LineUnavailable) => &mut self.line_unavailable,
        };
        *counter = counter.wrapping_add(1);
    }

    pub fn failures(&self) -> u32 {
        self.polls.wrapping_sub(self.successes)
    }
}

/// Next cycle deadline after one that started at `previous`
///
/// Fixed-period: `previous + period`, unless that moment has already
/// passed, in which case the cycle starts `now`.
pub fn next_deadline(previous: Instant, period: Duration, now: Instant) -> Instant {
    let next = previous + period;
    if next < now {
        now
    } else {
        next
    }
}

/// Periodic poller bound to one transceiver and one sink
pub struct Poller<T, S> {
    transceiver: T,
    sink: S,
    period: Duration,
    stats: PollStats,
}

impl<T: Transceiver, S: StateSink> Poller<T, S> {
    pub fn new(transceiver: T, sink: S, period: Duration) -> Self {
        Self {
            transceiver,
            sink,
            period,
            stats: PollStats::default(),
        }
    }

    /// Create a poller using the period from a validated configuration
    pub fn from_config(transceiver: T, sink: S, config: &PollerConfig) -> Self {
        Self::new(
            transceiver,
            sink,
            Duration::from_micros(config.period_us() as u64),
        )
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Run a single poll and dispatch its result
    ///
    /// A failed poll pushes nothing and is only counted.
    pub fn cycle(&mut self) -> Result<(), PollError> {
        let mut state = ControllerState::new();
        let result = self.transceiver.poll(&mut state);
        self.stats.record(result);

        match result {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("Poll ok: {}", state);
                self.sink.push(state);
            }
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("Poll skipped: {}", _error);
            }
        }

        result
    }

    /// Poll forever, once per period
    ///
    /// The first poll happens one period after the call. Never returns;
    /// cancel by dropping the future between cycles.
    pub async fn run(&mut self) {
        let mut deadline = Instant::now() + self.period;

        loop {
            Timer::at(deadline).await;
            let _ = self.cycle();

            #[cfg(feature = "defmt")]
            if self.stats.polls % STATS_LOG_INTERVAL == 0 {
                defmt::debug!("Poller stats: {}", self.stats);
            }

            deadline = next_deadline(deadline, self.period, Instant::now());
        }
    }
}

/// Poll `transceiver` every `period` and push successes into `sink`
pub async fn run<T: Transceiver, S: StateSink>(transceiver: T, sink: S, period: Duration) {
    Poller::new(transceiver, sink, period).run().await
}
