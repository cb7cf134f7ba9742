//! Bit-banged Joybus exchange
//!
//! Everything here busy-waits on the reference clock. Phase boundaries are
//! absolute tick deadlines derived from the first cell, so jitter on one
//! bit does not carry into the next.

use gcpad_core::{ControllerState, STATE_LEN};
use gcpad_hal::clock::{reached, ticks_since};
use gcpad_hal::{ClockedLine, ReferenceClock};

use super::timing::BitTiming;
use super::{PollError, POLL_COMMAND, RESPONSE_BITS};
use crate::poller::Transceiver;

/// Run one poll exchange on `line`
///
/// On success the 8 response bytes are written to `state`. On failure
/// `state` is left as it was; callers must treat it as stale.
pub fn poll<L: ClockedLine + ?Sized>(
    line: &mut L,
    state: &mut ControllerState,
) -> Result<(), PollError> {
    let timing = BitTiming::for_clock(&*line);

    if line.is_low() {
        return Err(PollError::LineUnavailable);
    }

    transmit(line, &timing, &POLL_COMMAND)?;
    let response = receive(line, &timing)?;

    state.set_bytes(response);
    Ok(())
}

/// Send `bytes` MSB first, followed by a stop bit
fn transmit<L: ClockedLine + ?Sized>(
    line: &mut L,
    timing: &BitTiming,
    bytes: &[u8],
) -> Result<(), PollError> {
    // Lead-in so the first falling edge lands on a deadline like the rest
    let mut cell_start = line.now().wrapping_add(timing.short);

    for &byte in bytes {
        for shift in (0..8).rev() {
            let one = (byte >> shift) & 1 == 1;
            send_pulse(line, timing, cell_start, timing.low_phase(one))?;
            cell_start = cell_start.wrapping_add(timing.cell);
        }
    }

    // Stop bit; the line stays released afterwards for the reply
    send_pulse(line, timing, cell_start, timing.short)
}

/// Drive the line low from `start` for `low` ticks
fn send_pulse<L: ClockedLine + ?Sized>(
    line: &mut L,
    timing: &BitTiming,
    start: u32,
    low: u32,
) -> Result<(), PollError> {
    wait_until(line, start, timing.max_lateness)?;
    line.drive_low();

    let release_at = start.wrapping_add(low);
    let on_time = wait_until(line, release_at, timing.max_lateness);
    // Never leave the bus pulled low, even on a missed deadline
    line.release();
    on_time
}

/// Spin until `deadline`, failing if it was overshot by more than `slack`
fn wait_until<C: ReferenceClock + ?Sized>(
    clock: &C,
    deadline: u32,
    slack: u32,
) -> Result<(), PollError> {
    loop {
        let late = ticks_since(clock.now(), deadline);
        if late >= 0 {
            return if late as u32 <= slack {
                Ok(())
            } else {
                Err(PollError::Timeout)
            };
        }
    }
}

/// Receive the 64-bit response and its stop bit
fn receive<L: ClockedLine + ?Sized>(
    line: &mut L,
    timing: &BitTiming,
) -> Result<[u8; STATE_LEN], PollError> {
    let mut response = [0u8; STATE_LEN];

    // Our stop bit ends released; make sure the pull-up has won first
    let float_deadline = line.now().wrapping_add(timing.edge_timeout);
    let released_at = wait_for_level(line, true, float_deadline).ok_or(PollError::Timeout)?;

    let mut fall_deadline = released_at.wrapping_add(timing.reply_timeout);
    for bit in 0..RESPONSE_BITS {
        let (rise, one) = read_bit(line, timing, fall_deadline).ok_or(PollError::Timeout)?;
        if one {
            response[bit / 8] |= 0x80 >> (bit % 8);
        }
        fall_deadline = rise.wrapping_add(timing.edge_timeout);
    }

    read_stop_bit(line, timing, fall_deadline)?;
    Ok(response)
}

/// Measure one bit cell; returns the rising edge tick and the bit value
fn read_bit<L: ClockedLine + ?Sized>(
    line: &mut L,
    timing: &BitTiming,
    fall_deadline: u32,
) -> Option<(u32, bool)> {
    let fall = wait_for_level(line, false, fall_deadline)?;
    let rise = wait_for_level(line, true, fall.wrapping_add(timing.edge_timeout))?;
    Some((rise, timing.decode(rise.wrapping_sub(fall))))
}

/// The stop bit is any low pulse that ends within one cell
fn read_stop_bit<L: ClockedLine + ?Sized>(
    line: &mut L,
    timing: &BitTiming,
    fall_deadline: u32,
) -> Result<(), PollError> {
    let fall = wait_for_level(line, false, fall_deadline).ok_or(PollError::Framing)?;
    wait_for_level(line, true, fall.wrapping_add(timing.cell)).ok_or(PollError::Framing)?;
    Ok(())
}

/// Spin until the line reads `high`, returning the tick it was seen at
fn wait_for_level<L: ClockedLine + ?Sized>(line: &mut L, high: bool, deadline: u32) -> Option<u32> {
    loop {
        let now = line.now();
        if line.is_high() == high {
            return Some(now);
        }
        if reached(now, deadline) {
            return None;
        }
    }
}

/// Joybus port owning its line
///
/// One instance per controller port. Each exchange runs with interrupts
/// masked so that no interrupt handler can stretch a bit cell.
pub struct Joybus<L> {
    line: L,
}

impl<L: ClockedLine> Joybus<L> {
    /// Take ownership of a line and leave it released
    pub fn new(mut line: L) -> Self {
        line.release();
        Self { line }
    }

    /// Give the line back
    pub fn into_inner(self) -> L {
        self.line
    }
}

impl<L: ClockedLine> Transceiver for Joybus<L> {
    fn poll(&mut self, state: &mut ControllerState) -> Result<(), PollError> {
        critical_section::with(|_| poll(&mut self.line, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joybus::sim::{SimClock, SimLine, SimPin, StopBit, SIM_TICKS_PER_US};
    use core::cell::RefCell;
    use gcpad_core::{get_axis, get_button, AxisId, ButtonId};
    use gcpad_hal::EmbeddedHalLine;

    const NEUTRAL: [u8; STATE_LEN] = [0x00, 0x80, 0x80, 0x80, 0x80, 0x80, 0x1F, 0x1F];

    /// Upper bound on a full exchange: 25 cells out, reply latency, 65 cells in
    const EXCHANGE_BOUND_TICKS: u32 = (25 * 4 + 100 + 65 * 4 + 20) * SIM_TICKS_PER_US;

    #[test]
    fn test_round_trip_decode() {
        let pattern = [0x1F, 0x81, 0x00, 0xFF, 0x5A, 0xA5, 0x01, 0xFE];
        let mut line = SimLine::with_reply(pattern);
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Ok(()));
        assert_eq!(state.as_bytes(), &pattern);
        assert!(line.elapsed() < EXCHANGE_BOUND_TICKS);
    }

    #[test]
    fn test_command_transcript() {
        let mut line = SimLine::with_reply(NEUTRAL);
        let mut state = ControllerState::new();
        poll(&mut line, &mut state).unwrap();

        let (sent, stop_bit) = line.sent_bytes();
        assert_eq!(sent.as_slice(), &POLL_COMMAND);
        assert!(stop_bit);
        assert!(line.is_released());
    }

    #[test]
    fn test_transmit_cells_are_fixed_length() {
        let mut line = SimLine::with_reply(NEUTRAL);
        let mut state = ControllerState::new();
        poll(&mut line, &mut state).unwrap();

        let cell = 4 * SIM_TICKS_PER_US;
        let falls: heapless::Vec<u32, 32> = line
            .edges()
            .iter()
            .filter(|(_, low)| *low)
            .map(|(tick, _)| *tick)
            .collect();
        assert_eq!(falls.len(), 25);
        for pair in falls.windows(2) {
            assert_eq!(pair[1].wrapping_sub(pair[0]), cell);
        }
    }

    #[test]
    fn test_example_scenario() {
        let response = [0x00, 0x10, 0x80, 0x80, 0x80, 0x80, 0x00, 0x00];
        let mut line = SimLine::with_reply(response);
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Ok(()));
        assert_eq!(line.sent_bytes().0.as_slice(), &[0x40, 0x03, 0x02]);
        assert!(!get_button(&state, ButtonId::Start));
        // 0x10 in byte 1 is bit 4: Z, not D-Left
        assert!(get_button(&state, ButtonId::Z));
        assert!(!get_button(&state, ButtonId::DLeft));
        assert_eq!(get_axis(&state, AxisId::StickX), 0x80);
    }

    #[test]
    fn test_d_left_is_byte1_bit0() {
        let response = [0x00, 0x01, 0x80, 0x80, 0x80, 0x80, 0x00, 0x00];
        let mut line = SimLine::with_reply(response);
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Ok(()));
        assert!(get_button(&state, ButtonId::DLeft));
        assert!(!get_button(&state, ButtonId::Start));
        assert_eq!(get_axis(&state, AxisId::StickX), 0x80);
    }

    #[test]
    fn test_no_controller_times_out() {
        let mut line = SimLine::silent();
        let mut state = ControllerState::from_bytes([0xAA; STATE_LEN]);

        assert_eq!(poll(&mut line, &mut state), Err(PollError::Timeout));
        assert_eq!(state.as_bytes(), &[0xAA; STATE_LEN]);
        assert!(line.elapsed() < EXCHANGE_BOUND_TICKS);
    }

    #[test]
    fn test_missing_stop_bit() {
        let mut line = SimLine::with_reply(NEUTRAL).stop_bit(StopBit::Missing);
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Err(PollError::Framing));
        assert_eq!(state, ControllerState::new());
        assert!(line.elapsed() < EXCHANGE_BOUND_TICKS);
    }

    #[test]
    fn test_stuck_low_stop_bit() {
        let mut line = SimLine::with_reply(NEUTRAL).stop_bit(StopBit::StuckLow);
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Err(PollError::Framing));
        assert!(line.elapsed() < EXCHANGE_BOUND_TICKS);
    }

    #[test]
    fn test_truncated_reply_is_not_partially_decoded() {
        let mut line = SimLine::with_reply([0xFF; STATE_LEN]).truncated(20);
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Err(PollError::Timeout));
        assert_eq!(state, ControllerState::new());
    }

    #[test]
    fn test_line_held_low() {
        let mut line = SimLine::with_reply(NEUTRAL).held_low();
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Err(PollError::LineUnavailable));
        assert!(line.edges().is_empty());
    }

    #[test]
    fn test_missed_transmit_deadline_aborts() {
        // Clock jumps 3 µs during the low phase of the second command bit
        let mut line = SimLine::with_reply(NEUTRAL).stall_at(83, 3 * SIM_TICKS_PER_US);
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Err(PollError::Timeout));
        assert!(line.is_released());
        assert_eq!(state, ControllerState::new());
    }

    #[test]
    fn test_clock_wrap_mid_exchange() {
        let mut line = SimLine::with_reply(NEUTRAL).starting_at(u32::MAX - 2_000);
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Ok(()));
        assert_eq!(state.as_bytes(), &NEUTRAL);
    }

    #[test]
    fn test_embedded_hal_open_drain_pin() {
        let sim = RefCell::new(SimLine::with_reply(NEUTRAL));
        let mut line = EmbeddedHalLine::new(SimPin(&sim), SimClock(&sim));
        let mut state = ControllerState::new();

        assert_eq!(poll(&mut line, &mut state), Ok(()));
        assert_eq!(state.as_bytes(), &NEUTRAL);

        drop(line);
        let sim = sim.into_inner();
        assert_eq!(sim.sent_bytes().0.as_slice(), &POLL_COMMAND);
        assert!(sim.is_released());
    }

    #[test]
    fn test_joybus_port_transceiver() {
        let mut port = Joybus::new(SimLine::with_reply(NEUTRAL));
        let mut state = ControllerState::new();

        assert_eq!(Transceiver::poll(&mut port, &mut state), Ok(()));
        assert_eq!(state.as_bytes(), &NEUTRAL);

        let line = port.into_inner();
        assert!(line.is_released());
    }
}
