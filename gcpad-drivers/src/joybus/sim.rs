//! Simulated controller line for host tests
//!
//! Time is virtual: every clock read advances it by one tick, so the busy
//! loops in the transceiver see time pass exactly as fast as they spin. The
//! simulated controller starts replying shortly after the host's stop bit.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use gcpad_core::STATE_LEN;
use gcpad_hal::{OpenDrainPin, ReferenceClock};
use heapless::Vec;

use super::POLL_COMMAND;

pub const SIM_TICKS_PER_US: u32 = 16;

const CELL: u32 = 4 * SIM_TICKS_PER_US;
const SHORT: u32 = SIM_TICKS_PER_US;
const LONG: u32 = 3 * SIM_TICKS_PER_US;

/// Host pulses in a poll request (command bits plus stop bit)
const REQUEST_PULSES: usize = POLL_COMMAND.len() * 8 + 1;

/// How the controller ends its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBit {
    Present,
    Missing,
    StuckLow,
}

struct Reply {
    bytes: [u8; STATE_LEN],
    bits: usize,
    stop: StopBit,
    delay: u32,
}

pub struct SimLine {
    now: Cell<u32>,
    origin: u32,
    stall: Cell<Option<(u32, u32)>>,
    host_low: bool,
    held_low: bool,
    edges: Vec<(u32, bool), 128>,
    pulses: usize,
    reply: Option<Reply>,
    reply_start: Option<u32>,
}

impl SimLine {
    /// Nothing plugged in
    pub fn silent() -> Self {
        Self {
            now: Cell::new(0),
            origin: 0,
            stall: Cell::new(None),
            host_low: false,
            held_low: false,
            edges: Vec::new(),
            pulses: 0,
            reply: None,
            reply_start: None,
        }
    }

    /// Controller that answers with `bytes`
    pub fn with_reply(bytes: [u8; STATE_LEN]) -> Self {
        Self {
            reply: Some(Reply {
                bytes,
                bits: STATE_LEN * 8,
                stop: StopBit::Present,
                delay: 2 * SIM_TICKS_PER_US,
            }),
            ..Self::silent()
        }
    }

    /// Controller goes quiet after `bits` data bits
    pub fn truncated(mut self, bits: usize) -> Self {
        if let Some(reply) = self.reply.as_mut() {
            reply.bits = bits;
        }
        self
    }

    pub fn stop_bit(mut self, stop: StopBit) -> Self {
        if let Some(reply) = self.reply.as_mut() {
            reply.stop = stop;
        }
        self
    }

    /// Another device pulls the line low for the whole test
    pub fn held_low(mut self) -> Self {
        self.held_low = true;
        self
    }

    /// Clock jumps forward by `jump` ticks when it reaches `at`
    pub fn stall_at(self, at: u32, jump: u32) -> Self {
        self.stall.set(Some((self.origin.wrapping_add(at), jump)));
        self
    }

    pub fn starting_at(mut self, tick: u32) -> Self {
        self.now.set(tick);
        self.origin = tick;
        self
    }

    /// Ticks since the simulation started
    pub fn elapsed(&self) -> u32 {
        self.now.get().wrapping_sub(self.origin)
    }

    /// Host edges as (tick, pulled low)
    pub fn edges(&self) -> &[(u32, bool)] {
        &self.edges
    }

    pub fn is_released(&self) -> bool {
        !self.host_low
    }

    /// Decode what the host sent: whole bytes plus whether a trailing stop
    /// pulse followed them
    pub fn sent_bytes(&self) -> (Vec<u8, 4>, bool) {
        let mut bits: Vec<bool, 32> = Vec::new();
        for pair in self.edges.chunks(2) {
            if let [(fall, true), (rise, false)] = pair {
                let low = rise.wrapping_sub(*fall);
                bits.push(low < 2 * SIM_TICKS_PER_US).unwrap();
            }
        }

        let mut bytes = Vec::new();
        for chunk in bits.chunks_exact(8) {
            let byte = chunk
                .iter()
                .fold(0u8, |acc, &one| (acc << 1) | one as u8);
            bytes.push(byte).unwrap();
        }
        let stop = bits.len() % 8 == 1 && bits.last() == Some(&true);
        (bytes, stop)
    }

    fn controller_low(&self, t: u32) -> bool {
        let (Some(reply), Some(start)) = (self.reply.as_ref(), self.reply_start) else {
            return false;
        };
        let offset = t.wrapping_sub(start);
        if (offset as i32) < 0 {
            return false;
        }

        let cell = (offset / CELL) as usize;
        let within = offset % CELL;
        let data_bits = STATE_LEN * 8;

        if cell < reply.bits {
            let one = reply.bytes[cell / 8] & (0x80 >> (cell % 8)) != 0;
            within < if one { SHORT } else { LONG }
        } else if reply.bits == data_bits && cell == data_bits {
            match reply.stop {
                StopBit::Present => within < SHORT,
                StopBit::Missing => false,
                StopBit::StuckLow => true,
            }
        } else {
            reply.bits == data_bits && reply.stop == StopBit::StuckLow
        }
    }
}

impl ReferenceClock for SimLine {
    fn now(&self) -> u32 {
        let mut t = self.now.get().wrapping_add(1);
        if let Some((at, jump)) = self.stall.get() {
            if t == at {
                t = t.wrapping_add(jump);
                self.stall.set(None);
            }
        }
        self.now.set(t);
        t
    }

    fn ticks_per_us(&self) -> u32 {
        SIM_TICKS_PER_US
    }
}

impl OpenDrainPin for SimLine {
    fn drive_low(&mut self) {
        if !self.host_low {
            self.host_low = true;
            self.edges.push((self.now.get(), true)).unwrap();
        }
    }

    fn release(&mut self) {
        if self.host_low {
            self.host_low = false;
            let t = self.now.get();
            self.edges.push((t, false)).unwrap();
            self.pulses += 1;

            if self.pulses == REQUEST_PULSES {
                if let Some(reply) = self.reply.as_ref() {
                    self.reply_start = Some(t.wrapping_add(reply.delay));
                }
            }
        }
    }

    fn is_high(&mut self) -> bool {
        let t = self.now.get();
        !(self.host_low || self.held_low || self.controller_low(t))
    }
}

/// `embedded-hal` pin half of a shared [`SimLine`]
pub struct SimPin<'a>(pub &'a RefCell<SimLine>);

/// Clock half of a shared [`SimLine`]
pub struct SimClock<'a>(pub &'a RefCell<SimLine>);

impl ErrorType for SimPin<'_> {
    type Error = Infallible;
}

impl OutputPin for SimPin<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().drive_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().release();
        Ok(())
    }
}

impl InputPin for SimPin<'_> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(OpenDrainPin::is_high(&mut *self.0.borrow_mut()))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!OpenDrainPin::is_high(&mut *self.0.borrow_mut()))
    }
}

impl ReferenceClock for SimClock<'_> {
    fn now(&self) -> u32 {
        self.0.borrow().now()
    }

    fn ticks_per_us(&self) -> u32 {
        SIM_TICKS_PER_US
    }
}
