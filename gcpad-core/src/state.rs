//! Controller state model
//!
//! A poll response is 8 bytes, stored exactly as received (MSB first on the
//! wire):
//!
//! ```text
//! byte 0: - - - START Y X B A          (bits 7..0)
//! byte 1: - L R Z D_UP D_DOWN D_RIGHT D_LEFT
//! byte 2: stick X        byte 3: stick Y
//! byte 4: C-stick X      byte 5: C-stick Y
//! byte 6: L trigger      byte 7: R trigger
//! ```
//!
//! Bits marked `-` are reserved. Their value on real hardware varies (byte 1
//! bit 7 usually reads 1), so nothing here interprets them.

use core::fmt;

/// Length of a controller poll response in bytes
pub const STATE_LEN: usize = 8;

/// Number of addressable buttons
pub const BUTTON_COUNT: usize = 12;

/// Digital button, addressed as bit `id % 8` of byte `id / 8`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ButtonId {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    Start = 4,
    DLeft = 8,
    DRight = 9,
    DDown = 10,
    DUp = 11,
    Z = 12,
    R = 13,
    L = 14,
}

impl ButtonId {
    /// All buttons in bit order
    pub const ALL: [ButtonId; BUTTON_COUNT] = [
        ButtonId::A,
        ButtonId::B,
        ButtonId::X,
        ButtonId::Y,
        ButtonId::Start,
        ButtonId::DLeft,
        ButtonId::DRight,
        ButtonId::DDown,
        ButtonId::DUp,
        ButtonId::Z,
        ButtonId::R,
        ButtonId::L,
    ];

    /// Byte offset within [`ControllerState`]
    pub const fn byte(self) -> usize {
        (self as u8 / 8) as usize
    }

    /// Bit position within its byte (0 = LSB)
    pub const fn bit(self) -> u8 {
        self as u8 % 8
    }

    /// Short display name
    pub const fn name(self) -> &'static str {
        match self {
            ButtonId::A => "A",
            ButtonId::B => "B",
            ButtonId::X => "X",
            ButtonId::Y => "Y",
            ButtonId::Start => "START",
            ButtonId::DLeft => "D_LEFT",
            ButtonId::DRight => "D_RIGHT",
            ButtonId::DDown => "D_DOWN",
            ButtonId::DUp => "D_UP",
            ButtonId::Z => "Z",
            ButtonId::R => "R",
            ButtonId::L => "L",
        }
    }
}

/// Analog channel, addressed by its byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AxisId {
    StickX = 2,
    StickY = 3,
    CStickX = 4,
    CStickY = 5,
    TriggerL = 6,
    TriggerR = 7,
}

impl AxisId {
    /// All axes in byte order
    pub const ALL: [AxisId; 6] = [
        AxisId::StickX,
        AxisId::StickY,
        AxisId::CStickX,
        AxisId::CStickY,
        AxisId::TriggerL,
        AxisId::TriggerR,
    ];

    /// Byte offset within [`ControllerState`]
    pub const fn byte(self) -> usize {
        self as usize
    }

    /// Short display name
    pub const fn name(self) -> &'static str {
        match self {
            AxisId::StickX => "X",
            AxisId::StickY => "Y",
            AxisId::CStickX => "CX",
            AxisId::CStickY => "CY",
            AxisId::TriggerL => "L",
            AxisId::TriggerR => "R",
        }
    }
}

/// Raw controller poll response
///
/// Always exactly [`STATE_LEN`] bytes. Accessors never modify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ControllerState {
    data: [u8; STATE_LEN],
}

impl ControllerState {
    /// Zeroed state
    pub const fn new() -> Self {
        Self {
            data: [0; STATE_LEN],
        }
    }

    /// Wrap a raw response
    pub const fn from_bytes(data: [u8; STATE_LEN]) -> Self {
        Self { data }
    }

    /// Raw response bytes in wire order
    pub const fn as_bytes(&self) -> &[u8; STATE_LEN] {
        &self.data
    }

    /// Overwrite the whole response at once
    pub fn set_bytes(&mut self, data: [u8; STATE_LEN]) {
        self.data = data;
    }

    /// Check whether a button is pressed
    pub const fn button(&self, button: ButtonId) -> bool {
        (self.data[button.byte()] >> button.bit()) & 1 == 1
    }

    /// Read an analog channel (0-255)
    pub const fn axis(&self, axis: AxisId) -> u8 {
        self.data[axis.byte()]
    }

    /// All pressed buttons, in bit order
    pub fn pressed_buttons(&self) -> heapless::Vec<ButtonId, BUTTON_COUNT> {
        ButtonId::ALL
            .iter()
            .copied()
            .filter(|&b| self.button(b))
            .collect()
    }
}

/// Check whether `button` is pressed in `state`
pub fn get_button(state: &ControllerState, button: ButtonId) -> bool {
    state.button(button)
}

/// Read analog channel `axis` from `state`
pub fn get_axis(state: &ControllerState, axis: AxisId) -> u8 {
    state.axis(axis)
}

impl fmt::Display for ControllerState {
    /// Renders e.g. `A START | X=128 Y=128 CX=128 CY=128 L=0 R=0`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pressed = self.pressed_buttons();
        if pressed.is_empty() {
            f.write_str("-")?;
        }
        for (i, button) in pressed.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(button.name())?;
        }

        f.write_str(" |")?;
        for axis in AxisId::ALL {
            write!(f, " {}={}", axis.name(), self.axis(axis))?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControllerState {
    fn format(&self, f: defmt::Formatter) {
        let pressed = self.pressed_buttons();
        if pressed.is_empty() {
            defmt::write!(f, "-");
        }
        for button in pressed.iter() {
            defmt::write!(f, "{=str} ", button.name());
        }
        defmt::write!(
            f,
            "| X={=u8} Y={=u8} CX={=u8} CY={=u8} L={=u8} R={=u8}",
            self.axis(AxisId::StickX),
            self.axis(AxisId::StickY),
            self.axis(AxisId::CStickX),
            self.axis(AxisId::CStickY),
            self.axis(AxisId::TriggerL),
            self.axis(AxisId::TriggerR),
        );
    }
}
