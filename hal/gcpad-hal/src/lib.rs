//! gcpad Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the Joybus transceiver needs,
//! so that the protocol code can run against a real pin on any chip or
//! against a simulated line in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  gcpad-drivers (joybus, poller)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gcpad-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  gcpad-hal-   │       │ embedded-hal  │
//! │    rp2040     │       │ open-drain pin│
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`line::OpenDrainPin`] - Single shared wire, driven low or released
//! - [`clock::ReferenceClock`] - Free-running tick counter for bit timing
//! - [`line::ClockedLine`] - A pin synchronized to a reference clock

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod line;

// Re-export key traits at crate root for convenience
pub use clock::ReferenceClock;
pub use line::{ClockedLine, EmbeddedHalLine, OpenDrainPin};
