//! Build-time controller configuration
//!
//! `build.rs` validates `controller.toml` and emits the constants and the
//! `take_line_pin!` macro included here.

include!(concat!(env!("OUT_DIR"), "/controller_config.rs"));
