//! Build script for gcpad-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates controller.toml and turns it into compile-time constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// RP2040 user GPIO count
const GPIO_COUNT: i64 = 30;

/// Poll period bounds in microseconds (mirrors gcpad_core::config)
const MIN_PERIOD_US: i64 = 1_000;
const MAX_PERIOD_US: i64 = 1_000_000;

const MAX_QUEUE_DEPTH: i64 = 32;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values extracted from controller.toml
struct ControllerConfig {
    gpio: i64,
    period_us: i64,
    queue_depth: i64,
}

/// Validate controller.toml at compile time
fn validate_config() -> ControllerConfig {
    // Re-run if controller.toml changes
    println!("cargo:rerun-if-changed=controller.toml");

    let config_path = Path::new("controller.toml");

    if !config_path.exists() {
        fail(&["controller.toml not found next to Cargo.toml".to_string()]);
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail(&[format!("Failed to read controller.toml: {}", e)]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            &e.to_string()
                .lines()
                .map(str::to_string)
                .collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    let gpio = integer(&config, "line", "gpio", &mut errors);
    if let Some(gpio) = gpio {
        if !(0..GPIO_COUNT).contains(&gpio) {
            errors.push(format!("[line] gpio must be 0-{}", GPIO_COUNT - 1));
        }
    }

    let period_us = integer(&config, "poller", "period_us", &mut errors);
    if let Some(period) = period_us {
        if !(MIN_PERIOD_US..=MAX_PERIOD_US).contains(&period) {
            errors.push(format!(
                "[poller] period_us must be {}-{}",
                MIN_PERIOD_US, MAX_PERIOD_US
            ));
        }
    }

    let queue_depth = integer(&config, "poller", "queue_depth", &mut errors);
    if let Some(depth) = queue_depth {
        if !(1..=MAX_QUEUE_DEPTH).contains(&depth) {
            errors.push(format!("[poller] queue_depth must be 1-{}", MAX_QUEUE_DEPTH));
        }
    }

    if !errors.is_empty() {
        fail(&errors);
    }

    println!("cargo:warning=controller.toml validated successfully");

    ControllerConfig {
        gpio: gpio.unwrap_or_default(),
        period_us: period_us.unwrap_or_default(),
        queue_depth: queue_depth.unwrap_or_default(),
    }
}

/// Look up a required integer `[section] key`
fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    let table = match config.get(section) {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push(format!("[{}] must be a table", section));
            return None;
        }
        None => {
            errors.push(format!("Missing [{}] section", section));
            return None;
        }
    };

    match table.get(key) {
        Some(toml::Value::Integer(value)) => Some(*value),
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            None
        }
    }
}

/// Write the validated values as Rust constants
fn generate_config(config: &ControllerConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("controller_config.rs")).unwrap();

    writeln!(f, "/// GPIO wired to the controller data line").unwrap();
    writeln!(f, "pub const LINE_GPIO: u8 = {};", config.gpio).unwrap();
    writeln!(f, "/// Poll period in microseconds").unwrap();
    writeln!(f, "pub const POLL_PERIOD_US: u32 = {};", config.period_us).unwrap();
    writeln!(f, "/// Consumer queue depth").unwrap();
    writeln!(f, "pub const QUEUE_DEPTH: usize = {};", config.queue_depth).unwrap();
    writeln!(f, "/// Take the configured line pin out of the peripherals").unwrap();
    writeln!(
        f,
        "macro_rules! take_line_pin {{ ($p:expr) => {{ gcpad_hal_rp2040::take_pin!($p, {}) }}; }}",
        config.gpio
    )
    .unwrap();
}

/// Abort the build with a boxed list of errors
fn fail(errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: Invalid controller.toml                                  ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        errors
            .iter()
            .map(|e| {
                let line = if e.len() > 62 {
                    format!("{}...", &e[..59])
                } else {
                    e.clone()
                };
                format!("║  • {:<62} ║", line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
