//! gcpad - GameCube controller poller firmware
//!
//! Polls a GameCube controller over its single-wire Joybus line from an
//! RP2040 and logs the decoded pad state over RTT.
//!
//! Line GPIO, poll period and queue depth come from `controller.toml`,
//! validated at build time.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use gcpad_core::PollerConfig;
use gcpad_drivers::Joybus;
use gcpad_hal_rp2040::pins::GPIO_COUNT;
use gcpad_hal_rp2040::{Rp2040Line, SysTickClock};

#[macro_use]
mod config;
mod channels;
mod tasks;

const _: () = core::assert!(config::LINE_GPIO < GPIO_COUNT);

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("gcpad firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // SysTick is the fine-grained bit clock; embassy-time keeps the TIMER
    let core = unwrap!(cortex_m::Peripherals::take());
    let core_hz = embassy_rp::clocks::clk_sys_freq();
    let clock = SysTickClock::new(core.SYST, core_hz);
    info!("SysTick clock running at {} Hz", core_hz);

    let line = Rp2040Line::new(take_line_pin!(p), clock);
    let port = Joybus::new(line);
    info!("Joybus line on GPIO{}", config::LINE_GPIO);

    let poller_config = match PollerConfig::new(config::POLL_PERIOD_US) {
        Ok(cfg) => cfg,
        Err(e) => {
            // build.rs checks the same bounds, so this only trips if they drift apart
            error!("Invalid poll period: {}", e);
            warn!("Using default poller configuration");
            PollerConfig::default()
        }
    };

    // Spawn tasks
    spawner.spawn(tasks::poller_task(port, poller_config)).unwrap();
    spawner.spawn(tasks::report_task()).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
