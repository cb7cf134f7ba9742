//! Controller poller task
//!
//! Owns the Joybus line and feeds [`STATE_QUEUE`] at the configured rate.

use defmt::*;
use gcpad_core::PollerConfig;
use gcpad_drivers::{Joybus, Poller};
use gcpad_hal_rp2040::Rp2040Line;

use crate::channels::STATE_QUEUE;

/// Poller task - polls the controller once per period, forever
#[embassy_executor::task]
pub async fn poller_task(port: Joybus<Rp2040Line<'static>>, config: PollerConfig) {
    info!(
        "Poller task started ({} us period, {} Hz)",
        config.period_us(),
        config.rate_hz()
    );

    let mut poller = Poller::from_config(port, &STATE_QUEUE, &config);
    poller.run().await;
}
