//! Controller state reporter
//!
//! Drains [`STATE_QUEUE`] and logs whenever the controller state changes.
//! A gap of [`DISCONNECT_TIMEOUT_MS`] without any state is reported as a
//! disconnect.

use defmt::*;
use embassy_time::{with_timeout, Duration};
use gcpad_core::ControllerState;

use crate::channels::STATE_QUEUE;

/// No state for this long means the controller is gone
pub const DISCONNECT_TIMEOUT_MS: u64 = 1_000;

/// Report task - logs state changes and connection transitions
#[embassy_executor::task]
pub async fn report_task() {
    info!("Report task started");

    let mut last: Option<ControllerState> = None;
    let mut dropped = 0u32;

    loop {
        match with_timeout(
            Duration::from_millis(DISCONNECT_TIMEOUT_MS),
            STATE_QUEUE.receive(),
        )
        .await
        {
            Ok(state) => {
                if last.is_none() {
                    info!("Controller connected");
                }

                if last != Some(state) {
                    debug!("Pad: {}", state);
                    last = Some(state);
                }
            }
            Err(_) => {
                if last.take().is_some() {
                    warn!("Controller disconnected");
                }
            }
        }

        let total = STATE_QUEUE.dropped();
        if total != dropped {
            warn!("Report task fell behind, {} states dropped", total - dropped);
            dropped = total;
        }
    }
}
