//! Alarm button task
//!
//! Watches the active-low alarm button and raises [`ALARM_TRIGGERED`].
//! The process task picks the flag up on its next tick; the process
//! manager itself is never touched from here.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use crate::channels::ALARM_TRIGGERED;

/// Debounce time in milliseconds
const DEBOUNCE_MS: u64 = 30;

/// Alarm button task
#[embassy_executor::task]
pub async fn alarm_button_task(mut button: Input<'static>) {
    info!("Alarm button task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after_millis(DEBOUNCE_MS).await;

        if button.is_low() {
            warn!("Alarm button pressed");
            ALARM_TRIGGERED.signal(());
        }

        button.wait_for_high().await;
        Timer::after_millis(DEBOUNCE_MS).await;
    }
}
