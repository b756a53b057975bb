//! Digital output task
//!
//! Executes commands started by the process manager. Each command whose
//! code is `WriteDigitalOutput` sets output `target` high when `data0` is
//! non-zero, low otherwise. Other codes have no device on this board and
//! are only logged.

use defmt::*;
use embassy_rp::gpio::Output;

use labseq_core::CommandData;
use labseq_protocol::FunctionCode;

use crate::channels::{DeviceAction, DEVICE_CHANNEL};

/// Number of digital outputs
pub const OUTPUT_COUNT: usize = 4;

/// Output task - drives the digital outputs
#[embassy_executor::task]
pub async fn outputs_task(mut outputs: [Output<'static>; OUTPUT_COUNT]) {
    info!("Output task started");

    all_off(&mut outputs);

    loop {
        match DEVICE_CHANNEL.receive().await {
            DeviceAction::Apply(command) => apply(&mut outputs, &command),
            DeviceAction::AllOff => all_off(&mut outputs),
        }
    }
}

fn apply(outputs: &mut [Output<'static>], command: &CommandData) {
    if command.code != FunctionCode::WriteDigitalOutput.to_byte() as i8 {
        debug!("No device for code {}", command.code);
        return;
    }

    let Some(pin) = usize::try_from(command.target)
        .ok()
        .and_then(|i| outputs.get_mut(i))
    else {
        warn!("No output {}", command.target);
        return;
    };

    if command.data0 != 0 {
        pin.set_high();
    } else {
        pin.set_low();
    }
    debug!("Output {} = {}", command.target, command.data0 != 0);
}

fn all_off(outputs: &mut [Output<'static>]) {
    for pin in outputs.iter_mut() {
        pin.set_low();
    }
}
