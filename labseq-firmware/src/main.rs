//! Labseq - Laboratory Instrument Sequencer Firmware
//!
//! Main firmware binary for RP2040-based lab controllers. A host loads
//! timed command sequences over UART; the board plays them back on its
//! digital outputs and preempts them with interrupt routines when the
//! alarm button is pressed.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use labseq_core::config::ProgramConfig;

mod channels;
mod clock;
mod program;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Boot program, borrowed by the process task
static PROGRAM: StaticCell<ProgramConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Labseq firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let program = PROGRAM.init(program::default_program());
    info!(
        "Boot program '{}': {} commands, main list {} ms",
        program.label.as_str(),
        program.command_count(),
        program.main_duration_us() / 1_000
    );

    // Host link on UART0 (GPIO0 = TX, GPIO1 = RX), 115200 baud
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        UartConfig::default(),
    );
    let (tx, rx) = uart.split();
    info!("UART initialized for host link");

    // Process outputs on GPIO2..GPIO5, all starting low
    let outputs = [
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
    ];

    // Alarm button to ground on GPIO15
    let alarm_button = Input::new(p.PIN_15, Pull::Up);

    // Spawn tasks
    spawner.spawn(tasks::host_rx_task(rx)).unwrap();
    spawner.spawn(tasks::host_tx_task(tx)).unwrap();
    spawner.spawn(tasks::outputs_task(outputs)).unwrap();
    spawner.spawn(tasks::alarm_button_task(alarm_button)).unwrap();
    spawner.spawn(tasks::process_task(program)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
