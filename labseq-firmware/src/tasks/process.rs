//! Process control loop
//!
//! Owns the process manager. Ticks it every millisecond, executes host
//! requests between ticks, and polls the alarm flag set by the button
//! task. Started commands are forwarded to the output task.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use labseq_core::config::ProgramConfig;
use labseq_core::dispatch::{handle_request, status};
use labseq_core::process::{EventForwarder, ProcessEvent, ProcessManager};
use labseq_core::timer::SoftTimer;
use labseq_core::{Clock, CommandData};
use labseq_protocol::{ErrorReason, FunctionCode, Request, Response};

use crate::channels::{
    DeviceAction, ALARM_TRIGGERED, DEVICE_CHANNEL, REQUEST_CHANNEL, RESPONSE_CHANNEL,
};
use crate::clock::EmbassyClock;
use crate::program::ALARM_VECTOR;

/// Main program capacity
pub const BUFFER_LEN: usize = 32;

/// Number of interrupt vectors
pub const VECTOR_COUNT: usize = 4;

/// Commands per interrupt vector
pub const VECTOR_LEN: usize = 8;

/// Control loop period in microseconds
pub const TICK_INTERVAL_US: u64 = 1_000;

/// Period of the status log line
const STATUS_INTERVAL_US: u32 = 5_000_000;

/// Process task - runs the sequencer
#[embassy_executor::task]
pub async fn process_task(program: &'static ProgramConfig) {
    info!("Process task started");

    let mut pm: ProcessManager<_, _, BUFFER_LEN, VECTOR_COUNT, VECTOR_LEN> =
        ProcessManager::new(EmbassyClock, EventForwarder(forward_event));

    match pm.load_program(program) {
        Ok(()) => info!(
            "Loaded program '{}' ({} commands)",
            program.label.as_str(),
            program.command_count()
        ),
        Err(e) => warn!("Program '{}' rejected: {:?}", program.label.as_str(), e),
    }

    let mut ticker = Ticker::every(Duration::from_micros(TICK_INTERVAL_US));
    let mut status_timer = SoftTimer::new(STATUS_INTERVAL_US);
    status_timer.start(pm.clock().now_us());

    loop {
        match select(REQUEST_CHANNEL.receive(), ticker.next()).await {
            Either::First(request) => {
                debug!("Request: {:?}", request);

                let response = match handle_request(&mut pm, &request) {
                    Response::Unhandled { code } => {
                        device_request(&request).unwrap_or(Response::Unhandled { code })
                    }
                    response => response,
                };

                if let Response::Error { code, reason } = response {
                    warn!("Request {:#x} failed: {:?}", code, reason);
                }
                if RESPONSE_CHANNEL.try_send(response).is_err() {
                    warn!("Response channel full, dropping reply");
                }
            }

            Either::Second(()) => {
                // Flag set from the button task, handled between ticks only
                if ALARM_TRIGGERED.signaled() {
                    ALARM_TRIGGERED.reset();
                    match pm.trigger_interrupt(ALARM_VECTOR) {
                        Ok(()) => info!("Alarm routine started"),
                        Err(e) => warn!("Alarm ignored: {:?}", e),
                    }
                }

                let started = pm.clock().now_us();
                pm.update();
                let took = pm.clock().elapsed_since(started);
                if u64::from(took) > TICK_INTERVAL_US {
                    warn!("Tick overran: update took {}us", took);
                }

                if status_timer.poll(pm.clock().now_us()) {
                    let s = status(&pm);
                    info!(
                        "Status: running={} vector={} code={} remaining={}us queued={}",
                        s.running,
                        s.vector,
                        s.code,
                        s.remaining_us,
                        pm.queued(0).unwrap_or(0)
                    );
                }
            }
        }
    }
}

/// Listener body: turn process notifications into device actions
fn forward_event(event: ProcessEvent) {
    trace!("Process event: {:?}", event);

    let action = match event {
        ProcessEvent::CommandStarted { command, vector } => {
            debug!("Command {} started on vector {}", command.code, vector);
            DeviceAction::Apply(command)
        }
        ProcessEvent::CommandEnded { .. } => return,
        ProcessEvent::ProcessEnded => {
            info!("Process ended");
            DeviceAction::AllOff
        }
    };

    if DEVICE_CHANNEL.try_send(action).is_err() {
        warn!("Device channel full, dropping {:?}", action);
    }
}

/// Execute a device request the process engine does not handle
///
/// Only direct output writes (`[target, level]`) are supported.
fn device_request(request: &Request) -> Option<Response> {
    let Request::Other { code, payload } = request else {
        return None;
    };
    if *code != FunctionCode::WriteDigitalOutput.to_byte() {
        return None;
    }

    let (Some(&target), Some(&level)) = (payload.first(), payload.get(1)) else {
        return Some(Response::Error {
            code: *code,
            reason: ErrorReason::Malformed,
        });
    };

    let command = CommandData::new(*code as i8, target as i8).with_data(u32::from(level != 0), 0);
    if DEVICE_CHANNEL.try_send(DeviceAction::Apply(command)).is_err() {
        return Some(Response::Error {
            code: *code,
            reason: ErrorReason::CapacityExceeded,
        });
    }
    Some(Response::Ack { code: *code })
}
