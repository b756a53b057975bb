//! Host UART receive task
//!
//! Reassembles frames from the host and queues decoded requests for the
//! process task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use labseq_protocol::{ErrorReason, FrameParser, MessageError, Request, Response};

use crate::channels::{REQUEST_CHANNEL, RESPONSE_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Host RX task - receives and parses frames from the host
#[embassy_executor::task]
pub async fn host_rx_task(mut rx: BufferedUartRx) {
    info!("Host RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match Request::from_frame(&frame) {
                            // Waits when the process task is behind; the
                            // UART buffer absorbs the backlog
                            Ok(request) => REQUEST_CHANNEL.send(request).await,
                            Err(e) => {
                                warn!("Rejected frame {:#x}: {:?}", frame.code, e);
                                let reason = match e {
                                    MessageError::Truncated => ErrorReason::Malformed,
                                    MessageError::UnknownCode(_) => ErrorReason::Unsupported,
                                };
                                let reply = Response::Error {
                                    code: frame.code,
                                    reason,
                                };
                                if RESPONSE_CHANNEL.try_send(reply).is_err() {
                                    warn!("Response channel full, dropping reply");
                                }
                            }
                        },
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Frame parse error: {:?}", e);
                            if RESPONSE_CHANNEL.try_send(Response::corrupt_frame()).is_err() {
                                warn!("Response channel full, dropping reply");
                            }
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
