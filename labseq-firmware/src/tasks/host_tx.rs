//! Host UART transmit task

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use labseq_protocol::MAX_FRAME_SIZE;

use crate::channels::RESPONSE_CHANNEL;

/// Host TX task - encodes and sends replies
#[embassy_executor::task]
pub async fn host_tx_task(mut tx: BufferedUartTx) {
    info!("Host TX task started");

    let mut buf = [0u8; MAX_FRAME_SIZE];

    loop {
        let response = RESPONSE_CHANNEL.receive().await;

        let len = match response.to_frame().and_then(|frame| frame.encode(&mut buf)) {
            Ok(len) => len,
            Err(e) => {
                warn!("Failed to encode {:?}: {:?}", response, e);
                continue;
            }
        };

        match tx.write_all(&buf[..len]).await {
            Ok(()) => trace!("TX: {} bytes", len),
            Err(e) => warn!("UART write error: {:?}", e),
        }
    }
}
