//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod alarm_button;
pub mod host_rx;
pub mod host_tx;
pub mod outputs;
pub mod process;

pub use alarm_button::alarm_button_task;
pub use host_rx::host_rx_task;
pub use host_tx::host_tx_task;
pub use outputs::{outputs_task, OUTPUT_COUNT};
pub use process::process_task;
