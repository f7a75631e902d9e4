use tracing::{error, info, warn};

use crate::models::Status;

/// Consumer of the monitor's per-tick outputs. The original program fed a
/// tray icon; anything that can display an up/down signal, a status line and
/// the occasional error message can sit behind this.
pub trait StatusSink: Send {
    /// Called after every tick, throttled or not.
    fn update(&self, status: Status, text: &str);
    /// Called when a tick fails (log I/O or other unexpected error).
    fn report_error(&self, message: &str);
}

/// Default sink: routes status updates to the process log.
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn update(&self, status: Status, text: &str) {
        match status {
            Status::Up => info!("{}", text),
            Status::Down => warn!("{}", text),
        }
    }

    fn report_error(&self, message: &str) {
        error!("{}", message);
    }
}
