//! Page-settle detection: a pure state machine plus the poll loop that drives it.

mod detector;
mod watch;

pub use detector::SettleDetector;
pub use watch::{SettleReport, wait_for_settle};
