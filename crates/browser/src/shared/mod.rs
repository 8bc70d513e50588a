pub mod errors;
pub mod config;

pub use config::{CaptureConfig, DEFAULT_BROWSER_URL, MAX_TIMEOUT, PdfOptions, TimeoutConfig};
pub use errors::to_capture_error;
