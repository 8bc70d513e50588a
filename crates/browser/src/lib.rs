//! Renders web pages to PDF through a remote browser's DevTools protocol.
//!
//! A capture opens a blank target, subscribes to network and page events, navigates,
//! waits until the page has loaded *and* gone network-quiet for a grace period (or a
//! hard deadline passes), prints to PDF and always closes the session.
//!
//! - [`settle`] - settle detection state machine and poll loop
//! - [`protocol`] - transport/session traits the capture path is written against
//! - [`worker`] - the capture orchestrator and the chromiumoxide transport
//! - [`handler`] - request boundary (URL decoding, response shaping)

pub mod handler;
pub mod protocol;
pub mod settle;
pub mod shared;
pub mod worker;

pub use handler::{PrintRequest, PrintResponse, decode_url, print_pdf};
pub use protocol::{DevtoolsSession, DevtoolsTransport, PageEvent, PageEventStream, RequestInfo};
pub use settle::{SettleDetector, SettleReport, wait_for_settle};
pub use shared::{CaptureConfig, PdfOptions, TimeoutConfig};
pub use worker::chromium::{ChromiumSession, ChromiumTransport};
pub use worker::{ChromiumWorker, PdfCapturer};
