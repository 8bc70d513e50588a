mod transport;

pub use transport::{ChromiumSession, ChromiumTransport};

use pagepress_core::CaptureError;

use super::PdfCapturer;
use crate::shared::CaptureConfig;

/// Capturer backed by a live Chromium over DevTools.
pub type ChromiumWorker = PdfCapturer<ChromiumTransport>;

impl ChromiumWorker {
    pub async fn connect(config: CaptureConfig) -> Result<Self, CaptureError> {
        config.validate()?;
        let transport = ChromiumTransport::connect(&config).await?;
        PdfCapturer::new(transport, config)
    }
}
