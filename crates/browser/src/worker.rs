pub mod chromium;
mod capture;

pub use capture::PdfCapturer;
pub use chromium::ChromiumWorker;
