//! Narrow view of the DevTools protocol the capture path depends on.
//!
//! [`DevtoolsTransport`] opens targets and sessions, [`DevtoolsSession`] issues the
//! handful of commands a capture needs and exposes page lifecycle events as a single
//! stream. The chromiumoxide-backed implementation lives in
//! [`crate::worker::chromium`].

use async_trait::async_trait;
use futures::stream::BoxStream;
use pagepress_core::CaptureError;

use crate::shared::PdfOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub url: String,
    pub method: String,
}

/// Page lifecycle events the settle detector consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// `Network.requestWillBeSent`
    RequestStarted { request_id: String, request: RequestInfo },
    /// `Network.loadingFinished`
    RequestFinished { request_id: String },
    /// `Network.loadingFailed`
    RequestFailed { request_id: String, error_text: String },
    /// `Page.loadEventFired`
    LoadEventFired,
}

pub type PageEventStream = BoxStream<'static, PageEvent>;

#[async_trait]
pub trait DevtoolsTransport: Send + Sync {
    type Target: Send + Sync;
    type Session: DevtoolsSession;

    /// Creates a new blank navigable target.
    async fn open_target(&self) -> Result<Self::Target, CaptureError>;

    async fn open_session(&self, target: &Self::Target) -> Result<Self::Session, CaptureError>;

    /// Releases a target whose session never opened.
    async fn close_target(&self, target: Self::Target) -> Result<(), CaptureError>;
}

#[async_trait]
pub trait DevtoolsSession: Send + Sync + Sized {
    /// Subscribes to request and load events. Events emitted before this call are lost.
    async fn subscribe(&self) -> Result<PageEventStream, CaptureError>;

    async fn enable_network(&self) -> Result<(), CaptureError>;

    async fn enable_page(&self) -> Result<(), CaptureError>;

    /// Resolves once the browser acknowledges the navigation, not when it loads.
    async fn navigate(&self, url: &str) -> Result<(), CaptureError>;

    async fn print_to_pdf(&self, options: &PdfOptions) -> Result<Vec<u8>, CaptureError>;

    /// Consumes the session so it cannot be closed twice.
    async fn close(self) -> Result<(), CaptureError>;
}
