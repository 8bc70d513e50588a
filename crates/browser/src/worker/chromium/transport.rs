use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, EventLoadingFailed, EventLoadingFinished,
    EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::{
    EnableParams as PageEnableParams, EventLoadEventFired, NavigateParams, PrintToPdfParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use futures::stream::select_all;
use pagepress_core::{CaptureError, CaptureStage};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::protocol::{DevtoolsSession, DevtoolsTransport, PageEvent, PageEventStream, RequestInfo};
use crate::shared::{CaptureConfig, PdfOptions, to_capture_error};

/// DevTools transport over a browser that is already running.
pub struct ChromiumTransport {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumTransport {
    pub async fn connect(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let (browser, mut handler) = Browser::connect(config.browser_url.clone())
            .await
            .map_err(|e| {
                CaptureError::connection_error(format!(
                    "Connect to {} failed: {}",
                    config.browser_url, e
                ))
            })?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        if config.logging {
            match browser.version().await {
                Ok(version) => info!(
                    product = %version.product,
                    protocol = %version.protocol_version,
                    user_agent = %version.user_agent,
                    "CDP version info"
                ),
                Err(e) => warn!(error = %e, "CDP version query failed"),
            }
        }

        Ok(Self { browser, handler })
    }
}

impl Drop for ChromiumTransport {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl DevtoolsTransport for ChromiumTransport {
    type Target = Page;
    type Session = ChromiumSession;

    async fn open_target(&self) -> Result<Page, CaptureError> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| to_capture_error(e, CaptureStage::Created))
    }

    async fn open_session(&self, target: &Page) -> Result<ChromiumSession, CaptureError> {
        debug!(target_id = ?target.target_id(), "binding session to target");
        Ok(ChromiumSession { page: target.clone() })
    }

    async fn close_target(&self, target: Page) -> Result<(), CaptureError> {
        target
            .close()
            .await
            .map_err(|e| to_capture_error(e, CaptureStage::Closed))
    }
}

pub struct ChromiumSession {
    page: Page,
}

#[async_trait]
impl DevtoolsSession for ChromiumSession {
    async fn subscribe(&self) -> Result<PageEventStream, CaptureError> {
        let map_err = |e: CdpError| to_capture_error(e, CaptureStage::SessionOpened);

        let started = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(map_err)?
            .map(|e| PageEvent::RequestStarted {
                request_id: e.request_id.inner().clone(),
                request: RequestInfo {
                    url: e.request.url.clone(),
                    method: e.request.method.clone(),
                },
            })
            .boxed();
        let finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(map_err)?
            .map(|e| PageEvent::RequestFinished {
                request_id: e.request_id.inner().clone(),
            })
            .boxed();
        let failed = self
            .page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(map_err)?
            .map(|e| PageEvent::RequestFailed {
                request_id: e.request_id.inner().clone(),
                error_text: e.error_text.clone(),
            })
            .boxed();
        let loaded = self
            .page
            .event_listener::<EventLoadEventFired>()
            .await
            .map_err(map_err)?
            .map(|_| PageEvent::LoadEventFired)
            .boxed();

        Ok(select_all([started, finished, failed, loaded]).boxed())
    }

    async fn enable_network(&self) -> Result<(), CaptureError> {
        self.page
            .execute(NetworkEnableParams::default())
            .await
            .map(|_| ())
            .map_err(|e| to_capture_error(e, CaptureStage::SessionOpened))
    }

    async fn enable_page(&self) -> Result<(), CaptureError> {
        self.page
            .execute(PageEnableParams::default())
            .await
            .map(|_| ())
            .map_err(|e| to_capture_error(e, CaptureStage::SessionOpened))
    }

    async fn navigate(&self, url: &str) -> Result<(), CaptureError> {
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| to_capture_error(e, CaptureStage::Navigating))?;
        // The browser renders its own error page; capture proceeds with it. Only a
        // live browser reports `errorText`, so no test in this crate reaches this branch.
        if let Some(error_text) = &response.result.error_text {
            warn!(url, error = %error_text, "browser reported navigation error");
        }
        Ok(())
    }

    async fn print_to_pdf(&self, options: &PdfOptions) -> Result<Vec<u8>, CaptureError> {
        let params = PrintToPdfParams {
            landscape: Some(options.landscape),
            print_background: Some(options.print_background),
            prefer_css_page_size: Some(options.prefer_css_page_size),
            ..Default::default()
        };
        self.page
            .pdf(params)
            .await
            .map_err(|e| to_capture_error(e, CaptureStage::Capturing))
    }

    async fn close(self) -> Result<(), CaptureError> {
        self.page
            .close()
            .await
            .map_err(|e| to_capture_error(e, CaptureStage::Closed))
    }
}
