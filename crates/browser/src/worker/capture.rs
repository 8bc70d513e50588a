use async_trait::async_trait;
use futures::future::Either;
use pagepress_core::{
    CaptureError, CaptureJob, CaptureReport, CaptureStage, CaptureWorker, PdfArtifact,
};
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::protocol::{DevtoolsSession, DevtoolsTransport};
use crate::settle::{SettleDetector, SettleReport, wait_for_settle};
use crate::shared::CaptureConfig;

/// Runs capture attempts against one transport.
///
/// Each attempt walks `Created -> TargetOpened -> SessionOpened -> DomainsEnabled ->
/// Navigating -> AwaitingSettle -> Capturing -> Closed`. Once a session is open it is
/// closed exactly once whatever happens; if the session never opens the target is
/// closed instead.
pub struct PdfCapturer<T: DevtoolsTransport> {
    transport: T,
    config: CaptureConfig,
}

impl<T: DevtoolsTransport> PdfCapturer<T> {
    pub fn new(transport: T, config: CaptureConfig) -> Result<Self, CaptureError> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn capture_url(&self, url: &str) -> Result<(PdfArtifact, SettleReport), CaptureError> {
        let target = self
            .transport
            .open_target()
            .await
            .map_err(|e| e.at_stage(CaptureStage::Created))?;
        debug!(url, "target opened");

        let session = match self.transport.open_session(&target).await {
            Ok(session) => session,
            Err(e) => {
                if let Err(close_err) = self.transport.close_target(target).await {
                    warn!(error = %close_err, "failed to close target after session error");
                }
                return Err(e.at_stage(CaptureStage::TargetOpened));
            }
        };
        debug!(url, "session opened");

        let result = self.drive(&session, url).await;

        if let Err(e) = session.close().await {
            warn!(error = %e, url, "failed to close devtools session");
        }
        debug!(url, ok = result.is_ok(), "session closed");

        result
    }

    async fn drive(
        &self,
        session: &T::Session,
        url: &str,
    ) -> Result<(PdfArtifact, SettleReport), CaptureError> {
        let timeouts = &self.config.timeouts;

        // Subscribe before enabling so no request slips past the detector.
        let events = session
            .subscribe()
            .await
            .map_err(|e| e.at_stage(CaptureStage::SessionOpened))?;
        let detector = SettleDetector::new(timeouts, Instant::now());
        let settle = wait_for_settle(detector, events, timeouts.check_interval, self.config.logging);
        let mut settle = std::pin::pin!(settle);

        // The deadline bounds the enable acknowledgments as well as navigation.
        let enabled = tokio::select! {
            enabled = async { tokio::try_join!(session.enable_network(), session.enable_page()) } => {
                enabled.map(|_| ())
            }
            report = &mut settle => Err(CaptureError::session_error(format!(
                "Domains not enabled before page load deadline ({:?})",
                report.outcome
            ))),
        };
        enabled.map_err(|e| e.at_stage(CaptureStage::SessionOpened))?;
        debug!(url, "network and page domains enabled");

        let first = tokio::select! {
            navigated = session.navigate(url) => Either::Left(navigated),
            report = &mut settle => Either::Right(report),
        };
        let report = match first {
            Either::Left(navigated) => {
                navigated.map_err(|e| e.at_stage(CaptureStage::Navigating))?;
                debug!(url, "navigation acknowledged, awaiting settle");
                settle.await
            }
            Either::Right(report) => {
                warn!(url, "settle wait resolved before navigation was acknowledged");
                report
            }
        };

        let bytes = session
            .print_to_pdf(&self.config.pdf)
            .await
            .map_err(|e| {
                e.at_stage(CaptureStage::Capturing).with_context(json!({
                    "url": url,
                    "settle": format!("{:?}", report.outcome),
                    "page_loaded": report.page_loaded,
                    "pending_requests": report.pending_requests,
                }))
            })?;

        Ok((PdfArtifact::new(bytes), report))
    }
}

#[async_trait]
impl<T: DevtoolsTransport> CaptureWorker for PdfCapturer<T> {
    async fn capture(&self, job: &CaptureJob) -> Result<CaptureReport, CaptureError> {
        let started = Instant::now();
        info!(job_id = %job.id, url = %job.url, "capturing pdf");

        match self.capture_url(&job.url).await {
            Ok((pdf, settle)) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                info!(
                    job_id = %job.id,
                    bytes = pdf.len(),
                    settle = ?settle.outcome,
                    elapsed_ms,
                    "pdf captured"
                );
                Ok(CaptureReport {
                    job_id: job.id.clone(),
                    url: job.url.clone(),
                    pdf,
                    settle: settle.outcome,
                    elapsed_ms,
                })
            }
            Err(e) => {
                error!(job_id = %job.id, url = %job.url, stage = ?e.stage, error = %e, "capture failed");
                Err(e)
            }
        }
    }
}
