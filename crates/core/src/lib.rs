use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single page-to-PDF request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureJob {
    pub id: String,
    /// Absolute, already decoded URL
    pub url: String,
}

impl CaptureJob {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.into(),
        }
    }

    pub fn with_id(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Binary PDF payload returned by the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfArtifact {
    pub bytes: Vec<u8>,
}

impl PdfArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn from_base64(data: &str) -> Result<Self, CaptureError> {
        STANDARD
            .decode(data)
            .map(Self::new)
            .map_err(|e| CaptureError::capture_error(format!("Invalid base64 PDF payload: {}", e)))
    }

    /// Cheap sanity check on the `%PDF-` magic header
    pub fn looks_like_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF-")
    }
}

/// How the wait for a settled page ended. Both variants proceed to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettleOutcome {
    /// Page loaded and stayed network-quiet for the whole quiet window
    Settled,
    /// Hard deadline reached first
    TimedOut,
}

/// Per-attempt lifecycle states, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureStage {
    Created,
    TargetOpened,
    SessionOpened,
    DomainsEnabled,
    Navigating,
    AwaitingSettle,
    Capturing,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReport {
    pub job_id: String,
    pub url: String,
    pub pdf: PdfArtifact,
    pub settle: SettleOutcome,
    pub elapsed_ms: u64,
}

/// Error categories, one per failure class of a capture attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Browser endpoint unreachable or connection dropped
    Connection,
    /// Target/session could not be opened, or a protocol domain could not be enabled
    Session,
    /// Navigate command rejected
    Navigation,
    /// Print-to-PDF failed
    Capture,
    /// Session or target close failed
    Teardown,
    /// Malformed request (bad URL encoding, relative URL)
    InvalidInput,
    /// Configuration could not be read or parsed
    Config,
    Unknown,
}

/// Structured error with the lifecycle stage it happened in
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("[{category:?}] {message}")]
pub struct CaptureError {
    pub category: ErrorCategory,
    pub message: String,
    /// Stage the attempt was in when it failed, if it got that far
    pub stage: Option<CaptureStage>,
    /// Optional context (url, request counts, underlying cause...)
    pub context: serde_json::Value,
}

impl CaptureError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            stage: None,
            context: serde_json::json!({}),
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn at_stage(mut self, stage: CaptureStage) -> Self {
        self.stage = Some(stage);
        self
    }

    // Convenience constructors
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Connection, message)
    }

    pub fn session_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Session, message)
    }

    pub fn navigation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message)
    }

    pub fn capture_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Capture, message)
    }

    pub fn teardown_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Teardown, message).at_stage(CaptureStage::Closed)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InvalidInput, message)
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Config, message)
    }
}

/// Anything that can turn a job into a PDF
#[async_trait]
pub trait CaptureWorker: Send + Sync {
    async fn capture(&self, job: &CaptureJob) -> Result<CaptureReport, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_category() {
        let err = CaptureError::session_error("Network.enable rejected");
        assert_eq!(err.to_string(), "[Session] Network.enable rejected");
        assert_eq!(err.stage, None);
    }

    #[test]
    fn teardown_errors_carry_closed_stage() {
        let err = CaptureError::teardown_error("target already gone");
        assert_eq!(err.category, ErrorCategory::Teardown);
        assert_eq!(err.stage, Some(CaptureStage::Closed));
    }

    #[test]
    fn at_stage_overrides_previous_stage() {
        let err = CaptureError::capture_error("printToPDF failed")
            .at_stage(CaptureStage::AwaitingSettle)
            .at_stage(CaptureStage::Capturing);
        assert_eq!(err.stage, Some(CaptureStage::Capturing));
    }

    #[test]
    fn error_serializes_with_context() {
        let err = CaptureError::navigation_error("boom")
            .at_stage(CaptureStage::Navigating)
            .with_context(serde_json::json!({ "url": "https://example.com" }));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["category"], "Navigation");
        assert_eq!(value["stage"], "Navigating");
        assert_eq!(value["context"]["url"], "https://example.com");
    }

    #[test]
    fn artifact_base64_matches_payload() {
        let pdf = PdfArtifact::new(b"%PDF-1.4 hello".to_vec());
        let encoded = pdf.to_base64();
        assert_eq!(encoded, "JVBERi0xLjQgaGVsbG8=");
        assert_eq!(PdfArtifact::from_base64(&encoded).unwrap(), pdf);
        assert!(pdf.looks_like_pdf());
    }

    #[test]
    fn artifact_rejects_bad_base64() {
        let err = PdfArtifact::from_base64("not base64!!").unwrap_err();
        assert_eq!(err.category, ErrorCategory::Capture);
    }

    #[test]
    fn jobs_get_distinct_ids() {
        let a = CaptureJob::new("https://example.com");
        let b = CaptureJob::new("https://example.com");
        assert_ne!(a.id, b.id);
        assert_eq!(a.url, "https://example.com");
    }

    struct EchoWorker;

    #[async_trait]
    impl CaptureWorker for EchoWorker {
        async fn capture(&self, job: &CaptureJob) -> Result<CaptureReport, CaptureError> {
            Ok(CaptureReport {
                job_id: job.id.clone(),
                url: job.url.clone(),
                pdf: PdfArtifact::new(b"%PDF-".to_vec()),
                settle: SettleOutcome::Settled,
                elapsed_ms: 0,
            })
        }
    }

    #[tokio::test]
    async fn worker_trait_is_object_safe() {
        let worker: Box<dyn CaptureWorker> = Box::new(EchoWorker);
        let job = CaptureJob::with_id("job-1", "https://example.com");
        let report = worker.capture(&job).await.unwrap();
        assert_eq!(report.job_id, "job-1");
        assert_eq!(report.settle, SettleOutcome::Settled);
    }
}
