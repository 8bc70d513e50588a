//! Request boundary: decodes the incoming URL once, runs a capture, shapes the reply.

use pagepress_core::{CaptureError, CaptureJob, CaptureReport, CaptureWorker, ErrorCategory};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintRequest {
    /// Percent-encoded target URL
    pub url: String,
}

/// Gateway-style response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrintResponse {
    pub is_base64_encoded: bool,
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl PrintResponse {
    pub fn from_report(report: &CaptureReport) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/pdf".to_string()),
            (
                "Content-Disposition".to_string(),
                "inline;filename='report.pdf'".to_string(),
            ),
        ]);
        Self {
            is_base64_encoded: true,
            status_code: 200,
            body: report.pdf.to_base64(),
            headers,
        }
    }

    pub fn from_error(err: &CaptureError) -> Self {
        let status_code = match err.category {
            ErrorCategory::InvalidInput => 400,
            ErrorCategory::Connection => 503,
            _ => 502,
        };
        let body = json!({
            "error": "Unable to capture pdf",
            "category": err.category,
            "stage": err.stage,
            "message": err.message,
        });
        let headers = BTreeMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]);
        Self {
            is_base64_encoded: false,
            status_code,
            body: body.to_string(),
            headers,
        }
    }
}

/// Percent-decodes `encoded` and checks it is an absolute URL.
pub fn decode_url(encoded: &str) -> Result<String, CaptureError> {
    let decoded = urlencoding::decode(encoded)
        .map_err(|e| CaptureError::invalid_input(format!("URL is not valid UTF-8 after decoding: {}", e)))?
        .into_owned();

    let parsed = url::Url::parse(&decoded).map_err(|e| {
        CaptureError::invalid_input(format!("Not an absolute URL: {}", e))
            .with_context(json!({ "url": decoded }))
    })?;
    if parsed.cannot_be_a_base() && parsed.scheme() != "data" {
        return Err(CaptureError::invalid_input(format!("Unsupported URL: {}", decoded)));
    }
    Ok(decoded)
}

pub async fn print_pdf<W>(worker: &W, request: &PrintRequest) -> Result<CaptureReport, CaptureError>
where
    W: CaptureWorker + ?Sized,
{
    let url = decode_url(&request.url)?;
    info!(url = %url, "processing pdf capture");

    let job = CaptureJob::new(url);
    worker.capture(&job).await.map_err(|e| {
        error!(url = %job.url, error = %e, "error capturing pdf");
        e
    })
}

/// Like [`print_pdf`] but always produces a response, success or not.
pub async fn handle<W>(worker: &W, request: &PrintRequest) -> PrintResponse
where
    W: CaptureWorker + ?Sized,
{
    match print_pdf(worker, request).await {
        Ok(report) => PrintResponse::from_report(&report),
        Err(e) => PrintResponse::from_error(&e),
    }
}
