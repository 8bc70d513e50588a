use pagepress_browser::{CaptureConfig, ChromiumWorker, PrintRequest, TimeoutConfig, handler};

// Expects Chrome started with --remote-debugging-port=9222
#[tokio::main]
async fn main() {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    let config = CaptureConfig::default()
        .with_timeouts(TimeoutConfig::fast())
        .with_logging(true);

    let worker = match ChromiumWorker::connect(config).await {
        Ok(worker) => worker,
        Err(e) => {
            eprintln!("Failed to connect: {}", e);
            std::process::exit(1);
        }
    };

    let response = handler::handle(&worker, &PrintRequest { url }).await;
    println!(
        "status {} ({} base64 chars)",
        response.status_code,
        response.body.len()
    );
}
