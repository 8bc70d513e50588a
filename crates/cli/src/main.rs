use anyhow::{Context, Result};
use clap::Parser;
use pagepress_browser::{CaptureConfig, ChromiumWorker, PrintRequest, print_pdf};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "pagepress", about = "Render a web page to PDF through a running Chrome")]
struct Cli {
    /// URL to render (percent-encoded URLs are decoded once)
    url: String,
    /// Where to write the PDF (defaults to <host>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// DevTools endpoint, http://host:port or ws://... debugger url
    #[arg(long)]
    browser_url: Option<String>,
    /// Hard cap on the settle wait
    #[arg(long)]
    page_load_timeout_ms: Option<u64>,
    /// Quiet window after the last request completes
    #[arg(long)]
    ajax_timeout_ms: Option<u64>,
    #[arg(long)]
    landscape: bool,
    #[arg(long)]
    print_background: bool,
    /// Debug logging, including every network request
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> Result<CaptureConfig> {
        let mut config = match &self.config {
            Some(path) => CaptureConfig::load(path)?,
            None => CaptureConfig::default(),
        };
        if let Some(url) = &self.browser_url {
            config.browser_url = url.clone();
        }
        if let Some(ms) = self.page_load_timeout_ms {
            config.timeouts.page_load = Duration::from_millis(ms);
        }
        if let Some(ms) = self.ajax_timeout_ms {
            config.timeouts.ajax_load_check = Duration::from_millis(ms);
        }
        config.pdf.landscape |= self.landscape;
        config.pdf.print_background |= self.print_background;
        config.logging |= self.verbose;
        config.validate()?;
        Ok(config)
    }
}

fn default_output(url: &str) -> PathBuf {
    let host = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "page".to_string());
    PathBuf::from(format!("{}.pdf", host))
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

async fn write_pdf(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    init_tracing(config.logging);

    let worker = ChromiumWorker::connect(config)
        .await
        .context("could not reach the browser")?;

    let request = PrintRequest { url: cli.url.clone() };
    let report = print_pdf(&worker, &request)
        .await
        .context("unable to capture pdf")?;

    let output = cli.output.clone().unwrap_or_else(|| default_output(&report.url));
    write_pdf(&output, &report.pdf.bytes).await?;
    info!(
        path = %output.display(),
        bytes = report.pdf.len(),
        settle = ?report.settle,
        elapsed_ms = report.elapsed_ms,
        "pdf written"
    );

    Ok(())
}
