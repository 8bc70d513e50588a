use pagepress_core::CaptureError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BROWSER_URL: &str = "http://127.0.0.1:9222";

/// Upper bound accepted for any configured timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Hard cap on the whole settle wait
    #[serde(with = "humantime_serde")]
    pub page_load: Duration,
    /// Quiet window after the last in-flight request completes
    #[serde(with = "humantime_serde")]
    pub ajax_load_check: Duration,
    #[serde(with = "humantime_serde")]
    pub check_interval: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            page_load: Duration::from_millis(60000),
            ajax_load_check: Duration::from_millis(500),
            check_interval: Duration::from_millis(100),
        }
    }
}

impl TimeoutConfig {
    pub fn with_page_load(mut self, ms: u64) -> Self {
        self.page_load = Duration::from_millis(ms);
        self
    }

    pub fn with_ajax_load_check(mut self, ms: u64) -> Self {
        self.ajax_load_check = Duration::from_millis(ms);
        self
    }

    pub fn fast() -> Self {
        Self {
            page_load: Duration::from_millis(20000),
            ajax_load_check: Duration::from_millis(250),
            check_interval: Duration::from_millis(50),
        }
    }

    pub fn patient() -> Self {
        Self {
            page_load: Duration::from_millis(120000),
            ajax_load_check: Duration::from_millis(2000),
            check_interval: Duration::from_millis(250),
        }
    }
}

/// Print options forwarded to `Page.printToPDF`. All off means browser defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptions {
    pub landscape: bool,
    pub print_background: bool,
    pub prefer_css_page_size: bool,
}

/// Process-wide settings, read once at startup and never mutated during a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// DevTools endpoint, either `http://host:port` or a `ws://` debugger url
    pub browser_url: String,
    pub timeouts: TimeoutConfig,
    pub pdf: PdfOptions,
    /// Verbose per-request logging and browser version query
    pub logging: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            browser_url: DEFAULT_BROWSER_URL.to_string(),
            timeouts: TimeoutConfig::default(),
            pdf: PdfOptions::default(),
            logging: false,
        }
    }
}

impl CaptureConfig {
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CaptureError> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| CaptureError::config_error(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CaptureError::config_error(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        let t = &self.timeouts;
        if t.page_load.is_zero() {
            return Err(CaptureError::config_error("timeouts.page_load must be non-zero"));
        }
        if t.check_interval.is_zero() {
            return Err(CaptureError::config_error("timeouts.check_interval must be non-zero"));
        }
        for (name, value) in [
            ("page_load", t.page_load),
            ("ajax_load_check", t.ajax_load_check),
            ("check_interval", t.check_interval),
        ] {
            if value > MAX_TIMEOUT {
                return Err(CaptureError::config_error(format!(
                    "timeouts.{} must not exceed {:?}",
                    name, MAX_TIMEOUT
                )));
            }
        }
        if self.browser_url.trim().is_empty() {
            return Err(CaptureError::config_error("browser_url must not be empty"));
        }
        Ok(())
    }
}
