use pagepress_core::SettleOutcome;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::protocol::{PageEvent, RequestInfo};
use crate::shared::{MAX_TIMEOUT, TimeoutConfig};

// Unvalidated timeouts saturate instead of overflowing the clock.
fn after(now: Instant, wait: Duration) -> Instant {
    now.checked_add(wait).unwrap_or(now + MAX_TIMEOUT)
}

/// Decides when a page is loaded and network-quiet, or when to give up.
///
/// State only changes through [`observe`](Self::observe); [`poll`](Self::poll) is a
/// read-only check. Both take `now` explicitly so the logic runs without a clock.
#[derive(Debug)]
pub struct SettleDetector {
    pending: HashMap<String, RequestInfo>,
    page_loaded: bool,
    empty_request_cutoff: Option<Instant>,
    hard_deadline: Instant,
    quiet_window: Duration,
}

impl SettleDetector {
    pub fn new(timeouts: &TimeoutConfig, now: Instant) -> Self {
        Self {
            pending: HashMap::new(),
            page_loaded: false,
            empty_request_cutoff: None,
            hard_deadline: after(now, timeouts.page_load),
            quiet_window: timeouts.ajax_load_check,
        }
    }

    pub fn observe(&mut self, event: PageEvent, now: Instant) {
        match event {
            PageEvent::RequestStarted { request_id, request } => {
                self.pending.insert(request_id, request);
                self.empty_request_cutoff = None;
            }
            PageEvent::RequestFinished { request_id } | PageEvent::RequestFailed { request_id, .. } => {
                self.pending.remove(&request_id);
                if self.pending.is_empty() {
                    self.empty_request_cutoff = Some(after(now, self.quiet_window));
                }
            }
            PageEvent::LoadEventFired => {
                if self.page_loaded {
                    return;
                }
                self.page_loaded = true;
                // Nothing in flight at load: the quiet window starts now, so pages
                // that never issue a request still settle.
                if self.pending.is_empty() {
                    self.empty_request_cutoff = Some(after(now, self.quiet_window));
                }
            }
        }
    }

    pub fn poll(&self, now: Instant) -> Option<SettleOutcome> {
        let quiet = self.empty_request_cutoff.is_some_and(|cutoff| now > cutoff);
        if self.page_loaded && quiet {
            Some(SettleOutcome::Settled)
        } else if now > self.hard_deadline {
            Some(SettleOutcome::TimedOut)
        } else {
            None
        }
    }

    pub fn page_loaded(&self) -> bool {
        self.page_loaded
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.pending.values().map(|r| r.url.as_str()).collect();
        urls.sort_unstable();
        urls
    }

    pub fn empty_request_cutoff(&self) -> Option<Instant> {
        self.empty_request_cutoff
    }

    pub fn hard_deadline(&self) -> Instant {
        self.hard_deadline
    }
}
