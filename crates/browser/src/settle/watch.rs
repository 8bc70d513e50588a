use futures::StreamExt;
use pagepress_core::SettleOutcome;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, warn};

use super::SettleDetector;
use crate::protocol::{PageEvent, PageEventStream};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleReport {
    pub outcome: SettleOutcome,
    pub page_loaded: bool,
    pub pending_requests: usize,
    pub elapsed: Duration,
}

/// Feeds `events` into `detector` and polls it every `check_interval` until it resolves.
///
/// Keeps polling after the event stream ends so a dead session still hits the
/// deadline. The ticker is owned by this future and goes away with it.
pub async fn wait_for_settle(
    mut detector: SettleDetector,
    mut events: PageEventStream,
    check_interval: Duration,
    log_requests: bool,
) -> SettleReport {
    let start = Instant::now();
    let mut ticker = interval(check_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut events_open = true;

    loop {
        tokio::select! {
            event = events.next(), if events_open => match event {
                Some(event) => {
                    if log_requests {
                        log_event(&event);
                    }
                    detector.observe(event, Instant::now());
                }
                None => {
                    debug!("event stream closed, waiting on deadline");
                    events_open = false;
                }
            },
            _ = ticker.tick() => {
                let Some(outcome) = detector.poll(Instant::now()) else {
                    continue;
                };
                let elapsed = start.elapsed();
                match outcome {
                    SettleOutcome::Settled => {
                        debug!(elapsed_ms = elapsed.as_millis() as u64, "page settled");
                    }
                    SettleOutcome::TimedOut => {
                        warn!(
                            page_loaded = detector.page_loaded(),
                            pending = ?detector.pending_urls(),
                            "timeout waiting for page to settle"
                        );
                    }
                }
                return SettleReport {
                    outcome,
                    page_loaded: detector.page_loaded(),
                    pending_requests: detector.pending_count(),
                    elapsed,
                };
            }
        }
    }
}

fn log_event(event: &PageEvent) {
    match event {
        PageEvent::RequestStarted { request_id, request } => {
            debug!(request_id = %request_id, method = %request.method, url = %request.url, "requesting");
        }
        PageEvent::RequestFailed { request_id, error_text } => {
            debug!(request_id = %request_id, error = %error_text, "request failed");
        }
        PageEvent::RequestFinished { .. } => {}
        PageEvent::LoadEventFired => debug!("load event fired"),
    }
}
