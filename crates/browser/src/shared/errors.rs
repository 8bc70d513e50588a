use pagepress_core::{CaptureError, CaptureStage};

/// Classifies a raw transport error raised while the attempt was in `stage`.
pub fn to_capture_error(e: impl std::fmt::Display, stage: CaptureStage) -> CaptureError {
    let s = e.to_string();
    let lower = s.to_ascii_lowercase();
    let err = if lower.contains("connection") || lower.contains("websocket") || lower.contains("channel closed") {
        CaptureError::connection_error(format!("{:?}: browser connection lost: {}", stage, s))
    } else {
        match stage {
            CaptureStage::Created | CaptureStage::TargetOpened | CaptureStage::SessionOpened => {
                CaptureError::session_error(format!("{:?}: {}", stage, s))
            }
            CaptureStage::DomainsEnabled | CaptureStage::Navigating | CaptureStage::AwaitingSettle => {
                CaptureError::navigation_error(format!("Navigation failed: {}", s))
            }
            CaptureStage::Capturing => CaptureError::capture_error(format!("Print to PDF failed: {}", s)),
            CaptureStage::Closed => CaptureError::teardown_error(format!("Close failed: {}", s)),
        }
    };
    err.at_stage(stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepress_core::ErrorCategory;

    #[test]
    fn classifies_by_stage() {
        let cases = [
            (CaptureStage::Created, ErrorCategory::Session),
            (CaptureStage::SessionOpened, ErrorCategory::Session),
            (CaptureStage::Navigating, ErrorCategory::Navigation),
            (CaptureStage::Capturing, ErrorCategory::Capture),
            (CaptureStage::Closed, ErrorCategory::Teardown),
        ];
        for (stage, category) in cases {
            let err = to_capture_error("command rejected", stage);
            assert_eq!(err.category, category, "stage {:?}", stage);
            assert_eq!(err.stage, Some(stage));
        }
    }

    #[test]
    fn connection_loss_wins_over_stage() {
        let err = to_capture_error("WebSocket protocol error: Connection reset", CaptureStage::Capturing);
        assert_eq!(err.category, ErrorCategory::Connection);
        assert_eq!(err.stage, Some(CaptureStage::Capturing));
    }
}
