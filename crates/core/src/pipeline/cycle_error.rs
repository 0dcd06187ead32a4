use thiserror::Error;

use crate::classification::domain::spoof_classifier::ClassificationError;
use crate::shared::constants::CAPTURE_FAILED_MESSAGE;

/// Why a capture-classify cycle produced no outcome.
///
/// Neither kind is fatal: the controller reports it through
/// `DetectionObserver::on_error` and carries on with the next cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("{}", CAPTURE_FAILED_MESSAGE)]
    CaptureFailure,
    #[error(transparent)]
    ClassificationFailure(#[from] ClassificationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_failure_message() {
        assert_eq!(CycleError::CaptureFailure.to_string(), "Failed to capture image");
    }

    #[test]
    fn test_classification_message_passes_through() {
        let err: CycleError = ClassificationError::Backend("network error".into()).into();
        assert_eq!(err.to_string(), "network error");
    }
}
