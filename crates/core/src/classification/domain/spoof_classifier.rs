use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::classification::domain::classification_outcome::ClassificationOutcome;
use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The backend failed; the message is shown to the user unchanged.
    #[error("{0}")]
    Backend(String),
    #[error("no face detected in the image")]
    NoFace,
}

/// Domain interface for the liveness / anti-spoofing backend.
///
/// The call may take arbitrarily long and cannot be aborted once issued.
/// Implementations only borrow the frame for the duration of the call.
#[async_trait]
pub trait SpoofClassifier: Send + Sync {
    async fn classify(&self, frame: Arc<Frame>) -> Result<ClassificationOutcome, ClassificationError>;
}
