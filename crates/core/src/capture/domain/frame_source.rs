use crate::shared::frame::Frame;

/// Domain interface for whatever produces camera frames.
///
/// Capture is synchronous and never suspends. `None` means no frame is
/// available right now (camera not ready, device busy). Opening and closing
/// the physical device is the caller's business, not the controller's.
pub trait FrameSource: Send {
    fn capture_frame(&mut self) -> Option<Frame>;
}
