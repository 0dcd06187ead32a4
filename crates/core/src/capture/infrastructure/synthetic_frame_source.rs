use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

/// Generates a deterministic gradient test pattern instead of reading a camera.
///
/// `warmup` captures return `None` first, mimicking a webcam that has been
/// opened but has not delivered its first frame yet.
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    warmup_remaining: usize,
    next_index: usize,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            warmup_remaining: 0,
            next_index: 0,
        }
    }

    pub fn with_warmup(mut self, captures: usize) -> Self {
        self.warmup_remaining = captures;
        self
    }

    fn render(&self, index: usize) -> Vec<u8> {
        let w = self.width as usize;
        let h = self.height as usize;
        let shift = (index % 256) as u8;
        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                let r = ((x * 255) / w.max(1)) as u8;
                let g = ((y * 255) / h.max(1)) as u8;
                data.extend_from_slice(&[r, g, shift]);
            }
        }
        data
    }
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl FrameSource for SyntheticFrameSource {
    fn capture_frame(&mut self) -> Option<Frame> {
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            log::debug!(
                "Synthetic camera warming up ({} captures left)",
                self.warmup_remaining
            );
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        Some(Frame::new(
            self.render(index),
            self.width,
            self.height,
            3,
            index,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_warmup(0)]
    #[case::single(1)]
    #[case::several(3)]
    fn test_warmup_yields_none_exactly_n_times(#[case] warmup: usize) {
        let mut source = SyntheticFrameSource::new(4, 4).with_warmup(warmup);

        for _ in 0..warmup {
            assert!(source.capture_frame().is_none());
        }
        let frame = source.capture_frame().unwrap();

        assert_eq!(frame.index(), 0);
    }

    #[test]
    fn test_frame_dimensions() {
        let mut source = SyntheticFrameSource::new(16, 9);
        let frame = source.capture_frame().unwrap();
        assert_eq!(frame.width(), 16);
        assert_eq!(frame.height(), 9);
        assert_eq!(frame.byte_len(), 16 * 9 * 3);
    }

    #[test]
    fn test_consecutive_frames_differ() {
        let mut source = SyntheticFrameSource::new(4, 4);
        let a = source.capture_frame().unwrap();
        let b = source.capture_frame().unwrap();
        assert_eq!(b.index(), 1);
        assert_ne!(a.data(), b.data());
    }

    #[test]
    fn test_default_is_hd() {
        let source = SyntheticFrameSource::default();
        assert_eq!((source.width, source.height), (1280, 720));
    }
}
