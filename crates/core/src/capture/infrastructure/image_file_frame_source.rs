use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

/// Serves a still image from disk as if it were a live camera.
///
/// The file is decoded again on every capture, so an external process can
/// overwrite it between cycles (e.g. a snapshot tool writing `latest.jpg`).
/// A missing or undecodable file reads as "no frame available".
pub struct ImageFileFrameSource {
    path: PathBuf,
    next_index: usize,
}

impl ImageFileFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            next_index: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileFrameSource {
    fn capture_frame(&mut self) -> Option<Frame> {
        let decoded = match image::open(&self.path) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                log::warn!("Cannot read frame from {}: {e}", self.path.display());
                return None;
            }
        };
        let frame = Frame::from_rgb_image(decoded, self.next_index);
        self.next_index += 1;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_image(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("snapshot.png");
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([50, 100, 200]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_capture_returns_rgb_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 40, 30);
        let mut source = ImageFileFrameSource::new(&path);

        let frame = source.capture_frame().unwrap();

        assert_eq!(frame.width(), 40);
        assert_eq!(frame.height(), 30);
        assert_eq!(frame.channels(), 3);
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_indices_increase_per_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 4, 4);
        let mut source = ImageFileFrameSource::new(&path);

        let first = source.capture_frame().unwrap();
        let second = source.capture_frame().unwrap();

        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
    }

    #[test]
    fn test_missing_file_yields_none() {
        let mut source = ImageFileFrameSource::new("/nonexistent/snapshot.png");
        assert!(source.capture_frame().is_none());
    }

    #[test]
    fn test_failed_capture_does_not_consume_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.png");
        let mut source = ImageFileFrameSource::new(&path);

        assert!(source.capture_frame().is_none());
        write_test_image(dir.path(), 4, 4);

        assert_eq!(source.capture_frame().unwrap().index(), 0);
    }

    #[test]
    fn test_picks_up_replaced_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 4, 4);
        let mut source = ImageFileFrameSource::new(&path);
        assert_eq!(source.capture_frame().unwrap().width(), 4);

        write_test_image(dir.path(), 8, 6);

        let frame = source.capture_frame().unwrap();
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.height(), 6);
    }
}
