use std::time::Duration;

/// Delay between `start()` and the first capture cycle.
pub const INITIAL_DELAY_MS: u64 = 1500;

/// Interval between consecutive periodic capture cycles.
pub const PERIOD_MS: u64 = 3000;

/// Round-trip latency the simulated classification backend pretends to have.
pub const SIMULATED_LATENCY_MS: u64 = 2000;

pub const INITIAL_DELAY: Duration = Duration::from_millis(INITIAL_DELAY_MS);
pub const PERIOD: Duration = Duration::from_millis(PERIOD_MS);
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(SIMULATED_LATENCY_MS);

/// Reported through `on_error` when the frame source has nothing to hand out.
pub const CAPTURE_FAILED_MESSAGE: &str = "Failed to capture image";

/// Reported by the simulated backend when it decides to fail a request.
pub const BACKEND_FAILED_MESSAGE: &str = "Failed to process face spoofing detection";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const SETTINGS_DIR_NAME: &str = "LivenessGuard";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Recent detections kept for the history view.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// First identifier handed out by the detection history (`det-1000`, ...).
pub const HISTORY_FIRST_ID: u64 = 1000;
