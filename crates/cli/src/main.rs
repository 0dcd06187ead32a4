use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{Receiver, RecvTimeoutError};

use liveness_guard_core::capture::domain::frame_source::FrameSource;
use liveness_guard_core::capture::infrastructure::image_file_frame_source::ImageFileFrameSource;
use liveness_guard_core::capture::infrastructure::synthetic_frame_source::SyntheticFrameSource;
use liveness_guard_core::classification::infrastructure::simulated_classifier::SimulatedClassifier;
use liveness_guard_core::pipeline::capture_controller::{CaptureController, ControllerConfig};
use liveness_guard_core::pipeline::detection_history::DetectionHistory;
use liveness_guard_core::pipeline::detection_observer::{FanoutObserver, LogDetectionObserver};
use liveness_guard_core::pipeline::detection_stats::DetectionStats;
use liveness_guard_core::pipeline::infrastructure::channel_observer::{
    ChannelObserver, DetectionEvent,
};
use liveness_guard_core::pipeline::infrastructure::tokio_scheduler::TokioScheduler;
use liveness_guard_core::shared::constants::{DEFAULT_HISTORY_LIMIT, IMAGE_EXTENSIONS};
use liveness_guard_core::shared::settings::Settings;

/// Periodic face spoofing detection against a still image or a test pattern.
#[derive(Parser)]
#[command(name = "liveness-guard")]
struct Cli {
    /// Still image re-read on every capture (defaults to a synthetic pattern).
    #[arg(long)]
    image: Option<PathBuf>,

    /// Number of initial captures that report "camera not ready".
    #[arg(long, default_value = "0")]
    warmup: usize,

    /// Delay before the first periodic cycle, in milliseconds.
    #[arg(long)]
    initial_delay_ms: Option<u64>,

    /// Interval between periodic cycles, in milliseconds.
    #[arg(long)]
    period_ms: Option<u64>,

    /// Simulated backend latency, in milliseconds.
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Probability (0.0-1.0) that a simulated classification fails.
    #[arg(long)]
    failure_rate: Option<f64>,

    /// Seed for reproducible simulated verdicts.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many published results or errors.
    #[arg(long, default_value = "5")]
    cycles: usize,

    /// Stop after this many seconds even if fewer cycles completed.
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Run one detection immediately before arming the schedule.
    #[arg(long)]
    detect_now: bool,

    /// Number of recent detections listed after the summary.
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    history: usize,

    /// Print events as JSON lines.
    #[arg(long)]
    json: bool,

    /// Persist the effective timing and simulation settings.
    #[arg(long)]
    save_settings: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = effective_settings(&cli);
    if cli.save_settings {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()?;

    let mut classifier = SimulatedClassifier::new(settings.simulated_latency())
        .with_failure_rate(settings.failure_rate);
    if let Some(seed) = cli.seed {
        classifier = classifier.with_seed(seed);
    }

    let stats = Arc::new(DetectionStats::new());
    let history = Arc::new(DetectionHistory::new(cli.history));
    let (channel, events) = ChannelObserver::unbounded();
    let observer = FanoutObserver::new()
        .with(Arc::new(channel))
        .with(stats.clone())
        .with(history.clone())
        .with(Arc::new(LogDetectionObserver));

    let controller = CaptureController::new(
        build_frame_source(&cli),
        Arc::new(classifier),
        Arc::new(observer),
        Arc::new(TokioScheduler::new(runtime.handle().clone())),
        ControllerConfig::from(&settings),
    );

    if cli.detect_now {
        controller.trigger_once();
    }
    controller.start();

    let deadline = cli
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let published = consume(&events, cli.cycles, deadline, cli.json)?;

    controller.stop();
    log::info!("Stopped after {published} events");

    if cli.json {
        println!("{}", serde_json::to_string(&stats.report())?);
        let recent = serde_json::json!({
            "type": "history",
            "detections": history.recent(cli.history),
        });
        println!("{recent}");
    } else {
        if let Some(summary) = stats.summary_string() {
            println!("{summary}");
        }
        if let Some(recent) = history.summary_string(cli.history) {
            println!("{recent}");
        }
    }

    runtime.shutdown_timeout(Duration::from_millis(100));
    Ok(())
}

/// Prints events until `cycles` have arrived or `deadline` passes.
fn consume(
    events: &Receiver<DetectionEvent>,
    cycles: usize,
    deadline: Option<Instant>,
    json: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut published = 0;
    while published < cycles {
        let received = match deadline {
            Some(deadline) => events.recv_deadline(deadline),
            None => events.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let event = match received {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => break,
            Err(RecvTimeoutError::Disconnected) => {
                return Err("detection event channel closed".into())
            }
        };
        published += 1;
        print_event(&event, json);
    }
    Ok(published)
}

fn print_event(event: &DetectionEvent, json: bool) {
    match (event, json) {
        (DetectionEvent::Result(outcome), true) => {
            let line = serde_json::json!({ "type": "result", "outcome": outcome });
            println!("{line}");
        }
        (DetectionEvent::Error(message), true) => {
            let line = serde_json::json!({ "type": "error", "message": message });
            println!("{line}");
        }
        (DetectionEvent::Result(outcome), false) => {
            println!("{outcome}");
            if let Some(map) = outcome.attention_map() {
                for p in &map.highlights {
                    println!("  attention ({}, {}) {:.0}%", p.x, p.y, p.intensity * 100.0);
                }
            }
        }
        (DetectionEvent::Error(message), false) => println!("Error: {message}"),
    }
}

fn effective_settings(cli: &Cli) -> Settings {
    let mut settings = Settings::load();
    if let Some(ms) = cli.initial_delay_ms {
        settings.initial_delay_ms = ms;
    }
    if let Some(ms) = cli.period_ms {
        settings.period_ms = ms;
    }
    if let Some(ms) = cli.latency_ms {
        settings.simulated_latency_ms = ms;
    }
    if let Some(rate) = cli.failure_rate {
        settings.failure_rate = rate;
    }
    settings
}

fn build_frame_source(cli: &Cli) -> Box<dyn FrameSource> {
    match &cli.image {
        Some(path) => Box::new(ImageFileFrameSource::new(path.clone())),
        None => Box::new(SyntheticFrameSource::default().with_warmup(cli.warmup)),
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(image) = &cli.image {
        if !image.exists() {
            return Err(format!("Image file not found: {}", image.display()).into());
        }
        if !is_image(image) {
            return Err(format!(
                "Unsupported image format: {} (expected one of {})",
                image.display(),
                IMAGE_EXTENSIONS.join(", ")
            )
            .into());
        }
        if cli.warmup > 0 {
            return Err("--warmup only applies to the synthetic frame source".into());
        }
    }
    if cli.period_ms == Some(0) {
        return Err("Period must be at least 1ms".into());
    }
    if let Some(rate) = cli.failure_rate {
        if !(0.0..=1.0).contains(&rate) {
            return Err(format!("Failure rate must be between 0.0 and 1.0, got {rate}").into());
        }
    }
    if cli.cycles == 0 {
        return Err("Cycles must be at least 1".into());
    }
    if cli.duration_secs == Some(0) {
        return Err("Duration must be at least 1 second".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
