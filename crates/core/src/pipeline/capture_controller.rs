use std::cell::RefCell;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex};

use crate::capture::domain::frame_source::FrameSource;
use crate::classification::domain::classification_outcome::ClassificationOutcome;
use crate::classification::domain::spoof_classifier::SpoofClassifier;
use crate::pipeline::cycle_error::CycleError;
use crate::pipeline::detection_observer::DetectionObserver;
use crate::pipeline::scheduler::{Scheduler, TickFn};
use crate::pipeline::session::{Session, SessionSnapshot, SessionStatus};
use crate::shared::constants::{INITIAL_DELAY, PERIOD};
use crate::shared::settings::Settings;

/// Timing of the periodic schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub initial_delay: Duration,
    pub period: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_DELAY,
            period: PERIOD,
        }
    }
}

impl From<&Settings> for ControllerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            initial_delay: settings.initial_delay(),
            period: settings.period(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Manual,
    /// Fired by the schedule armed under the given generation.
    Periodic(u64),
}

/// Drives capture → classify → publish cycles on a fixed period.
///
/// At most one classification call is outstanding at any time: a cycle that
/// starts while a call is pending is a no-op. Each call is tagged with the
/// session generation it was issued under, and completions from an earlier
/// generation (anything dispatched before the last `stop()`/`reset()`) are
/// dropped without reaching the observer.
///
/// The controller never fails across its public operations. Capture and
/// classification failures are reported through
/// [`DetectionObserver::on_error`] and the next cycle proceeds normally.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct CaptureController {
    inner: Arc<Inner>,
}

struct Inner {
    // Re-entrant so observers may call back into the controller while a
    // delivery holds the lock. The RefCell is never borrowed across a call
    // into an observer.
    session: ReentrantMutex<RefCell<Session>>,
    frame_source: Mutex<Box<dyn FrameSource>>,
    classifier: Arc<dyn SpoofClassifier>,
    observer: Arc<dyn DetectionObserver>,
    scheduler: Arc<dyn Scheduler>,
    config: ControllerConfig,
}

impl CaptureController {
    pub fn new(
        frame_source: Box<dyn FrameSource>,
        classifier: Arc<dyn SpoofClassifier>,
        observer: Arc<dyn DetectionObserver>,
        scheduler: Arc<dyn Scheduler>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: ReentrantMutex::new(RefCell::new(Session::new())),
                frame_source: Mutex::new(frame_source),
                classifier,
                observer,
                scheduler,
                config,
            }),
        }
    }

    /// Arms the periodic schedule: the first cycle runs after
    /// `initial_delay`, then one every `period`. Clears the previous
    /// result, error and frame. No-op when already armed.
    pub fn start(&self) {
        let inner = &self.inner;
        let guard = inner.session.lock();
        let generation = {
            let session = guard.borrow();
            if session.is_armed() {
                log::debug!("start() ignored: already armed");
                return;
            }
            session.generation()
        };

        let weak: Weak<Inner> = Arc::downgrade(inner);
        let tick: TickFn = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::run_cycle(&inner, Trigger::Periodic(generation));
            }
        });
        let schedule =
            inner
                .scheduler
                .schedule_repeating(inner.config.initial_delay, inner.config.period, tick);

        guard.borrow_mut().arm(schedule);
        log::info!(
            "Detection armed: first cycle in {:?}, then every {:?}",
            inner.config.initial_delay,
            inner.config.period
        );
    }

    /// Cancels the schedule and fences every outstanding call. Safe from
    /// any state.
    pub fn stop(&self) {
        let guard = self.inner.session.lock();
        let mut session = guard.borrow_mut();
        let was_busy = session.status() != SessionStatus::Idle;
        let was_armed = session.disarm();
        if was_armed || was_busy {
            log::info!("Detection stopped (generation {})", session.generation());
        }
    }

    /// Runs one cycle now. No-op while a classification is outstanding.
    pub fn trigger_once(&self) {
        Inner::run_cycle(&self.inner, Trigger::Manual);
    }

    /// `stop()` followed by clearing the last result, error and frame.
    /// Does not restart.
    pub fn reset(&self) {
        let guard = self.inner.session.lock();
        self.stop();
        guard.borrow_mut().clear_outputs();
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.session.lock().borrow().status()
    }

    pub fn is_armed(&self) -> bool {
        self.inner.session.lock().borrow().is_armed()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.session.lock().borrow().snapshot()
    }

    pub fn config(&self) -> ControllerConfig {
        self.inner.config
    }
}

impl Inner {
    fn run_cycle(this: &Arc<Self>, trigger: Trigger) {
        let guard = this.session.lock();
        {
            let mut session = guard.borrow_mut();
            if let Trigger::Periodic(generation) = trigger {
                if !session.is_armed() || session.generation() != generation {
                    return;
                }
            }
            if !session.begin_cycle() {
                log::debug!("{trigger:?} cycle skipped: classification in flight");
                return;
            }
        }

        let captured = this.frame_source.lock().capture_frame();
        let Some(frame) = captured else {
            guard.borrow_mut().capture_failed();
            let error = CycleError::CaptureFailure;
            log::warn!("{trigger:?} cycle: {error}");
            this.observer.on_error(&error.to_string());
            return;
        };

        let frame = Arc::new(frame);
        let generation = guard.borrow_mut().dispatch(Arc::clone(&frame));
        log::debug!(
            "{trigger:?} cycle: classifying frame {} (generation {generation})",
            frame.index()
        );

        let weak = Arc::downgrade(this);
        let classifier = Arc::clone(&this.classifier);
        this.scheduler.spawn(Box::pin(async move {
            let result = classifier.classify(frame).await.map_err(CycleError::from);
            if let Some(inner) = weak.upgrade() {
                inner.complete(generation, result);
            }
        }));
    }

    fn complete(&self, generation: u64, result: Result<ClassificationOutcome, CycleError>) {
        let guard = self.session.lock();
        let accepted = guard.borrow_mut().complete(generation, &result);
        if !accepted {
            log::debug!("Dropping stale completion from generation {generation}");
            return;
        }

        match result {
            Ok(outcome) => self.observer.on_result(&outcome),
            Err(error) => {
                log::warn!("Classification failed: {error}");
                self.observer.on_error(&error.to_string());
            }
        }
    }
}
