use std::fmt;
use std::sync::Arc;

use crate::classification::domain::classification_outcome::ClassificationOutcome;
use crate::pipeline::cycle_error::CycleError;
use crate::pipeline::scheduler::ScheduledTask;
use crate::shared::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Idle,
    /// The periodic schedule is active and no cycle is running.
    Armed,
    Capturing,
    AwaitingResult,
    /// Never entered by the controller: a failed cycle rests in its
    /// pre-cycle status and is reported through `last_error`. Accepts every
    /// operation `Idle` does.
    Error,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Armed => write!(f, "armed"),
            SessionStatus::Capturing => write!(f, "capturing"),
            SessionStatus::AwaitingResult => write!(f, "awaiting result"),
            SessionStatus::Error => write!(f, "error"),
        }
    }
}

/// State of one camera-detection lifecycle.
///
/// Pure bookkeeping: the controller owns timers, I/O and delivery, and
/// drives this struct through its transitions. `generation` changes on every
/// stop so completions issued earlier can be recognised as stale.
#[derive(Debug)]
pub struct Session {
    status: SessionStatus,
    generation: u64,
    schedule: Option<ScheduledTask>,
    last_captured_frame: Option<Arc<Frame>>,
    last_result: Option<ClassificationOutcome>,
    last_error: Option<String>,
}

/// Read-only copy of the session for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub armed: bool,
    pub generation: u64,
    pub last_captured_frame: Option<Arc<Frame>>,
    pub last_result: Option<ClassificationOutcome>,
    pub last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            generation: 0,
            schedule: None,
            last_captured_frame: None,
            last_result: None,
            last_error: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_armed(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn last_captured_frame(&self) -> Option<&Arc<Frame>> {
        self.last_captured_frame.as_ref()
    }

    pub fn last_result(&self) -> Option<&ClassificationOutcome> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            armed: self.is_armed(),
            generation: self.generation,
            last_captured_frame: self.last_captured_frame.clone(),
            last_result: self.last_result.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// Installs the periodic schedule and wipes previous outputs.
    ///
    /// A cycle already in flight keeps `AwaitingResult`; it settles into
    /// `Armed` when it completes.
    pub(crate) fn arm(&mut self, schedule: ScheduledTask) {
        self.clear_outputs();
        self.schedule = Some(schedule);
        if self.status != SessionStatus::AwaitingResult {
            self.status = SessionStatus::Armed;
        }
    }

    /// Cancels the schedule and fences off every outstanding call.
    /// Returns whether a schedule was active.
    pub(crate) fn disarm(&mut self) -> bool {
        let was_armed = match self.schedule.take() {
            Some(schedule) => {
                schedule.cancel();
                true
            }
            None => false,
        };
        self.generation += 1;
        self.status = SessionStatus::Idle;
        was_armed
    }

    pub(crate) fn clear_outputs(&mut self) {
        self.last_captured_frame = None;
        self.last_result = None;
        self.last_error = None;
    }

    /// Enters `Capturing`. Refuses while a classification is outstanding.
    pub(crate) fn begin_cycle(&mut self) -> bool {
        if matches!(
            self.status,
            SessionStatus::AwaitingResult | SessionStatus::Capturing
        ) {
            return false;
        }
        self.status = SessionStatus::Capturing;
        self.last_error = None;
        true
    }

    pub(crate) fn capture_failed(&mut self) {
        self.last_error = Some(CycleError::CaptureFailure.to_string());
        self.status = self.resting_status();
    }

    /// Records the captured frame and returns the generation the
    /// classification call belongs to.
    pub(crate) fn dispatch(&mut self, frame: Arc<Frame>) -> u64 {
        self.last_captured_frame = Some(frame);
        self.status = SessionStatus::AwaitingResult;
        self.generation
    }

    /// Applies a finished classification. Returns `false` (and changes
    /// nothing) when the call belongs to an earlier generation.
    pub(crate) fn complete(
        &mut self,
        generation: u64,
        result: &Result<ClassificationOutcome, CycleError>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        match result {
            Ok(outcome) => self.last_result = Some(outcome.clone()),
            Err(e) => self.last_error = Some(e.to_string()),
        }
        self.status = self.resting_status();
        true
    }

    /// Status a finished cycle returns to, whether it succeeded or not.
    fn resting_status(&self) -> SessionStatus {
        if self.is_armed() {
            SessionStatus::Armed
        } else {
            SessionStatus::Idle
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
