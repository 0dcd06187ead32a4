use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Callback fired on every tick of a repeating schedule.
pub type TickFn = Box<dyn FnMut() + Send + 'static>;

/// Fire-and-forget asynchronous work (a pending classification call).
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Abstracts timers and task execution for the capture controller.
///
/// This is a port: infrastructure supplies a concrete clock (tokio timers
/// in production, tokio's paused clock in tests). Implementations must not
/// invoke `tick` synchronously from inside `schedule_repeating`.
pub trait Scheduler: Send + Sync {
    /// Fires `tick` once after `initial_delay`, then every `period`, until
    /// the returned handle is cancelled or dropped.
    fn schedule_repeating(
        &self,
        initial_delay: Duration,
        period: Duration,
        tick: TickFn,
    ) -> ScheduledTask;

    /// Runs `task` to completion in the background.
    fn spawn(&self, task: Task);
}

/// Handle to pending scheduled work. Cancels on drop.
pub struct ScheduledTask {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ScheduledTask {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("pending", &self.cancel.is_some())
            .finish()
    }
}
