use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::pipeline::scheduler::{ScheduledTask, Scheduler, Task, TickFn};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// [`Scheduler`] backed by a tokio runtime.
///
/// Each repeating schedule is one spawned task driving a
/// `tokio::time::Interval`; cancelling aborts that task. Ticks that fall
/// behind (a blocked runtime, a suspended laptop) are skipped rather than
/// replayed in a burst.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(
        &self,
        initial_delay: Duration,
        period: Duration,
        mut tick: TickFn,
    ) -> ScheduledTask {
        let _enter = self.handle.enter();
        let first = Instant::now() + initial_delay;
        let period = period.max(MIN_PERIOD);

        let join = self.handle.spawn(async move {
            let mut ticker = time::interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                tick();
            }
        });

        ScheduledTask::new(move || join.abort())
    }

    fn spawn(&self, task: Task) {
        self.handle.spawn(task);
    }
}
