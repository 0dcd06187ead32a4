use std::sync::Arc;

use crate::classification::domain::classification_outcome::ClassificationOutcome;

/// Output channel of the capture controller.
///
/// Exactly one of the two methods is invoked per completed cycle. Calls are
/// serialized by the controller; an observer may call back into the
/// controller (e.g. `stop()` after the first spoof) without deadlocking.
pub trait DetectionObserver: Send + Sync {
    /// A classification call succeeded.
    fn on_result(&self, outcome: &ClassificationOutcome);

    /// A capture or classification failed; `message` is user-presentable.
    fn on_error(&self, message: &str);
}

/// Discards every event.
pub struct NullDetectionObserver;

impl DetectionObserver for NullDetectionObserver {
    fn on_result(&self, _outcome: &ClassificationOutcome) {}
    fn on_error(&self, _message: &str) {}
}

/// Writes every event to the `log` facade.
pub struct LogDetectionObserver;

impl DetectionObserver for LogDetectionObserver {
    fn on_result(&self, outcome: &ClassificationOutcome) {
        log::info!("{outcome}");
    }

    fn on_error(&self, message: &str) {
        log::warn!("Detection error: {message}");
    }
}

/// Forwards every event to each wrapped observer, in order.
#[derive(Default)]
pub struct FanoutObserver {
    observers: Vec<Arc<dyn DetectionObserver>>,
}

impl FanoutObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn DetectionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl DetectionObserver for FanoutObserver {
    fn on_result(&self, outcome: &ClassificationOutcome) {
        for observer in &self.observers {
            observer.on_result(outcome);
        }
    }

    fn on_error(&self, message: &str) {
        for observer in &self.observers {
            observer.on_error(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl DetectionObserver for RecordingObserver {
        fn on_result(&self, outcome: &ClassificationOutcome) {
            self.events
                .lock()
                .unwrap()
                .push(format!("result:{}", outcome.is_authentic()));
        }

        fn on_error(&self, message: &str) {
            self.events.lock().unwrap().push(format!("error:{message}"));
        }
    }

    #[test]
    fn test_null_and_log_observers_are_noop() {
        let outcome = ClassificationOutcome::authentic(0.9).unwrap();
        NullDetectionObserver.on_result(&outcome);
        NullDetectionObserver.on_error("boom");
        LogDetectionObserver.on_result(&outcome);
        LogDetectionObserver.on_error("boom");
        // No panics = success
    }

    #[test]
    fn test_fanout_reaches_every_observer_in_order() {
        let first = Arc::new(RecordingObserver::default());
        let second = Arc::new(RecordingObserver::default());
        let fanout = FanoutObserver::new()
            .with(first.clone())
            .with(second.clone());

        fanout.on_result(&ClassificationOutcome::authentic(0.9).unwrap());
        fanout.on_error("network error");

        for recorder in [&first, &second] {
            let events = recorder.events.lock().unwrap();
            assert_eq!(*events, vec!["result:true", "error:network error"]);
        }
        assert_eq!(fanout.len(), 2);
    }

    #[test]
    fn test_empty_fanout() {
        let fanout = FanoutObserver::new();
        assert!(fanout.is_empty());
        fanout.on_error("ignored");
    }
}
