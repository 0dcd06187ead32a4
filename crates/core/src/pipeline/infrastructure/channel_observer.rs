use crossbeam_channel::{Receiver, Sender};

use crate::classification::domain::classification_outcome::ClassificationOutcome;
use crate::pipeline::detection_observer::DetectionObserver;

/// Message handed to a presentation thread.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    Result(ClassificationOutcome),
    Error(String),
}

/// Bridges controller callbacks onto a channel so a synchronous UI loop
/// can consume them at its own pace.
pub struct ChannelObserver {
    tx: Sender<DetectionEvent>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<DetectionEvent>) -> Self {
        Self { tx }
    }

    /// Creates an observer plus the unbounded receiver it feeds.
    pub fn unbounded() -> (Self, Receiver<DetectionEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }

    fn send(&self, event: DetectionEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Detection event dropped: receiver disconnected");
        }
    }
}

impl DetectionObserver for ChannelObserver {
    fn on_result(&self, outcome: &ClassificationOutcome) {
        self.send(DetectionEvent::Result(outcome.clone()));
    }

    fn on_error(&self, message: &str) {
        self.send(DetectionEvent::Error(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (observer, rx) = ChannelObserver::unbounded();
        let outcome = ClassificationOutcome::authentic(0.9).unwrap();

        observer.on_result(&outcome);
        observer.on_error("Failed to capture image");

        assert_eq!(rx.try_recv().unwrap(), DetectionEvent::Result(outcome));
        assert_eq!(
            rx.try_recv().unwrap(),
            DetectionEvent::Error("Failed to capture image".into())
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_receiver_is_ignored() {
        let (observer, rx) = ChannelObserver::unbounded();
        drop(rx);
        observer.on_error("nobody listening");
    }
}
