pub mod channel_observer;
pub mod tokio_scheduler;
