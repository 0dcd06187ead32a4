pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod settings;
}

pub mod capture {
    pub mod domain {
        pub mod frame_source;
    }
    pub mod infrastructure;
}

pub mod classification {
    pub mod domain {
        pub mod classification_outcome;
        pub mod spoof_classifier;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod capture_controller;
    pub mod cycle_error;
    pub mod detection_history;
    pub mod detection_observer;
    pub mod detection_stats;
    pub mod infrastructure;
    pub mod scheduler;
    pub mod session;
}
