use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::classification::domain::classification_outcome::{
    AttackKind, AttentionMap, AttentionPoint, ClassificationOutcome,
};
use crate::classification::domain::spoof_classifier::{ClassificationError, SpoofClassifier};
use crate::shared::constants::{BACKEND_FAILED_MESSAGE, SIMULATED_LATENCY};
use crate::shared::frame::Frame;

/// Stand-in backend that answers with randomized verdicts after a fixed delay.
///
/// Half of the calls come back authentic with confidence in `[0.70, 0.98)`,
/// the rest as a spoof with confidence in `[0.65, 0.95)` and a uniformly
/// chosen attack kind. Every verdict carries the same two attention
/// highlights. Frames with no pixels are rejected as `NoFace`.
pub struct SimulatedClassifier {
    latency: Duration,
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedClassifier {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failure_rate: 0.0,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Fixes the random sequence so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Probability in `[0, 1]` that a call fails with a backend error.
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    fn draw(&self) -> Result<ClassificationOutcome, ClassificationError> {
        let mut rng = self.rng.lock();
        if self.failure_rate > 0.0 && rng.gen::<f64>() < self.failure_rate {
            return Err(ClassificationError::Backend(BACKEND_FAILED_MESSAGE.into()));
        }

        let is_real = rng.gen::<f64>() > 0.5;
        let verdict = if is_real {
            ClassificationOutcome::authentic(0.7 + rng.gen::<f64>() * 0.28)
        } else {
            let kind = AttackKind::ALL.choose(&mut *rng).copied();
            ClassificationOutcome::spoof(0.65 + rng.gen::<f64>() * 0.3, kind)
        };
        let outcome = verdict.map_err(|e| ClassificationError::Backend(e.to_string()))?;

        Ok(outcome
            .with_attention_map(fixed_highlights())
            .with_processing_time(self.latency))
    }
}

impl Default for SimulatedClassifier {
    fn default() -> Self {
        Self::new(SIMULATED_LATENCY)
    }
}

#[async_trait]
impl SpoofClassifier for SimulatedClassifier {
    async fn classify(&self, frame: Arc<Frame>) -> Result<ClassificationOutcome, ClassificationError> {
        let verdict = if frame.byte_len() == 0 {
            Err(ClassificationError::NoFace)
        } else {
            self.draw()
        };
        tokio::time::sleep(self.latency).await;
        verdict
    }
}

fn fixed_highlights() -> AttentionMap {
    AttentionMap {
        highlights: vec![
            AttentionPoint {
                x: 100,
                y: 150,
                intensity: 0.8,
            },
            AttentionPoint {
                x: 200,
                y: 120,
                intensity: 0.9,
            },
        ],
    }
}
