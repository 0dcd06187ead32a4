use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::Serialize;

use crate::classification::domain::classification_outcome::{AttackKind, ClassificationOutcome};
use crate::pipeline::detection_observer::DetectionObserver;
use crate::shared::constants::{DEFAULT_HISTORY_LIMIT, HISTORY_FIRST_ID};

/// One successful detection as listed by the history view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
    pub is_real: bool,
    pub confidence: f64,
    pub attack_type: Option<AttackKind>,
}

struct Ring {
    records: VecDeque<DetectionRecord>,
    next_id: u64,
}

/// Keeps the last `capacity` outcomes, oldest evicted first.
///
/// Errors are not recorded; [`DetectionStats`](crate::pipeline::detection_stats::DetectionStats)
/// counts those.
pub struct DetectionHistory {
    capacity: usize,
    ring: Mutex<Ring>,
}

impl DetectionHistory {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            ring: Mutex::new(Ring {
                records: VecDeque::with_capacity(capacity),
                next_id: HISTORY_FIRST_ID,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ring.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<DetectionRecord> {
        self.ring
            .lock()
            .records
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Renders the newest `limit` records, or `None` if nothing was recorded.
    pub fn summary_string(&self, limit: usize) -> Option<String> {
        let records = self.recent(limit);
        if records.is_empty() {
            return None;
        }
        let mut lines = vec![format!("Recent detections ({}):", records.len())];
        for r in &records {
            let verdict = match (r.is_real, r.attack_type) {
                (true, _) => "real".to_string(),
                (false, Some(kind)) => format!("spoof, {kind}"),
                (false, None) => "spoof".to_string(),
            };
            lines.push(format!(
                "  {}  {:>6.2}%  {verdict}",
                r.id,
                r.confidence * 100.0
            ));
        }
        Some(lines.join("\n"))
    }
}

impl Default for DetectionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl DetectionObserver for DetectionHistory {
    fn on_result(&self, outcome: &ClassificationOutcome) {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        let mut ring = self.ring.lock();
        let id = format!("det-{}", ring.next_id);
        ring.next_id += 1;
        if ring.records.len() == self.capacity {
            ring.records.pop_front();
        }
        ring.records.push_back(DetectionRecord {
            id,
            timestamp_ms,
            is_real: outcome.is_authentic(),
            confidence: outcome.confidence(),
            attack_type: outcome.attack_kind(),
        });
    }

    fn on_error(&self, _message: &str) {}
}
