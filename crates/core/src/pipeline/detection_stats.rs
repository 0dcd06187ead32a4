use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::Serialize;

use crate::classification::domain::classification_outcome::{AttackKind, ClassificationOutcome};
use crate::pipeline::detection_observer::DetectionObserver;

/// Spoof attempts per attack family, keyed the way the dashboard API does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttackCounts {
    pub print: usize,
    pub digital: usize,
    pub mask: usize,
    pub deepfake: usize,
}

impl AttackCounts {
    fn record(&mut self, kind: AttackKind) {
        match kind {
            AttackKind::Print => self.print += 1,
            AttackKind::DigitalScreen => self.digital += 1,
            AttackKind::Mask => self.mask += 1,
            AttackKind::Deepfake => self.deepfake += 1,
        }
    }

    pub fn get(&self, kind: AttackKind) -> usize {
        match kind {
            AttackKind::Print => self.print,
            AttackKind::DigitalScreen => self.digital,
            AttackKind::Mask => self.mask,
            AttackKind::Deepfake => self.deepfake,
        }
    }

    pub fn total(&self) -> usize {
        self.print + self.digital + self.mask + self.deepfake
    }
}

/// Serialisable dashboard figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub total_detections: usize,
    pub real_faces: usize,
    pub spoof_attempts: usize,
    pub errors: usize,
    pub attack_types: AttackCounts,
    pub average_confidence: f64,
    /// Milliseconds.
    pub average_processing_time: f64,
}

#[derive(Default)]
struct Tally {
    authentic: usize,
    spoof: usize,
    errors: usize,
    attacks: AttackCounts,
    confidence_sum: f64,
    processing_sum_ms: f64,
    processing_count: usize,
}

/// Aggregates live outcomes into dashboard statistics.
///
/// Register it with a [`FanoutObserver`](crate::pipeline::detection_observer::FanoutObserver)
/// next to the presentation observer.
#[derive(Default)]
pub struct DetectionStats {
    tally: Mutex<Tally>,
}

impl DetectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        let tally = self.tally.lock();
        tally.authentic + tally.spoof
    }

    pub fn authentic(&self) -> usize {
        self.tally.lock().authentic
    }

    pub fn spoof_attempts(&self) -> usize {
        self.tally.lock().spoof
    }

    pub fn errors(&self) -> usize {
        self.tally.lock().errors
    }

    pub fn attack_counts(&self) -> AttackCounts {
        self.tally.lock().attacks.clone()
    }

    /// Mean confidence over successful detections, `0.0` when none.
    pub fn average_confidence(&self) -> f64 {
        let tally = self.tally.lock();
        let n = tally.authentic + tally.spoof;
        if n == 0 {
            0.0
        } else {
            tally.confidence_sum / n as f64
        }
    }

    /// Mean backend-reported processing time in milliseconds, over the
    /// outcomes that carried one.
    pub fn average_processing_time_ms(&self) -> f64 {
        let tally = self.tally.lock();
        if tally.processing_count == 0 {
            0.0
        } else {
            tally.processing_sum_ms / tally.processing_count as f64
        }
    }

    /// Share of each named attack family among named attacks, in percent.
    pub fn attack_distribution(&self) -> BTreeMap<AttackKind, f64> {
        let attacks = self.attack_counts();
        let named = attacks.total();
        AttackKind::ALL
            .iter()
            .map(|&kind| {
                let pct = if named == 0 {
                    0.0
                } else {
                    attacks.get(kind) as f64 / named as f64 * 100.0
                };
                (kind, pct)
            })
            .collect()
    }

    pub fn report(&self) -> StatsReport {
        StatsReport {
            total_detections: self.total(),
            real_faces: self.authentic(),
            spoof_attempts: self.spoof_attempts(),
            errors: self.errors(),
            attack_types: self.attack_counts(),
            average_confidence: self.average_confidence(),
            average_processing_time: self.average_processing_time_ms(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        let report = self.report();
        if report.total_detections == 0 && report.errors == 0 {
            return None;
        }

        let mut lines = vec![format!(
            "Detection summary ({} detections, {} errors):",
            report.total_detections, report.errors
        )];
        lines.push(format!("  Real faces:     {}", report.real_faces));
        lines.push(format!("  Spoof attempts: {}", report.spoof_attempts));
        for (kind, pct) in self.attack_distribution() {
            let count = report.attack_types.get(kind);
            if count > 0 {
                lines.push(format!("    {:22}: {count} ({pct:.1}%)", kind.to_string()));
            }
        }
        if report.total_detections > 0 {
            lines.push(format!(
                "  Avg confidence: {:.2}%",
                report.average_confidence * 100.0
            ));
        }
        if report.average_processing_time > 0.0 {
            lines.push(format!(
                "  Avg processing: {:.0}ms",
                report.average_processing_time
            ));
        }
        Some(lines.join("\n"))
    }
}

impl DetectionObserver for DetectionStats {
    fn on_result(&self, outcome: &ClassificationOutcome) {
        let mut tally = self.tally.lock();
        if outcome.is_authentic() {
            tally.authentic += 1;
        } else {
            tally.spoof += 1;
            if let Some(kind) = outcome.attack_kind() {
                tally.attacks.record(kind);
            }
        }
        tally.confidence_sum += outcome.confidence();
        if let Some(elapsed) = outcome.processing_time() {
            tally.processing_sum_ms += elapsed.as_secs_f64() * 1000.0;
            tally.processing_count += 1;
        }
    }

    fn on_error(&self, _message: &str) {
        self.tally.lock().errors += 1;
    }
}
