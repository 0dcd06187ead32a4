use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutcomeError {
    #[error("confidence must be within [0, 1], got {0}")]
    ConfidenceOutOfRange(f64),
    #[error("an authentic face cannot carry an attack kind")]
    AttackOnAuthentic,
}

/// Presentation attack families the classifier can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackKind {
    #[serde(rename = "Print Attack")]
    Print,
    #[serde(rename = "Digital Screen Attack")]
    DigitalScreen,
    #[serde(rename = "3D Mask")]
    Mask,
    #[serde(rename = "Deepfake")]
    Deepfake,
}

impl AttackKind {
    pub const ALL: &[AttackKind] = &[
        AttackKind::Print,
        AttackKind::DigitalScreen,
        AttackKind::Mask,
        AttackKind::Deepfake,
    ];
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackKind::Print => write!(f, "Print Attack"),
            AttackKind::DigitalScreen => write!(f, "Digital Screen Attack"),
            AttackKind::Mask => write!(f, "3D Mask"),
            AttackKind::Deepfake => write!(f, "Deepfake"),
        }
    }
}

/// One hot spot of the model's attention, in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionPoint {
    pub x: u32,
    pub y: u32,
    pub intensity: f64,
}

/// Grad-CAM style auxiliary data. Opaque to the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttentionMap {
    pub highlights: Vec<AttentionPoint>,
}

/// Result of a single classification call.
///
/// Constructed through [`ClassificationOutcome::authentic`] or
/// [`ClassificationOutcome::spoof`] so that an attack kind can only appear
/// on a spoof verdict and confidence always lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OutcomeWire", into = "OutcomeWire")]
pub struct ClassificationOutcome {
    is_authentic: bool,
    confidence: f64,
    attack_kind: Option<AttackKind>,
    attention_map: Option<AttentionMap>,
    processing_time: Option<Duration>,
}

impl ClassificationOutcome {
    pub fn authentic(confidence: f64) -> Result<Self, OutcomeError> {
        Ok(Self {
            is_authentic: true,
            confidence: check_confidence(confidence)?,
            attack_kind: None,
            attention_map: None,
            processing_time: None,
        })
    }

    pub fn spoof(confidence: f64, attack_kind: Option<AttackKind>) -> Result<Self, OutcomeError> {
        Ok(Self {
            is_authentic: false,
            confidence: check_confidence(confidence)?,
            attack_kind,
            attention_map: None,
            processing_time: None,
        })
    }

    pub fn with_attention_map(mut self, map: AttentionMap) -> Self {
        self.attention_map = Some(map);
        self
    }

    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.processing_time = Some(elapsed);
        self
    }

    pub fn is_authentic(&self) -> bool {
        self.is_authentic
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn attack_kind(&self) -> Option<AttackKind> {
        self.attack_kind
    }

    pub fn attention_map(&self) -> Option<&AttentionMap> {
        self.attention_map.as_ref()
    }

    pub fn processing_time(&self) -> Option<Duration> {
        self.processing_time
    }

    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }

    pub fn headline(&self) -> &'static str {
        if self.is_authentic {
            "Real Face Detected"
        } else {
            "Spoofing Attempt Detected"
        }
    }
}

impl fmt::Display for ClassificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}%)", self.headline(), self.confidence_percent())?;
        if let Some(kind) = self.attack_kind {
            write!(f, ": {kind}")?;
        }
        Ok(())
    }
}

fn check_confidence(confidence: f64) -> Result<f64, OutcomeError> {
    if (0.0..=1.0).contains(&confidence) {
        Ok(confidence)
    } else {
        Err(OutcomeError::ConfidenceOutOfRange(confidence))
    }
}

/// JSON shape spoken by the detection backend.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeWire {
    is_real: bool,
    confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attack_type: Option<AttackKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grad_cam_data: Option<AttentionMap>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    processing_time: Option<f64>,
}

impl TryFrom<OutcomeWire> for ClassificationOutcome {
    type Error = OutcomeError;

    fn try_from(wire: OutcomeWire) -> Result<Self, Self::Error> {
        let mut outcome = if wire.is_real {
            if wire.attack_type.is_some() {
                return Err(OutcomeError::AttackOnAuthentic);
            }
            Self::authentic(wire.confidence)?
        } else {
            Self::spoof(wire.confidence, wire.attack_type)?
        };
        outcome.attention_map = wire.grad_cam_data;
        outcome.processing_time = wire
            .processing_time
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64);
        Ok(outcome)
    }
}

impl From<ClassificationOutcome> for OutcomeWire {
    fn from(outcome: ClassificationOutcome) -> Self {
        Self {
            is_real: outcome.is_authentic,
            confidence: outcome.confidence,
            attack_type: outcome.attack_kind,
            grad_cam_data: outcome.attention_map,
            processing_time: outcome.processing_time.map(|d| d.as_secs_f64()),
        }
    }
}
