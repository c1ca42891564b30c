// ─────────────────────────────────────────────────────────────────────
// Dynauth — Capability Classifier
// ─────────────────────────────────────────────────────────────────────
//! Maps the continuous drive state onto discrete capability bands.
//!
//! Total over the real line: NaN compares false against every cutoff
//! and therefore lands in the lowest band.

use serde::{Deserialize, Serialize};

use dynauth_types::ClassifierThresholds;

/// Attention level derived from arousal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArousalLevel {
    Sleeping,
    Awake,
    HighAlert,
}

/// Creativity level derived from information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InformationLevel {
    Routine,
    Thinking,
    Inspired,
}

/// Action permission derived from readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReadinessLevel {
    Observer,
    ReadOnly,
    WriteAccess,
}

/// The three bands together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    pub attention: ArousalLevel,
    pub creativity: InformationLevel,
    pub action_permission: ReadinessLevel,
}

/// Stateless thresholding over [`ClassifierThresholds`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StateClassifier {
    thresholds: ClassifierThresholds,
}

impl StateClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    pub fn classify_arousal(&self, psi: f64) -> ArousalLevel {
        if psi > self.thresholds.arousal_alert {
            ArousalLevel::HighAlert
        } else if psi > self.thresholds.arousal_awake {
            ArousalLevel::Awake
        } else {
            ArousalLevel::Sleeping
        }
    }

    pub fn classify_information(&self, i: f64) -> InformationLevel {
        if i > self.thresholds.information_inspired {
            InformationLevel::Inspired
        } else if i > self.thresholds.information_thinking {
            InformationLevel::Thinking
        } else {
            InformationLevel::Routine
        }
    }

    pub fn classify_readiness(&self, r: f64) -> ReadinessLevel {
        if r > self.thresholds.readiness_write {
            ReadinessLevel::WriteAccess
        } else if r > self.thresholds.readiness_read {
            ReadinessLevel::ReadOnly
        } else {
            ReadinessLevel::Observer
        }
    }

    pub fn classify(&self, arousal: f64, information: f64, readiness: f64) -> Capabilities {
        Capabilities {
            attention: self.classify_arousal(arousal),
            creativity: self.classify_information(information),
            action_permission: self.classify_readiness(readiness),
        }
    }
}
