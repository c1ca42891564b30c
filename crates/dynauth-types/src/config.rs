// ─────────────────────────────────────────────────────────────────────
// Dynauth — Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Cutoffs for the capability classifier.
///
/// Each pair is `(low → medium, medium → high)`; comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Arousal: above `arousal_awake` is Awake, above `arousal_alert` is HighAlert.
    pub arousal_awake: f64,
    pub arousal_alert: f64,
    /// Information: Thinking above the first, Inspired above the second.
    pub information_thinking: f64,
    pub information_inspired: f64,
    /// Readiness: ReadOnly above the first, WriteAccess above the second.
    pub readiness_read: f64,
    pub readiness_write: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            arousal_awake: 0.2,
            arousal_alert: 0.4,
            information_thinking: 0.4,
            information_inspired: 0.8,
            readiness_read: 0.1,
            readiness_write: 0.3,
        }
    }
}

/// Error control for the adaptive RK4(5) integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverTolerance {
    /// Relative tolerance. Default: 1e-3.
    pub rtol: f64,
    /// Absolute tolerance. Default: 1e-6.
    pub atol: f64,
    /// Substep budget per `advance()` before giving up.
    pub max_steps: usize,
}

impl Default for SolverTolerance {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_steps: 10_000,
        }
    }
}

/// Runtime configuration for a dynamical-system instance and the
/// challenge-response protocol built on it.
///
/// Server and client must agree on every field that influences the
/// trajectory (everything except `challenge_timeout_s` and
/// `consume_on_device_mismatch`), otherwise no response will verify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Integration interval per `advance()`. Default: 0.1.
    pub dt: f64,

    /// Number of field elements. Default: 20.
    pub field_len: usize,

    /// Spatial spacing between field elements. Default: 1.0.
    pub field_spacing: f64,

    /// Symmetric clamp applied after every injection. Default: 5.0.
    pub field_clamp: f64,

    /// Initial value of every field element before seeding. Default: 0.1.
    pub field_background: f64,

    /// Multiplier applied to stress at the field midpoint. Default: 2.0.
    pub injection_gain: f64,

    /// Noise std per unit of stress. Default: 0.1.
    pub noise_scale: f64,

    /// Upper bound of the seeded initial field/arousal draw. Default: 0.1.
    pub init_scale: f64,

    /// Perturbations per challenge. Default: 50.
    pub challenge_length: usize,

    /// Exclusive upper bound for each perturbation magnitude. Default: 3.0.
    pub perturbation_cap: f64,

    /// Decimal places kept when comparing responses. Default: 6.
    pub response_precision: u32,

    /// Seconds after issuance before a challenge expires. Default: 30.
    pub challenge_timeout_s: f64,

    /// Consume a pending challenge when it is answered under the wrong
    /// device identifier. Default: false (the entry stays pending).
    pub consume_on_device_mismatch: bool,

    pub solver: SolverTolerance,

    pub thresholds: ClassifierThresholds,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            field_len: 20,
            field_spacing: 1.0,
            field_clamp: 5.0,
            field_background: 0.1,
            injection_gain: 2.0,
            noise_scale: 0.1,
            init_scale: 0.1,
            challenge_length: 50,
            perturbation_cap: 3.0,
            response_precision: 6,
            challenge_timeout_s: 30.0,
            consume_on_device_mismatch: false,
            solver: SolverTolerance::default(),
            thresholds: ClassifierThresholds::default(),
        }
    }
}

impl AuthConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> AuthResult<()> {
        positive("dt", self.dt)?;
        positive("field_spacing", self.field_spacing)?;
        positive("field_clamp", self.field_clamp)?;
        positive("perturbation_cap", self.perturbation_cap)?;
        positive("challenge_timeout_s", self.challenge_timeout_s)?;
        positive("solver.rtol", self.solver.rtol)?;
        positive("solver.atol", self.solver.atol)?;
        if self.field_len < 3 {
            return Err(AuthError::Config(format!(
                "field_len must be >= 3, got {}",
                self.field_len
            )));
        }
        if self.challenge_length == 0 {
            return Err(AuthError::Config(
                "challenge_length must be > 0".to_string(),
            ));
        }
        if self.response_precision > 15 {
            return Err(AuthError::Config(format!(
                "response_precision must be <= 15, got {}",
                self.response_precision
            )));
        }
        if self.solver.max_steps == 0 {
            return Err(AuthError::Config(
                "solver.max_steps must be > 0".to_string(),
            ));
        }
        for (name, value) in [
            ("field_background", self.field_background),
            ("injection_gain", self.injection_gain),
            ("noise_scale", self.noise_scale),
            ("init_scale", self.init_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AuthError::Config(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        let t = &self.thresholds;
        for (name, lo, hi) in [
            ("arousal", t.arousal_awake, t.arousal_alert),
            ("information", t.information_thinking, t.information_inspired),
            ("readiness", t.readiness_read, t.readiness_write),
        ] {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(AuthError::Config(format!(
                    "{name} thresholds must be ascending, got {lo} > {hi}"
                )));
            }
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> AuthResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AuthError::Config(format!("JSON parse error: {e}")))
    }
}

fn positive(name: &str, value: f64) -> AuthResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AuthError::Config(format!("{name} must be > 0, got {value}")))
    }
}
