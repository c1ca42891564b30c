// ─────────────────────────────────────────────────────────────────────
// Dynauth — Dynamical Agent
// ─────────────────────────────────────────────────────────────────────
//! Drive subsystem (arousal, readiness, information) coupled to a 1-D
//! environment field.
//!
//! Each `advance()` integrates the drive ODE over one `dt` with the
//! adaptive RK4(5) solver, then steps the field with the updated
//! arousal. All randomness (seeded initial condition, injection noise)
//! comes from one `Pcg64Mcg` stream, so a given seed and injection
//! sequence always reproduce the same trajectory.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use dynauth_types::{AuthConfig, AuthError, AuthResult};

use crate::classifier::{Capabilities, StateClassifier};
use crate::dynamics::{
    field_average, gradient_feedback, DiffusionField, DriveDynamics, FieldDynamics, StateDynamics,
};
use crate::params::{FieldParams, StateParams, AROUSAL, INFORMATION, READINESS};
use crate::solver::Dopri5;

/// Drive-subsystem values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveState {
    pub arousal: f64,
    pub readiness: f64,
    pub information: f64,
}

impl Default for DriveState {
    /// Resting but not dormant.
    fn default() -> Self {
        Self {
            arousal: 0.2,
            readiness: 0.1,
            information: 0.5,
        }
    }
}

impl DriveState {
    pub fn to_array(self) -> [f64; 3] {
        let mut y = [0.0; 3];
        y[AROUSAL] = self.arousal;
        y[READINESS] = self.readiness;
        y[INFORMATION] = self.information;
        y
    }

    pub fn from_array(y: [f64; 3]) -> Self {
        Self {
            arousal: y[AROUSAL],
            readiness: y[READINESS],
            information: y[INFORMATION],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.arousal.is_finite() && self.readiness.is_finite() && self.information.is_finite()
    }
}

/// Raw numeric state exposed with the readout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawState {
    pub arousal: f64,
    pub information: f64,
    pub readiness: f64,
    pub field_avg: f64,
}

/// Classified capabilities plus the raw values they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentReadout {
    pub capabilities: Capabilities,
    pub raw: RawState,
}

/// Ephemeral dynamical system driven by stress injections.
pub struct DynamicalAgent {
    config: AuthConfig,
    state_params: StateParams,
    field_params: FieldParams,
    state_dynamics: Arc<dyn StateDynamics>,
    field_dynamics: Arc<dyn FieldDynamics>,
    solver: Dopri5,
    classifier: StateClassifier,
    state: DriveState,
    field: Vec<f64>,
    t: f64,
    step_count: u64,
    rng: Pcg64Mcg,
}

impl DynamicalAgent {
    /// Default parameters and the built-in drive/field models.
    pub fn new(config: &AuthConfig, seed: u64) -> AuthResult<Self> {
        Self::with_dynamics(
            config,
            StateParams::default(),
            FieldParams::default(),
            Arc::new(DriveDynamics),
            Arc::new(DiffusionField),
            seed,
        )
    }

    pub fn with_dynamics(
        config: &AuthConfig,
        state_params: StateParams,
        field_params: FieldParams,
        state_dynamics: Arc<dyn StateDynamics>,
        field_dynamics: Arc<dyn FieldDynamics>,
        seed: u64,
    ) -> AuthResult<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            state_params,
            field_params,
            state_dynamics,
            field_dynamics,
            solver: Dopri5::new(&config.solver),
            classifier: StateClassifier::new(config.thresholds),
            state: DriveState::default(),
            field: vec![config.field_background; config.field_len],
            t: 0.0,
            step_count: 0,
            rng: Pcg64Mcg::seed_from_u64(seed),
        })
    }

    /// Re-seed the random stream and draw the initial field and arousal
    /// from it. Later injection noise continues the same stream.
    pub fn seed_initial_condition(&mut self, seed: u64) {
        self.rng = Pcg64Mcg::seed_from_u64(seed);
        let scale = self.config.init_scale;
        for v in self.field.iter_mut() {
            *v = self.rng.random::<f64>() * scale;
        }
        self.state.arousal = self.rng.random::<f64>() * scale;
    }

    /// Inject stress at the field midpoint, add proportional Gaussian
    /// noise everywhere, then clamp.
    pub fn inject(&mut self, stress: f64) -> AuthResult<()> {
        if !stress.is_finite() || stress < 0.0 {
            return Err(AuthError::Validation(format!(
                "stress must be finite and >= 0, got {stress}"
            )));
        }

        let mid = self.field.len() / 2;
        self.field[mid] += stress * self.config.injection_gain;

        if stress > 0.0 {
            let sigma = self.config.noise_scale * stress;
            for i in 0..self.field.len() {
                let noise = next_normal(&mut self.rng);
                self.field[i] += noise * sigma;
            }
        }

        let bound = self.config.field_clamp;
        for v in self.field.iter_mut() {
            *v = v.clamp(-bound, bound);
        }
        Ok(())
    }

    /// Advance the coupled system by one `dt`.
    pub fn advance(&mut self) -> AuthResult<()> {
        let dt = self.config.dt;
        let dx = self.config.field_spacing;
        let field_avg = field_average(&self.field);
        let feedback = gradient_feedback(&self.field, dx);

        let params = self.state_params;
        let dynamics = &self.state_dynamics;
        let result = self.solver.integrate(
            |t, y: &[f64; 3]| dynamics.derivatives(t, y, &params, field_avg, feedback),
            self.t,
            self.t + dt,
            self.state.to_array(),
        );
        let integration = result.inspect_err(|e| {
            log::error!("drive integration failed at step {}: {e}", self.step_count);
        })?;

        let next = DriveState::from_array(integration.y);
        if !next.is_finite() {
            log::error!("drive state went non-finite at step {}", self.step_count);
            return Err(AuthError::Numerical(format!(
                "drive state non-finite after step {}",
                self.step_count
            )));
        }
        self.state = next;

        let field = self.field_dynamics.step(
            &self.field,
            self.state.arousal,
            &self.state_params,
            &self.field_params,
            dx,
            dt,
        );
        if field.len() != self.field.len() {
            return Err(AuthError::Validation(format!(
                "field model changed field length {} -> {}",
                self.field.len(),
                field.len()
            )));
        }
        if !field.iter().all(|v| v.is_finite()) {
            log::error!("field went non-finite at step {}", self.step_count);
            return Err(AuthError::Numerical(format!(
                "field non-finite after step {}",
                self.step_count
            )));
        }
        self.field = field;

        self.t += dt;
        self.step_count += 1;
        Ok(())
    }

    pub fn readout(&self) -> AgentReadout {
        let raw = self.raw();
        AgentReadout {
            capabilities: self
                .classifier
                .classify(raw.arousal, raw.information, raw.readiness),
            raw,
        }
    }

    pub fn raw(&self) -> RawState {
        RawState {
            arousal: self.state.arousal,
            information: self.state.information,
            readiness: self.state.readiness,
            field_avg: field_average(&self.field),
        }
    }

    pub fn state(&self) -> &DriveState {
        &self.state
    }

    pub fn field(&self) -> &[f64] {
        &self.field
    }

    pub fn state_params(&self) -> &StateParams {
        &self.state_params
    }

    /// Simulation time.
    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

/// Standard normal via Box–Muller.
fn next_normal(rng: &mut Pcg64Mcg) -> f64 {
    let u1 = rng.random::<f64>().max(1e-300);
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
