// ─────────────────────────────────────────────────────────────────────
// Dynauth — Physics Authenticator
// ─────────────────────────────────────────────────────────────────────
//! Stateless transform between challenges, secrets, and responses.
//!
//! Two independent random sources are kept apart on purpose:
//! challenge generation draws from the thread-local OS-seeded RNG,
//! while response computation draws only from a generator seeded by
//! the secret and created fresh for each call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::Rng;

use dynauth_physics::{
    DiffusionField, DriveDynamics, DynamicalAgent, FieldDynamics, FieldParams, StateDynamics,
    StateParams,
};
use dynauth_types::{
    unix_now_s, AuthConfig, AuthResult, Challenge, ChallengeId, Response, Secret,
};

/// Process-wide challenge sequence; never reused within a process.
static CHALLENGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Core authentication engine.
///
/// Holds only configuration and the governing equations; every
/// `compute_response` builds its own `DynamicalAgent`.
pub struct PhysicsAuthenticator {
    config: AuthConfig,
    state_params: StateParams,
    field_params: FieldParams,
    state_dynamics: Arc<dyn StateDynamics>,
    field_dynamics: Arc<dyn FieldDynamics>,
}

impl Default for PhysicsAuthenticator {
    fn default() -> Self {
        Self {
            config: AuthConfig::default(),
            state_params: StateParams::default(),
            field_params: FieldParams::default(),
            state_dynamics: Arc::new(DriveDynamics),
            field_dynamics: Arc::new(DiffusionField),
        }
    }
}

impl PhysicsAuthenticator {
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Authenticator with custom base parameters and governing equations.
    ///
    /// `state_params.k_i_phi` and `state_params.gamma_psi` are replaced by
    /// the secret on every response computation.
    pub fn with_dynamics(
        config: AuthConfig,
        state_params: StateParams,
        field_params: FieldParams,
        state_dynamics: Arc<dyn StateDynamics>,
        field_dynamics: Arc<dyn FieldDynamics>,
    ) -> AuthResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state_params,
            field_params,
            state_dynamics,
            field_dynamics,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Issue a challenge of `length` perturbations in `[0, perturbation_cap)`.
    pub fn generate_challenge(&self, length: usize) -> Challenge {
        let seq = CHALLENGE_SEQ.fetch_add(1, Ordering::SeqCst) + 1;
        let issued_at_s = unix_now_s();
        let cap = self.config.perturbation_cap;
        let mut rng = rand::rng();
        let perturbations = (0..length).map(|_| rng.random::<f64>() * cap).collect();
        Challenge {
            id: ChallengeId::new(seq, issued_at_s as u64),
            perturbations,
            issued_at_s,
        }
    }

    /// Issue a challenge of the configured length.
    pub fn generate_default_challenge(&self) -> Challenge {
        self.generate_challenge(self.config.challenge_length)
    }

    /// Drive a fresh agent, parameterised and seeded by `secret`, through
    /// the challenge sequence and fingerprint its final state.
    ///
    /// Same `(challenge, secret)` always yields the same response.
    pub fn compute_response(&self, challenge: &Challenge, secret: &Secret) -> AuthResult<Response> {
        let params = StateParams {
            k_i_phi: secret.k,
            gamma_psi: secret.gamma,
            ..self.state_params
        };
        let mut agent = DynamicalAgent::with_dynamics(
            &self.config,
            params,
            self.field_params,
            Arc::clone(&self.state_dynamics),
            Arc::clone(&self.field_dynamics),
            secret.seed,
        )?;
        agent.seed_initial_condition(secret.seed);

        for &stress in &challenge.perturbations {
            agent.inject(stress)?;
            agent.advance()?;
        }

        let raw = agent.raw();
        Ok(Response {
            challenge_id: challenge.id.clone(),
            arousal: raw.arousal,
            information: raw.information,
            readiness: raw.readiness,
            field_avg: raw.field_avg,
        })
    }

    /// Exact match after rounding to `response_precision` decimals.
    pub fn verify(&self, actual: &Response, expected: &Response) -> bool {
        let p = self.config.response_precision;
        actual.to_tuple(p) == expected.to_tuple(p)
    }

    /// Every component within `tolerance` (strict) of the expected value.
    pub fn verify_within(&self, actual: &Response, expected: &Response, tolerance: f64) -> bool {
        actual
            .raw()
            .iter()
            .zip(expected.raw().iter())
            .all(|(a, e)| (a - e).abs() < tolerance)
    }
}
