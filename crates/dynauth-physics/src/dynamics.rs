// ─────────────────────────────────────────────────────────────────────
// Dynauth — Drive / Field Collaborators
// ─────────────────────────────────────────────────────────────────────
//! Governing equations, behind two traits so the agent can be driven by
//! any model that satisfies the contracts.
//!
//! Default drive model (`DriveDynamics`), state = (Ψ, R, I):
//!
//!   dI/dt = k_Iφ φ̄ − ½ (U_E / I_char) I
//!   dR/dt = k_Rφ I Ψ − (2 U_E / R_char) R
//!   dΨ/dt = α_Ψ I − β_Ψ R − γ_Ψ Ψ − k_∇ ⟨|∇φ|⟩
//!
//! Default field model (`DiffusionField`), explicit Euler on a ring:
//!
//!   φ'_i = φ_i + dt [ D Δφ_i / dx² − β_φ φ_i + k_φΨ tanh(Ψ/2 − φ_i) ]

use crate::params::{FieldParams, StateParams, AROUSAL, INFORMATION, READINESS};

/// Instantaneous rates of change of the drive subsystem.
///
/// Must be Lipschitz-continuous in `state` so the adaptive RK4(5)
/// solver converges at its default tolerances.
pub trait StateDynamics: Send + Sync {
    fn derivatives(
        &self,
        t: f64,
        state: &[f64; 3],
        params: &StateParams,
        field_avg: f64,
        gradient_feedback: f64,
    ) -> [f64; 3];
}

/// One explicit update of the environment field.
///
/// Returns a field of the same length as `field`.
pub trait FieldDynamics: Send + Sync {
    fn step(
        &self,
        field: &[f64],
        arousal: f64,
        state: &StateParams,
        params: &FieldParams,
        dx: f64,
        dt: f64,
    ) -> Vec<f64>;
}

/// Default drive model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriveDynamics;

impl StateDynamics for DriveDynamics {
    fn derivatives(
        &self,
        _t: f64,
        state: &[f64; 3],
        p: &StateParams,
        field_avg: f64,
        gradient_feedback: f64,
    ) -> [f64; 3] {
        let psi = state[AROUSAL];
        let r = state[READINESS];
        let i = state[INFORMATION];

        let mut d = [0.0; 3];
        d[INFORMATION] = p.k_i_phi * field_avg - p.information_decay() * i;
        d[READINESS] = p.k_r_phi * i * psi - p.readiness_decay() * r;
        d[AROUSAL] =
            p.alpha_psi * i - p.beta_psi * r - p.gamma_psi * psi - p.k_psi_grad * gradient_feedback;
        d
    }
}

/// Default field model: periodic diffusion with a linear sink and an
/// arousal-driven saturating source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffusionField;

impl FieldDynamics for DiffusionField {
    fn step(
        &self,
        field: &[f64],
        arousal: f64,
        state: &StateParams,
        params: &FieldParams,
        dx: f64,
        dt: f64,
    ) -> Vec<f64> {
        let n = field.len();
        let inv_dx2 = 1.0 / (dx * dx);
        let target = 0.5 * arousal;
        (0..n)
            .map(|i| {
                let phi = field[i];
                let left = field[(i + n - 1) % n];
                let right = field[(i + 1) % n];
                let laplacian = (left - 2.0 * phi + right) * inv_dx2;
                let source = state.k_field_arousal * (target - phi).tanh();
                phi + dt * (params.d_phi * laplacian - params.beta_phi * phi + source)
            })
            .collect()
    }
}

/// Arithmetic mean of the field (0 for an empty field).
pub fn field_average(field: &[f64]) -> f64 {
    if field.is_empty() {
        return 0.0;
    }
    field.iter().sum::<f64>() / field.len() as f64
}

/// Mean absolute central-difference gradient with periodic boundaries:
/// ⟨|φ_{i+1} − φ_{i−1}|⟩ / (2 dx).
pub fn gradient_feedback(field: &[f64], dx: f64) -> f64 {
    let n = field.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = (0..n)
        .map(|i| (field[(i + 1) % n] - field[(i + n - 1) % n]).abs())
        .sum();
    total / (2.0 * dx * n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_average() {
        assert_eq!(field_average(&[]), 0.0);
        assert!((field_average(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_uniform_field_is_zero() {
        assert_eq!(gradient_feedback(&[0.3; 8], 1.0), 0.0);
    }

    #[test]
    fn test_gradient_wraps_around() {
        // Spike at index 0: neighbours 1 and n-1 each see |0 - 1| via wrap.
        let mut field = vec![0.0; 4];
        field[0] = 1.0;
        // i=1: |φ2 − φ0| = 1, i=3: |φ0 − φ2| = 1, others 0 → 2 / (2·1·4)
        assert!((gradient_feedback(&field, 1.0) - 0.25).abs() < 1e-12);
        assert!((gradient_feedback(&field, 2.0) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_drive_rest_state() {
        let p = StateParams::default();
        let d = DriveDynamics.derivatives(0.0, &[0.0; 3], &p, 0.0, 0.0);
        assert_eq!(d, [0.0; 3]);
    }

    #[test]
    fn test_drive_field_excites_information() {
        let p = StateParams::default();
        let d = DriveDynamics.derivatives(0.0, &[0.0; 3], &p, 1.0, 0.0);
        assert!((d[INFORMATION] - p.k_i_phi).abs() < 1e-12);
        assert_eq!(d[AROUSAL], 0.0);
    }

    #[test]
    fn test_drive_gradient_damps_arousal() {
        let p = StateParams::default();
        let d = DriveDynamics.derivatives(0.0, &[0.0; 3], &p, 0.0, 2.0);
        assert!((d[AROUSAL] + 2.0 * p.k_psi_grad).abs() < 1e-12);
    }

    #[test]
    fn test_field_step_preserves_length() {
        let out = DiffusionField.step(
            &[0.1; 20],
            0.2,
            &StateParams::default(),
            &FieldParams::default(),
            1.0,
            0.1,
        );
        assert_eq!(out.len(), 20);
    }

    #[test]
    fn test_field_diffusion_spreads_spike() {
        let mut field = vec![0.0; 10];
        field[5] = 1.0;
        let out = DiffusionField.step(
            &field,
            0.0,
            &StateParams::default(),
            &FieldParams::default(),
            1.0,
            0.1,
        );
        assert!(out[5] < 1.0);
        assert!(out[4] > 0.0 && out[6] > 0.0);
        assert!((out[4] - out[6]).abs() < 1e-12);
    }

    #[test]
    fn test_field_source_tracks_arousal() {
        let state = StateParams::default();
        let params = FieldParams {
            d_phi: 0.0,
            beta_phi: 0.0,
        };
        let out = DiffusionField.step(&[0.0; 4], 2.0, &state, &params, 1.0, 0.1);
        assert!(out.iter().all(|&v| v > 0.0));
        let out = DiffusionField.step(&[0.0; 4], -2.0, &state, &params, 1.0, 0.1);
        assert!(out.iter().all(|&v| v < 0.0));
    }
}
