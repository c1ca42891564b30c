// ─────────────────────────────────────────────────────────────────────
// Dynauth — Canonical Parameters
// ─────────────────────────────────────────────────────────────────────
//! Coefficients of the drive (state) subsystem and the environment
//! (field) subsystem.
//!
//! Defaults are tuned for an agent that settles quickly (strong
//! information decay) but reacts strongly to its environment.
//! `k_i_phi` and `gamma_psi` are overridden per secret.

use serde::{Deserialize, Serialize};

/// Index of each drive quantity in the state triple handed to
/// [`crate::dynamics::StateDynamics`].
pub const AROUSAL: usize = 0;
pub const READINESS: usize = 1;
pub const INFORMATION: usize = 2;

/// Drive-subsystem coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateParams {
    /// Energy scale shared by the information and readiness decay terms.
    pub u_e: f64,
    /// Characteristic information scale.
    pub i_char: f64,
    /// Characteristic readiness scale. Large values mean slow readiness decay.
    pub r_char: f64,
    /// Field → information sensitivity. Secret-derived.
    pub k_i_phi: f64,
    /// Arousal decay rate. Secret-derived.
    pub gamma_psi: f64,
    /// Information × arousal → readiness drive.
    pub k_r_phi: f64,
    /// Information → arousal drive.
    pub alpha_psi: f64,
    /// Readiness → arousal damping.
    pub beta_psi: f64,
    /// Field-gradient friction on arousal.
    pub k_psi_grad: f64,
    /// Arousal → field source gain.
    pub k_field_arousal: f64,
}

impl Default for StateParams {
    fn default() -> Self {
        Self {
            u_e: 86.4,
            i_char: 8.0,
            r_char: 1000.0,
            k_i_phi: 2.0,
            gamma_psi: 0.02,
            k_r_phi: 5.0,
            alpha_psi: 3.0,
            beta_psi: 0.5,
            k_psi_grad: 0.5,
            k_field_arousal: 0.1,
        }
    }
}

impl StateParams {
    /// Information decay rate, (U_E / I_char) / 2.
    pub fn information_decay(&self) -> f64 {
        0.5 * self.u_e / self.i_char
    }

    /// Readiness decay rate, 2 U_E / R_char.
    pub fn readiness_decay(&self) -> f64 {
        2.0 * self.u_e / self.r_char
    }
}

/// Environment-field coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldParams {
    /// Diffusion coefficient.
    pub d_phi: f64,
    /// Linear sink.
    pub beta_phi: f64,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            d_phi: 0.5,
            beta_phi: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_indices_distinct() {
        assert_ne!(AROUSAL, READINESS);
        assert_ne!(READINESS, INFORMATION);
        assert_ne!(AROUSAL, INFORMATION);
    }

    #[test]
    fn test_decay_rates_positive() {
        let p = StateParams::default();
        assert!((p.information_decay() - 5.4).abs() < 1e-12);
        assert!((p.readiness_decay() - 0.1728).abs() < 1e-12);
    }

    #[test]
    fn test_field_explicit_step_stable() {
        // Explicit diffusion needs D·dt/dx² < 1/2.
        let f = FieldParams::default();
        assert!(f.d_phi * 0.1 / 1.0 < 0.5);
    }
}
