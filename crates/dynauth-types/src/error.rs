// ─────────────────────────────────────────────────────────────────────
// Dynauth — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all dynauth failures.
///
/// Expected protocol rejections (replay, expiry, mismatch) are not
/// errors; they are reported through [`crate::AuthStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// A challenge was requested for a device that was never registered.
    #[error("unregistered device: {0}")]
    UnregisteredDevice(String),

    /// Numerical error (NaN/Inf in state, field, or integrator).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Invalid input (stress, field, parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

impl AuthError {
    /// Stable reason code, in the same vocabulary as `AuthStatus::code`.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::UnregisteredDevice(_) => "UNREGISTERED_DEVICE",
            AuthError::Numerical(_) => "NUMERICAL_ERROR",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::Config(_) => "CONFIG_ERROR",
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
