// ─────────────────────────────────────────────────────────────────────
// Dynauth — Authentication Client
// ─────────────────────────────────────────────────────────────────────
//! Device-side role: holds a secret and answers challenges.

use dynauth_types::{AuthConfig, AuthResult, Challenge, Response, Secret};

use crate::authenticator::PhysicsAuthenticator;

/// A device that proves possession of its secret by simulation.
pub struct AuthClient {
    device_id: String,
    secret: Secret,
    authenticator: PhysicsAuthenticator,
}

impl AuthClient {
    /// The config must match the server's for responses to verify.
    pub fn new(device_id: impl Into<String>, secret: Secret, config: AuthConfig) -> AuthResult<Self> {
        Ok(Self::with_authenticator(
            device_id,
            secret,
            PhysicsAuthenticator::new(config)?,
        ))
    }

    pub fn with_authenticator(
        device_id: impl Into<String>,
        secret: Secret,
        authenticator: PhysicsAuthenticator,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            secret,
            authenticator,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Public fingerprint of the held secret, safe to log.
    pub fn secret_hash(&self) -> String {
        self.secret.to_hash()
    }

    pub fn respond_to_challenge(&self, challenge: &Challenge) -> AuthResult<Response> {
        log::debug!("{} answering {}", self.device_id, challenge.id);
        self.authenticator.compute_response(challenge, &self.secret)
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("device_id", &self.device_id)
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}
