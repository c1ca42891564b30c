// ─────────────────────────────────────────────────────────────────────
// Dynauth — Authentication Server
// ─────────────────────────────────────────────────────────────────────
//! Challenge lifecycle per identifier:
//!
//!   ISSUED ──► CONSUMED (Success | InvalidResponse | NonFiniteResponse)
//!      └─────► EXPIRED  (detected lazily or by `purge_expired`)
//!
//! Verification checks, first match wins:
//!   0. pending and past its timeout → purged, `Expired`
//!   1. already consumed             → `Replay`
//!   2. not pending                  → `UnknownChallenge`
//!   3. issued to another device     → `DeviceMismatch`
//!   4. consume (used-set insert + pending remove)
//!   5. numeric comparison           → `Success` | `InvalidResponse`
//!
//! Steps 0–4 run under one lock acquisition, so two concurrent
//! verifications of the same identifier can never both consume it.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use dynauth_types::{
    deadline_passed, unix_now_s, AuthConfig, AuthError, AuthResult, AuthStatus, Challenge,
    ChallengeId, Response, Secret,
};

use crate::authenticator::PhysicsAuthenticator;

#[derive(Debug, Clone)]
struct PendingChallenge {
    device_id: String,
    expected: Response,
    issued_at_s: f64,
}

#[derive(Debug, Default)]
struct ServerState {
    registry: HashMap<String, Secret>,
    pending: HashMap<ChallengeId, PendingChallenge>,
    used: HashSet<ChallengeId>,
}

/// Stateful protocol orchestrator.
///
/// Thread-safe: registry, pending table, and used-set are guarded by a
/// single `parking_lot::Mutex`.
pub struct AuthServer {
    authenticator: PhysicsAuthenticator,
    state: Mutex<ServerState>,
}

impl Default for AuthServer {
    fn default() -> Self {
        Self::with_authenticator(PhysicsAuthenticator::default())
    }
}

impl AuthServer {
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        Ok(Self::with_authenticator(PhysicsAuthenticator::new(config)?))
    }

    pub fn with_authenticator(authenticator: PhysicsAuthenticator) -> Self {
        Self {
            authenticator,
            state: Mutex::new(ServerState::default()),
        }
    }

    pub fn authenticator(&self) -> &PhysicsAuthenticator {
        &self.authenticator
    }

    /// Register (or replace) a device's secret.
    pub fn register_device(&self, device_id: impl Into<String>, secret: Secret) {
        let device_id = device_id.into();
        log::info!("registering device {device_id} (secret {})", secret.to_hash());
        self.state.lock().registry.insert(device_id, secret);
    }

    pub fn is_registered(&self, device_id: &str) -> bool {
        self.state.lock().registry.contains_key(device_id)
    }

    /// Issue a challenge for `device_id` and remember the expected response.
    pub fn create_challenge(&self, device_id: &str) -> AuthResult<Challenge> {
        let secret = self.state.lock().registry.get(device_id).copied();
        let Some(secret) = secret else {
            log::warn!("challenge requested for unregistered device {device_id}");
            return Err(AuthError::UnregisteredDevice(device_id.to_string()));
        };

        // Integration runs outside the lock.
        let challenge = self.authenticator.generate_default_challenge();
        let expected = self.authenticator.compute_response(&challenge, &secret)?;

        self.state.lock().pending.insert(
            challenge.id.clone(),
            PendingChallenge {
                device_id: device_id.to_string(),
                expected,
                issued_at_s: challenge.issued_at_s,
            },
        );
        log::debug!("issued {} to {device_id}", challenge.id);
        Ok(challenge)
    }

    /// Verify a response against the current wall clock.
    pub fn verify_response(&self, device_id: &str, response: &Response) -> AuthStatus {
        self.verify_response_at(device_id, response, unix_now_s())
    }

    /// Verify a response as of `now_s` (UNIX seconds).
    ///
    /// A non-finite `now_s` treats every pending challenge as expired.
    pub fn verify_response_at(&self, device_id: &str, response: &Response, now_s: f64) -> AuthStatus {
        let cid = &response.challenge_id;
        let config = self.authenticator.config();
        let timeout_s = config.challenge_timeout_s;

        let expected = {
            let mut state = self.state.lock();

            let expired = state
                .pending
                .get(cid)
                .is_some_and(|p| deadline_passed(p.issued_at_s, now_s, timeout_s));
            if expired {
                state.pending.remove(cid);
                log::warn!("challenge {cid} expired before verification");
                return AuthStatus::Expired;
            }

            if state.used.contains(cid) {
                log::warn!("replayed challenge {cid} from {device_id}");
                return AuthStatus::Replay;
            }

            let owner_matches = match state.pending.get(cid) {
                None => return AuthStatus::UnknownChallenge,
                Some(p) => p.device_id == device_id,
            };
            if !owner_matches {
                log::warn!("challenge {cid} answered by wrong device {device_id}");
                if config.consume_on_device_mismatch {
                    state.pending.remove(cid);
                    state.used.insert(cid.clone());
                }
                return AuthStatus::DeviceMismatch;
            }

            let Some(pending) = state.pending.remove(cid) else {
                return AuthStatus::UnknownChallenge;
            };
            state.used.insert(cid.clone());
            pending.expected
        };

        if !response.is_finite() {
            log::warn!("non-finite response for {cid} from {device_id}");
            return AuthStatus::NonFiniteResponse;
        }
        if self.authenticator.verify(response, &expected) {
            AuthStatus::Success
        } else {
            AuthStatus::InvalidResponse
        }
    }

    /// Drop every pending challenge past its timeout. Returns how many.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(unix_now_s())
    }

    pub fn purge_expired_at(&self, now_s: f64) -> usize {
        let timeout_s = self.authenticator.config().challenge_timeout_s;
        let mut state = self.state.lock();
        let before = state.pending.len();
        state
            .pending
            .retain(|_, p| !deadline_passed(p.issued_at_s, now_s, timeout_s));
        let purged = before - state.pending.len();
        if purged > 0 {
            log::debug!("purged {purged} expired challenges");
        }
        purged
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn used_count(&self) -> usize {
        self.state.lock().used.len()
    }
}
