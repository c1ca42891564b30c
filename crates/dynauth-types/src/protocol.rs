// ─────────────────────────────────────────────────────────────────────
// Dynauth — Protocol Records
// ─────────────────────────────────────────────────────────────────────
//! Immutable records exchanged between the authenticator roles:
//! `Secret` (never leaves its owner), `Challenge` (server → client),
//! `Response` (client → server), and the `AuthStatus` verdict.

use std::fmt;
use std::cmp::Ordering;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AuthError, AuthResult};

/// Current wall-clock time as fractional UNIX seconds.
pub fn unix_now_s() -> f64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// True unless `now_s` is provably within `timeout_s` of `issued_at_s`.
///
/// Fails closed: a NaN clock, issuance time, or timeout counts as expired.
pub fn deadline_passed(issued_at_s: f64, now_s: f64, timeout_s: f64) -> bool {
    !matches!(
        (now_s - issued_at_s).partial_cmp(&timeout_s),
        Some(Ordering::Less | Ordering::Equal)
    )
}

/// Round `value` to `precision` decimal places (half away from zero).
///
/// Non-finite values pass through unchanged.
#[inline]
pub fn round_to(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        log::warn!("round_to: non-finite value {value}");
        return value;
    }
    let scale = 10f64.powi(precision as i32);
    (value * scale).round() / scale
}

/// A device's secret: the physical-model parameters it alone holds.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    /// Sensitivity coefficient (field → information coupling).
    pub k: f64,
    /// Decay coefficient of arousal.
    pub gamma: f64,
    /// Seed for the initial condition and injection noise.
    pub seed: u64,
}

impl Secret {
    pub fn new(k: f64, gamma: f64, seed: u64) -> Self {
        Self { k, gamma, seed }
    }

    /// Short identification hash. Not a security mechanism: the
    /// parameter space is small enough to enumerate.
    pub fn to_hash(&self) -> String {
        let data = format!("{:.6}:{:.6}:{}", self.k, self.gamma, self.seed);
        let digest = Sha256::digest(data.as_bytes());
        digest[..8].iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Load from JSON string, e.g. `{"k": 2.5, "gamma": 0.8, "seed": 12345}`.
    pub fn from_json(json: &str) -> AuthResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AuthError::Config(format!("secret JSON parse error: {e}")))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("hash", &self.to_hash())
            .finish_non_exhaustive()
    }
}

/// Challenge identifier, `CH-{seq:08}-{unix_secs}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(String);

impl ChallengeId {
    pub fn new(seq: u64, unix_secs: u64) -> Self {
        Self(format!("CH-{seq:08}-{unix_secs}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChallengeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChallengeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Server-issued perturbation sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    /// Non-negative perturbation magnitudes, applied in order.
    pub perturbations: Vec<f64>,
    /// Issuance time (UNIX seconds).
    pub issued_at_s: f64,
}

impl Challenge {
    /// True once more than `timeout_s` seconds have elapsed since issuance.
    pub fn is_expired(&self, timeout_s: f64) -> bool {
        self.is_expired_at(unix_now_s(), timeout_s)
    }

    pub fn is_expired_at(&self, now_s: f64, timeout_s: f64) -> bool {
        deadline_passed(self.issued_at_s, now_s, timeout_s)
    }

    pub fn len(&self) -> usize {
        self.perturbations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perturbations.is_empty()
    }
}

/// Numeric fingerprint of the final dynamical state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub challenge_id: ChallengeId,
    pub arousal: f64,
    pub information: f64,
    pub readiness: f64,
    pub field_avg: f64,
}

impl Response {
    /// `(arousal, information, readiness, field_avg)` rounded to `precision`.
    pub fn to_tuple(&self, precision: u32) -> [f64; 4] {
        [
            round_to(self.arousal, precision),
            round_to(self.information, precision),
            round_to(self.readiness, precision),
            round_to(self.field_avg, precision),
        ]
    }

    pub fn raw(&self) -> [f64; 4] {
        [self.arousal, self.information, self.readiness, self.field_avg]
    }

    pub fn is_finite(&self) -> bool {
        self.raw().iter().all(|v| v.is_finite())
    }
}

/// Verdict of `AuthServer::verify_response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthStatus {
    Success,
    Replay,
    UnknownChallenge,
    DeviceMismatch,
    Expired,
    InvalidResponse,
    NonFiniteResponse,
}

impl AuthStatus {
    pub fn is_success(self) -> bool {
        matches!(self, AuthStatus::Success)
    }

    /// Stable reason code.
    pub fn code(self) -> &'static str {
        match self {
            AuthStatus::Success => "AUTH_SUCCESS",
            AuthStatus::Replay => "REPLAY",
            AuthStatus::UnknownChallenge => "UNKNOWN_CHALLENGE",
            AuthStatus::DeviceMismatch => "DEVICE_MISMATCH",
            AuthStatus::Expired => "EXPIRED",
            AuthStatus::InvalidResponse => "INVALID_RESPONSE",
            AuthStatus::NonFiniteResponse => "NON_FINITE_RESPONSE",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(a: f64, i: f64, r: f64, phi: f64) -> Response {
        Response {
            challenge_id: ChallengeId::from("CH-00000001-0"),
            arousal: a,
            information: i,
            readiness: r,
            field_avg: phi,
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123_456_78, 6), 0.123_457);
        assert_eq!(round_to(-0.123_456_4, 6), -0.123_456);
        assert_eq!(round_to(1.5, 0), 2.0);
    }

    #[test]
    fn test_round_to_non_finite() {
        assert!(round_to(f64::NAN, 6).is_nan());
        assert_eq!(round_to(f64::INFINITY, 6), f64::INFINITY);
    }

    #[test]
    fn test_secret_hash_stable() {
        let s = Secret::new(2.5, 0.8, 12345);
        let h = s.to_hash();
        assert_eq!(h.len(), 16);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(h, Secret::new(2.5, 0.8, 12345).to_hash());
        assert_ne!(h, Secret::new(2.5, 0.8, 12346).to_hash());
    }

    #[test]
    fn test_secret_debug_hides_values() {
        let s = Secret::new(2.5, 0.8, 12345);
        let dbg = format!("{s:?}");
        assert!(dbg.contains(&s.to_hash()));
        assert!(!dbg.contains("12345"));
        assert!(!dbg.contains("2.5"));
    }

    #[test]
    fn test_secret_from_json() {
        let s = Secret::from_json(r#"{"k": 2.5, "gamma": 0.8, "seed": 12345}"#).unwrap();
        assert_eq!(s, Secret::new(2.5, 0.8, 12345));
        assert!(Secret::from_json(r#"{"k": 2.5}"#).is_err());
    }

    #[test]
    fn test_challenge_id_format() {
        let id = ChallengeId::new(7, 1_700_000_000);
        assert_eq!(id.as_str(), "CH-00000007-1700000000");
        assert_eq!(id.to_string(), "CH-00000007-1700000000");
    }

    #[test]
    fn test_challenge_expiry() {
        let ch = Challenge {
            id: ChallengeId::new(1, 0),
            perturbations: vec![1.0; 4],
            issued_at_s: 1000.0,
        };
        assert!(!ch.is_expired_at(1029.0, 30.0));
        assert!(!ch.is_expired_at(1030.0, 30.0));
        assert!(ch.is_expired_at(1030.5, 30.0));
    }

    #[test]
    fn test_challenge_expiry_fails_closed() {
        let ch = Challenge {
            id: ChallengeId::new(1, 0),
            perturbations: vec![],
            issued_at_s: 1000.0,
        };
        assert!(ch.is_expired_at(f64::NAN, 30.0));
        assert!(ch.is_expired_at(1001.0, f64::NAN));
        assert!(ch.is_expired_at(1001.0, -1.0));
        assert!(ch.is_expired(f64::NAN));
        assert!(deadline_passed(f64::NAN, 1000.0, 30.0));
        assert!(!deadline_passed(1000.0, 1000.0, 0.0));
    }

    #[test]
    fn test_fresh_challenge_not_expired() {
        let ch = Challenge {
            id: ChallengeId::new(1, 0),
            perturbations: vec![],
            issued_at_s: unix_now_s(),
        };
        assert!(!ch.is_expired(30.0));
        assert!(ch.is_empty());
    }

    #[test]
    fn test_response_tuple_order() {
        let r = response(0.1234567, 0.2, 0.3, 0.4);
        assert_eq!(r.to_tuple(6), [0.123457, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_response_tuple_equal_below_precision() {
        let a = response(0.1000001, 0.2, 0.3, 0.4);
        let b = response(0.1000002, 0.2, 0.3, 0.4);
        assert_eq!(a.to_tuple(6), b.to_tuple(6));
        assert_ne!(a.to_tuple(7), b.to_tuple(7));
    }

    #[test]
    fn test_response_finite() {
        assert!(response(0.1, 0.2, 0.3, 0.4).is_finite());
        assert!(!response(f64::NAN, 0.2, 0.3, 0.4).is_finite());
    }

    #[test]
    fn test_status_codes() {
        assert!(AuthStatus::Success.is_success());
        assert!(!AuthStatus::Replay.is_success());
        assert_eq!(AuthStatus::Replay.to_string(), "REPLAY");
        assert_eq!(
            serde_json::to_string(&AuthStatus::UnknownChallenge).unwrap(),
            "\"UNKNOWN_CHALLENGE\""
        );
    }

    #[test]
    fn test_challenge_serde() {
        let ch = Challenge {
            id: ChallengeId::new(3, 42),
            perturbations: vec![0.5, 1.5],
            issued_at_s: 42.25,
        };
        let json = serde_json::to_string(&ch).unwrap();
        assert!(json.contains("\"CH-00000003-42\""));
        let back: Challenge = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ch);
    }
}
