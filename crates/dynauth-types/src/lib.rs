// ─────────────────────────────────────────────────────────────────────
// Dynauth — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for dynauth:
//! challenge-response device authentication by dynamical-system
//! fingerprint.

pub mod config;
pub mod error;
pub mod protocol;

pub use config::{AuthConfig, ClassifierThresholds, SolverTolerance};
pub use error::{AuthError, AuthResult};
pub use protocol::{
    deadline_passed, round_to, unix_now_s, AuthStatus, Challenge, ChallengeId, Response, Secret,
};
