// ─────────────────────────────────────────────────────────────────────
// Dynauth — Protocol Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Challenge-response protocol: the stateless `PhysicsAuthenticator`,
//! the device-side `AuthClient`, and the stateful `AuthServer`.
//!
//! # Protocol Invariants
//!
//! 1. **Single use**: a challenge identifier is consumed by the first
//!    verification that reaches the comparison step, whatever its
//!    outcome. Every later submission yields `Replay`.
//!
//! 2. **Bound to a device**: a response submitted under a device other
//!    than the one the challenge was issued to never succeeds.
//!
//! 3. **Time-limited**: a pending challenge older than
//!    `challenge_timeout_s` is purged and reported `Expired`.
//!
//! 4. **Deterministic responses**: the same challenge and secret give
//!    bit-identical responses on any instance, independent of call
//!    history.

pub mod authenticator;
pub mod client;
pub mod server;

pub use authenticator::PhysicsAuthenticator;
pub use client::AuthClient;
pub use server::AuthServer;
