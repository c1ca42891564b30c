// ─────────────────────────────────────────────────────────────────────
// Dynauth — Physics Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Drive/field dynamical system: adaptive Dormand–Prince integrator,
//! pluggable governing equations, the stress-driven `DynamicalAgent`,
//! and the capability classifier.

pub mod agent;
pub mod classifier;
pub mod dynamics;
pub mod params;
pub mod solver;

pub use agent::{AgentReadout, DriveState, DynamicalAgent, RawState};
pub use classifier::{
    ArousalLevel, Capabilities, InformationLevel, ReadinessLevel, StateClassifier,
};
pub use dynamics::{DiffusionField, DriveDynamics, FieldDynamics, StateDynamics};
pub use params::{FieldParams, StateParams};
pub use solver::{Dopri5, Integration};
