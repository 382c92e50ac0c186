//! # farmhub-domain
//!
//! Pure domain model for the farmhub telemetry and rule system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **SensorReading** (the canonical normalized telemetry record)
//!   and the payload normalization that produces it
//! - Define **Rules** (trigger → expression → ordered actions) with
//!   cooldown semantics
//! - Define **EvaluationContexts** (the variable bindings a rule's
//!   expression is tested against)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod context;
pub mod reading;
pub mod rule;
