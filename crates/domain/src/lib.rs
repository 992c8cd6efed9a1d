//! # velobridge-domain
//!
//! Pure domain model for the velobridge telemetry bridge.
//!
//! ## Responsibilities
//! - Foundational types: store-generated identifiers, error conventions, timestamps
//! - Define **Battery readings** (pack scalars plus per-cell and per-probe sequences)
//! - Define **Location readings** (GPS fixes)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod battery;
pub mod location;
