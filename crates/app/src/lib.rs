//! # velobridge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ReadingStore` / `ReadingTransaction` — transactional persistence
//!   - `Subscriber` — per-topic callbacks on a publish/subscribe broker
//! - Decode raw telemetry payloads into domain readings
//! - Define **use-cases**:
//!   - `BatteryWriter` — atomic parent + child-row write of a battery reading
//!   - `LocationWriter` — single-statement write of a GPS fix
//!   - `Dispatcher` — topic → decoder → writer routing
//!
//! ## Dependency rule
//! Depends on `velobridge-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod decoder;
pub mod dispatcher;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
