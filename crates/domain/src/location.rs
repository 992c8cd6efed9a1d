//! GPS telemetry.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One GPS fix as published by the bicycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationReading {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    pub timestamp: Timestamp,
}
