//! Store-generated identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier the store assigns to a persisted
/// [`BatteryReading`](crate::battery::BatteryReading) parent row.
///
/// Child rows reference their parent through this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatteryId(i64);

impl BatteryId {
    /// Wrap a raw row identifier returned by the store.
    #[must_use]
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Access the raw row identifier.
    #[must_use]
    pub fn as_raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BatteryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
