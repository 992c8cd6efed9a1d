//! Location writer — persists GPS fixes.

use velobridge_domain::error::TelemetryError;
use velobridge_domain::location::LocationReading;

use crate::ports::ReadingStore;

/// Application service writing [`LocationReading`]s.
pub struct LocationWriter<S> {
    store: S,
}

impl<S: ReadingStore> LocationWriter<S> {
    /// Create a new writer backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist `reading` with a single insert statement.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the insert fails. The failure is logged
    /// here and never retried.
    pub async fn write(&self, reading: &LocationReading) -> Result<(), TelemetryError> {
        self.store
            .insert_location(reading)
            .await
            .inspect_err(|err| {
                tracing::error!(error = ?err, "failed to insert location reading");
            })
    }
}
