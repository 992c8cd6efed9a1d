//! Battery writer — persists a battery reading and its per-cell and per-probe
//! child rows as one atomic unit.

use velobridge_domain::battery::BatteryReading;
use velobridge_domain::error::TelemetryError;
use velobridge_domain::id::BatteryId;

use crate::ports::{ReadingStore, ReadingTransaction};

/// Application service writing [`BatteryReading`]s.
pub struct BatteryWriter<S> {
    store: S,
}

impl<S: ReadingStore> BatteryWriter<S> {
    /// Create a new writer backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist `reading` in a single transaction.
    ///
    /// The parent row is inserted first, then one row per cell voltage and
    /// one row per battery temperature, each carrying its 1-based position
    /// and the parent's generated identifier. Either every row becomes
    /// visible or none does. Failures are logged here and never retried.
    ///
    /// # Errors
    ///
    /// Returns the storage error of the first step that failed (begin, any
    /// insert, or commit). The transaction has been rolled back by then.
    pub async fn write(&self, reading: &BatteryReading) -> Result<BatteryId, TelemetryError> {
        let mut tx = self.store.begin().await.inspect_err(|err| {
            tracing::error!(error = ?err, "failed to begin battery transaction");
        })?;

        match stage(&mut tx, reading).await {
            Ok(battery_id) => {
                tx.commit().await.inspect_err(|err| {
                    tracing::error!(
                        error = ?err,
                        %battery_id,
                        "failed to commit battery transaction"
                    );
                })?;
                Ok(battery_id)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = ?rollback_err, "failed to roll back battery transaction");
                }
                Err(err)
            }
        }
    }
}

async fn stage<T: ReadingTransaction>(
    tx: &mut T,
    reading: &BatteryReading,
) -> Result<BatteryId, TelemetryError> {
    let battery_id = tx.insert_battery(reading).await.inspect_err(|err| {
        tracing::error!(error = ?err, "failed to insert battery reading");
    })?;

    for item in reading.cell_voltage_items() {
        tx.insert_cell_voltage(battery_id, item)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    error = ?err,
                    %battery_id,
                    position = item.position,
                    "failed to insert cell voltage"
                );
            })?;
    }

    for item in reading.bat_temp_items() {
        tx.insert_bat_temp(battery_id, item)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    error = ?err,
                    %battery_id,
                    position = item.position,
                    "failed to insert battery temperature"
                );
            })?;
    }

    Ok(battery_id)
}
