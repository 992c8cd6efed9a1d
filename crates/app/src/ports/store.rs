//! Store port — transactional persistence for readings.

use std::future::Future;
use std::sync::Arc;

use velobridge_domain::battery::{BatteryReading, SequenceItem};
use velobridge_domain::error::TelemetryError;
use velobridge_domain::id::BatteryId;
use velobridge_domain::location::LocationReading;

/// Relational store that readings are written to.
///
/// Implementations hand out pooled connections and must be safe to use from
/// several writers at once.
pub trait ReadingStore: Send + Sync {
    /// Transaction handle returned by [`begin`](Self::begin).
    type Transaction: ReadingTransaction;

    /// Start a new transaction on a dedicated connection.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, TelemetryError>> + Send;

    /// Persist a location reading as a single statement, outside any
    /// transaction.
    fn insert_location(
        &self,
        reading: &LocationReading,
    ) -> impl Future<Output = Result<(), TelemetryError>> + Send;
}

/// An open transaction.
///
/// Dropping a transaction without calling [`commit`](Self::commit) must
/// discard every statement executed through it.
pub trait ReadingTransaction: Send {
    /// Insert the parent row for a battery reading and return the identifier
    /// the store generated for it.
    fn insert_battery(
        &mut self,
        reading: &BatteryReading,
    ) -> impl Future<Output = Result<BatteryId, TelemetryError>> + Send;

    /// Insert one cell-voltage child row.
    fn insert_cell_voltage(
        &mut self,
        battery_id: BatteryId,
        item: SequenceItem,
    ) -> impl Future<Output = Result<(), TelemetryError>> + Send;

    /// Insert one battery-temperature child row.
    fn insert_bat_temp(
        &mut self,
        battery_id: BatteryId,
        item: SequenceItem,
    ) -> impl Future<Output = Result<(), TelemetryError>> + Send;

    /// Make every statement of this transaction visible.
    fn commit(self) -> impl Future<Output = Result<(), TelemetryError>> + Send;

    /// Discard every statement of this transaction.
    fn rollback(self) -> impl Future<Output = Result<(), TelemetryError>> + Send;
}

impl<T: ReadingStore> ReadingStore for Arc<T> {
    type Transaction = T::Transaction;

    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, TelemetryError>> + Send {
        (**self).begin()
    }

    fn insert_location(
        &self,
        reading: &LocationReading,
    ) -> impl Future<Output = Result<(), TelemetryError>> + Send {
        (**self).insert_location(reading)
    }
}
