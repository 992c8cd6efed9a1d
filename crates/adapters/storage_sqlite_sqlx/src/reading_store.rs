//! `SQLite` implementation of [`ReadingStore`] and [`ReadingTransaction`].

use sqlx::{Sqlite, SqlitePool, Transaction};

use velobridge_app::ports::{ReadingStore, ReadingTransaction};
use velobridge_domain::battery::{BatteryReading, SequenceItem};
use velobridge_domain::error::TelemetryError;
use velobridge_domain::id::BatteryId;
use velobridge_domain::location::LocationReading;

use crate::error::StorageError;

const INSERT_BATTERY: &str = r"
    INSERT INTO batteries (
        bat_temp_avg, bat_temp_max, bat_temp_min,
        cell_voltage_avg, cell_voltage_max, cell_voltage_min,
        chg_enable, connected_cells, dis_enable,
        ic_temp, is_empty, is_full,
        mcu_temp, mosfet_temp, pack_current,
        pack_voltage, soc, stack_voltage,
        state, balancing_status, error_flags,
        no_idle_timestamp, timestamp
    ) VALUES (
        ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
        ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
    )
    RETURNING battery_id
";

const INSERT_CELL_VOLTAGE: &str = r"
    INSERT INTO battery_reading_cell_voltages (cell_voltage, cell_voltages_order, battery_reading_battery_id)
    VALUES (?, ?, ?)
";

const INSERT_BAT_TEMP: &str = r"
    INSERT INTO battery_reading_bat_temps (bat_temps, bat_temps_order, battery_reading_battery_id)
    VALUES (?, ?, ?)
";

const INSERT_LOCATION: &str = r"
    INSERT INTO locations (latitude, longitude, timestamp)
    VALUES (?, ?, ?)
";

/// Widen a reported `f32` to the `f64` with the same shortest decimal form,
/// so `4.1_f32` is stored as `4.1` rather than `4.099999904632568`.
fn real(value: f32) -> f64 {
    value
        .to_string()
        .parse()
        .unwrap_or_else(|_| f64::from(value))
}

/// `SQLite`-backed reading store.
///
/// Cheap to clone; clones share the same connection pool.
#[derive(Clone)]
pub struct SqliteReadingStore {
    pool: SqlitePool,
}

impl SqliteReadingStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReadingStore for SqliteReadingStore {
    type Transaction = SqliteReadingTransaction;

    async fn begin(&self) -> Result<SqliteReadingTransaction, TelemetryError> {
        let tx = self.pool.begin().await.map_err(StorageError::from)?;
        Ok(SqliteReadingTransaction { tx })
    }

    async fn insert_location(&self, reading: &LocationReading) -> Result<(), TelemetryError> {
        sqlx::query(INSERT_LOCATION)
            .bind(reading.latitude)
            .bind(reading.longitude)
            .bind(reading.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }
}

/// An open `SQLite` transaction holding one pooled connection.
///
/// Rolled back when dropped without [`commit`](ReadingTransaction::commit).
pub struct SqliteReadingTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl ReadingTransaction for SqliteReadingTransaction {
    async fn insert_battery(&mut self, reading: &BatteryReading) -> Result<BatteryId, TelemetryError> {
        let id: i64 = sqlx::query_scalar(INSERT_BATTERY)
            .bind(real(reading.bat_temp_avg))
            .bind(real(reading.bat_temp_max))
            .bind(real(reading.bat_temp_min))
            .bind(real(reading.cell_voltage_avg))
            .bind(real(reading.cell_voltage_max))
            .bind(real(reading.cell_voltage_min))
            .bind(reading.chg_enable)
            .bind(reading.connected_cells)
            .bind(reading.dis_enable)
            .bind(real(reading.ic_temp))
            .bind(reading.is_empty)
            .bind(reading.is_full)
            .bind(real(reading.mcu_temp))
            .bind(real(reading.mosfet_temp))
            .bind(real(reading.pack_current))
            .bind(real(reading.pack_voltage))
            .bind(real(reading.soc))
            .bind(real(reading.stack_voltage))
            .bind(reading.state)
            .bind(reading.balancing_status)
            .bind(reading.error_flags)
            .bind(reading.no_idle_timestamp.to_rfc3339())
            .bind(reading.timestamp.to_rfc3339())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(StorageError::from)?;

        Ok(BatteryId::from_raw(id))
    }

    async fn insert_cell_voltage(
        &mut self,
        battery_id: BatteryId,
        item: SequenceItem,
    ) -> Result<(), TelemetryError> {
        sqlx::query(INSERT_CELL_VOLTAGE)
            .bind(real(item.value))
            .bind(item.position)
            .bind(battery_id.as_raw())
            .execute(&mut *self.tx)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn insert_bat_temp(
        &mut self,
        battery_id: BatteryId,
        item: SequenceItem,
    ) -> Result<(), TelemetryError> {
        sqlx::query(INSERT_BAT_TEMP)
            .bind(real(item.value))
            .bind(item.position)
            .bind(battery_id.as_raw())
            .execute(&mut *self.tx)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn commit(self) -> Result<(), TelemetryError> {
        self.tx.commit().await.map_err(StorageError::from)?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), TelemetryError> {
        self.tx.rollback().await.map_err(StorageError::from)?;
        Ok(())
    }
}
