//! Battery-management telemetry.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One battery-management reading as published by the bicycle.
///
/// Fields missing from a payload take their zero value (see
/// [`Default`]). `cell_voltages` holds one entry per connected cell and
/// `bat_temps` one entry per temperature probe; both keep the order in which
/// the device reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryReading {
    /// Operating state reported by the BMS.
    pub state: u16,
    pub chg_enable: bool,
    pub dis_enable: bool,
    pub connected_cells: u16,
    pub cell_voltages: Vec<f32>,
    pub cell_voltage_max: f32,
    pub cell_voltage_min: f32,
    pub cell_voltage_avg: f32,
    pub pack_voltage: f32,
    pub stack_voltage: f32,
    pub pack_current: f32,
    pub bat_temps: Vec<f32>,
    pub bat_temp_max: f32,
    pub bat_temp_min: f32,
    pub bat_temp_avg: f32,
    pub mosfet_temp: f32,
    pub ic_temp: f32,
    pub mcu_temp: f32,
    #[serde(rename = "full")]
    pub is_full: bool,
    #[serde(rename = "empty")]
    pub is_empty: bool,
    /// State of charge, in percent.
    pub soc: f32,
    /// One bit per cell currently being balanced.
    pub balancing_status: u32,
    /// Last time the pack current exceeded the idle threshold.
    pub no_idle_timestamp: Timestamp,
    pub error_flags: u32,
    pub timestamp: Timestamp,
}

/// One element of a reading's variable-length sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceItem {
    /// 1-based position within the sequence.
    pub position: u32,
    pub value: f32,
}

impl BatteryReading {
    /// Cell voltages paired with their 1-based positions, in reported order.
    pub fn cell_voltage_items(&self) -> impl Iterator<Item = SequenceItem> + '_ {
        positioned(&self.cell_voltages)
    }

    /// Battery temperatures paired with their 1-based positions, in reported order.
    pub fn bat_temp_items(&self) -> impl Iterator<Item = SequenceItem> + '_ {
        positioned(&self.bat_temps)
    }

    /// Number of statements needed to persist this reading: the parent row
    /// plus one row per sequence element.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        1 + self.cell_voltages.len() + self.bat_temps.len()
    }
}

fn positioned(values: &[f32]) -> impl Iterator<Item = SequenceItem> + '_ {
    (1_u32..)
        .zip(values.iter().copied())
        .map(|(position, value)| SequenceItem { position, value })
}
