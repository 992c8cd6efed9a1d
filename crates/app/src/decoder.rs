//! Payload decoder — raw MQTT payloads into typed readings.
//!
//! Decoding is structural: unknown keys are ignored and missing keys (or keys
//! set to `null`) take their zero value — `0` for numbers, `false` for flags,
//! an empty sequence for arrays and the UNIX epoch for timestamps. No field is
//! required.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde_json::Value;

use velobridge_domain::battery::BatteryReading;
use velobridge_domain::error::DecodeError;
use velobridge_domain::location::LocationReading;

/// Decode a battery-status payload.
///
/// # Errors
///
/// Returns [`DecodeError`] when the payload is not a JSON object or a field
/// holds a value of the wrong type.
pub fn decode_battery(payload: &[u8]) -> Result<BatteryReading, DecodeError> {
    decode(payload, "battery")
}

/// Decode a GPS-coordinates payload.
///
/// # Errors
///
/// Returns [`DecodeError`] when the payload is not a JSON object or a field
/// holds a value of the wrong type.
pub fn decode_location(payload: &[u8]) -> Result<LocationReading, DecodeError> {
    decode(payload, "location")
}

fn decode<T>(payload: &[u8], shape: &'static str) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Debug,
{
    tracing::info!(
        shape,
        payload = %String::from_utf8_lossy(payload),
        "decoding payload"
    );

    let mut fields = match serde_json::from_slice(payload)? {
        Value::Object(fields) => fields,
        other => {
            return Err(DecodeError::NotAnObject {
                found: json_type(&other),
            });
        }
    };
    fields.retain(|_, value| !value.is_null());

    let reading: T = serde_json::from_value(Value::Object(fields))?;

    tracing::info!(shape, ?reading, "decoded payload");

    Ok(reading)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use velobridge_domain::time::epoch;

    const FULL_BATTERY: &str = r#"{
        "state": 2,
        "chg_enable": true,
        "dis_enable": false,
        "connected_cells": 3,
        "cell_voltages": [3.70, 3.71, 3.69],
        "cell_voltage_max": 3.71,
        "cell_voltage_min": 3.69,
        "cell_voltage_avg": 3.70,
        "pack_voltage": 11.1,
        "stack_voltage": 11.08,
        "pack_current": -1.5,
        "bat_temps": [24.5, 25.0],
        "bat_temp_max": 25.0,
        "bat_temp_min": 24.5,
        "bat_temp_avg": 24.75,
        "mosfet_temp": 30.0,
        "ic_temp": 31.5,
        "mcu_temp": 33.0,
        "full": false,
        "empty": true,
        "soc": 87.5,
        "balancing_status": 5,
        "no_idle_timestamp": "2024-05-01T11:59:00Z",
        "error_flags": 4096,
        "timestamp": "2024-05-01T12:00:00Z"
    }"#;

    #[test]
    fn should_decode_every_battery_field() {
        let reading = decode_battery(FULL_BATTERY.as_bytes()).unwrap();

        assert_eq!(reading.state, 2);
        assert!(reading.chg_enable);
        assert!(!reading.dis_enable);
        assert_eq!(reading.connected_cells, 3);
        assert_eq!(reading.cell_voltages, vec![3.70, 3.71, 3.69]);
        assert_eq!(reading.bat_temps, vec![24.5, 25.0]);
        assert!(!reading.is_full);
        assert!(reading.is_empty);
        assert_eq!(reading.balancing_status, 5);
        assert_eq!(reading.error_flags, 4096);
        assert!((reading.pack_current + 1.5).abs() < f32::EPSILON);
        assert!((reading.soc - 87.5).abs() < f32::EPSILON);
        assert!((reading.mcu_temp - 33.0).abs() < f32::EPSILON);
        assert_eq!(
            reading.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(
            reading.no_idle_timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 11, 59, 0).unwrap()
        );
    }

    #[test]
    fn should_decode_same_bytes_to_equal_readings() {
        let first = decode_battery(FULL_BATTERY.as_bytes()).unwrap();
        let second = decode_battery(FULL_BATTERY.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn should_default_missing_battery_fields_to_zero_values() {
        let reading = decode_battery(br#"{"state": 1}"#).unwrap();

        assert_eq!(reading.state, 1);
        assert_eq!(reading.connected_cells, 0);
        assert!(!reading.chg_enable);
        assert!(!reading.is_full);
        assert!(reading.cell_voltages.is_empty());
        assert!(reading.bat_temps.is_empty());
        assert!(reading.pack_voltage.abs() < f32::EPSILON);
        assert_eq!(reading.timestamp, epoch());
        assert_eq!(reading.no_idle_timestamp, epoch());
    }

    #[test]
    fn should_decode_empty_object_to_default_reading() {
        let reading = decode_battery(b"{}").unwrap();
        assert_eq!(reading, BatteryReading::default());
    }

    #[test]
    fn should_treat_null_fields_as_missing() {
        let reading =
            decode_battery(br#"{"state": null, "cell_voltages": null, "timestamp": null}"#)
                .unwrap();
        assert_eq!(reading.state, 0);
        assert!(reading.cell_voltages.is_empty());
        assert_eq!(reading.timestamp, epoch());
    }

    #[test]
    fn should_ignore_unknown_fields() {
        let reading =
            decode_battery(br#"{"state": 3, "firmware": "1.2.0", "extra": [1, 2]}"#).unwrap();
        assert_eq!(reading.state, 3);
    }

    #[test]
    fn should_reject_malformed_json() {
        let err = decode_battery(b"{\"state\": 2,").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn should_reject_non_object_payload() {
        let err = decode_battery(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { found: "array" }));

        let err = decode_location(b"null").unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { found: "null" }));
    }

    #[test]
    fn should_reject_wrongly_typed_field() {
        let err = decode_battery(br#"{"cell_voltages": "4.1,4.0"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn should_reject_out_of_range_integer() {
        let err = decode_battery(br#"{"state": 70000}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));

        let err = decode_battery(br#"{"connected_cells": -1}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn should_reject_unparseable_timestamp() {
        let err = decode_location(br#"{"timestamp": "yesterday"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn should_decode_location() {
        let reading = decode_location(
            br#"{"latitude": 52.1, "longitude": 4.3, "timestamp": "2024-05-01T12:00:00Z"}"#,
        )
        .unwrap();

        assert!((reading.latitude - 52.1).abs() < f64::EPSILON);
        assert!((reading.longitude - 4.3).abs() < f64::EPSILON);
        assert_eq!(
            reading.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn should_default_missing_location_timestamp() {
        let reading = decode_location(br#"{"latitude": 52.1, "longitude": 4.3}"#).unwrap();
        assert_eq!(reading.timestamp, epoch());
    }
}
