//! MQTT connection configuration.

use rumqttc::QoS;
use serde::Deserialize;

use crate::error::MqttError;

/// Concurrent handler limit when none is configured.
const DEFAULT_MAX_IN_FLIGHT: usize = 5;

/// Configuration for the MQTT broker connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker address as `[tcp://|mqtt://]host[:port]`.
    pub broker_url: String,
    /// MQTT client identifier.
    pub client_id: String,
    /// Topic carrying battery-status payloads.
    pub battery_topic: String,
    /// Topic carrying GPS-coordinates payloads.
    pub location_topic: String,
    /// Subscription quality of service (0, 1 or 2).
    pub qos: u8,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Capacity of the request channel between client and event loop.
    pub channel_capacity: usize,
    /// Maximum number of deliveries handled concurrently.
    pub max_in_flight: Option<usize>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_url: "tcp://localhost:1883".to_string(),
            client_id: "velobridge".to_string(),
            battery_topic: "/bicycle/battery-status".to_string(),
            location_topic: "/bicycle/gps-coordinates".to_string(),
            qos: 0,
            keep_alive_secs: 30,
            channel_capacity: 64,
            max_in_flight: None,
        }
    }
}

impl MqttConfig {
    /// The number of deliveries that may be handled at once, never zero.
    #[must_use]
    pub fn handler_limit(&self) -> usize {
        self.max_in_flight.unwrap_or(DEFAULT_MAX_IN_FLIGHT).max(1)
    }

    /// The configured subscription quality of service.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::InvalidQos`] if `qos` is above 2.
    pub fn subscription_qos(&self) -> Result<QoS, MqttError> {
        match self.qos {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(MqttError::InvalidQos(other)),
        }
    }
}
